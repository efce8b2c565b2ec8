use crate::error::ApiError;
use crate::library::ListKind;
use crate::movies::MovieQuery;
use crate::session::{SessionProfile, UserSession};
use crate::AppState;
use actix_web::{web, HttpResponse};
use log::{debug, error};
use serde::Deserialize;
use serde_json::json;

type State = web::Data<AppState>;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/users/login", web::post().to(login))
            .route("/users/register", web::post().to(register))
            .route("/users/updatePassword", web::post().to(update_password))
            .route("/users/logout", web::post().to(logout))
            .route("/users/me", web::get().to(me))
            .route("/movies", web::get().to(movies))
            .route("/movies/{id}", web::get().to(movie))
            .route("/library", web::get().to(library))
            .route("/library/watched/{id}", web::post().to(watched))
            .route("/library/{list}/{id}", web::post().to(toggle)),
    );
}

/// Field names of the older JS clients (`Email`, `FullName`, ...) are
/// accepted alongside the lower-case ones.
#[derive(Deserialize)]
struct LoginParams {
    #[serde(default, alias = "Email")]
    email: String,
    #[serde(default, alias = "Password")]
    password: String,
}

#[derive(Deserialize)]
struct RegisterParams {
    #[serde(default, alias = "FullName")]
    name: String,
    #[serde(default, alias = "Email")]
    email: String,
    #[serde(default, alias = "Password")]
    password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdatePasswordParams {
    email: Option<String>,
    current_password: Option<String>,
    new_password: Option<String>,
}

#[derive(Deserialize)]
struct MoviesParams {
    query: Option<String>,
    genre: Option<String>,
    page: Option<String>,
}

/// Page numbers start at 1; anything unparsable is page 1.
pub fn parse_page(page: Option<&str>) -> u32 {
    page.and_then(|page| page.trim().parse().ok())
        .filter(|page| *page >= 1)
        .unwrap_or(1)
}

async fn login(
    params: web::Json<LoginParams>,
    state: State,
    session: UserSession,
) -> Result<HttpResponse, ApiError> {
    if params.email.trim().is_empty() || params.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and Password are required".to_owned(),
        ));
    }
    let outcome = state.auth.login(params.email.trim(), &params.password).await;
    if let Some(user) = outcome.user() {
        session.begin(&user.id, &SessionProfile::for_user(user))?;
    }
    Ok(HttpResponse::build(outcome.status).json(&outcome))
}

async fn register(
    params: web::Json<RegisterParams>,
    state: State,
    session: UserSession,
) -> Result<HttpResponse, ApiError> {
    if params.name.trim().is_empty() || params.email.trim().is_empty() || params.password.is_empty()
    {
        return Err(ApiError::BadRequest(
            "Fullname, Email and password are required".to_owned(),
        ));
    }
    let outcome = state
        .auth
        .register(params.name.trim(), params.email.trim(), &params.password)
        .await;
    if let Some(user) = outcome.user() {
        session.begin(&user.id, &SessionProfile::for_user(user))?;
    }
    Ok(HttpResponse::build(outcome.status).json(&outcome))
}

// Accepted and acknowledged; nothing is changed upstream.
async fn update_password(params: web::Json<UpdatePasswordParams>) -> HttpResponse {
    debug!(
        "Password update for {:?} (current given: {}, new given: {})",
        params.email,
        params.current_password.is_some(),
        params.new_password.is_some()
    );
    HttpResponse::Ok().json(json!({ "message": "Password updated successfully" }))
}

async fn logout(session: UserSession) -> HttpResponse {
    session.end();
    HttpResponse::Ok().json(json!({ "message": "Logged out" }))
}

async fn me(session: UserSession) -> Result<HttpResponse, ApiError> {
    match session.profile()? {
        Some(profile) => Ok(HttpResponse::Ok().json(profile)),
        None => Err(ApiError::Unauthorized),
    }
}

async fn movies(params: web::Query<MoviesParams>, state: State) -> HttpResponse {
    let request = MovieQuery::from_params(params.query.as_deref(), params.genre.as_deref());
    match state
        .movies
        .movies(&request, parse_page(params.page.as_deref()))
        .await
    {
        Ok(movies) => HttpResponse::Ok().json(json!({ "movies": movies, "success": true })),
        Err(err) => {
            error!("Error in movies API: {}", err);
            HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to fetch movies", "success": false }))
        }
    }
}

async fn movie(path: web::Path<String>, state: State) -> HttpResponse {
    match state.movies.movie(&path).await {
        Ok(Some(movie)) => HttpResponse::Ok().json(json!({ "movie": movie, "success": true })),
        Ok(None) => HttpResponse::NotFound()
            .json(json!({ "error": "Movie not found", "success": false })),
        Err(err) => {
            error!("Error fetching movie {}: {}", path.as_str(), err);
            HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to fetch movie", "success": false }))
        }
    }
}

/// Library entries must point at videos that exist.
async fn require_video(state: &AppState, id: &str) -> Result<(), ApiError> {
    match state.movies.movie(id).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::NotFound("Movie not found".to_owned())),
    }
}

async fn library(session: UserSession) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(session.library()?))
}

async fn toggle(
    path: web::Path<(String, String)>,
    state: State,
    session: UserSession,
) -> Result<HttpResponse, ApiError> {
    let (list, id) = path.into_inner();
    let kind: ListKind = list.parse().map_err(ApiError::NotFound)?;
    require_video(&state, &id).await?;
    let (library, active) = session.update_library(|library| library.toggle(kind, &id))?;
    Ok(HttpResponse::Ok().json(json!({ "id": id, "active": active, "library": library })))
}

async fn watched(
    path: web::Path<String>,
    state: State,
    session: UserSession,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    require_video(&state, &id).await?;
    let (library, ()) = session.update_library(|library| library.select(&id))?;
    Ok(HttpResponse::Ok().json(json!({ "id": id, "library": library })))
}
