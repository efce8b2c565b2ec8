use crate::admin::AdminOverview;
use crate::catalog::{self, Catalog};
use crate::error::log_error;
use crate::library::{Library, ListKind};
use crate::model::*;
use crate::session::{SessionProfile, UserSession};
use crate::view::{self, VideoCard, ViewMode};
use crate::AppState;
use actix_web::{http::StatusCode, web, HttpRequest, HttpResponse};
use log::warn;
use serde::{Deserialize, Serialize};

type Tera = web::Data<tera::Tera>;
type State = web::Data<AppState>;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/videos/{id}", web::get().to(video_detail))
        .route("/videos/{id}/{list}", web::post().to(toggle))
        .route("/users/login", web::get().to(login))
        .route("/users/login", web::post().to(login_post))
        .route("/users/register", web::get().to(register))
        .route("/users/register", web::post().to(register_post))
        .route("/users/logout", web::get().to(logout))
        .route("/users/dashboard", web::get().to(dashboard))
        .route("/users/profile", web::get().to(profile))
        .route("/users/profile", web::post().to(profile_post))
        .route("/users/profile/password", web::post().to(password_post))
        .route("/admin/login", web::get().to(admin_login))
        .route("/admin/login", web::post().to(admin_login_post))
        .route("/admin/dashboard", web::get().to(admin_dashboard));
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header(("location", location))
        .finish()
}

fn render(
    tera: &tera::Tera,
    template: &str,
    ctx: &tera::Context,
) -> actix_web::Result<HttpResponse> {
    render_with(tera, template, ctx, HttpResponse::Ok())
}

fn render_with(
    tera: &tera::Tera,
    template: &str,
    ctx: &tera::Context,
    mut response: actix_web::HttpResponseBuilder,
) -> actix_web::Result<HttpResponse> {
    let body = tera
        .render(template, ctx)
        .map_err(|err| log_error(err, "Template error"))?;
    Ok(response.content_type("text/html").body(body))
}

fn session_profile(session: &UserSession) -> actix_web::Result<Option<SessionProfile>> {
    session
        .profile()
        .map_err(|err| log_error(err, "Session error"))
}

fn session_library(session: &UserSession) -> actix_web::Result<Library> {
    session
        .library()
        .map_err(|err| log_error(err, "Session error"))
}

/// Context every page starts from: the signed-in user, if any.
fn base_context(session: &UserSession) -> actix_web::Result<tera::Context> {
    let mut ctx = tera::Context::new();
    let profile = session_profile(session)?;
    if let Some(profile) = &profile {
        ctx.insert("initials", &profile.initials());
        ctx.insert("first_name", profile.first_name());
    }
    ctx.insert("user", &profile);
    Ok(ctx)
}

/// Only same-site paths are followed after a form post.
fn safe_next(next: Option<&str>, default: &str) -> String {
    match next {
        Some(next) if next.starts_with('/') && !next.starts_with("//") && !next.contains('\\') => {
            next.to_owned()
        }
        _ => default.to_owned(),
    }
}

fn current_url(req: &HttpRequest) -> String {
    if req.query_string().is_empty() {
        req.path().to_owned()
    } else {
        format!("{}?{}", req.path(), req.query_string())
    }
}

fn has_flag(req: &HttpRequest, flag: &str) -> bool {
    req.query_string()
        .split('&')
        .any(|part| part == flag || part.starts_with(&format!("{}=", flag)))
}

#[derive(Serialize)]
struct Choice {
    value: &'static str,
    label: &'static str,
    selected: bool,
}

fn genre_choices(selected: GenreFilter) -> Vec<Choice> {
    let mut choices = vec![Choice {
        value: "all",
        label: "All",
        selected: selected == GenreFilter::All,
    }];
    choices.extend(Genre::ALL.iter().map(|genre| Choice {
        value: genre.as_str(),
        label: genre.label(),
        selected: selected == GenreFilter::Only(*genre),
    }));
    choices
}

fn view_choices(selected: ViewMode) -> Vec<Choice> {
    ViewMode::ALL
        .iter()
        .map(|mode| Choice {
            value: mode.as_str(),
            label: mode.label(),
            selected: *mode == selected,
        })
        .collect()
}

#[derive(Deserialize)]
struct BrowseParams {
    genre: Option<String>,
    q: Option<String>,
    view: Option<String>,
}

async fn index(
    req: HttpRequest,
    params: web::Query<BrowseParams>,
    tera: Tera,
    state: State,
    session: UserSession,
) -> actix_web::Result<HttpResponse> {
    let mut ctx = base_context(&session)?;
    let genre = GenreFilter::parse(params.genre.as_deref());
    let query = params.q.clone().unwrap_or_default();
    let mode = ViewMode::parse(params.view.as_deref());
    let catalog = state.movies.browse(&state.fallback).await;
    let library = session_library(&session)?;
    let videos = catalog.filter(genre, &query);

    ctx.insert("genres", &genre_choices(genre));
    ctx.insert("views", &view_choices(mode));
    ctx.insert("genre", genre.as_str());
    ctx.insert("theme", genre.theme());
    ctx.insert("query", &query);
    ctx.insert("view", mode.as_str());
    ctx.insert("total_videos", &videos.len());
    ctx.insert("total_favorites", &library.favorites.len());
    ctx.insert("next", &current_url(&req));
    ctx.insert("layout", &view::project(mode, view::cards(videos, &library)));
    render(&tera, "index.html", &ctx)
}

/// Looks a video up in the movie source, then in the fallback catalog if the
/// source is failing.
async fn find_video(state: &AppState, id: &str) -> Option<Video> {
    match state.movies.movie(id).await {
        Ok(video) => video,
        Err(err) => {
            warn!("{}, looking up {} in the built-in catalog", err, id);
            state.fallback.get(id).cloned()
        }
    }
}

fn not_found(tera: &tera::Tera, ctx: &mut tera::Context) -> actix_web::Result<HttpResponse> {
    ctx.insert("message", "Video not found");
    render_with(tera, "not_found.html", ctx, HttpResponse::NotFound())
}

async fn video_detail(
    req: HttpRequest,
    path: web::Path<String>,
    tera: Tera,
    state: State,
    session: UserSession,
) -> actix_web::Result<HttpResponse> {
    let id = path.into_inner();
    let mut ctx = base_context(&session)?;
    let video = match find_video(&state, &id).await {
        Some(video) => video,
        None => return not_found(&tera, &mut ctx),
    };
    let (library, ()) = session
        .update_library(|library| library.select(&video.id))
        .map_err(|err| log_error(err, "Session error"))?;
    ctx.insert("card", &VideoCard::new(&video, &library));
    ctx.insert("next", &current_url(&req));
    render(&tera, "video.html", &ctx)
}

#[derive(Deserialize)]
struct ToggleForm {
    next: Option<String>,
}

async fn toggle(
    path: web::Path<(String, String)>,
    form: web::Form<ToggleForm>,
    tera: Tera,
    state: State,
    session: UserSession,
) -> actix_web::Result<HttpResponse> {
    let (id, list) = path.into_inner();
    let kind: ListKind = match list.parse() {
        Ok(kind) => kind,
        Err(_) => return not_found(&tera, &mut base_context(&session)?),
    };
    if find_video(&state, &id).await.is_none() {
        return not_found(&tera, &mut base_context(&session)?);
    }
    session
        .update_library(|library| library.toggle(kind, &id))
        .map_err(|err| log_error(err, "Session error"))?;
    Ok(redirect(&safe_next(
        form.next.as_deref(),
        &format!("/videos/{}", id),
    )))
}

async fn login(
    req: HttpRequest,
    tera: Tera,
    session: UserSession,
) -> actix_web::Result<HttpResponse> {
    let mut ctx = base_context(&session)?;
    if has_flag(&req, "invalid") {
        ctx.insert("error", "Invalid credentials");
    } else if has_flag(&req, "failed") {
        ctx.insert("error", "Login failed. Please try again.");
    } else if has_flag(&req, "logout") {
        ctx.insert("notice", "You have been signed out.");
    } else if has_flag(&req, "registered") {
        ctx.insert("notice", "Account created. Confirm your email, then sign in.");
    }
    render(&tera, "login.html", &ctx)
}

#[derive(Deserialize)]
struct LoginForm {
    email: String,
    password: String,
}

async fn login_post(
    form: web::Form<LoginForm>,
    state: State,
    session: UserSession,
) -> actix_web::Result<HttpResponse> {
    if form.email.trim().is_empty() || form.password.is_empty() {
        return Ok(redirect("/users/login?invalid"));
    }
    let outcome = state.auth.login(form.email.trim(), &form.password).await;
    match outcome.user() {
        Some(user) => {
            session
                .begin(&user.id, &SessionProfile::for_user(user))
                .map_err(|err| log_error(err, "Session error"))?;
            Ok(redirect("/users/dashboard"))
        }
        None if outcome.status == StatusCode::UNAUTHORIZED => Ok(redirect("/users/login?invalid")),
        None => Ok(redirect("/users/login?failed")),
    }
}

async fn register(tera: Tera, session: UserSession) -> actix_web::Result<HttpResponse> {
    render(&tera, "register.html", &base_context(&session)?)
}

#[derive(Deserialize)]
struct RegisterForm {
    name: String,
    email: String,
    password: String,
    confirm: String,
}

async fn register_post(
    form: web::Form<RegisterForm>,
    tera: Tera,
    state: State,
    session: UserSession,
) -> actix_web::Result<HttpResponse> {
    let mut ctx = base_context(&session)?;
    ctx.insert("name", &form.name);
    ctx.insert("email", &form.email);
    let error = if form.name.trim().is_empty()
        || form.email.trim().is_empty()
        || form.password.is_empty()
    {
        "Please fill in all fields.".to_owned()
    } else if form.password != form.confirm {
        "Passwords do not match.".to_owned()
    } else {
        let outcome = state
            .auth
            .register(form.name.trim(), form.email.trim(), &form.password)
            .await;
        if let Some(user) = outcome.user() {
            session
                .begin(&user.id, &SessionProfile::for_user(user))
                .map_err(|err| log_error(err, "Session error"))?;
            return Ok(redirect("/users/dashboard"));
        }
        if outcome.status.is_success() {
            return Ok(redirect("/users/login?registered"));
        }
        match outcome.error {
            Some(reason) if outcome.status.is_client_error() => reason,
            _ => "Registration failed. Please try again.".to_owned(),
        }
    };
    ctx.insert("error", &error);
    render_with(&tera, "register.html", &ctx, HttpResponse::BadRequest())
}

async fn logout(session: UserSession) -> HttpResponse {
    session.end();
    redirect("/users/login?logout")
}

#[derive(Serialize)]
struct Section<'a> {
    key: &'static str,
    title: &'static str,
    cards: Vec<VideoCard<'a>>,
}

async fn dashboard(
    req: HttpRequest,
    params: web::Query<BrowseParams>,
    tera: Tera,
    state: State,
    session: UserSession,
) -> actix_web::Result<HttpResponse> {
    if session_profile(&session)?.is_none() {
        return Ok(redirect("/users/login"));
    }
    let mut ctx = base_context(&session)?;
    let library = session_library(&session)?;
    let query = params.q.clone().unwrap_or_default();

    let lists = [
        ("borrowed", "Borrowed", library.list(ListKind::Borrowed).iter().collect::<Vec<_>>()),
        ("favorites", "Favorites", library.list(ListKind::Favorites).iter().collect()),
        ("watchlist", "Watchlist", library.list(ListKind::Watchlist).iter().collect()),
        ("recent", "Recently Watched", library.recently_watched.iter().collect()),
    ];
    let mut resolved: Vec<(&'static str, &'static str, Vec<Video>)> = Vec::new();
    for (key, title, ids) in lists.iter() {
        let videos = match state.movies.movies_by_ids(ids.iter().copied()).await {
            Ok(videos) => videos,
            Err(err) => {
                warn!("{}, resolving {} from the built-in catalog", err, key);
                state
                    .fallback
                    .select(ids.iter().copied())
                    .into_iter()
                    .cloned()
                    .collect()
            }
        };
        resolved.push((*key, *title, videos));
    }
    let sections: Vec<Section> = resolved
        .iter()
        .map(|(key, title, videos)| Section {
            key: *key,
            title: *title,
            cards: view::cards(
                videos
                    .iter()
                    .filter(|video| catalog::matches(video, GenreFilter::All, &query)),
                &library,
            ),
        })
        .collect();

    ctx.insert("counts", &library.counts());
    ctx.insert("sections", &sections);
    ctx.insert("query", &query);
    ctx.insert("next", &current_url(&req));
    render(&tera, "dashboard.html", &ctx)
}

async fn profile(
    req: HttpRequest,
    tera: Tera,
    session: UserSession,
) -> actix_web::Result<HttpResponse> {
    if session_profile(&session)?.is_none() {
        return Ok(redirect("/users/login"));
    }
    let mut ctx = base_context(&session)?;
    if has_flag(&req, "saved") {
        ctx.insert("notice", "Profile saved.");
    }
    render(&tera, "profile.html", &ctx)
}

#[derive(Deserialize)]
struct ProfileForm {
    name: String,
    email: String,
}

async fn profile_post(
    form: web::Form<ProfileForm>,
    session: UserSession,
) -> actix_web::Result<HttpResponse> {
    let updated = session
        .update_profile(&form.name, &form.email)
        .map_err(|err| log_error(err, "Session error"))?;
    match updated {
        Some(_) => Ok(redirect("/users/profile?saved")),
        None => Ok(redirect("/users/login")),
    }
}

#[derive(Deserialize)]
struct PasswordForm {
    current: String,
    new: String,
    confirm: String,
}

/// Message shown for a password change request. Nothing is changed upstream.
fn password_message(form: &PasswordForm) -> &'static str {
    if form.new != form.confirm {
        "New passwords do not match."
    } else if form.current.is_empty() || form.new.is_empty() {
        "Please fill all password fields."
    } else {
        "Password changed successfully (demo only)."
    }
}

async fn password_post(
    form: web::Form<PasswordForm>,
    tera: Tera,
    session: UserSession,
) -> actix_web::Result<HttpResponse> {
    if session_profile(&session)?.is_none() {
        return Ok(redirect("/users/login"));
    }
    let mut ctx = base_context(&session)?;
    ctx.insert("password_message", password_message(&form));
    render(&tera, "profile.html", &ctx)
}

async fn admin_login(
    req: HttpRequest,
    tera: Tera,
    state: State,
    session: UserSession,
) -> actix_web::Result<HttpResponse> {
    let mut ctx = base_context(&session)?;
    ctx.insert("enabled", &state.admin.is_some());
    if has_flag(&req, "invalid") {
        ctx.insert("error", "Invalid admin credentials. Please try again.");
    }
    render(&tera, "admin_login.html", &ctx)
}

async fn admin_login_post(
    form: web::Form<LoginForm>,
    state: State,
    session: UserSession,
) -> actix_web::Result<HttpResponse> {
    match &state.admin {
        Some(admin) if admin.check(&form.email, &form.password) => {
            session
                .begin("admin", &SessionProfile::for_admin(&admin.email))
                .map_err(|err| log_error(err, "Session error"))?;
            Ok(redirect("/admin/dashboard"))
        }
        _ => Ok(redirect("/admin/login?invalid")),
    }
}

async fn admin_dashboard(
    tera: Tera,
    state: State,
    session: UserSession,
) -> actix_web::Result<HttpResponse> {
    match session_profile(&session)? {
        Some(profile) if profile.admin => {}
        _ => return Ok(redirect("/admin/login")),
    }
    let mut ctx = base_context(&session)?;
    let catalog: Catalog = state.movies.browse(&state.fallback).await;
    let registered_users = state
        .auth
        .local_user_count()
        .transpose()
        .map_err(|err| log_error(err, "Database error"))?;
    ctx.insert("overview", &AdminOverview::new(&catalog, registered_users));
    render(&tera, "admin.html", &ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AdminCredentials;
    use crate::{offline_tmdb_state, test_state};
    use actix_web::cookie::Cookie;
    use actix_web::dev::ServiceResponse;
    use actix_web::http::header;
    use actix_web::test::{call_service, read_body, TestRequest};

    fn session_cookie<B>(resp: &ServiceResponse<B>) -> Option<Cookie<'static>> {
        resp.response()
            .cookies()
            .find(|cookie| cookie.name() == "auth-cookie")
            .map(|cookie| cookie.into_owned())
    }

    fn location<B>(resp: &ServiceResponse<B>) -> &str {
        resp.headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
    }

    fn admin() -> Option<AdminCredentials> {
        Some(AdminCredentials {
            email: "admin@clipshelf.com".to_owned(),
            password: "hunter22".to_owned(),
        })
    }

    #[test]
    fn next_must_stay_on_site() {
        assert_eq!(safe_next(Some("/?genre=horror"), "/"), "/?genre=horror");
        assert_eq!(safe_next(Some("//evil.example.com"), "/"), "/");
        assert_eq!(safe_next(Some("https://evil.example.com"), "/"), "/");
        assert_eq!(safe_next(None, "/videos/1"), "/videos/1");
    }

    #[test]
    fn password_messages() {
        let form = |current: &str, new: &str, confirm: &str| PasswordForm {
            current: current.to_owned(),
            new: new.to_owned(),
            confirm: confirm.to_owned(),
        };
        assert_eq!(password_message(&form("a", "b", "c")), "New passwords do not match.");
        assert_eq!(password_message(&form("", "b", "b")), "Please fill all password fields.");
        assert_eq!(
            password_message(&form("a", "b", "b")),
            "Password changed successfully (demo only)."
        );
    }

    #[actix_rt::test]
    async fn home_filters_by_genre_and_query() {
        let app = test_app!(test_state(None));
        let req = TestRequest::get().uri("/?genre=horror&view=list").to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = String::from_utf8(read_body(resp).await.to_vec()).unwrap();
        assert!(body.contains("The Haunting Hour"));
        assert!(!body.contains("Laugh Track"));

        let req = TestRequest::get().uri("/?q=harbor&view=shelf").to_request();
        let body = String::from_utf8(read_body(call_service(&app, req).await).await.to_vec()).unwrap();
        assert!(body.contains("Quiet Harbor"));
        assert!(!body.contains("Orbital Drift"));
    }

    #[actix_rt::test]
    async fn every_view_mode_renders() {
        let app = test_app!(test_state(None));
        for mode in ViewMode::ALL.iter() {
            let req = TestRequest::get()
                .uri(&format!("/?view={}", mode.as_str()))
                .to_request();
            let resp = call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK, "view {}", mode.as_str());
            let body = String::from_utf8(read_body(resp).await.to_vec()).unwrap();
            assert!(body.contains("Neon Genesis City"), "view {}", mode.as_str());
        }
    }

    #[actix_rt::test]
    async fn video_detail_records_recently_watched() {
        let app = test_app!(test_state(None));
        let req = TestRequest::get().uri("/videos/8").to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let cookie = session_cookie(&resp).unwrap();
        let body = String::from_utf8(read_body(resp).await.to_vec()).unwrap();
        assert!(body.contains("Neon Genesis City"));

        let req = TestRequest::get()
            .uri("/api/library")
            .cookie(cookie)
            .to_request();
        let body = String::from_utf8(read_body(call_service(&app, req).await).await.to_vec()).unwrap();
        let library: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(library["recentlyWatched"], serde_json::json!(["8"]));
    }

    #[actix_rt::test]
    async fn unknown_video_is_404() {
        let app = test_app!(test_state(None));
        let req = TestRequest::get().uri("/videos/nope").to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_rt::test]
    async fn toggle_form_redirects_back() {
        let app = test_app!(test_state(None));
        let req = TestRequest::post()
            .uri("/videos/2/watchlist")
            .set_form([("next", "/?genre=comedy")])
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), "/?genre=comedy");
        assert!(session_cookie(&resp).is_some());
    }

    #[actix_rt::test]
    async fn dashboard_requires_login() {
        let app = test_app!(test_state(None));
        let req = TestRequest::get().uri("/users/dashboard").to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), "/users/login");
    }

    #[actix_rt::test]
    async fn register_login_dashboard_logout() {
        let app = test_app!(test_state(None));
        let req = TestRequest::post()
            .uri("/users/register")
            .set_form([
                ("name", "Jane Doe"),
                ("email", "jane@example.com"),
                ("password", "secret123"),
                ("confirm", "secret123"),
            ])
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(location(&resp), "/users/dashboard");

        let req = TestRequest::post()
            .uri("/users/login")
            .set_form([("email", "jane@example.com"), ("password", "wrong-one")])
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(location(&resp), "/users/login?invalid");
        assert!(session_cookie(&resp).is_none());

        let req = TestRequest::post()
            .uri("/users/login")
            .set_form([("email", "jane@example.com"), ("password", "secret123")])
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(location(&resp), "/users/dashboard");
        let cookie = session_cookie(&resp).unwrap();

        let req = TestRequest::get()
            .uri("/users/dashboard")
            .cookie(cookie.clone())
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = String::from_utf8(read_body(resp).await.to_vec()).unwrap();
        assert!(body.contains("Welcome, Jane!"));

        let req = TestRequest::get()
            .uri("/users/logout")
            .cookie(cookie)
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(location(&resp), "/users/login?logout");
        let cleared = session_cookie(&resp).unwrap();

        let req = TestRequest::get()
            .uri("/users/dashboard")
            .cookie(cleared)
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(location(&resp), "/users/login");
    }

    #[actix_rt::test]
    async fn register_form_errors_render() {
        let app = test_app!(test_state(None));
        let req = TestRequest::post()
            .uri("/users/register")
            .set_form([
                ("name", "Jane"),
                ("email", "jane@example.com"),
                ("password", "secret123"),
                ("confirm", "secret124"),
            ])
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = String::from_utf8(read_body(resp).await.to_vec()).unwrap();
        assert!(body.contains("Passwords do not match."));
    }

    #[actix_rt::test]
    async fn admin_disabled_without_credentials() {
        let app = test_app!(test_state(None));
        let req = TestRequest::post()
            .uri("/admin/login")
            .set_form([("email", "admin@clipshelf.com"), ("password", "hunter22")])
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(location(&resp), "/admin/login?invalid");
        assert!(session_cookie(&resp).is_none());
    }

    #[actix_rt::test]
    async fn admin_dashboard_shows_catalog_figures() {
        let app = test_app!(test_state(admin()));
        let req = TestRequest::get().uri("/admin/dashboard").to_request();
        assert_eq!(location(&call_service(&app, req).await), "/admin/login");

        let req = TestRequest::post()
            .uri("/admin/login")
            .set_form([("email", "admin@clipshelf.com"), ("password", "hunter22")])
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(location(&resp), "/admin/dashboard");
        let cookie = session_cookie(&resp).unwrap();

        let req = TestRequest::get()
            .uri("/admin/dashboard")
            .cookie(cookie)
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = String::from_utf8(read_body(resp).await.to_vec()).unwrap();
        assert!(body.contains("The Haunting Hour"));
        assert!(body.contains("Total videos"));
    }

    #[actix_rt::test]
    async fn password_form_is_demo_only() {
        let app = test_app!(test_state(None));
        let req = TestRequest::post()
            .uri("/api/users/register")
            .set_json(serde_json::json!({ "name": "Jane", "email": "jane@example.com", "password": "secret123" }))
            .to_request();
        let cookie = session_cookie(&call_service(&app, req).await).unwrap();

        let req = TestRequest::post()
            .uri("/users/profile/password")
            .cookie(cookie)
            .set_form([("current", "secret123"), ("new", "a"), ("confirm", "b")])
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = String::from_utf8(read_body(resp).await.to_vec()).unwrap();
        assert!(body.contains("New passwords do not match."));
    }

    #[actix_rt::test]
    async fn pages_fall_back_to_builtin_catalog() {
        let app = test_app!(offline_tmdb_state());
        let req = TestRequest::get().uri("/").to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = String::from_utf8(read_body(resp).await.to_vec()).unwrap();
        assert!(body.contains("The Haunting Hour"));

        let req = TestRequest::get().uri("/videos/3").to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = String::from_utf8(read_body(resp).await.to_vec()).unwrap();
        assert!(body.contains("Orbital Drift"));
    }
}
