#[cfg(test)]
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(actix_identity::IdentityMiddleware::default())
                .wrap(crate::session_middleware(
                    actix_web::cookie::Key::from(&[0u8; 64]),
                ))
                .app_data(actix_web::web::Data::new($state))
                .app_data(actix_web::web::Data::new(crate::load_templates().unwrap()))
                .app_data(crate::json_config())
                .configure(crate::configure),
        )
        .await
    };
}

mod admin;
mod api;
mod auth;
mod catalog;
mod config;
mod database;
mod error;
mod library;
mod model;
mod movies;
mod pages;
mod session;
mod tmdb;
mod view;

use actix_identity::IdentityMiddleware;
use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::{cookie::Key, middleware::Logger, web, App, HttpServer};
use auth::{AuthGateway, HostedAuth, LocalAuth};
use catalog::Catalog;
use config::{AdminCredentials, Config, DEFAULT_LOG_FILTER};
use log::{info, warn};
use movies::MovieSource;
use tmdb::TmdbClient;

/// Shared, read-only state of every worker.
pub struct AppState {
    pub auth: AuthGateway,
    pub movies: MovieSource,
    /// Shown when the movie source can't deliver a page.
    pub fallback: Catalog,
    pub admin: Option<AdminCredentials>,
}

pub fn load_templates() -> tera::Result<tera::Tera> {
    tera::Tera::new(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/**/*"))
}

pub fn session_middleware(key: Key) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("auth-cookie".to_owned())
        .cookie_secure(false)
        .build()
}

pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(error::json_error_handler)
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    api::configure(cfg);
    pages::configure(cfg);
}

fn open_db(config: &Config) -> sled::Result<sled::Db> {
    match &config.database_path {
        Some(path) => sled::open(path),
        None => sled::Config::new().temporary(true).open(),
    }
}

fn build_state(config: &Config, db: sled::Db) -> anyhow::Result<AppState> {
    let http = reqwest::Client::new();
    let fallback = match &config.catalog_path {
        Some(path) => Catalog::from_path(path)?,
        None => Catalog::builtin()?,
    };
    let auth = match config.hosted_auth()? {
        Some(hosted) => {
            info!("Using hosted auth service at {}", hosted.url);
            AuthGateway::Hosted(HostedAuth::new(http.clone(), &hosted.url, &hosted.api_key))
        }
        None => {
            info!("No hosted auth service configured, using local accounts");
            AuthGateway::Local(LocalAuth::new(db, config.bcrypt_cost))
        }
    };
    let movies = match config.tmdb_api_key() {
        Some(api_key) => MovieSource::Tmdb(TmdbClient::new(
            http,
            &config.tmdb_base_url,
            &config.tmdb_image_base_url,
            api_key,
        )),
        None => {
            info!("No TMDb API key configured, serving the static catalog");
            MovieSource::Static(fallback.clone())
        }
    };
    let admin = config.admin()?;
    if admin.is_none() {
        info!("No admin credentials configured, admin area is disabled");
    }
    Ok(AppState {
        auth,
        movies,
        fallback,
        admin,
    })
}

#[actix_rt::main]
async fn main() -> anyhow::Result<()> {
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", DEFAULT_LOG_FILTER);
    }
    env_logger::init();

    let config = Config::from_env()?;
    let db = open_db(&config)?;
    let state = web::Data::new(build_state(&config, db)?);
    let tera = web::Data::new(load_templates()?);
    let key = match &config.session_secret {
        Some(secret) => Key::from(secret.as_bytes()),
        None => {
            warn!("No session secret configured, sessions will not survive a restart");
            Key::generate()
        }
    };

    info!("Listening on {}", config.bind);
    HttpServer::new(move || {
        App::new()
            .wrap(IdentityMiddleware::default())
            .wrap(session_middleware(key.clone()))
            .wrap(Logger::default())
            .app_data(state.clone())
            .app_data(tera.clone())
            .app_data(json_config())
            .configure(configure)
    })
    .bind(&config.bind)?
    .run()
    .await?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn test_state(admin: Option<AdminCredentials>) -> AppState {
    let fallback = Catalog::builtin().unwrap();
    AppState {
        auth: auth::local_gateway(),
        movies: MovieSource::Static(fallback.clone()),
        fallback,
        admin,
    }
}

/// State whose TMDb client points at a closed port.
#[cfg(test)]
pub(crate) fn offline_tmdb_state() -> AppState {
    let mut state = test_state(None);
    state.movies = MovieSource::Tmdb(TmdbClient::new(
        reqwest::Client::new(),
        "http://127.0.0.1:1",
        tmdb::DEFAULT_IMAGE_BASE_URL,
        "test-key",
    ));
    state
}

/// Serves `configure` on a free local port and returns its base URL.
#[cfg(test)]
pub(crate) fn stub_server<F>(configure: F) -> String
where
    F: Fn(&mut web::ServiceConfig) + Send + Clone + 'static,
{
    let server = HttpServer::new(move || App::new().configure(configure.clone()))
        .workers(1)
        .disable_signals()
        .bind(("127.0.0.1", 0))
        .unwrap();
    let url = format!("http://{}", server.addrs()[0]);
    actix_rt::spawn(server.run());
    url
}
