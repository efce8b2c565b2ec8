use serde::Deserialize;
use std::path::PathBuf;

pub const ENV_PREFIX: &str = "CLIPSHELF_";
pub const DEFAULT_LOG_FILTER: &str = "clipshelf=debug,actix_web=info";
/// Cookie signing keys must be at least this long.
pub const MIN_SESSION_SECRET_LEN: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid environment: {0}")]
    Env(#[from] envy::Error),
    #[error("CLIPSHELF_SESSION_SECRET must be at least 64 bytes")]
    ShortSecret,
    #[error("CLIPSHELF_{0} and CLIPSHELF_{1} must be set together")]
    Incomplete(&'static str, &'static str),
    #[error("CLIPSHELF_BCRYPT_COST must be between 4 and 31, got {0}")]
    BcryptCost(u32),
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_owned()
}

fn default_tmdb_base_url() -> String {
    crate::tmdb::DEFAULT_BASE_URL.to_owned()
}

fn default_tmdb_image_base_url() -> String {
    crate::tmdb::DEFAULT_IMAGE_BASE_URL.to_owned()
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

/// Settings read from `CLIPSHELF_*` environment variables (and `.env`).
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// sled directory. Without one the database is temporary.
    pub database_path: Option<PathBuf>,
    pub session_secret: Option<String>,
    pub tmdb_api_key: Option<String>,
    #[serde(default = "default_tmdb_base_url")]
    pub tmdb_base_url: String,
    #[serde(default = "default_tmdb_image_base_url")]
    pub tmdb_image_base_url: String,
    pub auth_url: Option<String>,
    pub auth_api_key: Option<String>,
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    /// JSON file replacing the built-in catalog.
    pub catalog_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HostedAuthConfig {
    pub url: String,
    pub api_key: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdminCredentials {
    pub email: String,
    pub password: String,
}

impl AdminCredentials {
    pub fn check(&self, email: &str, password: &str) -> bool {
        self.email.eq_ignore_ascii_case(email.trim()) && self.password == password
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// `first` is an address and is trimmed. `secret` is kept byte for byte;
/// blank counts as unset.
fn pair(
    first: &Option<String>,
    secret: &Option<String>,
    names: (&'static str, &'static str),
) -> Result<Option<(String, String)>, ConfigError> {
    let secret = secret.as_deref().filter(|v| !v.trim().is_empty());
    match (non_empty(first), secret) {
        (Some(a), Some(b)) => Ok(Some((a.to_owned(), b.to_owned()))),
        (None, None) => Ok(None),
        _ => Err(ConfigError::Incomplete(names.0, names.1)),
    }
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        dotenv::dotenv().ok();
        Config::from_vars(std::env::vars())
    }

    pub fn from_vars<I>(vars: I) -> Result<Config, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: Config = envy::prefixed(ENV_PREFIX).from_iter(vars)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(secret) = &self.session_secret {
            if secret.len() < MIN_SESSION_SECRET_LEN {
                return Err(ConfigError::ShortSecret);
            }
        }
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(ConfigError::BcryptCost(self.bcrypt_cost));
        }
        self.hosted_auth()?;
        self.admin()?;
        Ok(())
    }

    pub fn tmdb_api_key(&self) -> Option<&str> {
        non_empty(&self.tmdb_api_key)
    }

    pub fn hosted_auth(&self) -> Result<Option<HostedAuthConfig>, ConfigError> {
        Ok(
            pair(&self.auth_url, &self.auth_api_key, ("AUTH_URL", "AUTH_API_KEY"))?
                .map(|(url, api_key)| HostedAuthConfig { url, api_key }),
        )
    }

    pub fn admin(&self) -> Result<Option<AdminCredentials>, ConfigError> {
        Ok(pair(
            &self.admin_email,
            &self.admin_password,
            ("ADMIN_EMAIL", "ADMIN_PASSWORD"),
        )?
        .map(|(email, password)| AdminCredentials { email, password }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn admin_password_kept_as_configured() {
        let config = Config::from_vars(vars(&[
            ("CLIPSHELF_ADMIN_EMAIL", " admin@clipshelf.com "),
            ("CLIPSHELF_ADMIN_PASSWORD", " two words "),
        ]))
        .unwrap();
        let admin = config.admin().unwrap().unwrap();
        assert_eq!(admin.email, "admin@clipshelf.com");
        assert_eq!(admin.password, " two words ");
        assert!(admin.check("admin@clipshelf.com", " two words "));
        assert!(!admin.check("admin@clipshelf.com", "two words"));

        let blank = Config::from_vars(vars(&[
            ("CLIPSHELF_ADMIN_EMAIL", "admin@clipshelf.com"),
            ("CLIPSHELF_ADMIN_PASSWORD", "   "),
        ]));
        assert!(matches!(blank, Err(ConfigError::Incomplete(_, _))));
    }

    #[test]
    fn defaults() {
        let config = Config::from_vars(vars(&[("PATH", "/usr/bin")])).unwrap();
        assert_eq!(config.bind, "127.0.0.1:8080");
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert_eq!(config.tmdb_base_url, "https://api.themoviedb.org/3");
        assert!(config.database_path.is_none());
        assert!(config.tmdb_api_key().is_none());
        assert!(config.hosted_auth().unwrap().is_none());
        assert!(config.admin().unwrap().is_none());
    }

    #[test]
    fn reads_prefixed_values() {
        let config = Config::from_vars(vars(&[
            ("CLIPSHELF_BIND", "0.0.0.0:9000"),
            ("CLIPSHELF_TMDB_API_KEY", "abc"),
            ("CLIPSHELF_AUTH_URL", "https://auth.example.com"),
            ("CLIPSHELF_AUTH_API_KEY", "anon"),
            ("CLIPSHELF_BCRYPT_COST", "6"),
            ("CLIPSHELF_ADMIN_EMAIL", "admin@clipshelf.com"),
            ("CLIPSHELF_ADMIN_PASSWORD", "hunter22"),
        ]))
        .unwrap();
        assert_eq!(config.bind, "0.0.0.0:9000");
        assert_eq!(config.tmdb_api_key(), Some("abc"));
        assert_eq!(config.bcrypt_cost, 6);
        assert_eq!(
            config.hosted_auth().unwrap(),
            Some(HostedAuthConfig {
                url: "https://auth.example.com".to_owned(),
                api_key: "anon".to_owned(),
            })
        );
        let admin = config.admin().unwrap().unwrap();
        assert!(admin.check("ADMIN@clipshelf.com", "hunter22"));
        assert!(!admin.check("admin@clipshelf.com", "hunter2"));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            Config::from_vars(vars(&[("CLIPSHELF_SESSION_SECRET", "short")])),
            Err(ConfigError::ShortSecret)
        ));
        assert!(matches!(
            Config::from_vars(vars(&[("CLIPSHELF_AUTH_URL", "https://auth.example.com")])),
            Err(ConfigError::Incomplete("AUTH_URL", "AUTH_API_KEY"))
        ));
        assert!(matches!(
            Config::from_vars(vars(&[("CLIPSHELF_BCRYPT_COST", "2")])),
            Err(ConfigError::BcryptCost(2))
        ));
        assert!(matches!(
            Config::from_vars(vars(&[("CLIPSHELF_BCRYPT_COST", "many")])),
            Err(ConfigError::Env(_))
        ));
    }
}
