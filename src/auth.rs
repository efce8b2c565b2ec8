use crate::database::*;
use crate::model::*;
use actix_web::http::StatusCode;
use log::{debug, error};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The auth service looked at the request and said no.
    #[error("{0}")]
    Rejected(String),
    #[error("No user data returned")]
    NoUser,
    #[error("Auth service unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error(transparent)]
    Database(#[from] DbError),
    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

/// Result of a gateway call, mapped to what the HTTP layer sends back.
#[derive(Serialize, Debug)]
pub struct AuthOutcome {
    #[serde(skip)]
    pub status: StatusCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<AuthUser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuthOutcome {
    fn new(status: StatusCode, message: &str, user: Option<AuthUser>, error: Option<String>) -> Self {
        AuthOutcome {
            status,
            message: message.to_owned(),
            user,
            error,
        }
    }

    pub fn login(result: Result<AuthUser, AuthError>) -> AuthOutcome {
        match result {
            Ok(user) => AuthOutcome::new(StatusCode::OK, "Login successful", Some(user), None),
            Err(AuthError::Rejected(reason)) => AuthOutcome::new(
                StatusCode::UNAUTHORIZED,
                "Invalid credentials",
                None,
                Some(reason),
            ),
            Err(AuthError::NoUser) => AuthOutcome::new(
                StatusCode::BAD_REQUEST,
                "Login failed",
                None,
                Some(AuthError::NoUser.to_string()),
            ),
            Err(err) => {
                error!("Login error: {}", err);
                AuthOutcome::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error during login",
                    None,
                    Some(err.to_string()),
                )
            }
        }
    }

    /// A signup the service accepted without handing back a user (pending
    /// email confirmation) still counts as registered.
    pub fn register(result: Result<Option<AuthUser>, AuthError>) -> AuthOutcome {
        match result {
            Ok(user) => AuthOutcome::new(
                StatusCode::CREATED,
                "User registered successfully",
                user,
                None,
            ),
            Err(err @ AuthError::Rejected(_)) => AuthOutcome::new(
                StatusCode::BAD_REQUEST,
                "Failed to register user",
                None,
                Some(err.to_string()),
            ),
            Err(err) => {
                error!("Registration error: {}", err);
                AuthOutcome::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error during registration",
                    None,
                    Some(err.to_string()),
                )
            }
        }
    }

    pub fn user(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }
}

/// Client for a GoTrue-compatible hosted auth service.
#[derive(Clone)]
pub struct HostedAuth {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Deserialize, Debug)]
struct GoTrueUser {
    id: String,
    email: Option<String>,
    #[serde(default)]
    user_metadata: Value,
    created_at: Option<String>,
}

impl GoTrueUser {
    fn into_auth_user(self, requested_email: &str) -> AuthUser {
        let name = self
            .user_metadata
            .get("full_name")
            .and_then(Value::as_str)
            .map(str::to_owned);
        AuthUser {
            id: self.id,
            email: self.email.unwrap_or_else(|| requested_email.to_owned()),
            name,
            created_at: self.created_at,
        }
    }
}

/// Picks the human readable part of a GoTrue error body.
fn error_message(status: StatusCode, body: &Value) -> String {
    ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::to_owned)
        .unwrap_or_else(|| format!("Auth service responded with {}", status))
}

/// Signup answers with the user object itself when email confirmation is on
/// and with a session wrapping it when it is off.
fn extract_user(body: Value, requested_email: &str) -> Result<AuthUser, AuthError> {
    let user = match body.get("user") {
        Some(user) if user.is_object() => user.clone(),
        _ => body,
    };
    if user.get("id").and_then(Value::as_str).is_none() {
        return Err(AuthError::NoUser);
    }
    let user: GoTrueUser = serde_json::from_value(user).map_err(|err| {
        debug!("Unexpected user shape: {:?}", err);
        AuthError::NoUser
    })?;
    Ok(user.into_auth_user(requested_email))
}

impl HostedAuth {
    pub fn new(http: reqwest::Client, base_url: &str, api_key: &str) -> HostedAuth {
        HostedAuth {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key: api_key.to_owned(),
        }
    }

    async fn post(&self, path: &str, body: &Value) -> Result<(StatusCode, Value), AuthError> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;
        let status = StatusCode::from_u16(response.status().as_u16())
            .unwrap_or(StatusCode::BAD_GATEWAY);
        let text = response.text().await?;
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Ok((status, body))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let (status, body) = self
            .post(
                "/auth/v1/token?grant_type=password",
                &json!({ "email": email, "password": password }),
            )
            .await?;
        if !status.is_success() {
            return Err(AuthError::Rejected(error_message(status, &body)));
        }
        extract_user(body, email)
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Option<AuthUser>, AuthError> {
        let (status, body) = self
            .post(
                "/auth/v1/signup",
                &json!({
                    "email": email,
                    "password": password,
                    "data": { "full_name": name },
                }),
            )
            .await?;
        if !status.is_success() {
            return Err(AuthError::Rejected(error_message(status, &body)));
        }
        let mut user = match extract_user(body, email) {
            Ok(user) => user,
            Err(AuthError::NoUser) => return Ok(None),
            Err(err) => return Err(err),
        };
        if user.name.is_none() {
            user.name = Some(name.to_owned());
        }
        self.insert_profile(&user).await;
        Ok(Some(user))
    }

    /// Mirrors the account into the `users` table. A failure here does not
    /// undo the signup.
    async fn insert_profile(&self, user: &AuthUser) {
        let row = json!([{
            "id": user.id,
            "email": user.email,
            "name": user.name,
            "created_at": chrono::Utc::now().to_rfc3339(),
        }]);
        match self.post("/rest/v1/users", &row).await {
            Ok((status, _)) if status.is_success() => {}
            Ok((status, body)) => {
                error!("Error inserting user data: {}", error_message(status, &body))
            }
            Err(err) => error!("Error inserting user data: {}", err),
        }
    }
}

/// Accounts kept in the local sled database.
#[derive(Clone)]
pub struct LocalAuth {
    db: sled::Db,
    cost: u32,
}

fn local_auth_user(id: u64, user: &User) -> AuthUser {
    AuthUser {
        id: id.to_string(),
        email: user.email.clone(),
        name: Some(user.name.clone()),
        created_at: Some(user.created_at.clone()),
    }
}

impl LocalAuth {
    pub fn new(db: sled::Db, cost: u32) -> LocalAuth {
        LocalAuth { db, cost }
    }

    pub fn login(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        if let Some((id, user)) = self.db.get_user_by_email(email)? {
            if bcrypt::verify(password, &user.password_hash)? {
                return Ok(local_auth_user(id, &user));
            }
        }
        Err(AuthError::Rejected("Invalid login credentials".to_owned()))
    }

    pub fn register(&self, name: &str, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::Rejected(format!(
                "Password should be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        let user = User {
            name: name.trim().to_owned(),
            email: email.trim().to_owned(),
            password_hash: bcrypt::hash(password, self.cost)?,
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        match self.db.add_user(&user)? {
            Some(id) => Ok(local_auth_user(id, &user)),
            None => Err(AuthError::Rejected("User already registered".to_owned())),
        }
    }

    pub fn count_users(&self) -> Result<usize, DbError> {
        self.db.count_users()
    }
}

/// Where credentials get checked.
#[derive(Clone)]
pub enum AuthGateway {
    Hosted(HostedAuth),
    Local(LocalAuth),
}

impl AuthGateway {
    pub async fn login(&self, email: &str, password: &str) -> AuthOutcome {
        let result = match self {
            AuthGateway::Hosted(hosted) => hosted.login(email, password).await,
            AuthGateway::Local(local) => local.login(email, password),
        };
        AuthOutcome::login(result)
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> AuthOutcome {
        let result = match self {
            AuthGateway::Hosted(hosted) => hosted.register(name, email, password).await,
            AuthGateway::Local(local) => local.register(name, email, password).map(Some),
        };
        AuthOutcome::register(result)
    }

    /// Number of accounts, when they live in this process.
    pub fn local_user_count(&self) -> Option<Result<usize, DbError>> {
        match self {
            AuthGateway::Hosted(_) => None,
            AuthGateway::Local(local) => Some(local.count_users()),
        }
    }
}

#[cfg(test)]
pub(crate) fn local_gateway() -> AuthGateway {
    let db = sled::Config::new().temporary(true).open().unwrap();
    AuthGateway::Local(LocalAuth::new(db, 4))
}
