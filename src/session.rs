use crate::library::Library;
use crate::model::AuthUser;
use actix_identity::{Identity, IdentityExt};
use actix_session::{Session, SessionExt, SessionGetError, SessionInsertError};
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};

const PROFILE_KEY: &str = "user";
const LIBRARY_KEY: &str = "library";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Could not read session: {0}")]
    Get(#[from] SessionGetError),
    #[error("Could not write session: {0}")]
    Insert(#[from] SessionInsertError),
    #[error("Could not sign in: {0}")]
    Login(#[from] actix_identity::error::LoginError),
}

/// Who is signed in. Lives in the session cookie, never in the database.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SessionProfile {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub admin: bool,
}

impl SessionProfile {
    pub fn for_user(user: &AuthUser) -> SessionProfile {
        SessionProfile {
            name: user.display_name(),
            email: user.email.clone(),
            admin: false,
        }
    }

    pub fn for_admin(email: &str) -> SessionProfile {
        SessionProfile {
            name: "Admin".to_owned(),
            email: email.to_owned(),
            admin: true,
        }
    }

    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or("")
    }

    /// Avatar letters: initials of the name, or the first letter of the email.
    pub fn initials(&self) -> String {
        let initials: String = self
            .name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .collect::<String>()
            .to_uppercase();
        if !initials.is_empty() {
            return initials;
        }
        self.email
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default()
    }
}

/// Typed view of the cookie session: profile and library, with an explicit
/// begin/end lifecycle.
pub struct UserSession {
    session: Session,
    request: HttpRequest,
}

impl FromRequest for UserSession {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(UserSession {
            session: req.get_session(),
            request: req.clone(),
        }))
    }
}

impl UserSession {
    /// Signs `id` in and stores the profile. The library collected so far
    /// is kept.
    pub fn begin(&self, id: &str, profile: &SessionProfile) -> Result<(), SessionError> {
        self.session.renew();
        Identity::login(&self.request.extensions(), id.to_owned())?;
        self.session.insert(PROFILE_KEY, profile)?;
        Ok(())
    }

    pub fn profile(&self) -> Result<Option<SessionProfile>, SessionError> {
        Ok(self.session.get(PROFILE_KEY)?)
    }

    /// Profile edit. Returns the new profile, or `None` if nobody is signed
    /// in.
    pub fn update_profile(
        &self,
        name: &str,
        email: &str,
    ) -> Result<Option<SessionProfile>, SessionError> {
        match self.profile()? {
            Some(mut profile) => {
                profile.name = name.trim().to_owned();
                profile.email = email.trim().to_owned();
                self.session.insert(PROFILE_KEY, &profile)?;
                Ok(Some(profile))
            }
            None => Ok(None),
        }
    }

    pub fn library(&self) -> Result<Library, SessionError> {
        Ok(self.session.get(LIBRARY_KEY)?.unwrap_or_default())
    }

    /// Applies `change` to the stored library and writes it back.
    pub fn update_library<F, R>(&self, change: F) -> Result<(Library, R), SessionError>
    where
        F: FnOnce(&mut Library) -> R,
    {
        let mut library = self.library()?;
        let result = change(&mut library);
        self.session.insert(LIBRARY_KEY, &library)?;
        Ok((library, result))
    }

    /// Logout: forgets the identity and drops everything in the session.
    pub fn end(&self) {
        if let Ok(identity) = self.request.get_identity() {
            identity.logout();
        }
        self.session.purge();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str, email: &str) -> SessionProfile {
        SessionProfile {
            name: name.to_owned(),
            email: email.to_owned(),
            admin: false,
        }
    }

    #[test]
    fn initials() {
        assert_eq!(profile("jane van doe", "j@example.com").initials(), "JVD");
        assert_eq!(profile("  ", "jane@example.com").initials(), "J");
        assert_eq!(profile("", "").initials(), "");
    }

    #[test]
    fn first_name() {
        assert_eq!(profile("Jane Doe", "").first_name(), "Jane");
        assert_eq!(profile("", "").first_name(), "");
    }
}
