use crate::model::*;
use sled::transaction::{TransactionError, Transactional};
use std::convert::TryInto;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Storage error: {0}")]
    Storage(#[from] sled::Error),
    #[error("Encoding error: {0}")]
    Encoding(#[from] bincode::Error),
    #[error("Bad index entry for {0}")]
    BadIndex(String),
}

fn serialize_id(id: u64) -> [u8; 8] {
    id.to_le_bytes()
}

fn deserialize_id<V: AsRef<[u8]>>(id: V) -> Result<u64, DbError> {
    let bytes: [u8; 8] = id
        .as_ref()
        .try_into()
        .map_err(|_| DbError::BadIndex("user id".to_owned()))?;
    Ok(u64::from_le_bytes(bytes))
}

/// Emails are unique regardless of case and surrounding whitespace.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub trait UserDb {
    type Error;
    /// Returns `None` if the email is already taken.
    fn add_user(&self, user: &User) -> Result<Option<u64>, Self::Error>;
    fn get_user_by_email(&self, email: &str) -> Result<Option<(u64, User)>, Self::Error>;
    fn count_users(&self) -> Result<usize, Self::Error>;
}

const USERS: &[u8] = b"users";
const USERS_EMAIL: &[u8] = b"USERS_EMAIL";

impl UserDb for sled::Db {
    type Error = DbError;

    fn add_user(&self, user: &User) -> Result<Option<u64>, DbError> {
        let users = self.open_tree(USERS)?;
        let users_email = self.open_tree(USERS_EMAIL)?;
        let id = self.generate_id()?;
        let encoded = bincode::serialize(user)?;
        let email = normalize_email(&user.email);
        if let Err(err) = (&users, &users_email).transaction(|(users, users_email)| {
            if users_email.get(email.as_bytes())?.is_some() {
                sled::transaction::abort(())?;
            }
            users.insert(&serialize_id(id), encoded.as_slice())?;
            users_email.insert(email.as_bytes(), &serialize_id(id))?;
            Ok(())
        }) {
            match err {
                TransactionError::Storage(e) => return Err(e.into()),
                TransactionError::Abort(_) => return Ok(None),
            };
        }
        Ok(Some(id))
    }

    fn get_user_by_email(&self, email: &str) -> Result<Option<(u64, User)>, DbError> {
        let users_email = self.open_tree(USERS_EMAIL)?;
        let users = self.open_tree(USERS)?;
        if let Some(id) = users_email.get(normalize_email(email).as_bytes())? {
            let data = users
                .get(&id)?
                .ok_or_else(|| DbError::BadIndex(normalize_email(email)))?;
            Ok(Some((deserialize_id(id)?, bincode::deserialize(&data)?)))
        } else {
            Ok(None)
        }
    }

    fn count_users(&self) -> Result<usize, DbError> {
        Ok(self.open_tree(USERS)?.len())
    }
}
