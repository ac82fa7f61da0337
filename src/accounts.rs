use crate::error::AppError;
use crate::hash::{self, PasswordHasher};
use crate::models::User;
use crate::store::{CredentialStore, StoreError};

#[derive(Debug)]
pub enum Registration {
    Created(User),
    UsernameTaken,
}

pub fn register(
    store: &dyn CredentialStore,
    hasher: &PasswordHasher,
    username: &str,
    password: &str,
) -> Result<Registration, AppError> {
    if store.find_by_username(username)?.is_some() {
        return Ok(Registration::UsernameTaken);
    }

    let digest = hasher.hash(password)?;
    match store.create(username, &digest) {
        Ok(user) => Ok(Registration::Created(user)),
        // lost a race with a concurrent registration
        Err(StoreError::UsernameTaken) => Ok(Registration::UsernameTaken),
        Err(e) => Err(e.into()),
    }
}

/// Returns the user only if `password` matches the stored digest.
pub fn authenticate(
    store: &dyn CredentialStore,
    username: &str,
    password: &str,
) -> Result<Option<User>, StoreError> {
    let user = store.find_by_username(username)?;
    Ok(user.filter(|user| hash::verify(password, &user.password)))
}
