use actix_web::cookie::Key;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::{error, warn};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use thiserror::Error;

pub static COOKIE_KEY: &str = "COOKIE_KEY";

// Docker secrets are mounted here at runtime and take precedence over the
// environment.
static SECRETS_DIR: &str = "/run/secrets";
static COOKIE_KEY_SECRET: &str = "wbap_cookie_key";

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{0} is not valid base64")]
    Encoding(&'static str),
    #[error("cookie key must be at least 64 bytes, got {0}")]
    TooShort(usize),
}

/// Resolve the session signing key: Docker secret, then `COOKIE_KEY`, then a
/// throwaway key that invalidates every session on restart.
pub fn cookie_key() -> Result<Key, SecretError> {
    let env_value = std::env::var(COOKIE_KEY).ok();
    match cookie_key_from(Path::new(SECRETS_DIR), env_value.as_deref())? {
        Some(key) => Ok(key),
        None => {
            warn!(
                "No '{}' secret or {} variable set; using an ephemeral cookie key. \
                 Sessions will not survive a restart.",
                COOKIE_KEY_SECRET, COOKIE_KEY,
            );
            Ok(Key::generate())
        }
    }
}

fn cookie_key_from(
    secrets_dir: &Path,
    env_value: Option<&str>,
) -> Result<Option<Key>, SecretError> {
    if let Some(bytes) = secret(secrets_dir, COOKIE_KEY_SECRET)? {
        return key_from_bytes(&bytes).map(Some);
    }

    match env_value {
        Some(encoded) => {
            let bytes = STANDARD
                .decode(encoded.trim())
                .map_err(|_| SecretError::Encoding(COOKIE_KEY))?;
            key_from_bytes(&bytes).map(Some)
        }
        None => Ok(None),
    }
}

fn key_from_bytes(bytes: &[u8]) -> Result<Key, SecretError> {
    Key::try_from(bytes).map_err(|_| SecretError::TooShort(bytes.len()))
}

fn secret(dir: &Path, name: &str) -> Result<Option<Vec<u8>>, SecretError> {
    let path = dir.join(name);

    match fs::read(&path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => {
            error!("Failed to open {}: {}", path.display(), e);
            Err(SecretError::Read { path, source: e })
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempfile::TempDir;

    const KEY_BYTES: [u8; 64] = [7; 64];

    #[test]
    fn test_secret_file_wins_over_env() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(COOKIE_KEY_SECRET), KEY_BYTES).unwrap();

        let key = cookie_key_from(dir.path(), Some("not even base64!")).unwrap();
        assert_eq!(key.unwrap().master(), &KEY_BYTES[..]);
    }

    #[test]
    fn test_env_key_is_base64() {
        let dir = TempDir::new().unwrap();
        let encoded = STANDARD.encode(KEY_BYTES);

        let key = cookie_key_from(dir.path(), Some(&encoded)).unwrap();
        assert_eq!(key.unwrap().master(), &KEY_BYTES[..]);
    }

    #[test]
    fn test_nothing_configured() {
        let dir = TempDir::new().unwrap();
        assert!(cookie_key_from(dir.path(), None).unwrap().is_none());
    }

    #[test]
    fn test_bad_keys_rejected() {
        let dir = TempDir::new().unwrap();

        match cookie_key_from(dir.path(), Some("%%%")) {
            Err(SecretError::Encoding(_)) => {}
            other => panic!("expected encoding error, got {:?}", other.map(|k| k.is_some())),
        }
        match cookie_key_from(dir.path(), Some(&STANDARD.encode([1u8; 16]))) {
            Err(SecretError::TooShort(16)) => {}
            other => panic!("expected short key error, got {:?}", other.map(|k| k.is_some())),
        }
    }
}
