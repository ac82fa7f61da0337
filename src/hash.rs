use lazy_static::lazy_static;
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use std::fmt;
use std::num::NonZeroU32;
use thiserror::Error;

lazy_static! {
    static ref RNG: SystemRandom = SystemRandom::new();
}

const SALT_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const SALT_LEN: usize = 16;
// largest multiple of the alphabet size that fits in a byte
const SALT_BYTE_LIMIT: usize = 256 - 256 % SALT_CHARS.len();

pub const DEFAULT_ITERATIONS: NonZeroU32 = match NonZeroU32::new(600_000) {
    Some(n) => n,
    None => panic!("iteration count must be non-zero"),
};

#[derive(Debug, Error)]
#[error("system random number generator failed")]
pub struct RngError;

fn salt_char(byte: u8) -> Option<char> {
    let byte = usize::from(byte);
    if byte >= SALT_BYTE_LIMIT {
        return None;
    }
    Some(SALT_CHARS[byte % SALT_CHARS.len()] as char)
}

/// Generate a random 16-character alphanumeric salt.
fn random_salt(rng: &dyn SecureRandom) -> Result<String, RngError> {
    let mut salt = String::with_capacity(SALT_LEN);
    let mut bytes = [0; SALT_LEN];
    while salt.len() < SALT_LEN {
        rng.fill(&mut bytes).map_err(|_| RngError)?;
        let wanted = SALT_LEN - salt.len();
        salt.extend(bytes.iter().filter_map(|b| salt_char(*b)).take(wanted));
    }
    Ok(salt)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prf {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl Prf {
    fn from_name(name: &str) -> Option<Prf> {
        match name {
            "sha1" => Some(Prf::Sha1),
            "sha256" => Some(Prf::Sha256),
            "sha384" => Some(Prf::Sha384),
            "sha512" => Some(Prf::Sha512),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Prf::Sha1 => "sha1",
            Prf::Sha256 => "sha256",
            Prf::Sha384 => "sha384",
            Prf::Sha512 => "sha512",
        }
    }

    fn algorithm(self) -> pbkdf2::Algorithm {
        match self {
            Prf::Sha1 => pbkdf2::PBKDF2_HMAC_SHA1,
            Prf::Sha256 => pbkdf2::PBKDF2_HMAC_SHA256,
            Prf::Sha384 => pbkdf2::PBKDF2_HMAC_SHA384,
            Prf::Sha512 => pbkdf2::PBKDF2_HMAC_SHA512,
        }
    }

    fn output_len(self) -> usize {
        match self {
            Prf::Sha1 => 20,
            Prf::Sha256 => 32,
            Prf::Sha384 => 48,
            Prf::Sha512 => 64,
        }
    }
}

/// A decoded digest: everything needed to re-derive and compare a password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaltedHash {
    prf: Prf,
    iterations: NonZeroU32,
    salt: String,
    hash: Vec<u8>,
}

impl SaltedHash {
    /// Generate a random salt, then derive a SHA-256 hash of the password.
    pub fn from_password(
        rng: &dyn SecureRandom,
        iterations: NonZeroU32,
        password: &str,
    ) -> Result<SaltedHash, RngError> {
        let prf = Prf::Sha256;
        let salt = random_salt(rng)?;
        let mut hash = vec![0; prf.output_len()];
        pbkdf2::derive(
            prf.algorithm(),
            iterations,
            salt.as_bytes(),
            password.as_bytes(),
            &mut hash,
        );

        Ok(SaltedHash {
            prf,
            iterations,
            salt,
            hash,
        })
    }

    /// Decode a stored digest. Returns `None` for anything malformed.
    ///
    /// As in werkzeug, a missing PRF means sha256 and a missing count means
    /// `DEFAULT_ITERATIONS`.
    pub fn parse(digest: &str) -> Option<SaltedHash> {
        let mut parts = digest.split('$');
        let method = parts.next()?;
        let salt = parts.next()?;
        let hash = hex::decode(parts.next()?).ok()?;
        if parts.next().is_some() || hash.is_empty() {
            return None;
        }

        let mut method = method.split(':');
        if method.next()? != "pbkdf2" {
            return None;
        }
        let prf = match method.next() {
            Some(name) => Prf::from_name(name)?,
            None => Prf::Sha256,
        };
        let iterations = match method.next() {
            Some(count) => NonZeroU32::new(count.parse().ok()?)?,
            None => DEFAULT_ITERATIONS,
        };
        if method.next().is_some() {
            return None;
        }

        Some(SaltedHash {
            prf,
            iterations,
            salt: salt.to_string(),
            hash,
        })
    }

    /// Constant-time comparison against a freshly derived hash.
    pub fn verify(&self, password: &str) -> bool {
        pbkdf2::verify(
            self.prf.algorithm(),
            self.iterations,
            self.salt.as_bytes(),
            password.as_bytes(),
            &self.hash,
        )
        .is_ok()
    }
}

impl fmt::Display for SaltedHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pbkdf2:{}:{}${}${}",
            self.prf.name(),
            self.iterations,
            self.salt,
            hex::encode(&self.hash)
        )
    }
}

/// Produces new digests with a fixed work factor.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    iterations: NonZeroU32,
}

impl PasswordHasher {
    pub fn new(iterations: NonZeroU32) -> PasswordHasher {
        PasswordHasher { iterations }
    }

    pub fn hash(&self, password: &str) -> Result<String, RngError> {
        let salted = SaltedHash::from_password(&*RNG, self.iterations, password)?;
        Ok(salted.to_string())
    }
}

/// Check `password` against a stored digest. Malformed digests never match.
pub fn verify(password: &str, digest: &str) -> bool {
    SaltedHash::parse(digest).map_or(false, |salted| salted.verify(password))
}
