use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use rand::Rng;

use crate::error::{Error, Result};

const TOKEN_PREFIX: &str = "fangate";
const LOOKUP_LENGTH: usize = 8;
const SECRET_LENGTH: usize = 24;

/// Issues and verifies opaque session tokens.
///
/// A token reads `fangate_<lookup>_<secret>`. The lookup part is stored in
/// plaintext and indexed, so validation is a single point query plus one
/// argon2id verification of the full token. Only the hash is persisted.
pub struct TokenGenerator {
    argon2: Argon2<'static>,
}

impl Default for TokenGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenGenerator {
    #[must_use]
    pub fn new() -> Self {
        // Session tokens are high-entropy already, so a single pass with
        // 64 MiB of memory is enough.
        let params = Params::new(64 * 1024, 1, 4, Some(32)).expect("invalid argon2 params");

        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    /// Returns `(raw_token, lookup, hash)` for a freshly issued token. The
    /// raw token is shown to the caller once and never stored.
    pub fn generate(&self) -> Result<(String, String, String)> {
        let lookup = new_lookup();
        let secret = new_secret();
        let raw_token = format!("{TOKEN_PREFIX}_{lookup}_{secret}");
        let hash = self.hash(&raw_token)?;
        Ok((raw_token, lookup, hash))
    }

    pub fn hash(&self, token: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(token.as_bytes(), &salt)
            .map_err(|e| Error::Config(format!("failed to hash token: {e}")))?;
        Ok(hash.to_string())
    }

    pub fn verify(&self, token: &str, hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| Error::Config(format!("invalid hash format: {e}")))?;

        match self.argon2.verify_password(token.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(Error::Config(format!("failed to verify token: {e}"))),
        }
    }
}

fn new_lookup() -> String {
    uuid::Uuid::new_v4().to_string()[..LOOKUP_LENGTH].to_string()
}

fn new_secret() -> String {
    let mut bytes = [0u8; SECRET_LENGTH / 2];
    rand::thread_rng().fill(&mut bytes);
    bytes.iter().fold(
        String::with_capacity(SECRET_LENGTH),
        |mut s, b| {
            use std::fmt::Write;
            let _ = write!(s, "{b:02x}");
            s
        },
    )
}

/// Splits a raw token into `(lookup, secret)`, rejecting anything that does
/// not match the issued shape.
pub fn parse_token(token: &str) -> Result<(String, String)> {
    let mut parts = token.splitn(3, '_');
    let (prefix, lookup, secret) = match (parts.next(), parts.next(), parts.next()) {
        (Some(p), Some(l), Some(s)) => (p, l, s),
        _ => return Err(Error::InvalidTokenFormat),
    };

    if prefix != TOKEN_PREFIX
        || lookup.len() != LOOKUP_LENGTH
        || secret.len() != SECRET_LENGTH
        || secret.contains('_')
    {
        return Err(Error::InvalidTokenFormat);
    }

    Ok((lookup.to_string(), secret.to_string()))
}
