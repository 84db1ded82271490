//! Password verifier for database files.
//!
//! SQLite files are not encrypted, so the password gates access at connect
//! time instead: a salted SHA-256 digest is kept in `kakebo_meta` and every
//! later connection must present a password with the same digest.
//!
//! Stored format: `sha256$<salt>$<base64 digest>`.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use uuid::Uuid;

const SCHEME: &str = "sha256";

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b"$");
    hasher.update(password.as_bytes());
    STANDARD.encode(hasher.finalize())
}

/// Fresh verifier for `password` with a random salt.
pub(crate) fn make_verifier(password: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    let hash = digest(&salt, password);
    format!("{SCHEME}${salt}${hash}")
}

/// Whether `password` matches `verifier`. Malformed verifiers never match.
pub(crate) fn verify(verifier: &str, password: &str) -> bool {
    let mut parts = verifier.splitn(3, '$');
    let (Some(scheme), Some(salt), Some(expected)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    if scheme != SCHEME {
        return false;
    }
    let actual = digest(salt, password);
    actual.as_bytes().ct_eq(expected.as_bytes()).into()
}
