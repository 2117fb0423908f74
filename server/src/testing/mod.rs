use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::auth::Clock;

/// A clock that only moves when told to.
///
/// Shared through an `Arc` so a test can advance time underneath an issuer
/// or verifier that already holds it.
#[derive(Debug)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    /// 2023-11-14T22:13:20Z, an arbitrary fixed starting point.
    pub const START: u64 = 1_700_000_000;

    pub const fn new(now: u64) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.fetch_add(by.as_secs(), Ordering::SeqCst);
    }

    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Self::START)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

const BASE64_URL_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Replace one character of a token's signature segment.
///
/// The last signature character is never touched, so the result always
/// decodes as base64url and fails only on signature comparison.
pub fn mutate_signature(token: &str, position: usize, replacement_seed: usize) -> String {
    let (message, signature) = token.rsplit_once('.').expect("token has a signature");
    let mut signature = signature.as_bytes().to_vec();
    let index = position % (signature.len() - 1);
    let original = signature[index];
    let mut replacement = BASE64_URL_ALPHABET[replacement_seed % BASE64_URL_ALPHABET.len()];
    if replacement == original {
        replacement = BASE64_URL_ALPHABET
            [(replacement_seed + 1) % BASE64_URL_ALPHABET.len()];
    }
    signature[index] = replacement;
    format!(
        "{message}.{}",
        String::from_utf8(signature).expect("base64url is ASCII")
    )
}
