//! Access codes — the unguessable public key of a certificate.
//!
//! A code is two concatenated 13-character fragments of lowercase base-36,
//! drawn from the operating-system RNG. Uniqueness is not guaranteed by the
//! generator; the store enforces it and the service retries on collision.

use std::fmt;

use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of one random fragment.
pub const FRAGMENT_LEN: usize = 13;

/// Total length of a generated code.
pub const CODE_LEN: usize = FRAGMENT_LEN * 2;

/// An opaque, URL-safe access code.
///
/// Comparison is exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessCode(String);

impl AccessCode {
  /// Generate a fresh random code.
  pub fn generate() -> Self {
    let mut code = String::with_capacity(CODE_LEN);
    for _ in 0..2 {
      code.push_str(&fragment(&mut OsRng));
    }
    Self(code)
  }

  /// Wrap a code read back from storage or a URL. No validation is applied;
  /// an unknown code simply matches nothing.
  pub fn from_raw(code: impl Into<String>) -> Self { Self(code.into()) }

  pub fn as_str(&self) -> &str { &self.0 }

  pub fn into_inner(self) -> String { self.0 }
}

impl fmt::Display for AccessCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl AsRef<str> for AccessCode {
  fn as_ref(&self) -> &str { &self.0 }
}

/// One base-36 fragment. Bytes at or above 252 are rejected so every symbol
/// is equally likely.
fn fragment(rng: &mut impl RngCore) -> String {
  let mut out = String::with_capacity(FRAGMENT_LEN);
  let mut buf = [0u8; 32];
  while out.len() < FRAGMENT_LEN {
    rng.fill_bytes(&mut buf);
    for b in buf {
      if b >= 252 {
        continue;
      }
      out.push(ALPHABET[(b % 36) as usize] as char);
      if out.len() == FRAGMENT_LEN {
        break;
      }
    }
  }
  out
}

// ─── Sources ─────────────────────────────────────────────────────────────────

/// Supplies access codes to the service.
pub trait AccessCodeSource: Send + Sync {
  fn next_code(&self) -> AccessCode;
}

/// The production source: [`AccessCode::generate`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomCodes;

impl AccessCodeSource for RandomCodes {
  fn next_code(&self) -> AccessCode { AccessCode::generate() }
}

impl<F> AccessCodeSource for F
where
  F: Fn() -> AccessCode + Send + Sync,
{
  fn next_code(&self) -> AccessCode { self() }
}
