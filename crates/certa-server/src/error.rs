//! Error types for `certa-server`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A configured admin's `password_hash` is not a valid PHC string.
  #[error("invalid password hash for admin {username:?}: {reason}")]
  InvalidPasswordHash { username: String, reason: String },

  #[error("admin {0:?} is configured more than once")]
  DuplicateAdmin(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
