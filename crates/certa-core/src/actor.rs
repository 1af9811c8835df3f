//! The authenticated actor and the identity capability that produces one.
//!
//! Protected operations take an `Option<&Actor>`; `None` means the caller is
//! anonymous. How an actor is established (Basic auth, a session, a test
//! fixture) is the business of an [`IdentityProvider`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of an actor, recorded as `created_by`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for ActorId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// An authenticated identity performing a protected operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
  pub id: ActorId,
}

impl Actor {
  pub fn new(id: impl Into<String>) -> Self { Self { id: ActorId::new(id) } }
}

/// Username/password pair presented by a caller.
#[derive(Clone)]
pub struct Credentials {
  pub username: String,
  pub password: String,
}

impl fmt::Debug for Credentials {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Credentials")
      .field("username", &self.username)
      .field("password", &"<redacted>")
      .finish()
  }
}

/// Resolves presented credentials to an actor.
///
/// Returns `None` for unknown users and wrong passwords alike.
pub trait IdentityProvider: Send + Sync {
  fn authenticate(&self, credentials: &Credentials) -> Option<Actor>;
}
