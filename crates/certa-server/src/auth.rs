//! Argon2-backed [`IdentityProvider`] over the configured admin accounts.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use certa_core::actor::{Actor, Credentials, IdentityProvider};
use serde::Deserialize;

use crate::error::{Error, Result};

/// One administrator allowed to issue and manage certificates.
#[derive(Deserialize, Clone)]
pub struct AdminAccount {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

/// Resolves Basic credentials against [`AdminAccount`]s. The actor id is the
/// username.
pub struct PasswordIdentity {
  admins: Vec<AdminAccount>,
}

impl PasswordIdentity {
  /// Fails if any hash is malformed or a username repeats.
  pub fn new(admins: Vec<AdminAccount>) -> Result<Self> {
    for (i, admin) in admins.iter().enumerate() {
      PasswordHash::new(&admin.password_hash).map_err(|e| Error::InvalidPasswordHash {
        username: admin.username.clone(),
        reason:   e.to_string(),
      })?;
      if admins[..i].iter().any(|a| a.username == admin.username) {
        return Err(Error::DuplicateAdmin(admin.username.clone()));
      }
    }
    Ok(Self { admins })
  }

  pub fn is_empty(&self) -> bool { self.admins.is_empty() }
}

impl IdentityProvider for PasswordIdentity {
  fn authenticate(&self, credentials: &Credentials) -> Option<Actor> {
    let admin = self.admins.iter().find(|a| a.username == credentials.username)?;
    let parsed = PasswordHash::new(&admin.password_hash).ok()?;
    Argon2::default()
      .verify_password(credentials.password.as_bytes(), &parsed)
      .ok()?;
    Some(Actor::new(admin.username.clone()))
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use argon2::{PasswordHasher, password_hash::SaltString};
  use rand_core::OsRng;

  use super::*;

  pub(crate) fn hash(password: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string()
  }

  pub(crate) fn admin(username: &str, password: &str) -> AdminAccount {
    AdminAccount {
      username:      username.to_string(),
      password_hash: hash(password),
    }
  }

  fn creds(username: &str, password: &str) -> Credentials {
    Credentials {
      username: username.to_string(),
      password: password.to_string(),
    }
  }

  #[test]
  fn correct_credentials() {
    let identity = PasswordIdentity::new(vec![admin("user", "secret")]).unwrap();
    let actor = identity.authenticate(&creds("user", "secret")).unwrap();
    assert_eq!(actor.id.as_str(), "user");
  }

  #[test]
  fn wrong_password() {
    let identity = PasswordIdentity::new(vec![admin("user", "secret")]).unwrap();
    assert!(identity.authenticate(&creds("user", "wrong")).is_none());
  }

  #[test]
  fn unknown_user() {
    let identity = PasswordIdentity::new(vec![admin("user", "secret")]).unwrap();
    assert!(identity.authenticate(&creds("mallory", "secret")).is_none());
  }

  #[test]
  fn each_admin_has_their_own_password() {
    let identity =
      PasswordIdentity::new(vec![admin("ana", "one"), admin("raj", "two")]).unwrap();
    assert!(identity.authenticate(&creds("raj", "two")).is_some());
    assert!(identity.authenticate(&creds("raj", "one")).is_none());
  }

  #[test]
  fn malformed_hash_is_rejected_up_front() {
    let bad = AdminAccount {
      username:      "user".into(),
      password_hash: "plaintext".into(),
    };
    assert!(matches!(
      PasswordIdentity::new(vec![bad]),
      Err(Error::InvalidPasswordHash { .. })
    ));
  }

  #[test]
  fn duplicate_username_is_rejected() {
    let result = PasswordIdentity::new(vec![admin("user", "a"), admin("user", "b")]);
    assert!(matches!(result, Err(Error::DuplicateAdmin(name)) if name == "user"));
  }
}
