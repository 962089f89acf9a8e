//! Error types for `beachwatch-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The record carries neither a name nor a field the identity policy can
  /// key on.
  #[error("record has no usable identity")]
  MissingIdentity,

  #[error("cannot derive a beach name from {0:?}")]
  NameNotDerivable(String),

  #[error("unknown identity policy: {0:?}")]
  UnknownIdentityPolicy(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
