use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
  // no article with this id.
  #[error("article not found: id={0}")]
  NotFound(i32),

  // rejected input (validation failure).
  #[error("unprocessable entity: {0}")]
  UnprocessableEntity(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  // Json error
  #[error("Json error: {source}")]
  JsonError {
    #[from]
    source: serde_json::Error,
  },

  #[error("std io error")]
  IOError {
    #[from]
    source: std::io::Error,
  },

  #[error("config error")]
  ConfigError {
    #[from]
    source: config::ConfigError,
  },
}

impl Error {
  /// Recoverable conditions a front end should show to the user.
  pub fn is_user_facing(&self) -> bool {
    match self {
      Error::NotFound(_) | Error::UnprocessableEntity(_) | Error::BadRequest(_) => true,
      _ => false,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
