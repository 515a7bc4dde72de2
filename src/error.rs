use sea_orm::DbErr;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("database error: {0}")]
  Db(#[from] DbErr),
  #[error("malformed payload: {0}")]
  Malformed(#[from] json::Error),
  #[error("commission rate `{0}` is not configured")]
  RateNotFound(String),
  #[error("invalid arguments: {0}")]
  InvalidArgs(String),
  #[error("internal error: {0}")]
  Internal(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
