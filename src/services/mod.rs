//! Request-independent business steps sitting between handlers and the
//! gateway.

use crate::gateway::GatewayError;
use thiserror::Error;

pub mod account_service;
pub mod publication_service;

pub const DUPLICATE_ACCOUNT_MESSAGE: &str = "Usuario ou E-mail Duplicado";
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Usuário ou senha incorretos";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("file name `{name}` invalid: {reason}")]
    InvalidFileName { name: String, reason: &'static str },
    #[error("unexpected additional file in field `{0}`")]
    UnexpectedFile(String),
    #[error("{}", DUPLICATE_ACCOUNT_MESSAGE)]
    DuplicateAccount,
    #[error("{}", INVALID_CREDENTIALS_MESSAGE)]
    InvalidCredentials,
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
