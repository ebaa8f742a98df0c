//! The hosted table + blob store this service fronts.
//!
//! Handlers never talk to the network directly: everything goes through a
//! [`Gateway`] value built once in `main` and shared through router state.
//! [`supabase::SupabaseGateway`] is the production implementation.

use crate::models::{
    publication::{NewPublication, Publication},
    upload::UploadedFile,
    user::{NewUser, UserSummary},
};
use async_trait::async_trait;
use thiserror::Error;

#[cfg(test)]
pub mod memory;
pub mod supabase;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Unique-constraint violation on a table, or an existing object at an
    /// upload path.
    #[error("{0}")]
    Conflict(String),
    /// Any other non-success answer; `message` is the gateway's own text.
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("invalid gateway url: {0}")]
    InvalidUrl(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Decode(#[from] serde_json::Error),
    /// The write succeeded but its response body could not be read.
    #[error("gateway stored the row but its answer was unreadable: {0}")]
    UnreadableAnswer(String),
}

impl GatewayError {
    /// False once the gateway has acknowledged a write, whatever happened to
    /// the response body afterwards.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, GatewayError::UnreadableAnswer(_))
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Table and blob operations used by the services.
///
/// Each method is a single round-trip (or none, for [`Gateway::public_url`]).
/// Implementations must not retry.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Insert one row into `users`. Duplicate username or email is a
    /// [`GatewayError::Conflict`].
    async fn insert_user(&self, user: &NewUser) -> GatewayResult<()>;

    /// All users whose username and password both match exactly.
    async fn find_users(&self, username: &str, password: &str)
    -> GatewayResult<Vec<UserSummary>>;

    /// Store `file` at `path` without overwriting an existing object.
    async fn upload_object(&self, path: &str, file: &UploadedFile) -> GatewayResult<()>;

    /// Publicly reachable URL for the object at `path`.
    fn public_url(&self, path: &str) -> GatewayResult<String>;

    /// Delete the object at `path`.
    async fn remove_object(&self, path: &str) -> GatewayResult<()>;

    /// Insert one row into `publications`, returning what the table stored.
    /// A row that was stored but whose answer could not be decoded is a
    /// [`GatewayError::UnreadableAnswer`].
    async fn insert_publication(
        &self,
        publication: &NewPublication,
    ) -> GatewayResult<Vec<Publication>>;

    /// Every publication joined with its owner's username, newest first.
    async fn list_publications(&self) -> GatewayResult<Vec<Publication>>;

    /// Cheapest possible read, used by `/readyz`.
    async fn ping(&self) -> GatewayResult<()>;
}
