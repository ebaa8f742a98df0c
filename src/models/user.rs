//! Account rows in the `users` table.

use super::RowId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Insert payload for a new account.
///
/// The password is stored exactly as received; there is no hashing anywhere
/// in this service.
#[derive(Serialize, Clone, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The projection returned by a credential lookup (`select=id,username`).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct UserSummary {
    pub id: RowId,
    pub username: String,
}
