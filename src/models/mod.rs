//! Row shapes exchanged with the gateway.
//!
//! Everything here is owned and persisted by the hosted database; the crate
//! only (de)serializes rows on their way through. Identifiers are generated
//! remotely and may be integers or uuid strings depending on the table
//! definition, so they travel as [`RowId`].

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod publication;
pub mod upload;
pub mod user;

/// A gateway-generated primary key.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum RowId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowId::Int(id) => write!(f, "{}", id),
            RowId::Text(id) => f.write_str(id),
        }
    }
}
