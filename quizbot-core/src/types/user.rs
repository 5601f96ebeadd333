//! Sender identity type for core messages.

use serde::{Deserialize, Serialize};

/// Sender identity (id, username, names) as reported by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}
