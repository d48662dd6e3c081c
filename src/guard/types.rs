use serde::{Deserialize, Serialize};

use crate::types::{Permission, UserId};

/// Claims carried inside the session cookie.
///
/// Written at login by [`issue_session`](super::issue_session) and read back
/// by the guard on every protected request. Confidentiality and integrity
/// come from the private cookie jar, not from the claims themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
}

/// Staff identity resolved from the user table.
///
/// Exposed unchanged to the whole protected subtree once the guard passes;
/// handlers never re-fetch it within a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
    pub permission: Permission,
}
