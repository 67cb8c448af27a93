//! User session model definitions.
//!
//! # Purpose
//! Defines the refresh-token-bearing session record. A refresh token is
//! unique across sessions and maps to exactly one session.
use atrium_common::ids::{SessionId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct UserSession {
    pub id: SessionId,
    pub user_id: UserId,
    pub refresh_token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
