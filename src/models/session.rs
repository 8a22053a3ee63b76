//! Session model
//!
//! A session is the token behind the `session` cookie. It is issued by a
//! password login or by `UserService::force_login`, and lives for
//! `auth.session_days`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A signed-in browser
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Random token, also the cookie value
    pub id: String,
    pub user_id: i64,
    /// Issue time plus `auth.session_days`
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Past `expires_at`; the request is then treated as anonymous.
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }

    /// Days this session was issued for
    pub fn lifetime_days(&self) -> i64 {
        (self.expires_at - self.created_at).num_days()
    }
}
