//! GitHub REST API request and response types, limited to the fields read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Permissions;

// ─── GET /app/installations ──────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct Installation {
    pub id: u64,
    pub app_id: u64,
    pub account: Option<Account>,
    pub access_tokens_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub login: Option<String>,
}

impl Installation {
    pub fn account_login(&self) -> Option<&str> {
        self.account.as_ref().and_then(|a| a.login.as_deref())
    }
}

// ─── POST /app/installations/{id}/access_tokens ─────────────────────────────

#[derive(Debug, Serialize)]
pub struct AccessTokenRequest<'a> {
    pub permissions: &'a Permissions,
}

#[derive(Debug, Deserialize)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
}
