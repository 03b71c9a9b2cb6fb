use crate::{account::AccountId, id::generate_prefixed_id};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of entries returned by the history read path.
pub const RECENT_LOGIN_LIMIT: usize = 20;

/// Best-effort description of the client behind a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl ClientInfo {
    pub fn new(ip_address: Option<String>, user_agent: Option<String>) -> Self {
        Self {
            ip_address,
            user_agent,
        }
    }
}

/// One successful login. Entries are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginHistoryEntry {
    pub id: String,
    pub account_id: AccountId,
    pub logged_in_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl LoginHistoryEntry {
    pub fn new(account_id: &AccountId, client: &ClientInfo, logged_in_at: DateTime<Utc>) -> Self {
        Self {
            id: generate_prefixed_id("lgh"),
            account_id: account_id.clone(),
            logged_in_at,
            ip_address: client.ip_address.clone(),
            user_agent: client.user_agent.clone(),
        }
    }
}
