//! External persistence seam for player data and famine notices.

use serde::{Deserialize, Serialize};

use crate::player::PlayerData;

/// Backing store for the player file and the famine-notice tracker.
///
/// The famine cycle treats every call as best-effort: failures are logged
/// and the cycle moves on, except for the initial snapshot load which has
/// nothing to fall back to.
pub trait PlayerRepository {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Loads the current active-player snapshot.
    fn load_player_data(&self) -> Result<PlayerData, Self::Error>;

    /// Persists the full snapshot with a human-readable summary message.
    fn update_player_file(&self, data: &PlayerData, message: &str) -> Result<(), Self::Error>;

    /// Opens a new famine notice.
    fn create_famine_notice(&self, request: &NoticeRequest) -> Result<(), Self::Error>;

    /// Lists currently open famine notices matching `query`.
    fn list_open_famine_notices(
        &self,
        query: &NoticeQuery,
    ) -> Result<Vec<FamineNotice>, Self::Error>;

    /// Posts `message` on the notice, then closes it.
    fn resolve_famine_notice(
        &self,
        notice: &FamineNotice,
        message: &str,
    ) -> Result<(), Self::Error>;
}

/// Payload for a new famine notice (mirrors an issue-create request).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticeRequest {
    pub title: String,
    pub body: String,
    pub assignee: String,
    pub labels: Vec<String>,
}

/// An open notice as reported back by the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamineNotice {
    pub id: u64,
    pub title: String,
    /// Login the notice is assigned to; unassigned notices are skipped
    /// during resolution.
    pub assignee: Option<String>,
}

/// Filter for [`PlayerRepository::list_open_famine_notices`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeQuery {
    pub label: String,
    pub per_page: u32,
}
