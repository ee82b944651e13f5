//! In-memory player repository the scenarios run the engine against.

use std::cell::RefCell;
use std::rc::Rc;

use nomic_engine::{FamineNotice, NoticeQuery, NoticeRequest, PlayerData, PlayerRepository};
use thiserror::Error;

/// Injected storage failure, raised only when a scenario asks for it.
#[derive(Debug, Error)]
#[error("injected player-file write failure")]
pub struct MemoryError;

#[derive(Debug, Default)]
struct MemoryState {
    data: PlayerData,
    journal: Vec<String>,
    requests: Vec<NoticeRequest>,
    open: Vec<FamineNotice>,
    resolutions: Vec<String>,
    next_id: u64,
    fail_updates: bool,
}

/// Shared-handle repository; every clone observes the same state, so a
/// scenario can keep a handle while the engine owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryRepository {
    #[must_use]
    pub fn with_data(data: PlayerData) -> Self {
        let repo = Self::default();
        repo.state.borrow_mut().data = data;
        repo
    }

    /// Replaces the stored snapshot without touching the journal, the way
    /// an out-of-band edit to the player file would.
    pub fn replace_data(&self, data: PlayerData) {
        self.state.borrow_mut().data = data;
    }

    /// Makes every subsequent snapshot write fail until turned off again.
    pub fn fail_updates(&self, fail: bool) {
        self.state.borrow_mut().fail_updates = fail;
    }

    #[must_use]
    pub fn data(&self) -> PlayerData {
        self.state.borrow().data.clone()
    }

    /// Commit messages recorded by every snapshot write, oldest first.
    #[must_use]
    pub fn journal(&self) -> Vec<String> {
        self.state.borrow().journal.clone()
    }

    /// Full notice requests as they were filed.
    #[must_use]
    pub fn notice_requests(&self) -> Vec<NoticeRequest> {
        self.state.borrow().requests.clone()
    }

    #[must_use]
    pub fn open_notices(&self) -> Vec<FamineNotice> {
        self.state.borrow().open.clone()
    }

    /// Resolution comments posted while closing notices.
    #[must_use]
    pub fn resolutions(&self) -> Vec<String> {
        self.state.borrow().resolutions.clone()
    }
}

impl PlayerRepository for MemoryRepository {
    type Error = MemoryError;

    fn load_player_data(&self) -> Result<PlayerData, Self::Error> {
        Ok(self.state.borrow().data.clone())
    }

    fn update_player_file(&self, data: &PlayerData, message: &str) -> Result<(), Self::Error> {
        let mut state = self.state.borrow_mut();
        if state.fail_updates {
            return Err(MemoryError);
        }
        state.data = data.clone();
        state.journal.push(message.to_string());
        Ok(())
    }

    fn create_famine_notice(&self, request: &NoticeRequest) -> Result<(), Self::Error> {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = state.next_id;
        state.open.push(FamineNotice {
            id,
            title: request.title.clone(),
            assignee: Some(request.assignee.clone()),
        });
        state.requests.push(request.clone());
        Ok(())
    }

    fn list_open_famine_notices(
        &self,
        _query: &NoticeQuery,
    ) -> Result<Vec<FamineNotice>, Self::Error> {
        Ok(self.state.borrow().open.clone())
    }

    fn resolve_famine_notice(
        &self,
        notice: &FamineNotice,
        message: &str,
    ) -> Result<(), Self::Error> {
        let mut state = self.state.borrow_mut();
        state.open.retain(|open| open.id != notice.id);
        state.resolutions.push(message.to_string());
        Ok(())
    }
}
