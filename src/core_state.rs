use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::config;
use crate::db::sqlite::open_database;
use crate::db::DatabaseError;
use crate::extract::TranscriptProcessor;
use crate::store::{SessionStore, SqliteStore};

/// Shared service state: the tiered session store behind a mutex, the
/// transcript processor, and flags serializing the two long-running
/// actions. Wrapped in an `Arc` by the server.
pub struct CoreState {
    pub session: Mutex<SessionStore>,
    pub processor: TranscriptProcessor,
    pub db_path: PathBuf,
    processing: AtomicBool,
    saving: AtomicBool,
}

impl CoreState {
    pub fn new(session: SessionStore, processor: TranscriptProcessor, db_path: PathBuf) -> Self {
        Self {
            session: Mutex::new(session),
            processor,
            db_path,
            processing: AtomicBool::new(false),
            saving: AtomicBool::new(false),
        }
    }

    /// Open the workspace database at the standard location and assemble
    /// the full state from the environment.
    pub fn initialize() -> Result<Self, DatabaseError> {
        let db_path = config::database_path();
        tracing::info!(path = %db_path.display(), "Opening workspace database");
        let conn = open_database(&db_path)?;
        let session = SessionStore::new(Box::new(SqliteStore::new(conn)));
        Ok(Self::new(session, TranscriptProcessor::from_env(), db_path))
    }

    /// Claim the processing flag. `None` means a process request is
    /// already in flight; the flag clears when the guard drops.
    pub fn try_begin_processing(&self) -> Option<FlagGuard<'_>> {
        FlagGuard::claim(&self.processing)
    }

    /// Claim the saving flag, same contract as processing.
    pub fn try_begin_saving(&self) -> Option<FlagGuard<'_>> {
        FlagGuard::claim(&self.saving)
    }
}

/// Holds an action flag until dropped.
pub struct FlagGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> FlagGuard<'a> {
    fn claim(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
            .then_some(Self { flag })
    }
}

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn test_state() -> CoreState {
        let conn = open_memory_database().unwrap();
        CoreState::new(
            SessionStore::new(Box::new(SqliteStore::new(conn))),
            TranscriptProcessor::unconfigured(),
            PathBuf::from(":memory:"),
        )
    }

    #[test]
    fn processing_flag_is_exclusive_until_released() {
        let state = test_state();
        let guard = state.try_begin_processing().unwrap();
        assert!(state.try_begin_processing().is_none());
        drop(guard);
        assert!(state.try_begin_processing().is_some());
    }

    #[test]
    fn processing_and_saving_flags_are_independent() {
        let state = test_state();
        let _processing = state.try_begin_processing().unwrap();
        assert!(state.try_begin_saving().is_some());
    }
}
