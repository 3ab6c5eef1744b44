use chrono::Utc;
use uuid::Uuid;

use super::history::LocalHistory;
use super::remote::RemoteStore;
use super::StoreError;
use crate::models::{ActionItem, ItemEdits, Transcript, Workspace};

/// Workspace created on first save when the user has none.
const DEFAULT_WORKSPACE_NAME: &str = "My Workspace";

/// Which tier the session currently reads and writes. Local history is
/// parked, not discarded, while a workspace is selected.
#[derive(Debug)]
pub enum SessionTier {
    Local(LocalHistory),
    Remote {
        workspace_id: Uuid,
        parked: LocalHistory,
    },
}

impl Default for SessionTier {
    fn default() -> Self {
        SessionTier::Local(LocalHistory::new())
    }
}

/// Per-item result of the migration saga.
#[derive(Debug)]
pub enum ItemWrite {
    Created,
    Failed(StoreError),
}

/// Aggregate result of saving a local transcript into a workspace.
/// Partially created state is kept as-is; there is no rollback.
#[derive(Debug)]
pub enum SaveOutcome {
    FullSuccess {
        workspace_id: Uuid,
        transcript_id: Uuid,
        created: usize,
    },
    PartialSuccess {
        workspace_id: Uuid,
        transcript_id: Uuid,
        created: usize,
        failed: usize,
    },
    Failure(StoreError),
}

/// Session façade over the two tiers. Every mutation pattern-matches the
/// active tier; remote mutations write through and then refetch the full
/// workspace transcript list, so the returned view is always what a
/// subsequent read would see.
pub struct SessionStore {
    remote: Box<dyn RemoteStore>,
    tier: SessionTier,
}

impl SessionStore {
    pub fn new(remote: Box<dyn RemoteStore>) -> Self {
        Self {
            remote,
            tier: SessionTier::Local(LocalHistory::new()),
        }
    }

    pub fn workspace_id(&self) -> Option<Uuid> {
        match &self.tier {
            SessionTier::Remote { workspace_id, .. } => Some(*workspace_id),
            _ => None,
        }
    }

    pub fn remote(&self) -> &dyn RemoteStore {
        self.remote.as_ref()
    }

    /// Current tier's transcript view, newest first.
    pub fn transcripts(&self) -> Result<Vec<Transcript>, StoreError> {
        match &self.tier {
            SessionTier::Local(history) => Ok(history.transcripts().to_vec()),
            SessionTier::Remote { workspace_id, .. } => self.remote.list_transcripts(workspace_id),
        }
    }

    /// Store a freshly processed transcript in the active tier and return
    /// the updated view.
    pub fn record_extraction(
        &mut self,
        content: &str,
        items: Vec<ActionItem>,
    ) -> Result<Vec<Transcript>, StoreError> {
        match &mut self.tier {
            SessionTier::Local(history) => {
                history.add(Transcript::new(content, items));
                Ok(history.transcripts().to_vec())
            }
            SessionTier::Remote { workspace_id, .. } => {
                let workspace_id = *workspace_id;
                let transcript = Transcript::new(content, Vec::new());
                self.remote.create_transcript(&workspace_id, &transcript)?;
                for (position, item) in items.iter().enumerate() {
                    self.remote
                        .create_action_item(&transcript.id, item, position as i64)?;
                }
                self.remote.list_transcripts(&workspace_id)
            }
        }
    }

    pub fn delete_transcript(&mut self, id: &Uuid) -> Result<Vec<Transcript>, StoreError> {
        match &mut self.tier {
            SessionTier::Local(history) => {
                history.remove(id)?;
                Ok(history.transcripts().to_vec())
            }
            SessionTier::Remote { workspace_id, .. } => {
                let workspace_id = *workspace_id;
                self.remote.delete_transcript(id)?;
                self.remote.list_transcripts(&workspace_id)
            }
        }
    }

    pub fn add_item(
        &mut self,
        transcript_id: &Uuid,
        item: ActionItem,
    ) -> Result<Vec<Transcript>, StoreError> {
        match &mut self.tier {
            SessionTier::Local(history) => {
                history.add_item(transcript_id, item)?;
                Ok(history.transcripts().to_vec())
            }
            SessionTier::Remote { workspace_id, .. } => {
                let workspace_id = *workspace_id;
                let transcripts = self.remote.list_transcripts(&workspace_id)?;
                let position = transcripts
                    .iter()
                    .find(|t| t.id == *transcript_id)
                    .map(|t| t.action_items.len() as i64)
                    .ok_or(StoreError::NotFound {
                        entity: "transcript",
                        id: *transcript_id,
                    })?;
                self.remote
                    .create_action_item(transcript_id, &item, position)?;
                self.remote.list_transcripts(&workspace_id)
            }
        }
    }

    pub fn update_item(
        &mut self,
        transcript_id: &Uuid,
        item_id: &Uuid,
        edits: &ItemEdits,
    ) -> Result<Vec<Transcript>, StoreError> {
        match &mut self.tier {
            SessionTier::Local(history) => {
                history.update_item(transcript_id, item_id, edits)?;
                Ok(history.transcripts().to_vec())
            }
            SessionTier::Remote { workspace_id, .. } => {
                let workspace_id = *workspace_id;
                self.remote.update_action_item(item_id, edits)?;
                self.remote.list_transcripts(&workspace_id)
            }
        }
    }

    pub fn delete_item(
        &mut self,
        transcript_id: &Uuid,
        item_id: &Uuid,
    ) -> Result<Vec<Transcript>, StoreError> {
        match &mut self.tier {
            SessionTier::Local(history) => {
                history.delete_item(transcript_id, item_id)?;
                Ok(history.transcripts().to_vec())
            }
            SessionTier::Remote { workspace_id, .. } => {
                let workspace_id = *workspace_id;
                self.remote.delete_action_item(item_id)?;
                self.remote.list_transcripts(&workspace_id)
            }
        }
    }

    /// Switch tiers. Selecting a workspace parks the local history;
    /// deselecting restores it untouched.
    pub fn select_workspace(
        &mut self,
        workspace_id: Option<Uuid>,
    ) -> Result<Vec<Transcript>, StoreError> {
        self.tier = match (std::mem::take(&mut self.tier), workspace_id) {
            (SessionTier::Local(history), None) => SessionTier::Local(history),
            (SessionTier::Local(history), Some(id)) => SessionTier::Remote {
                workspace_id: id,
                parked: history,
            },
            (SessionTier::Remote { parked, .. }, None) => SessionTier::Local(parked),
            (SessionTier::Remote { parked, .. }, Some(id)) => SessionTier::Remote {
                workspace_id: id,
                parked,
            },
        };
        self.transcripts()
    }

    /// Migrate the newest local transcript into a workspace of the given
    /// user, creating `"My Workspace"` when the user has none. Items are
    /// written one at a time; failures are recorded, not rolled back. On
    /// (partial) success the session switches to the remote tier.
    pub fn save_to_workspace(&mut self, user_id: &Uuid) -> Result<SaveOutcome, StoreError> {
        let transcript = match &self.tier {
            SessionTier::Local(history) => history.newest().cloned(),
            _ => None,
        }
        .ok_or(StoreError::NothingToSave)?;

        if self.remote.get_user(user_id)?.is_none() {
            return Err(StoreError::NotFound {
                entity: "user",
                id: *user_id,
            });
        }

        let workspace_id = match self.ensure_workspace(user_id) {
            Ok(id) => id,
            Err(e) => return Ok(SaveOutcome::Failure(e)),
        };

        if let Err(e) = self.remote.create_transcript(&workspace_id, &transcript) {
            return Ok(SaveOutcome::Failure(e));
        }

        let mut writes = Vec::with_capacity(transcript.action_items.len());
        for (position, item) in transcript.action_items.iter().enumerate() {
            match self
                .remote
                .create_action_item(&transcript.id, item, position as i64)
            {
                Ok(()) => writes.push(ItemWrite::Created),
                Err(e) => {
                    tracing::warn!(item_id = %item.id, error = %e, "Item write failed during save");
                    writes.push(ItemWrite::Failed(e));
                }
            }
        }

        let created = writes
            .iter()
            .filter(|w| matches!(w, ItemWrite::Created))
            .count();
        let failed = writes.len() - created;

        // Park the local history and continue the session in the workspace
        if let SessionTier::Local(parked) = std::mem::take(&mut self.tier) {
            self.tier = SessionTier::Remote {
                workspace_id,
                parked,
            };
        }

        if failed == 0 {
            Ok(SaveOutcome::FullSuccess {
                workspace_id,
                transcript_id: transcript.id,
                created,
            })
        } else {
            Ok(SaveOutcome::PartialSuccess {
                workspace_id,
                transcript_id: transcript.id,
                created,
                failed,
            })
        }
    }

    fn ensure_workspace(&self, user_id: &Uuid) -> Result<Uuid, StoreError> {
        if let Some(existing) = self.remote.list_workspaces(user_id)?.into_iter().next() {
            return Ok(existing.id);
        }
        let workspace = Workspace {
            id: Uuid::new_v4(),
            name: DEFAULT_WORKSPACE_NAME.to_string(),
            user_id: *user_id,
            created_at: Utc::now(),
        };
        self.remote.create_workspace(&workspace)?;
        tracing::info!(workspace_id = %workspace.id, "Created default workspace");
        Ok(workspace.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::{ItemStatus, User};
    use crate::store::remote::SqliteStore;
    use std::cell::Cell;

    fn local_session() -> SessionStore {
        SessionStore::new(Box::new(SqliteStore::new(open_memory_database().unwrap())))
    }

    fn seed_user(session: &SessionStore) -> Uuid {
        let user = User {
            id: Uuid::new_v4(),
            user_name: "ana".into(),
            created_at: Utc::now(),
        };
        session.remote().create_user(&user).unwrap();
        user.id
    }

    #[test]
    fn local_mutations_stay_local() {
        let mut session = session_with_items();
        let view = session.transcripts().unwrap();
        let transcript_id = view[0].id;
        let item_id = view[0].action_items[0].id;

        session
            .update_item(
                &transcript_id,
                &item_id,
                &ItemEdits::status(ItemStatus::Done),
            )
            .unwrap();

        let view = session.transcripts().unwrap();
        assert_eq!(view[0].action_items[0].status, ItemStatus::Done);
        assert!(session.workspace_id().is_none());
    }

    fn session_with_items() -> SessionStore {
        let mut session = local_session();
        session
            .record_extraction(
                "meeting notes",
                vec![ActionItem::open("call bank"), ActionItem::open("send minutes")],
            )
            .unwrap();
        session
    }

    #[test]
    fn saving_without_local_transcripts_is_rejected() {
        let mut session = local_session();
        let user_id = seed_user(&session);
        assert!(matches!(
            session.save_to_workspace(&user_id),
            Err(StoreError::NothingToSave)
        ));
    }

    #[test]
    fn saving_for_unknown_user_is_rejected() {
        let mut session = session_with_items();
        assert!(matches!(
            session.save_to_workspace(&Uuid::new_v4()),
            Err(StoreError::NotFound { entity: "user", .. })
        ));
    }

    #[test]
    fn full_save_creates_workspace_and_switches_tier() {
        let mut session = session_with_items();
        let user_id = seed_user(&session);

        let outcome = session.save_to_workspace(&user_id).unwrap();
        let SaveOutcome::FullSuccess {
            workspace_id,
            created,
            ..
        } = outcome
        else {
            panic!("expected full success, got {outcome:?}");
        };
        assert_eq!(created, 2);
        assert_eq!(session.workspace_id(), Some(workspace_id));

        let workspaces = session.remote().list_workspaces(&user_id).unwrap();
        assert_eq!(workspaces.len(), 1);
        assert_eq!(workspaces[0].name, "My Workspace");

        let view = session.transcripts().unwrap();
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].action_items.len(), 2);
        assert_eq!(view[0].action_items[0].task, "call bank");
    }

    #[test]
    fn save_reuses_existing_workspace() {
        let mut session = session_with_items();
        let user_id = seed_user(&session);
        let existing = Workspace {
            id: Uuid::new_v4(),
            name: "Prior".into(),
            user_id,
            created_at: Utc::now(),
        };
        session.remote().create_workspace(&existing).unwrap();

        session.save_to_workspace(&user_id).unwrap();
        assert_eq!(session.workspace_id(), Some(existing.id));
        assert_eq!(session.remote().list_workspaces(&user_id).unwrap().len(), 1);
    }

    #[test]
    fn tier_switch_parks_and_restores_local_history() {
        let mut session = session_with_items();
        let user_id = seed_user(&session);
        session.save_to_workspace(&user_id).unwrap();
        let workspace_id = session.workspace_id().unwrap();

        // Remote-tier write must not leak into the parked history
        session
            .record_extraction("second meeting", vec![ActionItem::open("remote only")])
            .unwrap();
        assert_eq!(session.transcripts().unwrap().len(), 2);

        let local_view = session.select_workspace(None).unwrap();
        assert_eq!(local_view.len(), 1);
        assert_eq!(local_view[0].content, "meeting notes");

        // And back again, with the remote view intact
        let remote_view = session.select_workspace(Some(workspace_id)).unwrap();
        assert_eq!(remote_view.len(), 2);
    }

    #[test]
    fn remote_mutations_write_through_and_refetch() {
        let mut session = session_with_items();
        let user_id = seed_user(&session);
        session.save_to_workspace(&user_id).unwrap();

        let view = session.transcripts().unwrap();
        let transcript_id = view[0].id;
        let item_id = view[0].action_items[0].id;

        let view = session
            .update_item(
                &transcript_id,
                &item_id,
                &ItemEdits::status(ItemStatus::Done),
            )
            .unwrap();
        assert_eq!(view[0].action_items[0].status, ItemStatus::Done);

        let view = session.delete_item(&transcript_id, &item_id).unwrap();
        assert_eq!(view[0].action_items.len(), 1);

        let view = session
            .add_item(&transcript_id, ActionItem::open("appended"))
            .unwrap();
        assert_eq!(view[0].action_items.len(), 2);
        assert_eq!(view[0].action_items[1].task, "appended");
    }

    /// Delegates to SQLite but fails scripted calls, for saga tests.
    struct FlakyStore {
        inner: SqliteStore,
        fail_transcript_creates: bool,
        item_creates_before_failure: Option<usize>,
        item_creates_seen: Cell<usize>,
    }

    impl FlakyStore {
        fn new(fail_transcript_creates: bool, item_creates_before_failure: Option<usize>) -> Self {
            Self {
                inner: SqliteStore::new(open_memory_database().unwrap()),
                fail_transcript_creates,
                item_creates_before_failure,
                item_creates_seen: Cell::new(0),
            }
        }

        fn broken() -> StoreError {
            StoreError::Database(crate::db::DatabaseError::MigrationFailed {
                version: 0,
                reason: "simulated write failure".into(),
            })
        }
    }

    impl RemoteStore for FlakyStore {
        fn probe(&self) -> Result<(), StoreError> {
            self.inner.probe()
        }
        fn create_user(&self, user: &User) -> Result<(), StoreError> {
            self.inner.create_user(user)
        }
        fn get_user(&self, id: &Uuid) -> Result<Option<User>, StoreError> {
            self.inner.get_user(id)
        }
        fn create_workspace(&self, workspace: &Workspace) -> Result<(), StoreError> {
            self.inner.create_workspace(workspace)
        }
        fn list_workspaces(&self, user_id: &Uuid) -> Result<Vec<Workspace>, StoreError> {
            self.inner.list_workspaces(user_id)
        }
        fn create_transcript(
            &self,
            workspace_id: &Uuid,
            transcript: &Transcript,
        ) -> Result<(), StoreError> {
            if self.fail_transcript_creates {
                return Err(Self::broken());
            }
            self.inner.create_transcript(workspace_id, transcript)
        }
        fn delete_transcript(&self, id: &Uuid) -> Result<(), StoreError> {
            self.inner.delete_transcript(id)
        }
        fn list_transcripts(&self, workspace_id: &Uuid) -> Result<Vec<Transcript>, StoreError> {
            self.inner.list_transcripts(workspace_id)
        }
        fn create_action_item(
            &self,
            transcript_id: &Uuid,
            item: &ActionItem,
            position: i64,
        ) -> Result<(), StoreError> {
            let seen = self.item_creates_seen.get();
            self.item_creates_seen.set(seen + 1);
            if let Some(limit) = self.item_creates_before_failure {
                if seen >= limit {
                    return Err(Self::broken());
                }
            }
            self.inner.create_action_item(transcript_id, item, position)
        }
        fn update_action_item(&self, id: &Uuid, edits: &ItemEdits) -> Result<(), StoreError> {
            self.inner.update_action_item(id, edits)
        }
        fn delete_action_item(&self, id: &Uuid) -> Result<(), StoreError> {
            self.inner.delete_action_item(id)
        }
    }

    fn flaky_session(store: FlakyStore) -> (SessionStore, Uuid) {
        let mut session = SessionStore::new(Box::new(store));
        let user_id = seed_user(&session);
        session
            .record_extraction(
                "meeting notes",
                vec![
                    ActionItem::open("one"),
                    ActionItem::open("two"),
                    ActionItem::open("three"),
                ],
            )
            .unwrap();
        (session, user_id)
    }

    #[test]
    fn partial_save_reports_counts_and_keeps_created_state() {
        let (mut session, user_id) = flaky_session(FlakyStore::new(false, Some(2)));

        let outcome = session.save_to_workspace(&user_id).unwrap();
        let SaveOutcome::PartialSuccess {
            created, failed, ..
        } = outcome
        else {
            panic!("expected partial success, got {outcome:?}");
        };
        assert_eq!(created, 2);
        assert_eq!(failed, 1);

        // No rollback: the transcript and the two successful items remain
        let view = session.transcripts().unwrap();
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].action_items.len(), 2);
    }

    #[test]
    fn failed_transcript_create_is_a_failure_outcome() {
        let (mut session, user_id) = flaky_session(FlakyStore::new(true, None));

        let outcome = session.save_to_workspace(&user_id).unwrap();
        assert!(matches!(outcome, SaveOutcome::Failure(_)));
    }
}
