use rusqlite::Connection;
use uuid::Uuid;

use super::StoreError;
use crate::db::repository;
use crate::models::{ActionItem, ItemEdits, Transcript, User, Workspace};

/// Persistence seam for the workspace tier. Implemented by `SqliteStore` in
/// production and by scripted doubles in tests.
pub trait RemoteStore: Send {
    /// Cheap liveness check of the backing database.
    fn probe(&self) -> Result<(), StoreError>;

    fn create_user(&self, user: &User) -> Result<(), StoreError>;
    fn get_user(&self, id: &Uuid) -> Result<Option<User>, StoreError>;

    fn create_workspace(&self, workspace: &Workspace) -> Result<(), StoreError>;
    fn list_workspaces(&self, user_id: &Uuid) -> Result<Vec<Workspace>, StoreError>;

    /// Create the transcript row. Items are written separately, one per
    /// call, so a failed item never loses the transcript.
    fn create_transcript(
        &self,
        workspace_id: &Uuid,
        transcript: &Transcript,
    ) -> Result<(), StoreError>;
    fn delete_transcript(&self, id: &Uuid) -> Result<(), StoreError>;
    fn list_transcripts(&self, workspace_id: &Uuid) -> Result<Vec<Transcript>, StoreError>;

    fn create_action_item(
        &self,
        transcript_id: &Uuid,
        item: &ActionItem,
        position: i64,
    ) -> Result<(), StoreError>;
    fn update_action_item(&self, id: &Uuid, edits: &ItemEdits) -> Result<(), StoreError>;
    fn delete_action_item(&self, id: &Uuid) -> Result<(), StoreError>;
}

/// `RemoteStore` over the embedded SQLite workspace database.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }
}

impl RemoteStore for SqliteStore {
    fn probe(&self) -> Result<(), StoreError> {
        self.conn
            .query_row("SELECT 1", [], |_| Ok(()))
            .map_err(crate::db::DatabaseError::from)?;
        Ok(())
    }

    fn create_user(&self, user: &User) -> Result<(), StoreError> {
        repository::insert_user(&self.conn, user)?;
        Ok(())
    }

    fn get_user(&self, id: &Uuid) -> Result<Option<User>, StoreError> {
        Ok(repository::get_user(&self.conn, id)?)
    }

    fn create_workspace(&self, workspace: &Workspace) -> Result<(), StoreError> {
        repository::insert_workspace(&self.conn, workspace)?;
        Ok(())
    }

    fn list_workspaces(&self, user_id: &Uuid) -> Result<Vec<Workspace>, StoreError> {
        Ok(repository::list_workspaces(&self.conn, user_id)?)
    }

    fn create_transcript(
        &self,
        workspace_id: &Uuid,
        transcript: &Transcript,
    ) -> Result<(), StoreError> {
        repository::insert_transcript(
            &self.conn,
            &transcript.id,
            workspace_id,
            &transcript.content,
            &transcript.created_at,
        )?;
        Ok(())
    }

    fn delete_transcript(&self, id: &Uuid) -> Result<(), StoreError> {
        repository::delete_transcript(&self.conn, id)?;
        Ok(())
    }

    fn list_transcripts(&self, workspace_id: &Uuid) -> Result<Vec<Transcript>, StoreError> {
        Ok(repository::list_transcripts(&self.conn, workspace_id)?)
    }

    fn create_action_item(
        &self,
        transcript_id: &Uuid,
        item: &ActionItem,
        position: i64,
    ) -> Result<(), StoreError> {
        repository::insert_action_item(&self.conn, transcript_id, item, position)?;
        Ok(())
    }

    fn update_action_item(&self, id: &Uuid, edits: &ItemEdits) -> Result<(), StoreError> {
        repository::update_action_item(&self.conn, id, edits)?;
        Ok(())
    }

    fn delete_action_item(&self, id: &Uuid) -> Result<(), StoreError> {
        repository::delete_action_item(&self.conn, id)?;
        Ok(())
    }
}
