use uuid::Uuid;

use super::StoreError;
use crate::models::{ActionItem, ItemEdits, Transcript};

/// Local history keeps at most this many transcripts.
pub const HISTORY_LIMIT: usize = 5;

/// Ephemeral, bounded transcript history for sessions without a workspace.
/// Newest first; adding beyond the limit evicts the oldest. Nothing here
/// survives a restart.
#[derive(Debug, Default)]
pub struct LocalHistory {
    transcripts: Vec<Transcript>,
}

impl LocalHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend a transcript, evicting the oldest beyond the limit.
    pub fn add(&mut self, transcript: Transcript) {
        self.transcripts.insert(0, transcript);
        self.transcripts.truncate(HISTORY_LIMIT);
    }

    pub fn transcripts(&self) -> &[Transcript] {
        &self.transcripts
    }

    pub fn newest(&self) -> Option<&Transcript> {
        self.transcripts.first()
    }

    pub fn len(&self) -> usize {
        self.transcripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcripts.is_empty()
    }

    pub fn remove(&mut self, id: &Uuid) -> Result<(), StoreError> {
        let before = self.transcripts.len();
        self.transcripts.retain(|t| t.id != *id);
        if self.transcripts.len() == before {
            return Err(StoreError::NotFound {
                entity: "transcript",
                id: *id,
            });
        }
        Ok(())
    }

    pub fn add_item(&mut self, transcript_id: &Uuid, item: ActionItem) -> Result<(), StoreError> {
        self.transcript_mut(transcript_id)?.action_items.push(item);
        Ok(())
    }

    /// Edit an item in place. Untouched fields keep their values.
    pub fn update_item(
        &mut self,
        transcript_id: &Uuid,
        item_id: &Uuid,
        edits: &ItemEdits,
    ) -> Result<(), StoreError> {
        let item = self
            .transcript_mut(transcript_id)?
            .action_items
            .iter_mut()
            .find(|i| i.id == *item_id)
            .ok_or(StoreError::NotFound {
                entity: "action item",
                id: *item_id,
            })?;
        edits.apply(item);
        Ok(())
    }

    pub fn delete_item(&mut self, transcript_id: &Uuid, item_id: &Uuid) -> Result<(), StoreError> {
        let items = &mut self.transcript_mut(transcript_id)?.action_items;
        let before = items.len();
        items.retain(|i| i.id != *item_id);
        if items.len() == before {
            return Err(StoreError::NotFound {
                entity: "action item",
                id: *item_id,
            });
        }
        Ok(())
    }

    fn transcript_mut(&mut self, id: &Uuid) -> Result<&mut Transcript, StoreError> {
        self.transcripts
            .iter_mut()
            .find(|t| t.id == *id)
            .ok_or(StoreError::NotFound {
                entity: "transcript",
                id: *id,
            })
    }
}
