pub mod history;
pub mod remote;
pub mod session;

pub use history::*;
pub use remote::*;
pub use session::*;

use thiserror::Error;
use uuid::Uuid;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("No local transcript to save")]
    NothingToSave,
}
