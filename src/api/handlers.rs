use std::sync::{Arc, MutexGuard};

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use uuid::Uuid;

use crate::core_state::CoreState;
use crate::extract::{sanitize_text, UNSPECIFIED_TASK};
use crate::models::{ActionItem, User, Workspace};
use crate::store::{SaveOutcome, SessionStore};

use super::error::ApiError;
use super::types::*;

fn lock_session(core: &CoreState) -> Result<MutexGuard<'_, SessionStore>, ApiError> {
    core.session
        .lock()
        .map_err(|_| ApiError::Internal("session lock poisoned".to_string()))
}

/// GET /api/health
pub async fn health(State(core): State<Arc<CoreState>>) -> Json<HealthResponse> {
    let database = match lock_session(&core).map(|s| s.remote().probe()) {
        Ok(Ok(())) => "ok",
        _ => "error",
    };
    let llm = if core.processor.is_configured() {
        "ready"
    } else {
        "not_configured"
    };
    Json(HealthResponse {
        backend: "ok",
        database,
        llm,
    })
}

/// POST /api/process — run extraction and store the result in the active
/// tier. The LLM call blocks, so the whole step runs off the async runtime.
pub async fn process(
    State(core): State<Arc<CoreState>>,
    Json(request): Json<ProcessRequest>,
) -> Result<Json<ProcessResponse>, ApiError> {
    let _guard = core
        .try_begin_processing()
        .ok_or(ApiError::Conflict("A process request is already running"))?;

    let worker = core.clone();
    let response = tokio::task::spawn_blocking(move || {
        let extraction = worker.processor.process(&request.text);
        let degraded_reason = extraction.degrade_reason().map(|e| e.to_string());
        let items = extraction.into_items();

        let transcripts = lock_session(&worker)?.record_extraction(&request.text, items)?;
        Ok::<_, ApiError>(ProcessResponse {
            transcripts,
            degraded: degraded_reason.is_some(),
            degraded_reason,
        })
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok(Json(response))
}

/// POST /api/save — migrate the newest local transcript into the user's
/// workspace. Partially saved state is reported, never rolled back.
pub async fn save(
    State(core): State<Arc<CoreState>>,
    Json(request): Json<SaveRequest>,
) -> Result<Json<SaveResponse>, ApiError> {
    let _guard = core
        .try_begin_saving()
        .ok_or(ApiError::Conflict("A save request is already running"))?;

    let worker = core.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        lock_session(&worker)?
            .save_to_workspace(&request.user_id)
            .map_err(ApiError::from)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;

    match outcome {
        SaveOutcome::FullSuccess {
            workspace_id,
            transcript_id,
            created,
        } => Ok(Json(SaveResponse {
            workspace_id,
            transcript_id,
            created,
        })),
        SaveOutcome::PartialSuccess {
            created, failed, ..
        } => Err(ApiError::PartialSave { created, failed }),
        SaveOutcome::Failure(cause) => Err(ApiError::Persistence(cause.to_string())),
    }
}

/// POST /api/session/workspace — switch the active tier.
pub async fn select_workspace(
    State(core): State<Arc<CoreState>>,
    Json(request): Json<SelectWorkspaceRequest>,
) -> Result<Json<TranscriptsResponse>, ApiError> {
    let transcripts = lock_session(&core)?.select_workspace(request.workspace_id)?;
    Ok(Json(TranscriptsResponse { transcripts }))
}

/// GET /api/transcripts
pub async fn list_transcripts(
    State(core): State<Arc<CoreState>>,
) -> Result<Json<TranscriptsResponse>, ApiError> {
    let transcripts = lock_session(&core)?.transcripts()?;
    Ok(Json(TranscriptsResponse { transcripts }))
}

/// DELETE /api/transcripts/:id
pub async fn delete_transcript(
    State(core): State<Arc<CoreState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<TranscriptsResponse>, ApiError> {
    let transcripts = lock_session(&core)?.delete_transcript(&id)?;
    Ok(Json(TranscriptsResponse { transcripts }))
}

/// POST /api/items
pub async fn add_item(
    State(core): State<Arc<CoreState>>,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<TranscriptsResponse>, ApiError> {
    let item = ActionItem {
        id: Uuid::new_v4(),
        task: sanitize_text(Some(&request.task), UNSPECIFIED_TASK),
        owner: request.owner.filter(|o| !o.trim().is_empty()),
        due_date: request.due_date.filter(|d| !d.trim().is_empty()),
        status: Default::default(),
    };
    let transcripts = lock_session(&core)?.add_item(&request.transcript_id, item)?;
    Ok(Json(TranscriptsResponse { transcripts }))
}

/// PATCH /api/items/:id
pub async fn update_item(
    State(core): State<Arc<CoreState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateItemRequest>,
) -> Result<Json<TranscriptsResponse>, ApiError> {
    if request.edits.is_empty() {
        return Err(ApiError::BadRequest("No fields to update".to_string()));
    }
    let transcripts =
        lock_session(&core)?.update_item(&request.transcript_id, &id, &request.edits)?;
    Ok(Json(TranscriptsResponse { transcripts }))
}

/// DELETE /api/items/:id
pub async fn delete_item(
    State(core): State<Arc<CoreState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<DeleteItemRequest>,
) -> Result<Json<TranscriptsResponse>, ApiError> {
    let transcripts = lock_session(&core)?.delete_item(&request.transcript_id, &id)?;
    Ok(Json(TranscriptsResponse { transcripts }))
}

/// GET /api/workspaces?userId=
pub async fn list_workspaces(
    State(core): State<Arc<CoreState>>,
    Query(query): Query<WorkspacesQuery>,
) -> Result<Json<Vec<Workspace>>, ApiError> {
    let workspaces = lock_session(&core)?.remote().list_workspaces(&query.user_id)?;
    Ok(Json(workspaces))
}

/// POST /api/workspaces
pub async fn create_workspace(
    State(core): State<Arc<CoreState>>,
    Json(request): Json<CreateWorkspaceRequest>,
) -> Result<Json<Workspace>, ApiError> {
    if request.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Workspace name is required".to_string()));
    }
    let session = lock_session(&core)?;
    if session.remote().get_user(&request.user_id)?.is_none() {
        return Err(ApiError::NotFound(format!("user {}", request.user_id)));
    }
    let workspace = Workspace {
        id: Uuid::new_v4(),
        name: request.name.trim().to_string(),
        user_id: request.user_id,
        created_at: Utc::now(),
    };
    session.remote().create_workspace(&workspace)?;
    Ok(Json(workspace))
}

/// POST /api/users
pub async fn create_user(
    State(core): State<Arc<CoreState>>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Json<User>, ApiError> {
    if request.user_name.trim().is_empty() {
        return Err(ApiError::BadRequest("User name is required".to_string()));
    }
    let user = User {
        id: Uuid::new_v4(),
        user_name: request.user_name.trim().to_string(),
        created_at: Utc::now(),
    };
    lock_session(&core)?.remote().create_user(&user)?;
    Ok(Json(user))
}
