//! The HTTP query/submit surface (`spec.md` §6). A thin front door: every
//! handler only delegates into `miniroha-validator`, `miniroha-state`,
//! `miniroha-mempool`, or the consensus inbox — no business logic lives
//! here.

use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;

use miniroha_consensus::ConsensusMessage;
use miniroha_core::{Height, MinirohaError, Transaction};
use miniroha_crypto::hash_canonical;
use miniroha_mempool::Mempool;
use miniroha_state::StateStore;

pub struct AppState {
    pub store: StateStore,
    pub mempool: Arc<Mutex<Mempool>>,
    pub consensus_inbox: Option<mpsc::Sender<ConsensusMessage>>,
    pub chain_id: String,
    pub use_bft: bool,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/info", get(info))
        .route("/mempool", get(mempool_status))
        .route("/tx", post(submit_tx))
        .route("/consensus", post(submit_consensus_message))
        .route("/query/domain/:id", get(query_domain))
        .route("/query/account/:id", get(query_account))
        .route("/query/asset/:id", get(query_asset))
        .route("/query/balance/:asset_id/:account_id", get(query_balance))
        .route("/query/block/:height", get(query_block))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Maps a [`MinirohaError`] onto the `{error, message}` envelope of
/// `spec.md` §6. "Not found" errors collapse to the literal
/// `{"error":"Not found"}` body the spec names explicitly.
struct ApiError(MinirohaError);

impl From<MinirohaError> for ApiError {
    fn from(e: MinirohaError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self.0 {
            MinirohaError::NotFound(_) | MinirohaError::DomainNotFound(_) => {
                (StatusCode::NOT_FOUND, json!({"error": "Not found"}))
            }
            MinirohaError::PermissionDenied => (
                StatusCode::FORBIDDEN,
                json!({"error": "PERMISSION_DENIED", "message": self.0.to_string()}),
            ),
            MinirohaError::InvalidSignature
            | MinirohaError::MissingChainId
            | MinirohaError::MissingSignerId
            | MinirohaError::InvalidNonce { .. }
            | MinirohaError::InvalidCreatedAt
            | MinirohaError::InvalidInstructions
            | MinirohaError::InvalidSignerFormat
            | MinirohaError::InvalidAmount
            | MinirohaError::InvalidAmountFormat
            | MinirohaError::InvalidPrecision
            | MinirohaError::InvalidPublicKey => (
                StatusCode::BAD_REQUEST,
                json!({"error": "ValidationError", "message": self.0.to_string()}),
            ),
            MinirohaError::Storage(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": "StorageError", "message": self.0.to_string()}),
            ),
            other => (
                StatusCode::BAD_REQUEST,
                json!({"error": "Error", "message": other.to_string()}),
            ),
        };
        (status, Json(body)).into_response()
    }
}

fn ok(data: Value) -> Json<Value> {
    Json(json!({"success": true, "data": data}))
}

async fn health() -> Json<Value> {
    Json(json!({"success": true, "data": {"status": "ok"}}))
}

async fn info(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let height = state.store.get_last_height()?;
    Ok(ok(json!({
        "chain_id": state.chain_id,
        "last_height": height,
        "use_bft": state.use_bft,
    })))
}

async fn mempool_status(State(state): State<Arc<AppState>>) -> Json<Value> {
    let size = state.mempool.lock().expect("mempool mutex poisoned").len();
    Json(json!({"success": true, "data": {"size": size}}))
}

#[derive(Deserialize)]
struct SubmitTxRequest {
    tx: Transaction,
}

async fn submit_tx(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmitTxRequest>,
) -> Result<Json<Value>, ApiError> {
    miniroha_validator::validate(&req.tx, &state.store)?;
    let tx_hash = hash_canonical(&req.tx).map_err(|e| MinirohaError::Serialization(e.to_string()))?;
    state
        .mempool
        .lock()
        .expect("mempool mutex poisoned")
        .insert(req.tx)?;
    Ok(Json(json!({"success": true, "tx_hash": tx_hash})))
}

/// Idempotent per message hash (`spec.md` §6): a duplicate delivery just
/// re-inserts the same vote under the same key, which the consensus
/// engine already tolerates.
async fn submit_consensus_message(
    State(state): State<Arc<AppState>>,
    Json(message): Json<ConsensusMessage>,
) -> Json<Value> {
    match &state.consensus_inbox {
        Some(inbox) => {
            let _ = inbox.send(message).await;
            Json(json!({"success": true}))
        }
        None => Json(json!({"error": "ConsensusDisabled", "message": "this node is not running the BFT engine"})),
    }
}

async fn query_domain(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    match state.store.get_domain(&id)? {
        Some(d) => Ok(ok(serde_json::to_value(d).map_err(|e| MinirohaError::Serialization(e.to_string()))?)),
        None => Err(MinirohaError::NotFound(id).into()),
    }
}

async fn query_account(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    match state.store.get_account(&id)? {
        Some(account) => {
            let roles = state.store.get_account_roles(&id)?;
            Ok(ok(json!({"account": account, "roles": roles.0})))
        }
        None => Err(MinirohaError::NotFound(id).into()),
    }
}

async fn query_asset(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    match state.store.get_asset(&id)? {
        Some(a) => Ok(ok(serde_json::to_value(a).map_err(|e| MinirohaError::Serialization(e.to_string()))?)),
        None => Err(MinirohaError::NotFound(id).into()),
    }
}

async fn query_balance(
    State(state): State<Arc<AppState>>,
    Path((asset_id, account_id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let balance = state.store.get_balance(&asset_id, &account_id)?;
    Ok(ok(serde_json::to_value(balance).map_err(|e| MinirohaError::Serialization(e.to_string()))?))
}

async fn query_block(State(state): State<Arc<AppState>>, Path(height): Path<Height>) -> Result<Json<Value>, ApiError> {
    match state.store.get_block(height)? {
        Some(block) => Ok(ok(serde_json::to_value(block).map_err(|e| MinirohaError::Serialization(e.to_string()))?)),
        None => Err(MinirohaError::NotFound(height.to_string()).into()),
    }
}
