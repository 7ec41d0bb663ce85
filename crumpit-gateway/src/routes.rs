//! Axum route handlers for the crumpit manager API.
//!
//! Every handler takes one configuration snapshot, resolves a fresh client,
//! makes its backend call and answers with a `{status, data}` envelope.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap},
    response::Response,
    routing::get,
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use crumpit_backends::resolve_from;
use crumpit_core::{Document, Outcome, StoreValue};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{error::GatewayError, state::AppState};

/// Payload of `GET /`.
pub const WELCOME: &str = "Welcome to crumpit Manager APIs";

// ── Router ────────────────────────────────────────────────────────────────────

/// Build the application router over the given state.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/liveRuns", get(live_runs))
        .route("/liveRuns/graph", get(live_runs_graph))
        .route("/liveRuns/liveStats", get(live_stats))
        .route("/metadata/runs", get(metadata_runs))
        .route("/metadata/run", get(run_schema).post(add_run))
        .route("/metadata/run/defaultBarKit/{seq_kit}", get(default_bar_kit))
        .route("/backups", get(backups))
        .route("/clusterInfo", get(cluster_info))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// `GET /`: welcome text.
pub async fn root(State(state): State<AppState>) -> Response {
    state.reply(Outcome::Success(WELCOME.into()))
}

/// `GET /liveRuns`: runs known to the document store.
///
/// # Errors
/// Returns [`GatewayError::LiveRunsUnavailable`] if the store cannot be reached.
pub async fn live_runs(State(state): State<AppState>) -> Result<Response, GatewayError> {
    let config = state.config.snapshot();
    let client = resolve_from(&config, &*state.live_runs)
        .await
        .map_err(GatewayError::LiveRunsUnavailable)?;
    let runs = client.list_runs().await.map_err(GatewayError::LiveRunsUnavailable)?;
    Ok(state.reply(Outcome::Success(runs)))
}

/// `GET /liveRuns/graph`: the runs graph as base64 image data.
///
/// # Errors
/// Returns [`GatewayError::LiveRunsUnavailable`] if the store cannot be reached,
/// or [`GatewayError::GraphUnavailable`] if no image file could be produced.
pub async fn live_runs_graph(State(state): State<AppState>) -> Result<Response, GatewayError> {
    let config = state.config.snapshot();
    let client = resolve_from(&config, &*state.live_runs)
        .await
        .map_err(GatewayError::LiveRunsUnavailable)?;

    let path = match client.build_runs_graph().await {
        Ok(Some(path)) => path,
        Ok(None) => {
            return Err(GatewayError::GraphUnavailable {
                reason: "renderer produced no image file".to_owned(),
            })
        }
        Err(e) => return Err(GatewayError::GraphUnavailable { reason: e.to_string() }),
    };
    let image = tokio::fs::read(&path).await.map_err(|e| GatewayError::GraphUnavailable {
        reason: format!("failed to read {}: {e}", path.display()),
    })?;

    let mut payload = Document::new();
    payload.insert("image".to_owned(), STANDARD.encode(image).into());
    Ok(state.reply(Outcome::Success(payload.into())))
}

/// `GET /liveRuns/liveStats`: aggregated live statistics.
///
/// # Errors
/// Returns [`GatewayError::LiveStats`] if the client cannot be built or queried.
pub async fn live_stats(State(state): State<AppState>) -> Result<Response, GatewayError> {
    let config = state.config.snapshot();
    let client = resolve_from(&config, &*state.live_runs).await.map_err(GatewayError::LiveStats)?;
    let stats = client.live_stats().await.map_err(GatewayError::LiveStats)?;
    Ok(state.reply(Outcome::Success(stats)))
}

/// `GET /metadata/runs`: previously registered runs.
///
/// # Errors
/// Returns [`GatewayError::MetadataUnavailable`] if the store cannot be reached.
pub async fn metadata_runs(State(state): State<AppState>) -> Result<Response, GatewayError> {
    let config = state.config.snapshot();
    let client = resolve_from(&config, &*state.metadata)
        .await
        .map_err(GatewayError::MetadataUnavailable)?;
    let runs = client.list_prior_runs().await.map_err(GatewayError::MetadataUnavailable)?;
    Ok(state.reply(Outcome::Success(runs)))
}

/// `GET /metadata/run`: field schema for a new run.
///
/// # Errors
/// Returns [`GatewayError::MetadataUnavailable`] if the store cannot be reached.
pub async fn run_schema(State(state): State<AppState>) -> Result<Response, GatewayError> {
    let schema = fetch_run_schema(&state).await?;
    Ok(state.reply(Outcome::Success(schema)))
}

/// `GET /metadata/run/defaultBarKit/{seq_kit}`: default barcode kit for a sequencing kit.
///
/// # Errors
/// Returns [`GatewayError::MetadataUnavailable`] if the schema cannot be fetched,
/// or [`GatewayError::UnknownSequencingKit`] if `seq_kit` is not listed.
pub async fn default_bar_kit(
    State(state): State<AppState>,
    Path(seq_kit): Path<String>,
) -> Result<Response, GatewayError> {
    let schema = fetch_run_schema(&state).await?;
    let bar_kit = schema
        .get("sequenceKits")
        .and_then(|kits| kits.get(&seq_kit))
        .cloned()
        .ok_or(GatewayError::UnknownSequencingKit(seq_kit))?;
    Ok(state.reply(Outcome::Success(bar_kit)))
}

async fn fetch_run_schema(state: &AppState) -> Result<StoreValue, GatewayError> {
    let config = state.config.snapshot();
    let client = resolve_from(&config, &*state.metadata)
        .await
        .map_err(GatewayError::MetadataUnavailable)?;
    client.run_field_schema().await.map_err(GatewayError::MetadataUnavailable)
}

/// `POST /metadata/run`: register a new run from a JSON object body.
///
/// # Errors
/// Returns [`GatewayError::UnsupportedMediaType`] unless the content type
/// contains the lowercase substring `json`, [`GatewayError::InvalidParameter`] unless the body is a JSON
/// object, and [`GatewayError::MetadataUnavailable`] if the insert fails.
pub async fn add_run(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, GatewayError> {
    let content_type = headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok());
    if !content_type.is_some_and(|ct| ct.contains("json")) {
        return Err(GatewayError::UnsupportedMediaType {
            content_type: content_type.map(str::to_owned),
        });
    }

    let fields = parse_run_fields(&body)?;
    tracing::debug!(params = ?fields.keys().collect::<Vec<_>>(), "adding run");

    let config = state.config.snapshot();
    let client = resolve_from(&config, &*state.metadata)
        .await
        .map_err(GatewayError::MetadataUnavailable)?;
    let created = client.create_run(&fields).await.map_err(GatewayError::MetadataUnavailable)?;
    Ok(state.reply(Outcome::Success(created)))
}

fn parse_run_fields(body: &[u8]) -> Result<Document, GatewayError> {
    let json: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| GatewayError::InvalidParameter(e.to_string()))?;
    match StoreValue::from(json) {
        StoreValue::Document(fields) => Ok(fields),
        _ => Err(GatewayError::InvalidParameter("body is not a JSON object".to_owned())),
    }
}

/// `GET /backups`: backup state of every live run.
///
/// # Errors
/// Returns [`GatewayError::Inspection`] if the runs or backup state cannot be
/// read, or [`GatewayError::Config`] if `logDir` or `clusterInfo.remoteStorage`
/// is not configured.
pub async fn backups(State(state): State<AppState>) -> Result<Response, GatewayError> {
    let config = state.config.snapshot();
    let client = resolve_from(&config, &*state.live_runs).await.map_err(GatewayError::Inspection)?;
    let runs = client.list_runs().await.map_err(GatewayError::Inspection)?;

    let log_dir = config.log_dir()?;
    let remote_storage = config.cluster_info()?.remote_storage()?;
    let info = state
        .cluster
        .backup_info(log_dir, &runs, remote_storage)
        .await
        .map_err(GatewayError::Inspection)?;
    Ok(state.reply(Outcome::Success(info)))
}

/// `GET /clusterInfo`: local and remote storage information.
///
/// # Errors
/// Returns [`GatewayError::Config`] if `clusterInfo` or its `remoteStorage` key
/// is missing, or [`GatewayError::Inspection`] if the inspector fails.
pub async fn cluster_info(State(state): State<AppState>) -> Result<Response, GatewayError> {
    let config = state.config.snapshot();
    let cluster = config.cluster_info()?;
    let local = state.cluster.local_info(cluster).await.map_err(GatewayError::Inspection)?;
    let remote = state
        .cluster
        .remote_info(cluster.remote_storage()?)
        .await
        .map_err(GatewayError::Inspection)?;

    let mut combined = Document::new();
    combined.insert("localInfo".to_owned(), local);
    combined.insert("remoteInfo".to_owned(), remote);
    Ok(state.reply(Outcome::Success(combined.into())))
}
