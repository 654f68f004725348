//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Host one process-wide session behind a single mutex.
//! - Expose input calls, the `on_tick` pump and read-only views to Dart via
//!   FRB.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every mutation goes through the same lock, so input and timer callbacks
//!   may arrive from different threads.
//! - Events are handed to Dart as JSON strings, oldest first.

use inbox_critters_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Bucket, GameConfig, SessionEngine, SessionError, SessionEvent, SortedThought,
    SqliteHistoryStore,
};
use log::{info, warn};
use parking_lot::{const_mutex, Mutex};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::sync::OnceLock;
use std::time::Duration;
use uuid::Uuid;

const HISTORY_DB_FILE_NAME: &str = "inbox_critters_history.sqlite3";
const HISTORY_DB_PATH_ENV: &str = "INBOX_CRITTERS_DB_PATH";

static HISTORY_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static SESSION: Mutex<Option<HostedSession>> = const_mutex(None);

struct HostedSession {
    engine: SessionEngine<SqliteHistoryStore>,
    events: Receiver<SessionEvent>,
}

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Display metadata for one bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketInfo {
    /// Storage key (`most_important|high|normal|someday`).
    pub key: String,
    pub label: String,
    pub icon: String,
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Generic action envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    /// Created orb ID for submissions.
    pub orb_id: Option<String>,
    /// Stable error code (`capacity_exceeded`, `already_resolved`, ...).
    pub error_code: Option<String>,
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            orb_id: None,
            error_code: None,
            message: message.into(),
        }
    }

    fn failure(code: &str, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            orb_id: None,
            error_code: Some(code.to_string()),
            message: message.into(),
        }
    }

    fn from_session_error(operation: &str, err: &SessionError) -> Self {
        Self::failure(err.code(), format!("{operation} failed: {err}"))
    }
}

/// Counter snapshot for headers and the watch companion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CountersView {
    pub total_sorted: u64,
    pub stolen_count: u64,
    pub session_sorted: u64,
    pub shooed_count: u64,
    pub floating: u32,
}

/// One sorted thought for list display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryItem {
    pub id: String,
    pub text: String,
    pub bucket: String,
    pub timestamp_ms: i64,
}

/// Bucket catalog in canonical order.
#[flutter_rust_bridge::frb(sync)]
pub fn bucket_catalog() -> Vec<BucketInfo> {
    Bucket::iter()
        .map(|bucket| {
            let color = bucket.color();
            BucketInfo {
                key: bucket.as_key().to_string(),
                label: bucket.label().to_string(),
                icon: bucket.icon().to_string(),
                r: color.r,
                g: color.g,
                b: color.b,
            }
        })
        .collect()
}

/// Starts (or replaces) the hosted session.
///
/// `config_json` is an optional partial `GameConfig` object; missing fields
/// use defaults.
#[flutter_rust_bridge::frb(sync)]
pub fn session_start(config_json: Option<String>) -> ActionResponse {
    let config = match parse_config(config_json.as_deref()) {
        Ok(config) => config,
        Err(message) => return ActionResponse::failure("invalid_config", message),
    };
    let store = match SqliteHistoryStore::open(resolve_history_db_path()) {
        Ok(store) => store,
        Err(err) => {
            return ActionResponse::failure("store_failed", format!("history open failed: {err}"))
        }
    };

    let (tx, rx) = mpsc::channel();
    let engine = match SessionEngine::start(store, config) {
        Ok(engine) => engine.with_sink(tx),
        Err(err) => return ActionResponse::from_session_error("session_start", &err),
    };

    let mut slot = SESSION.lock();
    if let Some(mut previous) = slot.take() {
        previous.engine.end();
        warn!("event=session_replace module=ffi status=ok");
    }
    *slot = Some(HostedSession { engine, events: rx });
    info!("event=session_start module=ffi status=ok");
    ActionResponse::success("Session started.")
}

#[flutter_rust_bridge::frb(sync)]
pub fn session_submit_thought(text: String) -> ActionResponse {
    with_session("session_submit_thought", |hosted| {
        hosted
            .engine
            .submit_thought(&text)
            .map(|id| ActionResponse {
                orb_id: Some(id.to_string()),
                ..ActionResponse::success("Thought added.")
            })
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn session_begin_drag(orb_id: String) -> ActionResponse {
    with_orb("session_begin_drag", &orb_id, |hosted, id| {
        hosted
            .engine
            .begin_drag(id)
            .map(|()| ActionResponse::success("Drag started."))
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn session_drag_move(orb_id: String) -> ActionResponse {
    with_orb("session_drag_move", &orb_id, |hosted, id| {
        hosted
            .engine
            .drag_move(id)
            .map(|()| ActionResponse::success("Dragging."))
    })
}

/// Ends a drag. `bucket` is a storage key, or `None` when the drop missed.
#[flutter_rust_bridge::frb(sync)]
pub fn session_end_drag(orb_id: String, bucket: Option<String>) -> ActionResponse {
    let bucket = match bucket.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(key) => match Bucket::from_key(key) {
            Some(bucket) => Some(bucket),
            None => {
                return ActionResponse::failure("invalid_bucket", format!("unknown bucket `{key}`"))
            }
        },
    };
    with_orb("session_end_drag", &orb_id, |hosted, id| {
        hosted
            .engine
            .end_drag(id, bucket)
            .map(|_| ActionResponse::success(if bucket.is_some() { "Sorted." } else { "Dropped." }))
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn session_shoo_critter(critter_id: String) -> ActionResponse {
    let Some(id) = parse_id(&critter_id) else {
        return ActionResponse::failure("invalid_id", format!("invalid critter id `{critter_id}`"));
    };
    with_session("session_shoo_critter", |hosted| {
        hosted
            .engine
            .shoo_critter(id)
            .map(|()| ActionResponse::success("Critter shooed."))
    })
}

/// Advances critter timers. Called from the host frame loop.
///
/// Ticks longer than the session's `max_tick_ms` are clamped by core.
#[flutter_rust_bridge::frb(sync)]
pub fn session_tick(elapsed_ms: u64) -> ActionResponse {
    let elapsed = Duration::from_millis(elapsed_ms);
    with_session("session_tick", |hosted| {
        hosted.engine.on_tick(elapsed);
        Ok(ActionResponse::success("Ticked."))
    })
}

/// Drains pending session events as JSON objects tagged by `type`.
#[flutter_rust_bridge::frb(sync)]
pub fn session_poll_events() -> Vec<String> {
    let slot = SESSION.lock();
    let Some(hosted) = slot.as_ref() else {
        return Vec::new();
    };
    let events: Vec<String> = hosted
        .events
        .try_iter()
        .filter_map(|event| match serde_json::to_string(&event) {
            Ok(json) => Some(json),
            Err(err) => {
                warn!("event=event_encode module=ffi status=error error={err}");
                None
            }
        })
        .collect();
    events
}

#[flutter_rust_bridge::frb(sync)]
pub fn session_counters() -> CountersView {
    let slot = SESSION.lock();
    let Some(hosted) = slot.as_ref() else {
        return CountersView::default();
    };
    let counters = hosted.engine.counters();
    CountersView {
        total_sorted: counters.total_sorted,
        stolen_count: counters.stolen_count,
        session_sorted: counters.session_sorted,
        shooed_count: counters.shooed_count,
        floating: u32::try_from(hosted.engine.floating_orbs().len()).unwrap_or(u32::MAX),
    }
}

/// Sorted thoughts, newest first. Unknown bucket keys yield an empty list.
#[flutter_rust_bridge::frb(sync)]
pub fn session_history(bucket: Option<String>) -> Vec<HistoryItem> {
    let filter = match bucket.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(key) => match Bucket::from_key(key) {
            Some(bucket) => Some(bucket),
            None => return Vec::new(),
        },
    };
    let slot = SESSION.lock();
    slot.as_ref()
        .map(|hosted| {
            hosted
                .engine
                .history(filter)
                .into_iter()
                .map(to_history_item)
                .collect()
        })
        .unwrap_or_default()
}

/// Per-bucket totals across all sessions, canonical order.
#[flutter_rust_bridge::frb(sync)]
pub fn session_bucket_counts() -> Vec<u64> {
    let slot = SESSION.lock();
    slot.as_ref()
        .map(|hosted| {
            hosted
                .engine
                .bucket_counts()
                .iter()
                .map(|(_, count)| count)
                .collect()
        })
        .unwrap_or_else(|| vec![0; Bucket::ALL.len()])
}

#[flutter_rust_bridge::frb(sync)]
pub fn session_restart() -> ActionResponse {
    with_session("session_restart", |hosted| {
        hosted.engine.restart();
        Ok(ActionResponse::success("Session restarted."))
    })
}

/// Tears the hosted session down; pending timers never fire afterwards.
#[flutter_rust_bridge::frb(sync)]
pub fn session_end() -> ActionResponse {
    let mut slot = SESSION.lock();
    match slot.take() {
        Some(mut hosted) => {
            hosted.engine.end();
            ActionResponse::success("Session ended.")
        }
        None => ActionResponse::failure("no_session", "no active session"),
    }
}

fn with_session(
    operation: &str,
    f: impl FnOnce(&mut HostedSession) -> Result<ActionResponse, SessionError>,
) -> ActionResponse {
    let mut slot = SESSION.lock();
    let Some(hosted) = slot.as_mut() else {
        return ActionResponse::failure("no_session", format!("{operation} failed: no active session"));
    };
    match f(hosted) {
        Ok(response) => response,
        Err(err) => ActionResponse::from_session_error(operation, &err),
    }
}

fn with_orb(
    operation: &str,
    orb_id: &str,
    f: impl FnOnce(&mut HostedSession, Uuid) -> Result<ActionResponse, SessionError>,
) -> ActionResponse {
    let Some(id) = parse_id(orb_id) else {
        return ActionResponse::failure("invalid_id", format!("invalid orb id `{orb_id}`"));
    };
    with_session(operation, |hosted| f(hosted, id))
}

fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}

fn parse_config(raw: Option<&str>) -> Result<GameConfig, String> {
    match raw.map(str::trim) {
        None | Some("") => Ok(GameConfig::default()),
        Some(json) => serde_json::from_str(json).map_err(|err| format!("invalid config json: {err}")),
    }
}

fn resolve_history_db_path() -> PathBuf {
    HISTORY_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(HISTORY_DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(HISTORY_DB_FILE_NAME)
        })
        .clone()
}

fn to_history_item(record: SortedThought) -> HistoryItem {
    HistoryItem {
        id: record.id.to_string(),
        text: record.text,
        bucket: record.bucket.as_key().to_string(),
        timestamp_ms: record.timestamp,
    }
}
