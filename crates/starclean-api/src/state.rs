//! Application state wiring the quote engine to its adapters.
//!
//! The engine is generic over the lead sink and zip lookup ports; AppState
//! pins it to the reqwest implementations from starclean-infra.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use starclean_core::engine::BookingEngine;
use starclean_core::wizard::BookingSession;
use starclean_infra::config::load_global_config;
use starclean_infra::filesystem::resolve_data_dir;
use starclean_infra::geocode::ZippopotamClient;
use starclean_infra::webhook::HttpLeadSink;
use starclean_types::config::GlobalConfig;

/// Concrete type aliases for the engine generics pinned to infra implementations.
pub type ConcreteEngine = BookingEngine<HttpLeadSink, ZippopotamClient>;

pub type ConcreteSession = BookingSession<HttpLeadSink, ZippopotamClient>;

/// Sessions untouched for this long are dropped by the sweeper.
pub const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// How often the sweeper looks for idle sessions.
pub const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// A wizard session held by the REST API.
///
/// The session sits behind its own mutex so at most one action runs per
/// session at a time.
pub struct LiveSession {
    pub session: Arc<Mutex<ConcreteSession>>,
    /// Last time a request addressed this session.
    pub last_seen: Instant,
}

/// Live wizard sessions of the REST API, keyed by session ID.
pub type SessionMap = DashMap<Uuid, LiveSession>;

/// Shared application state.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: ConcreteEngine,
    pub sessions: Arc<SessionMap>,
    pub config: Arc<GlobalConfig>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Load `config.toml` from the data directory and wire the engine.
    pub async fn init() -> Self {
        let data_dir = resolve_data_dir();
        let config = load_global_config(&data_dir).await;
        tracing::debug!(data_dir = %data_dir.display(), pricing = %config.pricing.version, "configuration loaded");
        Self::from_config(config, data_dir)
    }

    pub fn from_config(config: GlobalConfig, data_dir: PathBuf) -> Self {
        let engine = BookingEngine::new(
            &config,
            HttpLeadSink::new(),
            ZippopotamClient::with_base_url(config.geocoder.base_url.clone()),
        );
        Self {
            engine,
            sessions: Arc::new(DashMap::new()),
            config: Arc::new(config),
            data_dir,
        }
    }

    /// Register a new session and return its ID.
    pub fn insert_session(&self, session: ConcreteSession) -> Uuid {
        let id = Uuid::now_v7();
        self.sessions.insert(
            id,
            LiveSession {
                session: Arc::new(Mutex::new(session)),
                last_seen: Instant::now(),
            },
        );
        id
    }

    /// Look up a session and mark it as active.
    pub fn touch_session(&self, id: &Uuid) -> Option<Arc<Mutex<ConcreteSession>>> {
        let mut live = self.sessions.get_mut(id)?;
        live.last_seen = Instant::now();
        Some(Arc::clone(&live.session))
    }

    /// Discard a session. Returns `false` if it did not exist.
    pub fn end_session(&self, id: &Uuid) -> bool {
        self.sessions.remove(id).is_some()
    }

    /// Drop every session idle for at least `max_idle`. Returns how many
    /// were dropped.
    pub fn expire_idle_sessions(&self, max_idle: Duration) -> usize {
        let mut expired = 0;
        self.sessions.retain(|_, live| {
            let keep = live.last_seen.elapsed() < max_idle;
            if !keep {
                expired += 1;
            }
            keep
        });
        expired
    }

    /// Periodically expire idle sessions for as long as the server runs.
    pub fn spawn_session_sweeper(&self) -> tokio::task::JoinHandle<()> {
        let state = self.clone();
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(SESSION_SWEEP_INTERVAL);
            loop {
                tick.tick().await;
                let expired = state.expire_idle_sessions(SESSION_IDLE_TIMEOUT);
                if expired > 0 {
                    tracing::debug!(expired, live = state.sessions.len(), "idle wizard sessions dropped");
                }
            }
        })
    }

    /// The local calendar date appointments are generated from.
    pub fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}
