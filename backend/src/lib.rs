//! # Pregnancy Companion Backend
//!
//! Non-UI logic for the pregnancy companion: gestational dating, daily mood
//! tracking, the 小達 chat assistant, and a mock sign-in, served over a JSON
//! REST API.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (REST API, Gemini client)
//!     ↓
//! Domain Layer (date engine, history rules, services)
//!     ↓
//! Storage Layer (per-user cloud documents, session file)
//! ```
//!
//! [`initialize_backend`] wires the production stack from an [`AppConfig`];
//! [`AppState::assemble`] takes explicit parts so tests can swap in the
//! in-memory store and the scripted assistant.

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use log::info;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

pub use config::AppConfig;

use crate::domain::{
    AssistantBackend, AssistantService, AuthLatency, DateEngine, KeyedWriteLocks, MoodService,
    ProfileService, ScriptedAssistant, SessionService,
};
use crate::io::GeminiBackend;
use crate::storage::{CloudStore, JsonConnection, JsonFileStore, SessionStorage, YamlSessionRepository};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub session_service: SessionService,
    pub mood_service: MoodService,
    pub profile_service: ProfileService,
    pub assistant_service: AssistantService,
    pub date_engine: DateEngine,
}

/// Everything the services are built from
pub struct BackendParts {
    pub store: Arc<dyn CloudStore>,
    pub session_storage: Arc<dyn SessionStorage>,
    pub assistant: Arc<dyn AssistantBackend>,
    pub date_engine: DateEngine,
    pub auth_latency: AuthLatency,
    pub chat_history_cap: Option<usize>,
}

impl AppState {
    /// Build the services and restore any persisted session
    pub async fn assemble(parts: BackendParts) -> Result<Self> {
        let BackendParts {
            store,
            session_storage,
            assistant,
            date_engine,
            auth_latency,
            chat_history_cap,
        } = parts;

        info!("Setting up domain model (day boundary: {})", date_engine.boundary());
        let locks = KeyedWriteLocks::new();
        let session_service = SessionService::new(session_storage, auth_latency);
        let mood_service = MoodService::new(store.clone(), date_engine, locks.clone());
        let assistant_service =
            AssistantService::new(store.clone(), assistant, locks.clone(), chat_history_cap);
        let profile_service = ProfileService::new(
            store,
            date_engine,
            locks,
            mood_service.clone(),
            assistant_service.clone(),
        );

        session_service.initialize().await?;

        Ok(Self {
            session_service,
            mood_service,
            profile_service,
            assistant_service,
            date_engine,
        })
    }
}

/// Initialize the backend with file storage and the configured assistant
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    let data_directory = config.data_directory()?;
    info!("Setting up storage in {}", data_directory.display());
    let connection = JsonConnection::new(&data_directory)?;

    let store: Arc<dyn CloudStore> =
        Arc::new(JsonFileStore::with_latency(connection.clone(), config.store_latency));
    let session_storage: Arc<dyn SessionStorage> = Arc::new(YamlSessionRepository::new(connection));

    let assistant: Arc<dyn AssistantBackend> = match config.gemini_api_key() {
        Some(api_key) => {
            info!("Using Gemini model {}", config.assistant.model);
            Arc::new(GeminiBackend::new(&config.assistant, api_key)?)
        }
        None => Arc::new(ScriptedAssistant::new()),
    };

    AppState::assemble(BackendParts {
        store,
        session_storage,
        assistant,
        date_engine: DateEngine::new(config.timezone),
        auth_latency: config.auth_latency,
        chat_history_cap: config.chat_history_cap,
    })
    .await
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, cors_origin: &str) -> Result<Router> {
    let origin = cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin '{}'", cors_origin))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/session", get(io::get_session))
        .route("/session/login", post(io::login))
        .route("/session/logout", post(io::logout))
        .route("/session/profile", put(io::update_session_profile))
        .route("/pregnancy/progress", get(io::get_progress))
        .route("/pregnancy/settings", get(io::get_pregnancy_settings))
        .route("/pregnancy/dates", put(io::update_pregnancy_dates))
        .route("/pregnancy/convert", get(io::convert_dates))
        .route("/mood", get(io::get_current_mood).post(io::record_mood))
        .route("/mood/history", get(io::get_mood_history))
        .route("/mood/chart", get(io::get_mood_chart))
        .route("/chat/greeting", get(io::get_greeting))
        .route("/chat/history", get(io::get_chat_history))
        .route("/chat/messages", post(io::send_message))
        .route("/chat/recent", get(io::get_recent_queries))
        .route("/profile/overview", get(io::get_profile_overview));

    Ok(Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(app_state))
}
