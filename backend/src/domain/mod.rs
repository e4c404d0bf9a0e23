//! # Domain Module
//!
//! Business logic for the pregnancy companion, independent of HTTP and of
//! where data is stored.
//!
//! ## Module Organization
//!
//! - **date_engine**: LMP / due-date projection, gestational age, day keys
//! - **pregnancy_anchor**: The single stored date a pregnancy is measured from
//! - **history**: Bounded mood history, chat transcript views, chart series
//! - **session_service**: Mock sign-in with persisted user and subscribers
//! - **mood_service**: Daily mood check-ins
//! - **profile_service**: Pregnancy dates and the profile overview
//! - **assistant / assistant_service**: The 小達 chat assistant
//!
//! ## Business Rules
//!
//! - A due date is always LMP + 280 days; only the LMP is persisted
//! - Gestational age counts whole calendar days and never goes negative
//! - The mood history holds at most one entry per day and at most 14 days
//! - A chat question is saved even when the assistant fails to answer
//! - Writes to the same (user, key) never interleave

pub mod assistant;
pub mod assistant_service;
pub mod commands;
pub mod date_engine;
pub mod error;
pub mod history;
pub mod mood_service;
pub mod pregnancy_anchor;
pub mod profile_service;
pub mod session_service;
pub mod write_locks;

pub use assistant::{AssistantBackend, ScriptedAssistant};
pub use assistant_service::AssistantService;
pub use date_engine::{DateEngine, DayBoundary};
pub use error::{ProfileValidationError, TrackerError};
pub use mood_service::MoodService;
pub use pregnancy_anchor::PregnancyAnchor;
pub use profile_service::ProfileService;
pub use session_service::{AuthLatency, SessionCallback, SessionService, SubscriptionId};
pub use write_locks::KeyedWriteLocks;
