//! # Storage Module
//!
//! Persistence for the pregnancy companion: a per-user key-value "cloud"
//! document store and the signed-in session record.
//!
//! The domain layer only sees the [`CloudStore`] and [`SessionStorage`]
//! traits. Two backends implement them:
//!
//! - **json**: one JSON document per user plus `session.yaml` under the data
//!   directory, written atomically through a temp file
//! - **memory**: process-local maps used by tests and throwaway runs
//!
//! Both take a [`LatencyProfile`] so the simulated network delay of the
//! mocked cloud service is configurable instead of hard-coded.

pub mod traits;
pub mod latency;
pub mod json;
pub mod memory;

#[cfg(test)]
pub mod test_utils;

pub use traits::{load_list, load_typed, save_typed, CloudStore, SessionStorage, StoreKey};
pub use latency::LatencyProfile;
pub use json::{JsonConnection, JsonFileStore, YamlSessionRepository};
pub use memory::{InMemorySessionStorage, InMemoryStore};
