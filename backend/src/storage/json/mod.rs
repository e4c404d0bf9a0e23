//! # File-backed Storage
//!
//! ```text
//! {data_dir}/
//! ├── session.yaml          ← signed-in user
//! └── users/
//!     └── {uid}.json        ← every logical key for one user
//! ```

pub mod connection;
pub mod cloud_store;
pub mod session_repository;

pub use connection::JsonConnection;
pub use cloud_store::JsonFileStore;
pub use session_repository::YamlSessionRepository;
