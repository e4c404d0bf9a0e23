use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Artificial round-trip delay applied by the mocked cloud backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LatencyProfile {
    #[serde(default, rename = "save_ms", with = "millis")]
    pub save: Duration,
    #[serde(default, rename = "load_ms", with = "millis")]
    pub load: Duration,
}

impl LatencyProfile {
    /// No delay; what tests use
    pub fn none() -> Self {
        Self::default()
    }

    /// The delays the hosted mock used: 1.2 s per save, 0.5 s per load
    pub fn simulated() -> Self {
        Self {
            save: Duration::from_millis(1200),
            load: Duration::from_millis(500),
        }
    }

    pub async fn before_save(&self) {
        if !self.save.is_zero() {
            tokio::time::sleep(self.save).await;
        }
    }

    pub async fn before_load(&self) {
        if !self.load.is_zero() {
            tokio::time::sleep(self.load).await;
        }
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
