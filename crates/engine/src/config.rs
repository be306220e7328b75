// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Foreman contributors

//! Engine configuration surface.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for the orchestration core.
///
/// This is the whole configuration surface: mailbox capacity, the two
/// termination timeouts, and the enforcement retry budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Per-process mailbox capacity; `None` means unbounded.
    pub mailbox_capacity: Option<usize>,
    /// How long a graceful stop waits before escalating to a kill.
    #[serde(with = "duration_ms")]
    pub graceful_stop_timeout: Duration,
    /// How long a coordinator replacement waits for the current turn.
    #[serde(with = "duration_ms")]
    pub coordinator_drain_timeout: Duration,
    /// How many enforcement reminders a worker gets per turn.
    pub max_turn_retries: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: None,
            graceful_stop_timeout: Duration::from_secs(5),
            coordinator_drain_timeout: Duration::from_secs(30),
            max_turn_retries: 2,
        }
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, s: S) -> Result<S::Ok, S::Error> {
        duration.as_millis().serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(d)?;
        Ok(Duration::from_millis(millis))
    }
}
