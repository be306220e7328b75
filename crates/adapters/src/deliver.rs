// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Foreman contributors

//! Message delivery into a live agent's input channel.

use async_trait::async_trait;
use foreman_core::ProcessId;
use thiserror::Error;

/// Errors from message delivery
#[derive(Debug, Error)]
pub enum DeliverError {
    #[error("delivery failed: {0}")]
    Failed(String),
}

/// Adapter that hands a dequeued message to a live agent.
#[async_trait]
pub trait MessageDeliverer: Send + Sync {
    async fn deliver(&self, id: &ProcessId, content: &str) -> Result<(), DeliverError>;
}

/// Deliverer that accepts everything and does nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopDeliverer;

#[async_trait]
impl MessageDeliverer for NoopDeliverer {
    async fn deliver(&self, _id: &ProcessId, _content: &str) -> Result<(), DeliverError> {
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[derive(Default)]
    struct FakeDelivererState {
        calls: Vec<(ProcessId, String)>,
        fail_for: HashSet<ProcessId>,
    }

    /// Recording deliverer for testing
    #[derive(Clone, Default)]
    pub struct FakeDeliverer {
        inner: Arc<Mutex<FakeDelivererState>>,
    }

    impl FakeDeliverer {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make deliveries to the given process fail.
        pub fn fail_for(&self, id: ProcessId) {
            self.inner.lock().fail_for.insert(id);
        }

        /// All recorded deliveries, in call order.
        pub fn calls(&self) -> Vec<(ProcessId, String)> {
            self.inner.lock().calls.clone()
        }
    }

    #[async_trait]
    impl MessageDeliverer for FakeDeliverer {
        async fn deliver(&self, id: &ProcessId, content: &str) -> Result<(), DeliverError> {
            let mut state = self.inner.lock();
            if state.fail_for.contains(id) {
                return Err(DeliverError::Failed(format!("injected failure for {}", id)));
            }
            state.calls.push((id.clone(), content.to_string()));
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeDeliverer;
