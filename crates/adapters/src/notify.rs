// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Foreman contributors

//! Notification sinks: session-ref reporting, the coordinator handoff log,
//! observer channel cleanup, and sound cues.

use async_trait::async_trait;
use foreman_core::ProcessId;
use std::path::Path;
use thiserror::Error;

/// Errors from notification sinks
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Receives the agent-reported session identifier captured on a process's
/// first successful turn.
pub trait SessionRefNotifier: Send + Sync {
    fn notify_session_ref(
        &self,
        id: &ProcessId,
        session_ref: &str,
        work_dir: &Path,
    ) -> Result<(), NotifyError>;
}

/// Appends a coordinator handoff note to the durable message log.
#[async_trait]
pub trait MessagePoster: Send + Sync {
    async fn post_handoff(&self, content: &str) -> Result<(), NotifyError>;
}

/// Tears down an observer's channel subscriptions.
#[async_trait]
pub trait FabricUnsubscriber: Send + Sync {
    async fn unsubscribe_all(&self, id: &ProcessId) -> Result<(), NotifyError>;
}

/// Which sound to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    Approve,
    Deny,
    Notify,
}

/// Plays audible cues for review verdicts and user notifications.
pub trait SoundService: Send + Sync {
    fn play(&self, cue: SoundCue);
}

/// No-op session-ref sink.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSessionRefNotifier;

impl SessionRefNotifier for NoopSessionRefNotifier {
    fn notify_session_ref(
        &self,
        _id: &ProcessId,
        _session_ref: &str,
        _work_dir: &Path,
    ) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// No-op handoff log.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopMessagePoster;

#[async_trait]
impl MessagePoster for NoopMessagePoster {
    async fn post_handoff(&self, _content: &str) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// No-op observer cleanup.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopFabricUnsubscriber;

#[async_trait]
impl FabricUnsubscriber for NoopFabricUnsubscriber {
    async fn unsubscribe_all(&self, _id: &ProcessId) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Silent sound service.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSoundService;

impl SoundService for NoopSoundService {
    fn play(&self, _cue: SoundCue) {}
}

/// Desktop sound service using notify-rust.
///
/// On macOS, `notify-rust` uses `mac-notification-sys` (Cocoa bindings).
/// The first notification triggers `ensure_application_set()` which runs an
/// AppleScript to look up a bundle identifier; in a daemon context without
/// Automation permissions that AppleScript blocks forever, so the bundle
/// identifier is pre-set at construction time.
#[derive(Clone, Copy, Debug, Default)]
pub struct DesktopSoundService;

impl DesktopSoundService {
    pub fn new() -> Self {
        #[cfg(target_os = "macos")]
        {
            let _ = mac_notification_sys::set_application("com.apple.Terminal");
        }
        Self
    }
}

impl SoundService for DesktopSoundService {
    fn play(&self, cue: SoundCue) {
        let (summary, sound) = match cue {
            SoundCue::Approve => ("Review approved", "Glass"),
            SoundCue::Deny => ("Review denied", "Basso"),
            SoundCue::Notify => ("Foreman", "Ping"),
        };
        // Notification::show() is synchronous on macOS. Fire-and-forget on
        // tokio's bounded blocking thread pool to avoid blocking the runtime.
        tokio::task::spawn_blocking(move || {
            match notify_rust::Notification::new().summary(summary).sound_name(sound).show() {
                Ok(_) => {
                    tracing::debug!(summary, "sound cue sent");
                }
                Err(e) => {
                    tracing::warn!(summary, error = %e, "sound cue failed");
                }
            }
        });
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::path::PathBuf;
    use std::sync::Arc;

    /// Recording session-ref sink for testing
    #[derive(Clone, Default)]
    pub struct FakeSessionRefNotifier {
        calls: Arc<Mutex<Vec<(ProcessId, String, PathBuf)>>>,
    }

    impl FakeSessionRefNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<(ProcessId, String, PathBuf)> {
            self.calls.lock().clone()
        }
    }

    impl SessionRefNotifier for FakeSessionRefNotifier {
        fn notify_session_ref(
            &self,
            id: &ProcessId,
            session_ref: &str,
            work_dir: &Path,
        ) -> Result<(), NotifyError> {
            self.calls.lock().push((
                id.clone(),
                session_ref.to_string(),
                work_dir.to_path_buf(),
            ));
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakePosterState {
        handoffs: Vec<String>,
        fail: bool,
    }

    /// Recording handoff log for testing
    #[derive(Clone, Default)]
    pub struct FakeMessagePoster {
        inner: Arc<Mutex<FakePosterState>>,
    }

    impl FakeMessagePoster {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn fail(&self) {
            self.inner.lock().fail = true;
        }

        pub fn handoffs(&self) -> Vec<String> {
            self.inner.lock().handoffs.clone()
        }
    }

    #[async_trait]
    impl MessagePoster for FakeMessagePoster {
        async fn post_handoff(&self, content: &str) -> Result<(), NotifyError> {
            let mut state = self.inner.lock();
            if state.fail {
                return Err(NotifyError::SendFailed("handoff log rejected".into()));
            }
            state.handoffs.push(content.to_string());
            Ok(())
        }
    }

    /// Recording observer cleanup for testing
    #[derive(Clone, Default)]
    pub struct FakeUnsubscriber {
        calls: Arc<Mutex<Vec<ProcessId>>>,
    }

    impl FakeUnsubscriber {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<ProcessId> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl FabricUnsubscriber for FakeUnsubscriber {
        async fn unsubscribe_all(&self, id: &ProcessId) -> Result<(), NotifyError> {
            self.calls.lock().push(id.clone());
            Ok(())
        }
    }

    /// Recording sound service for testing
    #[derive(Clone, Default)]
    pub struct FakeSoundService {
        cues: Arc<Mutex<Vec<SoundCue>>>,
    }

    impl FakeSoundService {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn cues(&self) -> Vec<SoundCue> {
            self.cues.lock().clone()
        }
    }

    impl SoundService for FakeSoundService {
        fn play(&self, cue: SoundCue) {
            self.cues.lock().push(cue);
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeMessagePoster, FakeSessionRefNotifier, FakeSoundService, FakeUnsubscriber};
