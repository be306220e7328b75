// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Foreman contributors

//! Native process termination for the force-stop path.

/// Kill a process by native pid.
///
/// Unix delivers SIGKILL; other platforms have no signal support here and
/// rely on the agent's cooperative cancel having been requested first.
#[cfg(unix)]
pub(crate) fn kill_pid(pid: u32) {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    match kill(Pid::from_raw(pid as i32), Signal::SIGKILL) {
        Ok(()) => tracing::info!(pid, "sent SIGKILL"),
        Err(e) => tracing::warn!(pid, error = %e, "SIGKILL failed"),
    }
}

#[cfg(not(unix))]
pub(crate) fn kill_pid(pid: u32) {
    tracing::warn!(pid, "force kill unsupported on this platform");
}
