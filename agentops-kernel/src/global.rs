//! Optional process-wide monitor.
//!
//! Code that prefers an ambient monitor over threading a [`MonitorHandle`]
//! through call sites calls [`init`] once at startup. Every function here fails
//! with [`MonitorError::Uninitialized`] until then, and again after
//! [`shutdown`]. Handles and wrappers obtained earlier stay usable after a
//! shutdown or re-initialisation; they keep recording to their own session.

use std::path::Path;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use agentops_config::MonitorConfig;
use agentops_telemetry::{BaselineSnapshot, StatsSnapshot};
use tracing::info;

use crate::wrapper::ActionWrapper;
use crate::{MonitorError, MonitorHandle, MonitorResult};

static MONITOR: RwLock<Option<MonitorHandle>> = RwLock::new(None);

/// Starts a new session and installs it as the process-wide monitor.
///
/// Replaces any previously installed monitor.
///
/// # Errors
///
/// Returns [`MonitorError::Config`] when the configuration fails validation;
/// the previous monitor, if any, stays installed.
pub fn init(config: MonitorConfig) -> MonitorResult<MonitorHandle> {
    let handle = MonitorHandle::new(config)?;
    let previous = MONITOR
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .replace(handle.clone());
    if let Some(previous) = previous {
        info!(
            previous_session = %previous.session_id(),
            session_id = %handle.session_id(),
            "process-wide monitor replaced"
        );
    }
    Ok(handle)
}

/// Removes the process-wide monitor, returning it if one was installed.
pub fn shutdown() -> Option<MonitorHandle> {
    let previous = MONITOR
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
    if let Some(handle) = &previous {
        info!(
            session_id = %handle.session_id(),
            events = handle.event_count(),
            "process-wide monitor shut down"
        );
    }
    previous
}

/// Returns `true` while a process-wide monitor is installed.
#[must_use]
pub fn is_initialized() -> bool {
    MONITOR
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .is_some()
}

/// Returns a handle to the process-wide monitor.
///
/// # Errors
///
/// Returns [`MonitorError::Uninitialized`] before [`init`].
pub fn handle() -> MonitorResult<MonitorHandle> {
    MONITOR
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
        .ok_or(MonitorError::Uninitialized)
}

/// Creates a wrapper recording to the process-wide monitor.
///
/// # Errors
///
/// Returns [`MonitorError::Uninitialized`] before [`init`].
pub fn record_action(action_type: impl Into<String>) -> MonitorResult<ActionWrapper> {
    Ok(handle()?.action(action_type))
}

/// Returns statistics of the process-wide monitor.
///
/// # Errors
///
/// Returns [`MonitorError::Uninitialized`] before [`init`].
pub fn get_stats() -> MonitorResult<StatsSnapshot> {
    Ok(handle()?.stats())
}

/// Waits for `wait`, then captures the process-wide monitor's baseline.
///
/// # Errors
///
/// Returns [`MonitorError::Uninitialized`] before [`init`].
pub async fn establish_baseline(wait: Duration) -> MonitorResult<Option<BaselineSnapshot>> {
    let monitor = handle()?;
    Ok(monitor.establish_baseline_after(wait).await)
}

/// Exports the process-wide monitor's events to `path`.
///
/// # Errors
///
/// Returns [`MonitorError::Uninitialized`] before [`init`] and
/// [`MonitorError::Export`] when the file cannot be written.
pub async fn export_events(path: impl AsRef<Path>) -> MonitorResult<usize> {
    let monitor = handle()?;
    monitor.export_events(path).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Boom;

    impl std::fmt::Display for Boom {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("boom")
        }
    }

    // Single test: the process-wide monitor is shared by every test in this binary.
    #[tokio::test]
    async fn lifecycle_of_process_wide_monitor() {
        assert!(!is_initialized());
        assert!(matches!(handle(), Err(MonitorError::Uninitialized)));
        assert!(matches!(record_action("x"), Err(MonitorError::Uninitialized)));
        assert!(matches!(get_stats(), Err(MonitorError::Uninitialized)));
        assert!(matches!(
            export_events(std::env::temp_dir().join("never-written.json")).await,
            Err(MonitorError::Uninitialized)
        ));
        assert!(matches!(
            establish_baseline(Duration::ZERO).await,
            Err(MonitorError::Uninitialized)
        ));

        assert!(matches!(
            init(MonitorConfig::new(" ")),
            Err(MonitorError::Config(_))
        ));
        assert!(!is_initialized());

        let first = init(MonitorConfig::new("demo")).unwrap();
        assert!(get_stats().unwrap().is_empty());

        let wrapper = record_action("process_data").unwrap();
        wrapper.invoke("hello", |_| Ok::<_, Boom>(())).unwrap();
        let err = wrapper.invoke("fail", |_| Err::<(), _>(Boom)).unwrap_err();
        assert_eq!(err.to_string(), "boom");

        let stats = get_stats().unwrap();
        assert_eq!(stats.stats().unwrap().total_events, 2);
        assert!(establish_baseline(Duration::ZERO).await.unwrap().is_some());

        let second = init(MonitorConfig::new("demo")).unwrap();
        assert_ne!(first.session_id(), second.session_id());
        assert!(get_stats().unwrap().is_empty());

        let removed = shutdown().unwrap();
        assert_eq!(removed.session_id(), second.session_id());
        assert!(shutdown().is_none());
        assert!(matches!(get_stats(), Err(MonitorError::Uninitialized)));

        wrapper.invoke((), |()| Ok::<_, Boom>(())).unwrap();
        assert_eq!(first.event_count(), 3);
    }
}
