//! Per-view load state and the health-panel polling gate.

use std::time::Duration;

use crate::error::Result;
use crate::instance::FleetListing;

/// Fleet list refresh period.
pub const FLEET_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Health panel refresh period, only while the instance runs.
pub const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// `Idle -> Loading -> {Success, Error}`. A reload keeps the last good value
/// around so the view does not blank while a request is in flight.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading { previous: Option<T> },
    Success(T),
    Error { message: String, previous: Option<T> },
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> ViewState<T> {
    pub fn begin_load(&mut self) {
        let previous = match std::mem::take(self) {
            Self::Idle => None,
            Self::Loading { previous } | Self::Error { previous, .. } => previous,
            Self::Success(value) => Some(value),
        };
        *self = Self::Loading { previous };
    }

    /// Apply a response. State is simply overwritten, so when requests
    /// overlap the last one to resolve wins.
    pub fn resolve(&mut self, result: Result<T>) {
        *self = match result {
            Ok(value) => Self::Success(value),
            Err(e) => {
                let previous = match std::mem::take(self) {
                    Self::Success(value) => Some(value),
                    Self::Loading { previous } | Self::Error { previous, .. } => previous,
                    Self::Idle => None,
                };
                Self::Error {
                    message: e.detail().map_or_else(|| e.to_string(), str::to_string),
                    previous,
                }
            }
        };
    }

    /// Latest value available for display, fresh or stale.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            Self::Loading { previous } | Self::Error { previous, .. } => previous.as_ref(),
            Self::Idle => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }
}

/// Whether the health panel for `name` should keep polling.
///
/// Polling continues only while the instance is listed and running. With no
/// successful listing yet the panel stays idle.
pub fn should_poll_health(fleet: Option<&FleetListing>, name: &str) -> bool {
    fleet
        .and_then(|f| f.get(name))
        .is_some_and(|instance| instance.is_running())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::instance::parse_listing;

    #[test]
    fn idle_load_success() {
        let mut view: ViewState<u32> = ViewState::default();
        assert_eq!(view, ViewState::Idle);
        view.begin_load();
        assert!(view.is_loading());
        assert_eq!(view.value(), None);
        view.resolve(Ok(7));
        assert_eq!(view, ViewState::Success(7));
    }

    #[test]
    fn reload_keeps_previous_value() {
        let mut view = ViewState::Success(1);
        view.begin_load();
        assert_eq!(view.value(), Some(&1));
        view.resolve(Err(AppError::network("connection refused")));
        assert_eq!(view.error(), Some("connection refused"));
        assert_eq!(view.value(), Some(&1));
        view.begin_load();
        view.resolve(Ok(2));
        assert_eq!(view, ViewState::Success(2));
        assert_eq!(view.error(), None);
    }

    #[test]
    fn overlapping_loads_last_resolution_wins() {
        let mut view = ViewState::Idle;
        view.begin_load();
        view.begin_load();
        view.resolve(Ok("first"));
        view.resolve(Ok("second"));
        assert_eq!(view.value(), Some(&"second"));
    }

    #[test]
    fn health_polls_only_while_running() {
        let fleet = parse_listing(
            r#"[{"name": "up", "status": "running (healthy)"}, {"name": "down", "status": "stopped"}]"#,
        )
        .unwrap();
        assert!(should_poll_health(Some(&fleet), "up"));
        assert!(!should_poll_health(Some(&fleet), "down"));
        assert!(!should_poll_health(Some(&fleet), "missing"));
        assert!(!should_poll_health(None, "up"));
    }
}
