//! Instances of the molt fleet.
//!
//! Lifecycle and listing go through the external CLI; the per-instance
//! config file is read directly from `<state_root>/<name>/`.

mod lifecycle;
mod listing;
mod settings;
mod types;

pub use types::{FleetListing, InstanceSettings, InstanceStatus, RunState, Summary};

pub use listing::{list_instances, parse_listing};

pub use lifecycle::{
    clamp_log_lines, dashboard_url, instance_logs, instance_status, setup_health_checks,
    start_instance, stop_instance, DEFAULT_HEALTH_INTERVAL_SECS, DEFAULT_LOG_LINES,
    MAX_LOG_LINES,
};

pub use settings::{parse_settings, read_instance_settings};
