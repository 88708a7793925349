pub mod broadcast;
pub mod client;
pub mod config;
mod error;
pub mod health;
pub mod instance;
pub mod paths;
pub mod process;
pub mod server;
mod validation;
pub mod watch;

#[cfg(test)]
mod test_support;

use tracing_subscriber::EnvFilter;

pub use config::{load_config, DashboardConfig};
pub use error::{AppError, ErrorKind, Result};
pub use validation::validate_instance_name;

/// Install the log backend. `RUST_LOG` overrides the default `info` level;
/// `log` records from this crate are routed through the same subscriber.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_err()
    {
        log::debug!("Logger already initialized");
    }
}
