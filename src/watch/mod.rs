//! Terminal watcher: polls a dashboard server the way the browser UI does.
//!
//! The fleet list refreshes every 5 seconds. When an instance is focused its
//! health panel refreshes every 30 seconds, but only while that instance is
//! running; the panel timer is dropped as soon as it stops.

mod render;
mod state;

pub use render::{format_age, history_strip, render_fleet, render_panel};
pub use state::{should_poll_health, ViewState, FLEET_POLL_INTERVAL, HEALTH_POLL_INTERVAL};

use chrono::Utc;
use tokio::time::{interval, Interval, MissedTickBehavior};

use crate::client::{DashboardClient, HealthPanel};
use crate::error::Result;
use crate::instance::FleetListing;

struct PanelWatch {
    name: String,
    view: ViewState<HealthPanel>,
    timer: Option<Interval>,
}

impl PanelWatch {
    fn new(name: String) -> Self {
        Self {
            name,
            view: ViewState::Idle,
            timer: None,
        }
    }

    /// Start or stop the panel timer to match the instance's running state.
    fn sync_timer(&mut self, fleet: Option<&FleetListing>) {
        let should_poll = should_poll_health(fleet, &self.name);
        match (should_poll, self.timer.is_some()) {
            (true, false) => {
                let mut timer = interval(HEALTH_POLL_INTERVAL);
                timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
                self.timer = Some(timer);
            }
            (false, true) => {
                log::info!("{} is not running, health polling paused", self.name);
                self.timer = None;
            }
            _ => {}
        }
    }
}

async fn refresh_fleet(client: &DashboardClient, fleet: &mut ViewState<FleetListing>) {
    fleet.begin_load();
    fleet.resolve(client.fetch_molts().await);
    print!("{}", render_fleet(fleet));
}

async fn refresh_panel(client: &DashboardClient, panel: &mut PanelWatch) {
    panel.view.begin_load();
    panel.view.resolve(client.fetch_panel(&panel.name).await);
    print!("{}", render_panel(&panel.name, &panel.view, Utc::now()));
}

async fn next_panel_tick(panel: &mut Option<PanelWatch>) {
    match panel.as_mut().and_then(|p| p.timer.as_mut()) {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// Poll until Ctrl+C. `focus` names the instance whose health panel is open.
pub async fn run(client: DashboardClient, focus: Option<String>) -> Result<()> {
    log::info!("Watching {}", client.base_url());

    let mut fleet: ViewState<FleetListing> = ViewState::Idle;
    let mut panel = focus.map(PanelWatch::new);
    let mut fleet_timer = interval(FLEET_POLL_INTERVAL);
    fleet_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = fleet_timer.tick() => {
                refresh_fleet(&client, &mut fleet).await;
                if let Some(p) = panel.as_mut() {
                    // a fresh interval ticks immediately, which performs the
                    // initial panel fetch
                    p.sync_timer(fleet.value());
                }
            }
            () = next_panel_tick(&mut panel) => {
                if let Some(p) = panel.as_mut() {
                    refresh_panel(&client, p).await;
                }
            }
            _ = &mut ctrl_c => break,
        }
    }
    Ok(())
}
