use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use reqwest::Client;

use molt_dashboard::client::DashboardClient;
use molt_dashboard::{init_logging, load_config, server, watch, DashboardConfig};

/// Monitoring dashboard for a fleet of molt instances
#[derive(Parser, Debug)]
#[command(name = "molt-dashboard", version, args_conflicts_with_subcommands = true)]
struct Cli {
    /// Path to a TOML config file (defaults to ./molt-dashboard.toml if present)
    #[arg(long, global = true, env = "MOLT_DASHBOARD_CONFIG")]
    config: Option<PathBuf>,

    #[command(flatten)]
    serve: ServeArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the API and the browser UI (default)
    Serve(ServeArgs),
    /// Poll a running server and print the fleet, optionally with one health panel
    Watch {
        #[command(flatten)]
        remote: RemoteArgs,
        /// Instance whose health panel to follow
        #[arg(long)]
        instance: Option<String>,
    },
    /// Start an instance through a running server
    Start {
        #[command(flatten)]
        remote: RemoteArgs,
        name: String,
    },
    /// Stop an instance through a running server
    Stop {
        #[command(flatten)]
        remote: RemoteArgs,
        name: String,
    },
    /// Request periodic health checks for an instance
    SetupHealth {
        #[command(flatten)]
        remote: RemoteArgs,
        name: String,
        /// Check interval in seconds
        #[arg(long, default_value_t = 60)]
        interval: u64,
    },
    /// Send a message to every running instance
    Broadcast {
        #[command(flatten)]
        remote: RemoteArgs,
        message: String,
    },
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Host to bind to
    #[arg(long, env = "MOLT_DASHBOARD_HOST")]
    host: Option<String>,
    /// Port to bind to
    #[arg(short, long, env = "MOLT_DASHBOARD_PORT")]
    port: Option<u16>,
    /// External CLI binary
    #[arg(long, env = "MOLT_DASHBOARD_CLI")]
    cli_bin: Option<String>,
    /// Root of per-instance state directories
    #[arg(long, env = "MOLT_DASHBOARD_STATE_ROOT")]
    state_root: Option<PathBuf>,
    /// Directory holding the built UI
    #[arg(long, env = "MOLT_DASHBOARD_STATIC_DIR")]
    static_dir: Option<PathBuf>,
}

impl ServeArgs {
    fn apply(self, config: &mut DashboardConfig) {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(cli_bin) = self.cli_bin {
            config.cli_bin = Some(cli_bin);
        }
        if let Some(root) = self.state_root {
            config.state_root = Some(root);
        }
        if let Some(dir) = self.static_dir {
            config.static_dir = dir;
        }
    }
}

#[derive(Args, Debug)]
struct RemoteArgs {
    /// Base URL of the dashboard server
    #[arg(long, env = "MOLT_DASHBOARD_URL", default_value = "http://127.0.0.1:3000")]
    server: String,
}

impl RemoteArgs {
    fn client(&self) -> anyhow::Result<DashboardClient> {
        let client = Client::builder()
            .build()
            .context("Failed to create HTTP client")?;
        Ok(DashboardClient::new(client, &self.server))
    }
}

/// After a user action, refresh the fleet right away.
async fn print_fleet(client: &DashboardClient) {
    let mut view = watch::ViewState::Idle;
    view.begin_load();
    view.resolve(client.fetch_molts().await);
    print!("{}", watch::render_fleet(&view));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve(cli.serve)) {
        Command::Serve(args) => {
            let mut config = load_config(cli.config.as_deref())?;
            args.apply(&mut config);
            server::serve(config).await?;
        }
        Command::Watch { remote, instance } => {
            watch::run(remote.client()?, instance).await?;
        }
        Command::Start { remote, name } => {
            let client = remote.client()?;
            let out = client.start(&name).await?;
            println!("{}", out["output"].as_str().unwrap_or("started"));
            print_fleet(&client).await;
        }
        Command::Stop { remote, name } => {
            let client = remote.client()?;
            let out = client.stop(&name).await?;
            println!("{}", out["output"].as_str().unwrap_or("stopped"));
            print_fleet(&client).await;
        }
        Command::SetupHealth {
            remote,
            name,
            interval,
        } => {
            let client = remote.client()?;
            client.setup_health(&name, interval).await?;
            println!("Health checks for {name} scheduled every {interval}s");
        }
        Command::Broadcast { remote, message } => {
            let client = remote.client()?;
            let result = client.broadcast(&message).await?;
            println!(
                "Sent to {} of {} running molt(s)",
                result.successful, result.total
            );
            print_fleet(&client).await;
        }
    }
    Ok(())
}
