#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Sinkhole map API server binary.

use clap::Parser;
use sinkhole_map_server::{ServerConfig, interactive, run_server};

#[derive(Parser)]
#[command(name = "sinkhole_map_server", about = "Sinkhole map API server")]
struct Cli {
    /// Prompt for the server settings before starting
    #[arg(long, short)]
    interactive: bool,

    /// Port to bind (overrides `PORT`)
    #[arg(long)]
    port: Option<u16>,

    /// Prediction backend URL (overrides `BACKEND_URL`)
    #[arg(long)]
    backend_url: Option<String>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let cli = Cli::parse();

    let mut config = ServerConfig::from_env();
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(url) = cli.backend_url {
        config.backend_url = url;
    }

    if cli.interactive {
        match interactive::prompt(config) {
            Some(config) => run_server(config).await,
            None => {
                println!("Cancelled.");
                Ok(())
            }
        }
    } else {
        run_server(config).await
    }
}
