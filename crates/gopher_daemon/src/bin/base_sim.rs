//! Simulated navigation base server, for end-to-end runs without hardware.

use anyhow::Context;
use clap::Parser;
use gopher_core::transport::{
    grpc::{DEFAULT_NAV_PORT, NavBaseHandler, proto::nav_base_server::NavBaseServer},
    loopback::NavSim,
};
use tonic::transport::Server;

#[derive(Parser, Debug)]
#[command(name = "base_sim")]
#[command(about = "Simulated gopher navigation base")]
struct BaseSimArgs {
    /// Server address to bind to
    #[arg(short, long, default_value = "[::1]")]
    address: String,

    /// Server port to bind to
    #[arg(short, long, default_value_t = DEFAULT_NAV_PORT)]
    port: u16,

    /// Base travel time per leg in milliseconds
    #[arg(short, long, default_value_t = 1000)]
    base_delay_ms: u64,

    /// Maximum additional random delay in milliseconds
    #[arg(short, long, default_value_t = 0)]
    jitter_max_ms: u64,
}

#[cfg(not(tarpaulin_include))]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    #[cfg(feature = "gopher_tracing")]
    gopher_core::gopher_tracing::init();

    let args = BaseSimArgs::parse();
    let address = format!("{}:{}", args.address, args.port)
        .parse()
        .context("invalid bind address")?;

    let sim = NavSim::new(args.base_delay_ms, args.jitter_max_ms);
    Server::builder()
        .add_service(NavBaseServer::new(NavBaseHandler::new(sim)))
        .serve(address)
        .await?;

    Ok(())
}
