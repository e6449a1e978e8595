use anyhow::Context;
use clap::Parser;
use gopher_core::{
    delivery::{config::DeliveryConfig, core::semantics::SemanticMap, init_delivery},
    transport::grpc::{
        DEFAULT_GRPC_PORT, DEFAULT_NAV_PORT, DeliveryHandler, NavGrpc,
        proto::{GOPHER_DESCRIPTOR_SET, gopher_delivery_server::GopherDeliveryServer},
    },
};
use tonic::transport::Server;
use tonic_reflection::server::Builder;

#[derive(Parser, Debug)]
#[command(name = "gopherd")]
#[command(about = "Gopher delivery daemon")]
struct GopherdArgs {
    /// Server address to bind to
    #[arg(short, long, default_value = "[::1]")]
    address: String,

    /// Server port to bind to
    #[arg(short, long, default_value_t = DEFAULT_GRPC_PORT)]
    port: u16,

    /// Navigation base endpoint
    #[arg(short, long, default_value_t = format!("[::1]:{DEFAULT_NAV_PORT}"))]
    nav_base: String,

    /// Semantic map TOML file
    #[arg(short, long)]
    semantics: std::path::PathBuf,

    /// Behaviour tree tick period in milliseconds
    #[arg(short, long, default_value_t = 500)]
    tick_period_ms: u64,

    /// Do not hold at stops for the go button
    #[arg(short, long, default_value_t = false)]
    express: bool,

    /// Enable gRPC reflection
    #[arg(short, long, default_value_t = false)]
    reflection: bool,
}

#[cfg(not(tarpaulin_include))]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    #[cfg(feature = "gopher_tracing")]
    gopher_core::gopher_tracing::init();

    let args = GopherdArgs::parse();

    let address = format!("{}:{}", args.address, args.port)
        .parse()
        .context("invalid bind address")?;

    let document = std::fs::read_to_string(&args.semantics)
        .with_context(|| format!("reading semantic map {}", args.semantics.display()))?;
    let semantics = SemanticMap::from_toml_str(&document)?;

    let config = DeliveryConfig { tick_period_ms: args.tick_period_ms, express: args.express };
    let (goal_service, operator_service, engine) =
        init_delivery(config, semantics, NavGrpc::new(args.nav_base))?;
    let _engine_task = engine.spawn();

    let mut server_builder = Server::builder().add_service(GopherDeliveryServer::new(
        DeliveryHandler::new(goal_service, operator_service),
    ));

    if args.reflection {
        let reflection_service = Builder::configure()
            .register_encoded_file_descriptor_set(GOPHER_DESCRIPTOR_SET)
            .build_v1()?;
        server_builder = server_builder.add_service(reflection_service);
    }

    server_builder.serve(address).await?;

    Ok(())
}
