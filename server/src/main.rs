use clap::Parser;
use log::info;
use server::admission::AdmissionController;
use server::gateway::{ConnectionGateway, GatewayConfig};
use server::registry::SessionRegistry;
use server::world;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Parses command-line arguments, seeds the world, then serves the
/// gateway until interrupted.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Command line arguments
    #[derive(Parser, Debug)]
    #[clap(author, version, about)]
    struct Args {
        /// Server IP address to bind to
        #[clap(short = 'H', long, default_value = "127.0.0.1")]
        host: String,
        /// Server port to listen on
        #[clap(short, long, default_value = "8080")]
        port: u16,
        /// Maximum concurrent players
        #[clap(long, default_value_t = shared::MAX_PLAYERS)]
        max_players: usize,
        /// Broadcast interval per connection, in milliseconds
        #[clap(long, default_value_t = shared::BROADCAST_INTERVAL_MS)]
        broadcast_interval_ms: u64,
        /// Number of items to scatter at session start
        #[clap(long, default_value = "64")]
        items: usize,
    }

    let args = Args::parse();

    let registry = Arc::new(SessionRegistry::new());
    let admission = Arc::new(AdmissionController::new(args.max_players));

    // World initialization: item scatter plus the static obstacle
    // layout, before the first connection is accepted.
    let items = {
        let mut rng = rand::thread_rng();
        world::scatter_items(args.items, &mut rng)
    };
    registry.populate(items).await;
    let obstacles = world::default_obstacles();
    info!(
        "World seeded with {} items and {} obstacles",
        registry.item_count().await,
        obstacles.len()
    );

    let address = format!("{}:{}", args.host, args.port);
    let listener = TcpListener::bind(&address).await?;
    info!(
        "Listening on {} (max {} players, {}ms broadcast interval)",
        address, args.max_players, args.broadcast_interval_ms
    );

    let gateway = Arc::new(ConnectionGateway::new(
        registry,
        admission,
        GatewayConfig {
            broadcast_interval: Duration::from_millis(args.broadcast_interval_ms),
        },
    ));

    tokio::select! {
        _ = gateway.run(listener) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
