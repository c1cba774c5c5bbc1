use std::net::{IpAddr, SocketAddr};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::config::{Config, RaceTiming, DEFAULT_PORT};
use crate::core::websocket::WebSocketServer;
use crate::games::{create_default_directory, room_catalog};

#[derive(Parser)]
#[command(name = "gamerooms")]
#[command(about = "Real-time multiplayer mini-game rooms over WebSocket")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the game server
    Serve(ServeArgs),
    /// List available rooms
    List,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to bind the server to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Race: delay before a plain move is committed (ms)
    #[arg(long, default_value_t = RaceTiming::DEFAULT_STEP_MS)]
    pub step_delay_ms: u64,

    /// Race: delay before a ladder/chute move is committed (ms)
    #[arg(long, default_value_t = RaceTiming::DEFAULT_JUMP_MS)]
    pub jump_delay_ms: u64,
}

impl Default for ServeArgs {
    fn default() -> Self {
        let config = Config::default();
        Self {
            host: config.bind_addr.ip(),
            port: config.bind_addr.port(),
            step_delay_ms: RaceTiming::DEFAULT_STEP_MS,
            jump_delay_ms: RaceTiming::DEFAULT_JUMP_MS,
        }
    }
}

impl From<ServeArgs> for Config {
    fn from(args: ServeArgs) -> Self {
        Self {
            bind_addr: SocketAddr::new(args.host, args.port),
            race: RaceTiming::from_millis(args.step_delay_ms, args.jump_delay_ms),
        }
    }
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve(args)) => serve(args.into()).await,
        Some(Commands::List) => {
            println!("Available rooms:");
            println!();

            for (namespace, metadata) in room_catalog(&Config::default()) {
                println!("/{namespace}  {}", metadata.name);
                println!("   {}", metadata.description);
                match metadata.max_players {
                    Some(max) => println!("   Players: {}-{max}", metadata.min_players),
                    None => println!("   Players: {}+", metadata.min_players),
                }
                println!();
            }
            Ok(())
        }
        // No subcommand provided - serve with defaults
        None => serve(ServeArgs::default().into()).await,
    }
}

async fn serve(config: Config) -> Result<()> {
    let directory = create_default_directory(&config);
    info!(rooms = directory.len(), "rooms ready");

    let server = WebSocketServer::bind(config.bind_addr, directory).await?;
    server.run().await
}
