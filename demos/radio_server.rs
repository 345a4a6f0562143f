//! Minimal radio server example
//!
//! Run with: cargo run --example radio_server <AUDIO_FILE> [BIND_ADDR]
//!
//! Then listen with:
//!   mpv http://localhost:8080/music/stream
//!   ffplay http://localhost:8080/music/stream
//!
//! Every connected player hears the same looping broadcast; a player that
//! joins late joins mid-song, like tuning into a radio station.

use std::net::{IpAddr, SocketAddr};

use radiocast::{Station, StationConfig};

const DEFAULT_PORT: u16 = 8080;

const USAGE: &str = "Usage: radio_server <AUDIO_FILE> [BIND_ADDR]

Arguments:
  AUDIO_FILE   audio file to loop (e.g. music.aac)
  BIND_ADDR    address to bind (default 0.0.0.0:8080)";

/// Parse the bind address, defaulting the port when only an IP or
/// "localhost" is given.
fn parse_bind_addr(arg: &str) -> Result<SocketAddr, String> {
    let arg = arg.replace("localhost", "127.0.0.1");

    arg.parse::<SocketAddr>()
        .or_else(|_| {
            arg.parse::<IpAddr>()
                .map(|ip| SocketAddr::new(ip, DEFAULT_PORT))
        })
        .map_err(|_| format!("invalid bind address '{}'", arg))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        eprintln!("{USAGE}");
        return Ok(());
    }

    let source_path = match args.get(1) {
        Some(path) => path.clone(),
        None => {
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    };

    let bind_addr = match args.get(2) {
        Some(addr_str) => match parse_bind_addr(addr_str) {
            Ok(addr) => addr,
            Err(e) => {
                eprintln!("Error: {}", e);
                eprintln!();
                eprintln!("{USAGE}");
                std::process::exit(1);
            }
        },
        None => SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("radiocast=debug".parse()?)
                .add_directive("radio_server=debug".parse()?),
        )
        .init();

    let station = Station::load(&source_path, StationConfig::default())?;

    println!("Streaming {} on http://{}/music/stream", source_path, bind_addr);
    println!("Listen with: mpv http://localhost:{}/music/stream", bind_addr.port());

    // The station hands us a router; page routes stay our business.
    let app = axum::Router::new()
        .route(
            "/music",
            axum::routing::get(|| async {
                axum::response::Html(
                    "<html><body><audio controls src=\"/music/stream\"></audio></body></html>",
                )
            }),
        )
        .merge(station.router());

    let scheduler = station.scheduler().spawn();

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;

    tokio::select! {
        result = async { axum::serve(listener, app).await } => {
            if let Err(e) = result {
                eprintln!("Server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            println!("\nShutting down...");
        }
    }

    scheduler.abort();

    Ok(())
}
