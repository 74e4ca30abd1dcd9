//! typewire Server Binary
//!
//! Serves the calculator protocol over TCP.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};
use typewire::calc::{self, Calculator};
use typewire::network::Server;
use typewire::{BincodeMarshaller, Config, JsonMarshaller, Marshaller, PayloadFormat};

/// typewire calculator server
#[derive(Parser, Debug)]
#[command(name = "typewire-server")]
#[command(about = "Calculator server speaking the typewire framing protocol")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:7878")]
    listen: String,

    /// Worker threads serving connections
    #[arg(short, long, default_value = "4")]
    workers: usize,

    /// Payload format (bincode or json)
    #[arg(short, long, default_value = "bincode")]
    format: PayloadFormat,

    /// Largest accepted payload in KB
    #[arg(long, default_value = "16384")]
    max_payload_kb: usize,

    /// Idle read timeout in milliseconds (0 = none)
    #[arg(long, default_value = "30000")]
    read_timeout_ms: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,typewire=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("typewire server v{}", typewire::VERSION);
    tracing::info!("Listen address: {}", args.listen);
    tracing::info!("Payload format: {}", args.format);

    let config = match Config::builder()
        .addr(&args.listen)
        .workers(args.workers)
        .format(args.format)
        .max_payload_kb(args.max_payload_kb)
        .read_timeout_ms(args.read_timeout_ms)
        .build()
    {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    let result = match config.format {
        PayloadFormat::Bincode => serve(config, BincodeMarshaller),
        PayloadFormat::Json => serve(config, JsonMarshaller),
    };

    if let Err(e) = result {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

fn serve<M>(config: Config, marshaller: M) -> typewire::Result<()>
where
    M: Marshaller + Send + Sync + 'static,
{
    let codec = calc::server_codec(marshaller)?;
    let server = Server::bind(config, codec, Calculator::new())?;
    server.run()
}
