//! typewire CLI Client
//!
//! Command-line interface for the calculator server.

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};
use typewire::calc::{self, Add, Command, Div, Mul, Ping, Reply, Sub};
use typewire::network::Client;
use typewire::{BincodeMarshaller, Config, JsonMarshaller, Marshaller, PayloadFormat};

/// typewire CLI
#[derive(Parser, Debug)]
#[command(name = "typewire-cli")]
#[command(about = "CLI for the typewire calculator server")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:7878")]
    server: String,

    /// Payload format (bincode or json); must match the server
    #[arg(short, long, default_value = "bincode")]
    format: PayloadFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// a + b
    Add { a: i64, b: i64 },

    /// a - b
    Sub { a: i64, b: i64 },

    /// a * b
    Mul { a: i64, b: i64 },

    /// a / b
    Div { a: i64, b: i64 },

    /// Ping the server
    Ping,
}

impl From<Commands> for Command {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Add { a, b } => Command::Add(Add { a, b }),
            Commands::Sub { a, b } => Command::Sub(Sub { a, b }),
            Commands::Mul { a, b } => Command::Mul(Mul { a, b }),
            Commands::Div { a, b } => Command::Div(Div { a, b }),
            Commands::Ping => Command::Ping(Ping),
        }
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let args = Args::parse();

    let config = match Config::builder()
        .addr(&args.server)
        .format(args.format)
        .build()
    {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    };

    let command = Command::from(args.command);
    let result = match config.format {
        PayloadFormat::Bincode => call(&config, BincodeMarshaller, &command),
        PayloadFormat::Json => call(&config, JsonMarshaller, &command),
    };

    match result {
        Ok(Reply::Value(v)) => println!("{}", v.value),
        Ok(Reply::Pong(_)) => println!("PONG"),
        Ok(Reply::Failure(f)) => {
            eprintln!("(error) {}", f.message);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}

fn call<M: Marshaller>(config: &Config, marshaller: M, command: &Command) -> typewire::Result<Reply> {
    let codec = calc::client_codec(marshaller)?;
    let mut client = Client::connect(config, codec)?;
    tracing::debug!("Sending {}", command.name());
    client.call(command)
}
