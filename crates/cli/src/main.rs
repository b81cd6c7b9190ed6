use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod generate;

#[derive(Parser, Debug)]
#[command(
    name = "goapi",
    version,
    about = "Generate Go net/http server scaffolding from OpenAPI documents"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate one Go file per OpenAPI document
    Generate(generate::GenerateArgs),
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let code = match cli.command {
        Commands::Generate(args) => generate::run(args),
    };
    std::process::exit(code);
}

fn init_tracing() {
    // GOAPI_LOG is a plain level ("debug") or a full filter spec
    // ("goapi_core=trace,goapi=info")
    let filter = match std::env::var("GOAPI_LOG") {
        Ok(level) if is_plain_level(&level) => format!("goapi={level}"),
        Ok(spec) => spec,
        Err(_) => "goapi=info".to_string(),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn is_plain_level(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error" | "off"
    )
}
