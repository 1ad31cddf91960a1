//! `itemgate` binary.
//!
//! Serves the API over HTTP, or with `invoke` handles a single proxy event
//! read from stdin.

use std::path::PathBuf;

use anyhow::Context as _;
use itemgate_config::{ConfigLoader, ItemgateConfig, DEFAULT_ENV_PREFIX};
use itemgate_server::{build_default_app, EventHost, HttpHost, ShutdownSignal};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

enum Command {
    Serve,
    Invoke,
}

struct Args {
    command: Command,
    config: Option<PathBuf>,
}

impl Args {
    fn parse() -> Self {
        let mut args = std::env::args().skip(1);
        let mut command = Command::Serve;
        let mut config = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "serve" => command = Command::Serve,
                "invoke" => command = Command::Invoke,
                "--config" | "-c" => config = args.next().map(PathBuf::from),
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-V" => {
                    println!("itemgate {}", itemgate_server::VERSION);
                    std::process::exit(0);
                }
                other => {
                    eprintln!("Unknown argument: {other}");
                    eprintln!("Use --help for usage information");
                    std::process::exit(2);
                }
            }
        }

        Self { command, config }
    }
}

fn print_help() {
    println!(
        r"itemgate - item API with a bearer-token gate

USAGE:
    itemgate [serve|invoke] [OPTIONS]

COMMANDS:
    serve     Serve HTTP (default)
    invoke    Read one proxy event from stdin, write the response to stdout

OPTIONS:
    -c, --config <PATH>    Configuration file (TOML or JSON)
    -h, --help             Print help information
    -V, --version          Print version information

ENVIRONMENT VARIABLES:
    ITEMGATE__SERVER__HTTP_ADDR        Listen address (default: 0.0.0.0:8080)
    ITEMGATE__SERVER__REQUEST_TIMEOUT_MS
    ITEMGATE__AUTH__VALIDATOR          unverified_jwt | static
    ITEMGATE__AUTH__STATIC_TOKENS      token=subject,...
    ITEMGATE__LOGGING__LEVEL           Filter directives (default: info)
    ITEMGATE__LOGGING__FORMAT          json | pretty
    ITEMGATE__METRICS__ENABLED         Start the Prometheus exporter
"
    );
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<ItemgateConfig> {
    let loader = ConfigLoader::new().with_dotenv()?;
    let loader = match path {
        Some(path) => loader
            .with_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => loader.with_optional_file("itemgate.toml")?,
    };
    Ok(loader.with_env_prefix(DEFAULT_ENV_PREFIX).load()?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_ref())?;

    itemgate_telemetry::init_logging(&config.logging.to_log_config())?;
    itemgate_telemetry::init_metrics(&config.metrics.to_metrics_config())?;

    let router = build_default_app(&config)?;

    match args.command {
        Command::Serve => {
            tracing::info!(version = itemgate_server::VERSION, "starting itemgate");
            HttpHost::new(router)
                .with_request_timeout(config.request_timeout())
                .with_shutdown_timeout(config.shutdown_timeout())
                .run(config.http_addr()?, ShutdownSignal::on_ctrl_c())
                .await?;
        }
        Command::Invoke => {
            let mut input = String::new();
            tokio::io::stdin()
                .read_to_string(&mut input)
                .await
                .context("reading event from stdin")?;
            let output = EventHost::new(router).handle_json(&input).await?;
            let mut stdout = tokio::io::stdout();
            stdout.write_all(output.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
    }

    Ok(())
}
