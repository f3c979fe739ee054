use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::info;

use workbench::logging::init_logging;
use workbench::{server, Document, HttpWorkbench, Workbench, WorkbenchConfig};

#[derive(Parser)]
#[command(author, version, long_about = None)]
#[command(
    about = "Linear Workbench - step-by-step linear algebra and numerical methods over JSON"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Address to bind (overrides config and WORKBENCH_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides config and WORKBENCH_PORT)
        #[arg(long)]
        port: Option<u16>,

        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Evaluate a request, batch or script locally and print the response
    Run {
        /// JSON file, or `-` for stdin
        input: String,

        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Send a request or batch to a running server
    Remote {
        /// Base URL of the server, e.g. http://127.0.0.1:8000
        url: String,

        /// JSON file, or `-` for stdin
        input: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port, config } => handle_serve(host, port, config.as_deref()).await,
        Commands::Run { input, config } => handle_run(&input, config.as_deref()),
        Commands::Remote { url, input } => handle_remote(&url, &input).await,
    }
}

fn load_config(path: Option<&Path>) -> Result<WorkbenchConfig> {
    let config = match path {
        Some(path) => WorkbenchConfig::from_file(path)?,
        None => WorkbenchConfig::default(),
    };
    Ok(config.apply_env()?)
}

fn read_document(input: &str) -> Result<Document> {
    let source = if input == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read stdin")?;
        buffer
    } else {
        std::fs::read_to_string(input).with_context(|| format!("failed to read {input}"))?
    };
    serde_json::from_str(&source).with_context(|| format!("{input} is not a valid request"))
}

async fn handle_serve(host: Option<String>, port: Option<u16>, path: Option<&Path>) -> Result<()> {
    let mut config = load_config(path)?;
    if let Some(host) = host {
        config = config.with_host(host);
    }
    if let Some(port) = port {
        config = config.with_port(port);
    }
    config.validate()?;
    info!(address = %config.address(), "starting workbench server");
    server::serve(config).await?;
    Ok(())
}

fn handle_run(input: &str, path: Option<&Path>) -> Result<()> {
    let config = load_config(path)?;
    config.validate()?;
    let workbench = Workbench::new(config);

    let (requests, as_list) = read_document(input)?.into_requests()?;
    let output = if as_list {
        serde_json::to_string_pretty(&workbench.execute_batch(&requests)?)?
    } else {
        let request = requests.first().context("document holds no request")?;
        serde_json::to_string_pretty(&workbench.execute(request))?
    };
    println!("{output}");
    Ok(())
}

async fn handle_remote(url: &str, input: &str) -> Result<()> {
    let client = HttpWorkbench::new(url);
    let (requests, as_list) = read_document(input)?.into_requests()?;

    let output: Value = if as_list {
        Value::Array(
            client
                .execute_batch(&requests)
                .await
                .with_context(|| format!("batch request to {url} failed"))?,
        )
    } else {
        let request = requests.first().context("document holds no request")?;
        client
            .execute(request)
            .await
            .with_context(|| format!("request to {url}{} failed", request.route()))?
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
