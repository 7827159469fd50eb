use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scholar::{api, config::AppConfig};
use scholar_local::WebContentTool;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "scholar")]
#[command(about = "Research & Reason assistant (HTTP API + CLI)", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: AppConfig,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server (default).
    Serve,
    /// Answer one question through the orchestrator and print the JSON result.
    Ask(AskCmd),
    /// Exercise web search + fetch once and print what came back (json).
    Probe(ProbeCmd),
    /// Print version info.
    Version,
}

#[derive(clap::Args, Debug)]
struct AskCmd {
    /// The question to research.
    question: String,
}

#[derive(clap::Args, Debug)]
struct ProbeCmd {
    #[arg(long, default_value = "Python programming")]
    query: String,
    #[arg(long, default_value_t = 3)]
    max_results: usize,
    /// Text budget for the fetched page.
    #[arg(long, default_value_t = 500)]
    max_chars: usize,
    /// Only search; don't fetch the first result.
    #[arg(long)]
    no_fetch: bool,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        // stdout carries JSON for the CLI subcommands.
        .with_writer(std::io::stderr)
        .init();
}

fn load_dotenv() {
    let enabled = !matches!(
        std::env::var("SCHOLAR_DOTENV")
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
            .as_str(),
        "0" | "false" | "no" | "off"
    );
    if enabled {
        // Never overrides variables already set in the process environment.
        let _ = dotenvy::dotenv();
    }
}

async fn serve(config: &AppConfig) -> Result<()> {
    let orchestrator = Arc::new(config.build_orchestrator());
    let app = api::router(orchestrator).layer(api::cors_layer(&config.cors_origins));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;
    Ok(())
}

async fn probe(config: &AppConfig, args: ProbeCmd) -> Result<serde_json::Value> {
    let tool = WebContentTool::local(Some(&config.search_endpoint))?;
    let search = tool.search(&args.query, args.max_results).await;
    let fetch = match search.results.first() {
        Some(first) if !args.no_fetch => Some(tool.fetch(&first.url, args.max_chars).await),
        _ => None,
    };
    Ok(serde_json::json!({
        "query": args.query,
        "provider": tool.provider_name(),
        "search": search,
        "fetch": fetch,
    }))
}

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();
    let cli = Cli::parse();
    init_tracing();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(&cli.config).await?,
        Commands::Ask(args) => {
            if args.question.trim().is_empty() {
                anyhow::bail!("question cannot be empty");
            }
            let orchestrator = cli.config.build_orchestrator();
            let result = orchestrator.process_query(&args.question).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Probe(args) => {
            let v = probe(&cli.config, args).await?;
            println!("{}", serde_json::to_string_pretty(&v)?);
        }
        Commands::Version => {
            let v = serde_json::json!({
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            });
            println!("{}", serde_json::to_string(&v)?);
        }
    }
    Ok(())
}
