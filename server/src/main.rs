use anyhow::Result;
use axum::Router;
use clap::Parser;
use server::{build_app, ServerConfig};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Corpus file (CSV, JSON, JSONL) or directory
    #[arg(long, env = "CORPUS_PATH", default_value = "./imdb_2024_movies.csv")]
    corpus: String,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Results returned when the request does not set `k`
    #[arg(long, default_value_t = storyline_core::DEFAULT_TOP_N)]
    top_n: usize,
    /// Use 1 + ln(tf) instead of the raw term count
    #[arg(long, default_value_t = false)]
    sublinear_tf: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let mut config = ServerConfig::new(&args.corpus).with_env();
    config.top_n = args.top_n;
    config.weighting.sublinear_tf = args.sublinear_tf;
    let app: Router = build_app(config).await?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
