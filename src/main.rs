use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;

mod archive;
mod crawl;
mod extract_cmd;
mod output;
mod telemetry;

#[derive(Parser)]
#[command(name = "fandom", about = "Archive of Our Own work listing scraper")]
struct Cli {
    /// Emit a single JSON envelope to stdout; logs go to stderr
    #[arg(global = true, long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk a tag's listing pages and write one record per work
    Crawl(crawl::CrawlCmd),
    /// Extract records from a listing page saved to disk
    Extract(extract_cmd::ExtractCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    telemetry::config::set_json_mode(cli.json);

    // stderr logging; respects RUST_LOG and FANDOM_LOG_FORMAT
    telemetry::config::init_tracing();

    match cli.command {
        Commands::Crawl(args) => crawl::run(args).await?,
        Commands::Extract(args) => extract_cmd::run(args).await?,
    }

    Ok(())
}
