use anyhow::Result;
use clap::{Parser, Subcommand};
use std::fs;
use tracing::info;

use lwlies_review_scraper::{
    config::ScraperConfig, review_page::ReviewPageParser, review_scraper::ReviewScraper,
};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape the review index and write extracted reviews to CSV
    Scrape {
        /// Optional limit on the number of review pages to scrape
        #[arg(short, long)]
        limit: Option<usize>,
        /// Override the output CSV path
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Extract fields from a saved review page and print them as JSON
    ProcessPage {
        /// Path to the HTML file to process
        #[arg(short, long)]
        file: String,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = ScraperConfig::from_env();

    match cli.command {
        Commands::Scrape { limit, output } => {
            if let Some(output) = output {
                config.output.csv_path = output;
            }
            let scraper = ReviewScraper::new(config)?;
            scraper.run(limit)?;
        }
        Commands::ProcessPage { file } => {
            info!("Processing saved page: {}", file);
            let html = fs::read_to_string(&file)?;
            let record = ReviewPageParser::new().parse(&html, &format!("file://{}", file));
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
    }

    Ok(())
}
