//! arb-scout - Market price research and arbitrage decision engine CLI.

use anyhow::Result;
use arb_scout::commands::{decide, IntlCommand, ResearchCommand};
use arb_scout::config::{Config, OutputFormat};
use arb_scout::intl::Market;
use arb_scout::research::Condition;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "arb-scout",
    version,
    about = "Market price research and arbitrage decision engine",
    long_about = "Researches product prices across marketplaces, computes import/export \
                  arbitrage economics, and validates analysis-model output."
)]
struct Cli {
    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true, env = "ARB_PROXY")]
    proxy: Option<String>,

    /// Delay between scraped requests in milliseconds
    #[arg(long, default_value = "2000", global = true, env = "ARB_DELAY")]
    delay: u64,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "table", global = true)]
    format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Research market prices for a product across all sources
    #[command(alias = "r")]
    Research {
        /// Product title or description
        query: String,

        /// Brand to include in the search query
        #[arg(long)]
        brand: Option<String>,

        /// Model to include in the search query
        #[arg(long)]
        model: Option<String>,

        /// Print the prompt-context block instead of the summary
        #[arg(long)]
        prompt: bool,
    },

    /// Compare prices across international markets
    #[command(alias = "i")]
    Intl {
        /// Product title or description
        query: String,

        /// Markets to sample (comma-separated)
        #[arg(long, value_delimiter = ',')]
        markets: Option<Vec<Market>>,

        /// Item condition to sample
        #[arg(long, default_value = "used")]
        condition: CliCondition,

        /// Home-market sell price for the import calculation
        #[arg(long)]
        sell_price: Option<f64>,

        /// Home-market buy price for the export calculation
        #[arg(long)]
        buy_price: Option<f64>,
    },

    /// List supported markets
    Markets,

    /// Validate an analysis-model response (file path, or - for stdin)
    Decide {
        /// Input file, or - for stdin
        input: String,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum CliCondition {
    New,
    Used,
    Refurbished,
}

impl From<CliCondition> for Condition {
    fn from(c: CliCondition) -> Self {
        match c {
            CliCondition::New => Condition::New,
            CliCondition::Used => Condition::Used,
            CliCondition::Refurbished => Condition::Refurbished,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    config.format = cli.format;
    config.delay_ms = cli.delay;

    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }

    match cli.command {
        Commands::Research { query, brand, model, prompt } => {
            let cmd = ResearchCommand::new(config, prompt);
            let output = cmd.execute(&query, brand.as_deref(), model.as_deref()).await?;
            println!("{}", output);
        }

        Commands::Intl { query, markets, condition, sell_price, buy_price } => {
            let markets = markets.unwrap_or_else(|| config.markets.clone());
            let cmd = IntlCommand::new(config, sell_price, buy_price);
            let output = cmd.execute(&query, &markets, condition.into()).await?;
            println!("{}", output);
        }

        Commands::Markets => {
            println!("Supported markets:\n");
            println!("{:<6} {:<20} {:<10} {:<10} {:<10}", "Code", "Country", "Currency", "FX->EUR", "Shipping");
            println!("{:-<6} {:-<20} {:-<10} {:-<10} {:-<10}", "", "", "", "", "");

            for market in Market::all() {
                println!(
                    "{:<6} {:<20} {:<10} {:<10} {:<10}",
                    market.to_string(),
                    market.name(),
                    market.currency(),
                    market.fx_rate_to_eur(),
                    format!("€{:.0}", market.shipping_to_home())
                );
            }
        }

        Commands::Decide { input } => {
            let output = decide::run(&config, &input)?;
            println!("{}", output);
        }
    }

    Ok(())
}
