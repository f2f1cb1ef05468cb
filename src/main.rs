use std::sync::Arc;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use eyre::Result;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use satori_pool_sim::config::Config;
use satori_pool_sim::display::{print_comparison, print_pool_list, print_schedule};
use satori_pool_sim::fees::resolve_with_trace;
use satori_pool_sim::{run_comparison, ComparisonSummary, InMemoryDataSource, PoolCatalog};

#[derive(Parser)]
#[command(name = "satori-pool-sim")]
#[command(about = "SATORI staking pool earnings simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List pools in the catalog
    Pools,

    /// Show a pool's fee schedule and the entry in effect on a day
    Schedule {
        /// Pool address, vault address or name
        #[arg(long)]
        pool: String,

        /// Day to resolve (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Simulate staking in pools vs running a worker
    Compare {
        /// Pools to compare; the first one is the reference pool
        #[arg(long, value_delimiter = ',', required = true)]
        pools: Vec<String>,

        /// Last simulated day (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Number of days to simulate
        #[arg(long)]
        days: Option<u32>,

        /// Starting amount of SATORI for every trajectory
        #[arg(long)]
        amount: Option<f64>,

        /// Print rows and summary as JSON instead of tables
        #[arg(long, default_value = "false")]
        json: bool,
    },
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn run_pools(config: &Config) -> Result<()> {
    let catalog = PoolCatalog::from_json_file(&config.pools_file)?;
    print_pool_list(catalog.list_pools());
    Ok(())
}

fn run_schedule(config: &Config, pool_ref: &str, date: NaiveDate) -> Result<()> {
    let catalog = PoolCatalog::from_json_file(&config.pools_file)?;
    let pool = catalog
        .select(&[pool_ref])?
        .into_iter()
        .next()
        .ok_or_else(|| eyre::eyre!("Pool not found: {}", pool_ref))?;

    let resolved = resolve_with_trace(pool, date);
    print_schedule(pool, date, resolved.as_ref());
    Ok(())
}

async fn run_compare(
    config: &Config,
    pools: &[String],
    date: NaiveDate,
    days: u32,
    amount: f64,
    json: bool,
) -> Result<()> {
    let catalog = PoolCatalog::from_json_file(&config.pools_file)?;
    let source = Arc::new(InMemoryDataSource::from_json_file(&config.data_file)?);

    info!("Comparing {:?} over {} days ending {}", pools, days, date);
    let rows = run_comparison(&catalog, source, pools, date, days, amount).await?;
    let summary = ComparisonSummary::from_rows(&rows, amount);

    if json {
        let out = serde_json::json!({
            "rows": rows,
            "summary": summary,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print_comparison(&rows, summary.as_ref());
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Pools => run_pools(&config),
        Commands::Schedule { pool, date } => {
            run_schedule(&config, &pool, date.unwrap_or_else(today))
        }
        Commands::Compare { pools, date, days, amount, json } => {
            run_compare(
                &config,
                &pools,
                date.unwrap_or_else(today),
                days.unwrap_or(config.default_days),
                amount.unwrap_or(config.default_starting_amount),
                json,
            )
            .await
        }
    }
}
