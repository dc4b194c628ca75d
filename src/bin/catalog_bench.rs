//! Times bulk insert/select/update/delete on the catalog tables.
//!
//! Destroys all existing authors, publishers and books in the target database.

use clap::Parser;
use library_catalog::configuration::get_configuration;
use library_catalog::perf::{format_reports, run_suite, DEFAULT_SIZES};
use library_catalog::startup::get_connection_pool;
use library_catalog::telemetry::init_telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "catalog_bench",
    about = "Time basic SQL operations on the catalog at increasing scales"
)]
struct Args {
    /// Comma separated record counts, e.g. 1000,10000
    #[arg(long, value_delimiter = ',', env = "CATALOG_BENCH_SIZES")]
    sizes: Vec<usize>,

    /// Skip running migrations before the benchmark
    #[arg(long)]
    no_migrate: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_telemetry();
    let args = Args::parse();

    let configuration = get_configuration()?;
    let pool = get_connection_pool(&configuration.database)?;

    if !args.no_migrate {
        sqlx::migrate!("./migrations").run(&pool).await?;
    }

    let sizes = if args.sizes.is_empty() {
        DEFAULT_SIZES.to_vec()
    } else {
        args.sizes
    };

    tracing::info!(?sizes, "Starting catalog benchmark");
    let reports = run_suite(&pool, &sizes).await;

    print!("{}", format_reports(&reports));
    Ok(())
}
