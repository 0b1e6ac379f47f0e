use anyhow::Result;
use chillsite::analytics::{compute_snapshot, Period};
use chillsite::auth::AuthService;
use chillsite::config::{Config, DatabaseBackend};
use chillsite::storage::{PostgresStore, RecordStore, SqliteStore};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "chillsite-admin")]
#[command(about = "Chillsite admin management CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum PeriodArg {
    Today,
    Week,
    Month,
}

impl From<PeriodArg> for Period {
    fn from(arg: PeriodArg) -> Self {
        match arg {
            PeriodArg::Today => Period::Today,
            PeriodArg::Week => Period::Week,
            PeriodArg::Month => Period::Month,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the digest for ADMIN_PASSWORD_HASH
    HashPassword {
        /// Password to hash
        password: String,
    },
    /// Print the analytics snapshot for a period
    Stats {
        #[arg(value_enum, default_value_t = PeriodArg::Month)]
        period: PeriodArg,
    },
    /// List recent submissions
    Submissions {
        /// Maximum number of rows to print
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

async fn open_store(config: &Config) -> Result<Arc<dyn RecordStore>> {
    let store: Arc<dyn RecordStore> = match config.database.backend {
        DatabaseBackend::Sqlite => Arc::new(SqliteStore::new(&config.database.url).await?),
        DatabaseBackend::Postgres => Arc::new(PostgresStore::new(&config.database.url).await?),
    };
    store.init().await?;
    Ok(store)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::HashPassword { password } => {
            println!("{}", AuthService::hash_password(&password));
        }
        Commands::Stats { period } => {
            let config = Config::from_env()?;
            let store = open_store(&config).await?;

            let visits = store.fetch_visits().await?;
            let submissions = store.fetch_submissions().await?;
            let now = Utc::now().with_timezone(&config.analytics.reporting_offset());
            let snapshot = compute_snapshot(&visits, &submissions, period.into(), now);

            println!("Visits:      {} total", snapshot.total_visits);
            println!(
                "             {} today / {} this week / {} this month",
                snapshot.visits_today, snapshot.visits_this_week, snapshot.visits_this_month
            );
            println!("Submissions: {} total", snapshot.total_submissions);
            println!(
                "             {} today / {} this week / {} this month",
                snapshot.submissions_today,
                snapshot.submissions_this_week,
                snapshot.submissions_this_month
            );

            if snapshot.popular_services.is_empty() {
                println!("No service requests yet.");
            } else {
                println!("Requested services:");
                for (service, count) in &snapshot.popular_services {
                    println!("  {:<12} {}", service, count);
                }
            }
        }
        Commands::Submissions { limit } => {
            let config = Config::from_env()?;
            let store = open_store(&config).await?;

            let submissions = store.fetch_submissions().await?;
            if submissions.is_empty() {
                println!("No submissions found.");
            } else {
                println!("{:<25} {:<20} {:<12} {}", "Date", "Name", "Service", "Phone");
                println!("{}", "-".repeat(75));
                for sub in submissions.iter().take(limit) {
                    let date = sub
                        .timestamp
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_else(|| "N/A".to_string());
                    println!(
                        "{:<25} {:<20} {:<12} {}",
                        date, sub.name, sub.service, sub.phone
                    );
                }
            }
        }
    }

    Ok(())
}
