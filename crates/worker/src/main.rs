use clap::Parser;
use lfgwatch_core::notify::discord::DiscordNotifier;
use lfgwatch_core::scrape::chromium::ChromiumTableFetcher;
use lfgwatch_core::storage::snapshot::SnapshotFile;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod run;

use run::{Pipeline, RunOptions, RunOutcome};

#[derive(Debug, Parser)]
#[command(name = "lfgwatch_worker")]
struct Args {
    /// Fetch and diff, but do not send the webhook or write the snapshot.
    #[arg(long)]
    dry_run: bool,

    /// Snapshot file. Overrides SNAPSHOT_PATH.
    #[arg(long)]
    snapshot_path: Option<std::path::PathBuf>,

    /// Leaderboard page. Overrides SOURCE_URL.
    #[arg(long)]
    url: Option<String>,

    /// CSS selector of the leaderboard table. Overrides TABLE_SELECTOR.
    #[arg(long)]
    selector: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut settings = lfgwatch_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();
    if let Some(path) = args.snapshot_path {
        settings.snapshot_path = path;
    }
    if let Some(url) = args.url {
        settings.source_url = url;
    }
    if let Some(selector) = args.selector {
        settings.table_selector = selector;
    }

    tracing::info!(url = %settings.source_url, "checking for new data");

    let store = SnapshotFile::new(settings.snapshot_path.clone());
    let fetcher = ChromiumTableFetcher::from_settings(&settings);
    let notifier = DiscordNotifier::from_settings(&settings)?;
    let source = settings.source();

    let pipeline = Pipeline {
        store: &store,
        fetcher: &fetcher,
        notifier: &notifier,
        source: &source,
    };

    let outcome = match pipeline
        .run_once(RunOptions {
            dry_run: args.dry_run,
        })
        .await
    {
        Ok(outcome) => outcome,
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(error = %format!("{:#}", err), "run aborted");
            return Err(err);
        }
    };

    match &outcome {
        RunOutcome::DryRun { new_entries } => {
            tracing::info!(new_entries = new_entries.len(), dry_run = true, "dry run finished");
            println!("{}", serde_json::to_string_pretty(new_entries)?);
        }
        other => tracing::info!(outcome = ?other, "run finished"),
    }

    Ok(())
}

fn init_sentry(settings: &lfgwatch_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
