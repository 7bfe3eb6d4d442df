use lfgwatch_core::diff::compute_new;
use lfgwatch_core::domain::entry::Entry;
use lfgwatch_core::notify::{Delivery, Notifier, SkipReason};
use lfgwatch_core::scrape::{fetch_entries, SourcePage, TableFetcher};
use lfgwatch_core::storage::snapshot::SnapshotFile;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Fetch and diff, but never notify or touch the snapshot.
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// No usable table this run; the snapshot is left alone.
    FetchFailed,
    /// First run: the current table became the snapshot.
    Baseline { entries: usize },
    NoNewEntries,
    Notified { new_entries: usize, status: u16 },
    NotificationSkipped { new_entries: usize, reason: SkipReason },
    NotificationFailed { new_entries: usize },
    DryRun { new_entries: Vec<Entry> },
}

pub struct Pipeline<'a> {
    pub store: &'a SnapshotFile,
    pub fetcher: &'a dyn TableFetcher,
    pub notifier: &'a dyn Notifier,
    pub source: &'a SourcePage,
}

impl Pipeline<'_> {
    /// Runs one check. Only a failed snapshot write is returned as an error; fetch and
    /// notification failures are logged and reported through the outcome.
    ///
    /// The snapshot is rewritten only on the first run or after the webhook accepted the
    /// message, so undelivered entries are reported again next time.
    pub async fn run_once(&self, options: RunOptions) -> anyhow::Result<RunOutcome> {
        let previous = self.store.load().await;

        let current = match fetch_entries(self.fetcher, self.source).await {
            Ok(current) => current,
            Err(err) => {
                tracing::error!(url = %self.source.url, error = %err, "no current data; skipping run");
                return Ok(RunOutcome::FetchFailed);
            }
        };

        if previous.is_empty() {
            if options.dry_run {
                tracing::info!(entries = current.len(), dry_run = true, "no previous data; would initialise snapshot");
                return Ok(RunOutcome::DryRun {
                    new_entries: Vec::new(),
                });
            }
            tracing::info!(entries = current.len(), "no previous data found; initialising snapshot");
            self.store.save(&current).await?;
            return Ok(RunOutcome::Baseline {
                entries: current.len(),
            });
        }

        let new_entries = compute_new(&previous, &current);
        tracing::info!(
            previous = previous.len(),
            current = current.len(),
            new_entries = new_entries.len(),
            "diffed leaderboard"
        );

        if options.dry_run {
            return Ok(RunOutcome::DryRun { new_entries });
        }

        if new_entries.is_empty() {
            return Ok(RunOutcome::NoNewEntries);
        }

        match self.notifier.notify(&new_entries).await {
            Ok(Delivery::Sent { status }) => {
                self.store.save(&current).await?;
                Ok(RunOutcome::Notified {
                    new_entries: new_entries.len(),
                    status,
                })
            }
            Ok(Delivery::Skipped(reason)) => {
                tracing::warn!(?reason, "notification not sent; snapshot left unchanged");
                Ok(RunOutcome::NotificationSkipped {
                    new_entries: new_entries.len(),
                    reason,
                })
            }
            Err(err) => {
                tracing::error!(
                    error = %err,
                    status = ?err.status,
                    "failed to send webhook; snapshot left unchanged"
                );
                Ok(RunOutcome::NotificationFailed {
                    new_entries: new_entries.len(),
                })
            }
        }
    }
}
