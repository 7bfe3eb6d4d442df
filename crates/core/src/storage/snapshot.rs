use crate::domain::entry::Entry;
use anyhow::Context;
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};

/// The last known leaderboard, persisted as a pretty-printed JSON array.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the previous snapshot. Anything short of a readable JSON array of entries counts
    /// as having no history.
    pub async fn load(&self) -> Vec<Entry> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(err) => {
                tracing::debug!(path = %self.path.display(), error = %err, "no readable snapshot");
                return Vec::new();
            }
        };

        match decode(&text) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "snapshot is not a list of entries; treating as empty"
                );
                Vec::new()
            }
        }
    }

    /// Replaces the snapshot with `entries`.
    ///
    /// The new content is written to a temporary file next to the snapshot and renamed over
    /// it, so an interrupted write never leaves a truncated snapshot behind.
    pub async fn save(&self, entries: &[Entry]) -> anyhow::Result<()> {
        let dir = match self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            Some(dir) => dir.to_path_buf(),
            None => PathBuf::from("."),
        };
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("failed to create snapshot directory {}", dir.display()))?;

        let mut body =
            serde_json::to_string_pretty(entries).context("failed to serialize snapshot")?;
        body.push('\n');

        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomically(&dir, &path, body.as_bytes()))
            .await
            .context("snapshot writer task failed")?
            .with_context(|| format!("failed to write snapshot {}", self.path.display()))?;

        tracing::info!(path = %self.path.display(), entries = entries.len(), "snapshot updated");
        Ok(())
    }
}

fn write_atomically(dir: &Path, path: &Path, body: &[u8]) -> anyhow::Result<()> {
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temporary file in {}", dir.display()))?;
    tmp.write_all(body).context("failed to write temporary snapshot")?;
    tmp.as_file()
        .sync_all()
        .context("failed to flush temporary snapshot")?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .context("failed to move temporary snapshot into place")?;
    Ok(())
}

fn decode(text: &str) -> anyhow::Result<Vec<Entry>> {
    let value = serde_json::from_str::<Value>(text).context("snapshot is not valid JSON")?;
    anyhow::ensure!(value.is_array(), "snapshot JSON is not an array");
    serde_json::from_value(value).context("snapshot array does not hold entries")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entry::Link;

    fn sample() -> Vec<Entry> {
        vec![
            Entry {
                character: Link::new("Kaelis", Some("/character/eu/sanguino/kaelis".to_string())),
                guild: Link::new("Vanguard", None),
                realm: Link::new("Sanguino", Some("/gearscore/eu/sanguino".to_string())),
                date: Some("Oct 16, 2026 10:00".to_string()),
            },
            Entry {
                character: Link::new("Nobody", None),
                guild: Link::default(),
                realm: Link::default(),
                date: None,
            },
        ]
    }

    #[tokio::test]
    async fn save_then_load_round_trips_including_nulls() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotFile::new(dir.path().join("output.json"));

        store.save(&sample()).await.unwrap();
        assert_eq!(store.load().await, sample());
    }

    #[tokio::test]
    async fn save_writes_pretty_json_and_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output").join("output.json");
        let store = SnapshotFile::new(&path);

        store.save(&sample()[1..]).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("[\n  {\n    \"character\": {"));
        assert!(text.contains("\"url\": null"));
        assert!(text.ends_with("]\n"));
    }

    #[tokio::test]
    async fn save_replaces_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotFile::new(dir.path().join("output.json"));

        store.save(&sample()).await.unwrap();
        store.save(&sample()[..1]).await.unwrap();
        assert_eq!(store.load().await.len(), 1);
    }

    #[tokio::test]
    async fn save_leaves_only_the_snapshot_in_its_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotFile::new(dir.path().join("output.json"));

        store.save(&sample()).await.unwrap();
        store.save(&sample()[..1]).await.unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["output.json".to_string()]);
        assert_eq!(store.load().await, sample()[..1].to_vec());
    }

    #[tokio::test]
    async fn failed_save_cleans_up_and_leaves_other_snapshots_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.json");
        let store = SnapshotFile::new(&path);
        store.save(&sample()).await.unwrap();

        // The rename cannot replace a non-empty directory, so the save fails before the
        // snapshot at `path` is touched.
        let blocked = SnapshotFile::new(dir.path().join("blocked"));
        std::fs::create_dir(dir.path().join("blocked")).unwrap();
        std::fs::write(dir.path().join("blocked").join("keep"), "x").unwrap();
        assert!(blocked.save(&sample()).await.is_err());

        assert_eq!(store.load().await, sample());
        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 2);
    }

    #[tokio::test]
    async fn load_tolerates_missing_and_corrupt_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.json");
        let store = SnapshotFile::new(&path);

        assert!(store.load().await.is_empty());

        std::fs::write(&path, "{ not json").unwrap();
        assert!(store.load().await.is_empty());

        std::fs::write(&path, "{\"character\": {}}").unwrap();
        assert!(store.load().await.is_empty());

        std::fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn save_fails_when_target_is_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotFile::new(dir.path());
        assert!(store.save(&sample()).await.is_err());
    }
}
