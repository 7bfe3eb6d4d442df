pub mod diff;
pub mod domain;
pub mod notify;
pub mod scrape;
pub mod storage;

pub mod config {
    use anyhow::Context;
    use std::path::PathBuf;
    use std::time::Duration;

    pub const DEFAULT_SOURCE_URL: &str = "https://www.wowprogress.com/gearscore/es?lfg=1&sortby=ts";
    pub const DEFAULT_TABLE_SELECTOR: &str = "table.rating";
    pub const DEFAULT_SNAPSHOT_PATH: &str = "output/output.json";
    pub const DEFAULT_WEBHOOK_BASE_URL: &str = "https://discord.com";
    pub const DEFAULT_WEBHOOK_USERNAME: &str = "Ojeador del Real Madrid";
    pub const DEFAULT_WEBHOOK_CONTENT: &str = "Nueva persona buscando por guild!";
    pub const DEFAULT_WEBHOOK_REGION: &str = "eu";
    const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 30;
    const DEFAULT_BROWSER_TIMEOUT_SECS: u64 = 60;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub source_url: String,
        pub table_selector: String,
        pub snapshot_path: PathBuf,
        pub webhook_id: Option<String>,
        pub webhook_token: Option<String>,
        pub webhook_base_url: String,
        pub webhook_username: String,
        pub webhook_content: String,
        pub webhook_region: String,
        pub webhook_timeout: Duration,
        pub browser_timeout: Duration,
        pub chromium_path: Option<PathBuf>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                source_url: env_or("SOURCE_URL", DEFAULT_SOURCE_URL),
                table_selector: env_or("TABLE_SELECTOR", DEFAULT_TABLE_SELECTOR),
                snapshot_path: PathBuf::from(env_or("SNAPSHOT_PATH", DEFAULT_SNAPSHOT_PATH)),
                webhook_id: non_empty_env("WEBHOOK_ID"),
                webhook_token: non_empty_env("WEBHOOK_TOKEN"),
                webhook_base_url: env_or("WEBHOOK_BASE_URL", DEFAULT_WEBHOOK_BASE_URL),
                webhook_username: env_or("WEBHOOK_USERNAME", DEFAULT_WEBHOOK_USERNAME),
                webhook_content: env_or("WEBHOOK_CONTENT", DEFAULT_WEBHOOK_CONTENT),
                webhook_region: env_or("WEBHOOK_REGION", DEFAULT_WEBHOOK_REGION),
                webhook_timeout: secs_env("WEBHOOK_TIMEOUT_SECS", DEFAULT_WEBHOOK_TIMEOUT_SECS)?,
                browser_timeout: secs_env("BROWSER_TIMEOUT_SECS", DEFAULT_BROWSER_TIMEOUT_SECS)?,
                chromium_path: non_empty_env("CHROMIUM_PATH").map(PathBuf::from),
                sentry_dsn: non_empty_env("SENTRY_DSN"),
            })
        }

        pub fn source(&self) -> crate::scrape::SourcePage {
            crate::scrape::SourcePage {
                url: self.source_url.clone(),
                selector: self.table_selector.clone(),
            }
        }
    }

    fn non_empty_env(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|s| !s.trim().is_empty())
    }

    fn env_or(key: &str, default: &str) -> String {
        non_empty_env(key).unwrap_or_else(|| default.to_string())
    }

    fn secs_env(key: &str, default: u64) -> anyhow::Result<Duration> {
        let secs = match non_empty_env(key) {
            Some(s) => s
                .trim()
                .parse::<u64>()
                .with_context(|| format!("{key} must be a whole number of seconds (got {s:?})"))?,
            None => default,
        };
        Ok(Duration::from_secs(secs))
    }
}
