//! Headless Chromium table fetcher built on chromiumoxide.

use super::error::FetchError;
use super::{SourcePage, TableFetcher};
use anyhow::Result;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/117.0.0.0 Safari/537.36";

const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Launches a disposable browser for every fetch and tears it down afterwards.
#[derive(Debug, Clone)]
pub struct ChromiumTableFetcher {
    executable: Option<PathBuf>,
    timeout: Duration,
}

impl ChromiumTableFetcher {
    pub fn new(executable: Option<PathBuf>, timeout: Duration) -> Self {
        Self {
            executable,
            timeout,
        }
    }

    pub fn from_settings(settings: &crate::config::Settings) -> Self {
        Self::new(settings.chromium_path.clone(), settings.browser_timeout)
    }

    fn browser_config(&self) -> std::result::Result<BrowserConfig, String> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg(format!("--user-agent={DESKTOP_USER_AGENT}"))
            .window_size(1920, 1080)
            .request_timeout(self.timeout);
        if let Some(path) = &self.executable {
            builder = builder.chrome_executable(path);
        }
        builder.build()
    }

    async fn read_table(&self, browser: &Browser, source: &SourcePage) -> Result<String> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| FetchError::new("new_page", source, e))?;

        let deadline = Instant::now() + self.timeout;

        match tokio::time::timeout(self.timeout, page.goto(source.url.as_str())).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(FetchError::new("navigate", source, e).into()),
            Err(_) => {
                return Err(FetchError::new(
                    "navigate",
                    source,
                    format!("timed out after {:?}", self.timeout),
                )
                .into())
            }
        }

        // goto resolves on the load event; give late network activity a chance to settle.
        let remaining = deadline.saturating_duration_since(Instant::now());
        let settle = Settle::from_wait(tokio::time::timeout(remaining, page.wait_for_navigation()).await);
        tracing::debug!(url = %source.url, ?settle, "page settle wait finished");

        wait_for_inner_html(&page, source, deadline).await
    }
}

/// How the post-load navigation wait ended. None of these are fatal; the selector poll decides.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Settle {
    Settled,
    Failed(String),
    TimedOut,
}

impl Settle {
    fn from_wait<T, E: std::fmt::Display>(
        res: std::result::Result<std::result::Result<T, E>, tokio::time::error::Elapsed>,
    ) -> Self {
        match res {
            Ok(Ok(_)) => Settle::Settled,
            Ok(Err(e)) => Settle::Failed(e.to_string()),
            Err(_) => Settle::TimedOut,
        }
    }
}

async fn wait_for_inner_html(page: &Page, source: &SourcePage, deadline: Instant) -> Result<String> {
    loop {
        if let Ok(element) = page.find_element(source.selector.as_str()).await {
            let html = element
                .inner_html()
                .await
                .map_err(|e| FetchError::new("inner_html", source, e))?;
            return Ok(html.unwrap_or_default());
        }

        if Instant::now() >= deadline {
            return Err(FetchError::new("wait_for_selector", source, "selector never appeared").into());
        }
        tokio::time::sleep(SELECTOR_POLL_INTERVAL).await;
    }
}

#[async_trait::async_trait]
impl TableFetcher for ChromiumTableFetcher {
    async fn fetch_table_html(&self, source: &SourcePage) -> Result<String> {
        let config = self
            .browser_config()
            .map_err(|e| FetchError::new("browser_config", source, e))?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| FetchError::new("launch", source, e))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let started = Instant::now();
        let result = self.read_table(&browser, source).await;

        if let Err(err) = browser.close().await {
            tracing::warn!(error = %err, "failed to close browser cleanly");
        }
        if let Err(err) = browser.wait().await {
            tracing::warn!(error = %err, "failed to reap browser process");
        }
        handler_task.abort();

        match &result {
            Ok(html) => tracing::info!(
                url = %source.url,
                bytes = html.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "fetched leaderboard table"
            ),
            Err(err) => tracing::error!(url = %source.url, error = %err, "leaderboard fetch failed"),
        }

        result
    }
}
