use std::fmt;

#[derive(Debug, Clone)]
pub struct FetchError {
    pub stage: &'static str,
    pub url: String,
    pub selector: String,
    pub detail: String,
}

impl FetchError {
    pub fn new(
        stage: &'static str,
        source: &super::SourcePage,
        detail: impl fmt::Display,
    ) -> Self {
        Self {
            stage,
            url: source.url.clone(),
            selector: source.selector.clone(),
            detail: detail.to_string(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "table fetch failed (stage={}, url={}, selector={}): {}",
            self.stage, self.url, self.selector, self.detail
        )
    }
}

impl std::error::Error for FetchError {}
