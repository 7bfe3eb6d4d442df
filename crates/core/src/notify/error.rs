use std::fmt;

/// Longest slice of a response body carried into the error message.
const BODY_PREVIEW_CHARS: usize = 512;

#[derive(Debug, Clone)]
pub struct NotifyError {
    pub stage: &'static str,
    pub detail: String,
    pub status: Option<u16>,
    pub body: Option<String>,
}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "webhook delivery failed (stage={}", self.stage)?;
        if let Some(status) = self.status {
            write!(f, ", status={status}")?;
        }
        write!(f, "): {}", self.detail)?;
        if let Some(body) = self.body.as_deref().map(str::trim).filter(|b| !b.is_empty()) {
            let preview: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
            let ellipsis = if preview.len() < body.len() { "..." } else { "" };
            write!(f, "; response body: {preview}{ellipsis}")?;
        }
        Ok(())
    }
}

impl std::error::Error for NotifyError {}
