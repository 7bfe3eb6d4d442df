pub mod discord;
pub mod error;

use crate::domain::entry::Entry;
use error::NotifyError;

/// What happened to a notification that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// The endpoint accepted the message.
    Sent { status: u16 },
    /// Nothing went over the network.
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NothingToSend,
    MissingCredentials,
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, entries: &[Entry]) -> Result<Delivery, NotifyError>;
}
