use crate::domain::entry::Entry;

/// Returns the entries of `current` that appear before the first row already known in
/// `previous`.
///
/// The leaderboard is sorted newest-first, so everything above the most recent known listing
/// is new since the last run. The scan stops at the first recognised row; rows after it are
/// never examined, even if they would not match. This is deliberately not a set difference.
pub fn compute_new(previous: &[Entry], current: &[Entry]) -> Vec<Entry> {
    current
        .iter()
        .take_while(|entry| !previous.iter().any(|prev| prev.same_listing(entry)))
        .cloned()
        .collect()
}
