use chrono::{DateTime, Utc};
use tally_core::inventory::RecordId;

/// Hands out record ids from creation timestamps (milliseconds).
///
/// Ids are strictly increasing even when several records are created within the
/// same millisecond or the wall clock steps backwards.
#[derive(Debug, Default)]
pub(crate) struct RecordIdGenerator {
    last: u64,
}

impl RecordIdGenerator {
    /// Continues after the highest id already in use.
    pub(crate) fn after<'a>(ids: impl IntoIterator<Item = &'a RecordId>) -> Self {
        Self {
            last: ids.into_iter().map(|id| id.0).max().unwrap_or(0),
        }
    }

    pub(crate) fn next(&mut self, now: DateTime<Utc>) -> RecordId {
        let candidate = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        self.last = candidate.max(self.last.saturating_add(1));
        RecordId(self.last)
    }
}
