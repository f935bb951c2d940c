//! Idempotent consumption of at-least-once deliveries.

use std::future::Future;

use tracing::debug;

use crate::error::Result;
use crate::traits::store::ProcessedEventStore;

/// What happened to a delivered message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consumption {
    /// First delivery for this (event id, consumer group); the side effect ran
    Performed,
    /// Redelivery; the side effect was skipped and the message should still
    /// be acknowledged
    Skipped,
}

/// Run `side_effect` at most once per (event_id, consumer_group).
///
/// The ledger insert is attempted first; a unique-constraint hit means some
/// delivery of this message already got through for this group, so the side
/// effect is skipped. The same event id under a different consumer group is
/// independent.
pub async fn consume_once<S, F, Fut>(
    store: &S,
    event_id: &str,
    consumer_group: &str,
    side_effect: F,
) -> Result<Consumption>
where
    S: ProcessedEventStore + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<()>>,
{
    if !store.mark_processed(event_id, consumer_group).await? {
        debug!(event_id, consumer_group, "redelivery, skipping side effect");
        return Ok(Consumption::Skipped);
    }

    side_effect().await?;
    Ok(Consumption::Performed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::memory::MemoryIntakeStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_side_effect_runs_once_per_group() {
        let store = MemoryIntakeStore::new();
        let runs = AtomicUsize::new(0);

        let effect = || async {
            runs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        };

        assert_eq!(
            consume_once(&store, "evt-1", "search-index", effect).await.unwrap(),
            Consumption::Performed
        );

        let effect = || async {
            runs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        };
        assert_eq!(
            consume_once(&store, "evt-1", "search-index", effect).await.unwrap(),
            Consumption::Skipped
        );

        // Different group is independent.
        let effect = || async {
            runs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        };
        assert_eq!(
            consume_once(&store, "evt-1", "notifications", effect).await.unwrap(),
            Consumption::Performed
        );

        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }
}
