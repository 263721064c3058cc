//! Session-lifetime research cache with single-flight loading.
//!
//! One [`OnceCell`] per `(tier, record)` key. Concurrent callers for the
//! same uncached key share a single in-flight fetch; the first success is
//! stored and never replaced. A failed fetch leaves the cell empty so a
//! later call tries the network again. Entries are never evicted.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use sky_client::{ClientError, ResearchSource};
use sky_core::{RecordId, ResearchResult, ResearchTier};
use tokio::sync::OnceCell;

use crate::error::ResearchError;

pub type CacheKey = (ResearchTier, RecordId);

#[derive(Default)]
pub struct ResearchCache {
    cells: Mutex<HashMap<CacheKey, Arc<OnceCell<ResearchResult>>>>,
}

impl ResearchCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached result for the key, or run `fetch` once to fill it.
    ///
    /// `fetch` is not called when a result is already cached, and callers
    /// arriving while a fetch is in flight wait for it instead of starting
    /// their own.
    ///
    /// # Errors
    ///
    /// Returns [`ResearchError`] when `fetch` fails or answers with the
    /// wrong tier. Nothing is cached in that case.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        tier: ResearchTier,
        record_id: &RecordId,
        fetch: F,
    ) -> Result<ResearchResult, ResearchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ResearchResult, ClientError>>,
    {
        let cell = self.cell(tier, record_id);
        if cell.initialized() {
            tracing::debug!(%tier, id = %record_id, "research cache hit");
        }

        let result = cell
            .get_or_try_init(|| async {
                tracing::debug!(%tier, id = %record_id, "research cache miss");
                let result = fetch().await?;
                if result.tier() != tier {
                    return Err(ResearchError::TierMismatch {
                        expected: tier,
                        actual: result.tier(),
                    });
                }
                Ok::<_, ResearchError>(result)
            })
            .await?;
        Ok(result.clone())
    }

    /// [`get_or_fetch`](Self::get_or_fetch) against a [`ResearchSource`].
    ///
    /// # Errors
    ///
    /// See [`Self::get_or_fetch`].
    pub async fn load<S: ResearchSource>(
        &self,
        source: &S,
        tier: ResearchTier,
        record_id: &RecordId,
    ) -> Result<ResearchResult, ResearchError> {
        self.get_or_fetch(tier, record_id, || source.fetch_research(tier, record_id))
            .await
    }

    /// Cached result, without fetching.
    #[must_use]
    pub fn get(&self, tier: ResearchTier, record_id: &RecordId) -> Option<ResearchResult> {
        let cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        cells
            .get(&(tier, record_id.clone()))
            .and_then(|cell| cell.get().cloned())
    }

    #[must_use]
    pub fn contains(&self, tier: ResearchTier, record_id: &RecordId) -> bool {
        self.get(tier, record_id).is_some()
    }

    /// Number of stored results.
    #[must_use]
    pub fn len(&self) -> usize {
        let cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        cells.values().filter(|cell| cell.initialized()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cell(&self, tier: ResearchTier, record_id: &RecordId) -> Arc<OnceCell<ResearchResult>> {
        let mut cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(cells.entry((tier, record_id.clone())).or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn quick(text: &str) -> ResearchResult {
        ResearchResult::Quick {
            narrative: text.into(),
        }
    }

    #[tokio::test]
    async fn second_call_is_served_from_cache() {
        let cache = ResearchCache::new();
        let calls = AtomicUsize::new(0);
        let id = RecordId::from(42);

        for _ in 0..2 {
            let result = cache
                .get_or_fetch(ResearchTier::Quick, &id, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(quick("seen over the mesa"))
                })
                .await
                .unwrap();
            assert_eq!(result.narrative(), "seen over the mesa");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cache = ResearchCache::new();
        let calls = AtomicUsize::new(0);
        let id = RecordId::from(7);

        let err = cache
            .get_or_fetch(ResearchTier::Quick, &id, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ClientError::Unauthorized)
            })
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "authentication required");
        assert!(cache.is_empty());

        cache
            .get_or_fetch(ResearchTier::Quick, &id, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(quick("retry worked"))
            })
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(cache.contains(ResearchTier::Quick, &id));
    }

    #[tokio::test]
    async fn tiers_are_cached_separately() {
        let cache = ResearchCache::new();
        let id = RecordId::from(1);
        cache
            .get_or_fetch(ResearchTier::Quick, &id, || async { Ok(quick("q")) })
            .await
            .unwrap();
        assert!(cache.get(ResearchTier::Full, &id).is_none());
        assert!(cache.get(ResearchTier::Quick, &id).is_some());
    }

    #[tokio::test]
    async fn wrong_tier_is_rejected_and_not_cached() {
        let cache = ResearchCache::new();
        let id = RecordId::from(3);
        let err = cache
            .get_or_fetch(ResearchTier::Full, &id, || async { Ok(quick("q")) })
            .await
            .unwrap_err();
        assert!(matches!(err, ResearchError::TierMismatch { .. }));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_fetch() {
        let cache = Arc::new(ResearchCache::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

        let first = {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            tokio::spawn(async move {
                cache
                    .get_or_fetch(ResearchTier::Quick, &RecordId::from(9), || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        let _ = release_rx.await;
                        Ok(quick("shared"))
                    })
                    .await
            })
        };
        while calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        let second = {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            tokio::spawn(async move {
                cache
                    .get_or_fetch(ResearchTier::Quick, &RecordId::from(9), || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok(quick("duplicate"))
                    })
                    .await
            })
        };
        tokio::task::yield_now().await;
        let _ = release_tx.send(());

        let a = first.await.unwrap().unwrap();
        let b = second.await.unwrap().unwrap();
        assert_eq!(a.narrative(), "shared");
        assert_eq!(b.narrative(), "shared");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
