//! Research modal driven against a counting in-memory service.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use pretty_assertions::assert_eq;
use sky_client::{ClientError, ResearchSource};
use sky_core::{RecordId, ResearchResult, ResearchTier, SourceCitation};
use sky_research::{ModalError, ModalState, ResearchCache, ResearchModalController};

#[derive(Default)]
struct CountingService {
    quick_calls: AtomicUsize,
    full_calls: AtomicUsize,
    fail_quick: AtomicUsize,
}

impl CountingService {
    fn quick_calls(&self) -> usize {
        self.quick_calls.load(Ordering::SeqCst)
    }

    fn full_calls(&self) -> usize {
        self.full_calls.load(Ordering::SeqCst)
    }

    /// Fail the next `n` quick requests.
    fn fail_next_quick(&self, n: usize) {
        self.fail_quick.store(n, Ordering::SeqCst);
    }
}

impl ResearchSource for CountingService {
    async fn fetch_research(
        &self,
        tier: ResearchTier,
        record_id: &RecordId,
    ) -> Result<ResearchResult, ClientError> {
        match tier {
            ResearchTier::Quick => {
                self.quick_calls.fetch_add(1, Ordering::SeqCst);
                let failing = self.fail_quick.load(Ordering::SeqCst);
                if failing > 0 {
                    self.fail_quick.store(failing - 1, Ordering::SeqCst);
                    return Err(ClientError::Unavailable {
                        status: 503,
                        message: "overloaded".into(),
                    });
                }
                Ok(ResearchResult::Quick {
                    narrative: format!(
                        "Record {record_id} matches a Starlink pass. See https://www.nasa.gov/starlink."
                    ),
                })
            }
            ResearchTier::Full => {
                self.full_calls.fetch_add(1, Ordering::SeqCst);
                Ok(ResearchResult::Full {
                    narrative: format!(
                        "**Summary:**\nRecord {record_id}: clear skies per https://www.weather.gov/abq and http://bad[url.com"
                    ),
                    citations: vec![SourceCitation {
                        title: "FAA UAS".into(),
                        url: "https://www.faa.gov/uas".into(),
                    }],
                })
            }
        }
    }
}

fn controller() -> (Arc<CountingService>, ResearchModalController<CountingService>) {
    let service = Arc::new(CountingService::default());
    let controller =
        ResearchModalController::new(Arc::clone(&service), Arc::new(ResearchCache::new()));
    (service, controller)
}

#[tokio::test]
async fn reopening_record_42_hits_the_cache() {
    let (service, mut modal) = controller();

    let state = modal.open_and_wait(RecordId::from(42)).await;
    assert!(matches!(
        state,
        ModalState::Shown { tier: ResearchTier::Quick, .. }
    ));
    assert_eq!(service.quick_calls(), 1);

    modal.close();
    modal.open_and_wait(RecordId::from(42)).await;
    assert_eq!(service.quick_calls(), 1);
}

#[tokio::test]
async fn quick_report_is_formatted() {
    let (_service, mut modal) = controller();
    let ModalState::Shown { view, .. } = modal.open_and_wait(RecordId::from(42)).await else {
        panic!("expected a shown report");
    };
    assert_eq!(view.formatted.references.len(), 1);
    assert_eq!(view.formatted.references[0].title, "nasa.gov");
    assert!(view.formatted.html.contains("Record 42 matches"));
}

#[tokio::test]
async fn full_requires_a_shown_quick_report() {
    let (service, mut modal) = controller();
    assert!(matches!(modal.request_full(), Err(ModalError::FullWithoutQuick)));

    let _load = modal.open(RecordId::from(5));
    assert!(matches!(modal.request_full(), Err(ModalError::FullWithoutQuick)));
    assert_eq!(service.full_calls(), 0);
}

#[tokio::test]
async fn full_report_merges_upstream_citations() {
    let (service, mut modal) = controller();
    modal.open_and_wait(RecordId::from(7)).await;
    let state = modal.request_full_and_wait().await.unwrap();

    let ModalState::Shown { tier, view, .. } = state else {
        panic!("expected the full report, got {state:?}");
    };
    assert_eq!(*tier, ResearchTier::Full);
    let titles: Vec<&str> = view
        .formatted
        .references
        .iter()
        .map(|c| c.title.as_str())
        .collect();
    assert_eq!(titles, vec!["weather.gov", "FAA UAS"]);
    assert!(view.formatted.html.contains("<h4>Summary</h4>"));
    assert!(view.formatted.html.contains("http://bad[url.com"));
    assert_eq!(service.full_calls(), 1);

    // Full from a full report is not allowed.
    assert!(modal.request_full().is_err());
}

#[tokio::test]
async fn late_result_after_close_is_ignored_but_cached() {
    let (service, mut modal) = controller();

    let load = modal.open(RecordId::from(42));
    modal.close();
    let outcome = load.run().await;
    assert!(!modal.settle(outcome));
    assert!(modal.state().is_closed());
    assert!(modal.cache().contains(ResearchTier::Quick, &RecordId::from(42)));

    modal.open_and_wait(RecordId::from(42)).await;
    assert_eq!(service.quick_calls(), 1);
}

#[tokio::test]
async fn opening_another_record_supersedes_the_first() {
    let (_service, mut modal) = controller();

    let first = modal.open(RecordId::from(1));
    let second = modal.open(RecordId::from(2));

    let second_outcome = second.run().await;
    assert!(modal.settle(second_outcome));
    let first_outcome = first.run().await;
    assert!(!modal.settle(first_outcome));

    assert_eq!(modal.state().record_id(), Some(&RecordId::from(2)));
}

#[tokio::test]
async fn errors_show_in_modal_and_are_not_cached() {
    let (service, mut modal) = controller();
    service.fail_next_quick(1);

    let state = modal.open_and_wait(RecordId::from(9)).await;
    assert_eq!(
        state,
        &ModalState::Error {
            record_id: RecordId::from(9),
            tier: ResearchTier::Quick,
            message: "service unavailable".into(),
        }
    );
    assert!(modal.cache().is_empty());

    modal.close();
    let state = modal.open_and_wait(RecordId::from(9)).await;
    assert!(matches!(state, ModalState::Shown { .. }));
    assert_eq!(service.quick_calls(), 2);
}

#[tokio::test]
async fn spawned_load_populates_cache_after_close() {
    let (service, mut modal) = controller();
    let load = modal.open(RecordId::from(11));
    modal.close();

    let outcome = tokio::spawn(load.run()).await.unwrap();
    assert!(!modal.settle(outcome));
    assert_eq!(modal.cache().len(), 1);
    assert_eq!(service.quick_calls(), 1);
}
