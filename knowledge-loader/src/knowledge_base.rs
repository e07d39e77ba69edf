//! Shared, write-once corpus handle with a readiness barrier.
//!
//! The handle starts in [`KnowledgeStatus::Loading`]. The loader publishes
//! exactly once, moving it to `Ready` or `Degraded`; later publishes are
//! ignored. Readers either take a snapshot or wait on [`KnowledgeBase::wait_ready`].

use std::{path::PathBuf, sync::Arc};

use serde::Serialize;
use tokio::sync::watch;
use tracing::warn;

/// Origin of the published corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CorpusSource {
    Local { path: PathBuf },
    Remote { url: String },
    Inline,
}

/// Lifecycle of the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum KnowledgeStatus {
    /// Load not finished yet.
    Loading,
    /// Corpus published and non-empty.
    Ready { source: CorpusSource, chars: usize },
    /// Load finished without a usable corpus. Requests ground against empty text.
    Degraded { reason: String },
}

impl KnowledgeStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, KnowledgeStatus::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, KnowledgeStatus::Ready { .. })
    }
}

/// Status plus corpus text, as observed at one instant.
#[derive(Debug, Clone)]
pub struct KnowledgeSnapshot {
    pub status: KnowledgeStatus,
    pub corpus: Arc<str>,
}

/// Cloneable handle to the process-wide corpus.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    tx: Arc<watch::Sender<KnowledgeSnapshot>>,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::new()
    }
}

impl KnowledgeBase {
    /// Empty handle in `Loading` state.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(KnowledgeSnapshot {
            status: KnowledgeStatus::Loading,
            corpus: Arc::from(""),
        });
        Self { tx: Arc::new(tx) }
    }

    /// Handle that is already `Ready` with `text` (or `Degraded` if it is empty).
    pub fn preloaded(text: impl Into<String>) -> Self {
        let kb = Self::new();
        kb.publish_text(text.into(), CorpusSource::Inline);
        kb
    }

    /// Current status.
    pub fn status(&self) -> KnowledgeStatus {
        self.tx.borrow().status.clone()
    }

    /// Current snapshot without waiting.
    pub fn snapshot(&self) -> KnowledgeSnapshot {
        self.tx.borrow().clone()
    }

    /// Waits until the load has finished, then returns the snapshot.
    pub async fn wait_ready(&self) -> KnowledgeSnapshot {
        let mut rx = self.tx.subscribe();
        match rx.wait_for(|s| !s.status.is_loading()).await {
            Ok(snap) => snap.clone(),
            // The sender lives in `self`, so the channel cannot close while we wait.
            Err(_) => self.snapshot(),
        }
    }

    /// Publishes loaded text. Empty text publishes as `Degraded`.
    ///
    /// Returns `false` if the corpus was already published.
    pub fn publish_text(&self, text: String, source: CorpusSource) -> bool {
        let chars = text.chars().count();
        let status = if chars == 0 {
            KnowledgeStatus::Degraded {
                reason: "knowledge corpus is empty".to_string(),
            }
        } else {
            KnowledgeStatus::Ready { source, chars }
        };
        self.publish(KnowledgeSnapshot {
            status,
            corpus: Arc::from(text),
        })
    }

    /// Publishes a failed load: empty corpus, `Degraded` with `reason`.
    pub fn publish_failure(&self, reason: impl Into<String>) -> bool {
        self.publish(KnowledgeSnapshot {
            status: KnowledgeStatus::Degraded {
                reason: reason.into(),
            },
            corpus: Arc::from(""),
        })
    }

    fn publish(&self, next: KnowledgeSnapshot) -> bool {
        let published = self.tx.send_if_modified(|cur| {
            if cur.status.is_loading() {
                *cur = next;
                true
            } else {
                false
            }
        });
        if !published {
            warn!("knowledge corpus already published; ignoring second publish");
        }
        published
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn preloaded_is_ready() {
        let kb = KnowledgeBase::preloaded("Giờ làm việc: 8h-17h.");
        let snap = kb.snapshot();
        assert_eq!(&*snap.corpus, "Giờ làm việc: 8h-17h.");
        assert_eq!(
            snap.status,
            KnowledgeStatus::Ready {
                source: CorpusSource::Inline,
                chars: 21
            }
        );
    }

    #[test]
    fn empty_text_is_degraded() {
        let kb = KnowledgeBase::preloaded("");
        assert!(matches!(kb.status(), KnowledgeStatus::Degraded { .. }));
    }

    #[test]
    fn publishes_only_once() {
        let kb = KnowledgeBase::new();
        assert!(kb.publish_text("first".into(), CorpusSource::Inline));
        assert!(!kb.publish_text("second".into(), CorpusSource::Inline));
        assert!(!kb.publish_failure("late failure"));
        assert_eq!(&*kb.snapshot().corpus, "first");
    }

    #[tokio::test]
    async fn wait_ready_blocks_until_publish() {
        let kb = KnowledgeBase::new();
        let waiter = {
            let kb = kb.clone();
            tokio::spawn(async move { kb.wait_ready().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        kb.publish_text("corpus".into(), CorpusSource::Inline);
        let snap = waiter.await.unwrap();
        assert!(snap.status.is_ready());
        assert_eq!(&*snap.corpus, "corpus");
    }

    #[test]
    fn status_serializes_for_readiness_endpoint() {
        let st = KnowledgeStatus::Ready {
            source: CorpusSource::Remote {
                url: "https://kb.example/k.txt".into(),
            },
            chars: 3,
        };
        let v = serde_json::to_value(&st).unwrap();
        assert_eq!(v["status"], "ready");
        assert_eq!(v["source"]["kind"], "remote");
        assert_eq!(v["chars"], 3);

        let v = serde_json::to_value(KnowledgeStatus::Loading).unwrap();
        assert_eq!(v, serde_json::json!({ "status": "loading" }));
    }
}
