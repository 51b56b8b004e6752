use tokio::sync::Mutex;

use crate::types::{Evidence, EvidenceSet, GhostType};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CaseFileSnapshot {
    pub collected: EvidenceSet,
    pub solved: bool,
}

/// Evidence pooled by every hunter. The collected mask only ever grows.
#[derive(Debug, Default)]
pub struct CaseFile {
    inner: Mutex<CaseFileSnapshot>,
}

impl CaseFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent. Returns whether the bit was new to the case file.
    pub async fn record(&self, evidence: Evidence) -> bool {
        self.inner.lock().await.collected.insert(evidence)
    }

    /// True once the collected mask covers every bit of at least one known signature.
    /// Sets `solved` as a side effect. This says nothing about the actual ghost: a
    /// mask with extra bits still counts, which is why the final verdict is computed
    /// separately with an exact comparison.
    pub async fn check_solved(&self) -> bool {
        let mut state = self.inner.lock().await;
        let covers_signature = GhostType::ALL
            .iter()
            .any(|ghost| state.collected.is_superset_of(ghost.signature()));
        if covers_signature {
            state.solved = true;
        }
        covers_signature
    }

    pub async fn snapshot(&self) -> CaseFileSnapshot {
        *self.inner.lock().await
    }
}
