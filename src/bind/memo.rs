/// Per-occurrence resolution memo
///
/// One `@bind` argument occurrence may be resolved by both the validation
/// phase and the transform phase. The memo guarantees the underlying lookup
/// runs at most once: the first `resolve_with` computes and stores, every
/// later call returns the stored result. An explicit `Pending` state keeps
/// "not yet resolved" distinct from "resolved to null".

use crate::error::Result;

use async_graphql::Value;
use std::future::Future;
use tokio::sync::Mutex;

/// Outcome of resolving one argument occurrence.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Scalar binding; `None` when nothing matched.
    Scalar(Option<Value>),
    /// List binding, position-aligned with the raw input.
    List(Vec<Option<Value>>),
    /// Whatever a callable handler returned, taken as-is.
    Handler(Value),
}

#[derive(Debug)]
enum MemoState {
    Pending,
    Resolved(Resolution),
}

#[derive(Debug)]
pub struct BindingMemo {
    slot: Mutex<MemoState>,
}

impl BindingMemo {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(MemoState::Pending),
        }
    }

    pub async fn is_resolved(&self) -> bool {
        matches!(&*self.slot.lock().await, MemoState::Resolved(_))
    }

    /// Return the stored resolution, computing it first if still pending.
    ///
    /// The slot stays locked across the computation, so concurrent callers
    /// cannot race a second lookup. Failures are not stored; the request
    /// aborts before anything could retry.
    pub async fn resolve_with<F, Fut>(&self, compute: F) -> Result<Resolution>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Resolution>>,
    {
        let mut slot = self.slot.lock().await;
        if let MemoState::Resolved(resolution) = &*slot {
            return Ok(resolution.clone());
        }
        let resolution = compute().await?;
        *slot = MemoState::Resolved(resolution.clone());
        Ok(resolution)
    }
}

impl Default for BindingMemo {
    fn default() -> Self {
        Self::new()
    }
}
