//! In-flight async transport bookkeeping and bounded drain

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Default bound for [`PendingSet::wait_until_empty`] callers that pass none
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_millis(500);

/// Set of async transport invocations that have started but not settled
///
/// Ids are assigned monotonically and never reused. The set lives in a
/// `watch` channel so any number of drainers can wait on it concurrently.
#[derive(Debug)]
pub struct PendingSet {
    next_id: AtomicU64,
    inflight: watch::Sender<BTreeSet<u64>>,
}

impl PendingSet {
    pub fn new() -> Self {
        let (inflight, _) = watch::channel(BTreeSet::new());
        Self {
            next_id: AtomicU64::new(0),
            inflight,
        }
    }

    /// Track a new invocation; it is released when the guard drops
    pub(crate) fn register(self: &Arc<Self>) -> PendingGuard {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.inflight.send_modify(|set| {
            set.insert(id);
        });
        PendingGuard {
            set: Arc::clone(self),
            id,
        }
    }

    fn settle(&self, id: u64) {
        self.inflight.send_modify(|set| {
            set.remove(&id);
        });
    }

    pub fn len(&self) -> usize {
        self.inflight.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inflight.borrow().is_empty()
    }

    /// Forget every tracked invocation without waiting for it
    pub fn clear(&self) {
        self.inflight.send_modify(BTreeSet::clear);
    }

    /// Wait until nothing is in flight
    ///
    /// Returns `true` if the set emptied before `timeout` elapsed. Nothing
    /// is cancelled on timeout; outstanding work keeps running and leaves
    /// the set whenever it settles.
    pub async fn wait_until_empty(&self, timeout: Duration) -> bool {
        let mut rx = self.inflight.subscribe();
        let drained = match tokio::time::timeout(timeout, rx.wait_for(BTreeSet::is_empty)).await {
            Ok(waited) => waited.is_ok(),
            Err(_) => false,
        };
        drained
    }
}

impl Default for PendingSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Membership of one invocation in the pending set
#[derive(Debug)]
pub(crate) struct PendingGuard {
    set: Arc<PendingSet>,
    id: u64,
}

impl PendingGuard {
    #[cfg(test)]
    pub(crate) fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.set.settle(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_settle() {
        let set = Arc::new(PendingSet::new());
        let a = set.register();
        let b = set.register();

        assert!(a.id() < b.id());
        assert_eq!(set.len(), 2);

        drop(a);
        assert_eq!(set.len(), 1);
        drop(b);
        assert!(set.is_empty());
    }

    #[test]
    fn test_clear_then_late_settle() {
        let set = Arc::new(PendingSet::new());
        let guard = set.register();
        set.clear();
        assert!(set.is_empty());

        drop(guard);
        assert!(set.is_empty());
    }

    #[test]
    fn test_empty_set_drains_immediately() {
        let set = PendingSet::new();
        assert!(tokio_test::block_on(
            set.wait_until_empty(Duration::from_millis(10))
        ));
    }

    #[tokio::test]
    async fn test_wait_times_out_while_pending() {
        let set = Arc::new(PendingSet::new());
        let _guard = set.register();

        assert!(!set.wait_until_empty(Duration::from_millis(20)).await);
        assert_eq!(set.len(), 1);
    }

    #[tokio::test]
    async fn test_wait_completes_when_released() {
        let set = Arc::new(PendingSet::new());
        let guard = set.register();

        let releaser = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            drop(guard);
        });

        assert!(set.wait_until_empty(Duration::from_millis(500)).await);
        releaser.await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_drainers() {
        let set = Arc::new(PendingSet::new());
        let guard = set.register();

        let a = tokio::spawn({
            let set = Arc::clone(&set);
            async move { set.wait_until_empty(Duration::from_millis(500)).await }
        });
        let b = tokio::spawn({
            let set = Arc::clone(&set);
            async move { set.wait_until_empty(Duration::from_millis(500)).await }
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        drop(guard);

        assert!(a.await.unwrap());
        assert!(b.await.unwrap());
    }
}
