/// Coalescing of bursts of triggers into one delayed action
use std::cell::Cell;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

/// Delay between the last settings save and the regroup it triggers
pub const REGROUP_DEBOUNCE: Duration = Duration::from_millis(1000);

/// A single slot for a pending delayed action
///
/// Each `arm` replaces whatever was pending: earlier tickets still wait out
/// their delay but then find they are stale and do nothing. Only the most
/// recent ticket of a burst fires.
#[derive(Debug, Clone, Default)]
pub struct Debouncer {
    latest: Rc<Cell<u64>>,
}

/// One armed slot of a `Debouncer`
#[derive(Debug)]
pub struct PendingAction {
    generation: u64,
    latest: Rc<Cell<u64>>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the slot, replacing anything already pending
    pub fn arm(&self) -> PendingAction {
        let generation = self.latest.get() + 1;
        self.latest.set(generation);
        PendingAction {
            generation,
            latest: Rc::clone(&self.latest),
        }
    }
}

impl PendingAction {
    /// Still the most recent arm of its debouncer
    pub fn is_current(&self) -> bool {
        self.latest.get() == self.generation
    }

    /// Wait for `delay` to finish, then report whether this action should run
    pub async fn settle<D: Future<Output = ()>>(self, delay: D) -> bool {
        delay.await;
        self.is_current()
    }
}
