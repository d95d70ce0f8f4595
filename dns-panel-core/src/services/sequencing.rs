//! 请求排序与操作互斥
//!
//! - `RequestSequence`: 每个会话内单调递增的列表请求序号，只有最新请求的结果会被应用
//! - `Debouncer`: 搜索防抖，新的输入使旧的等待失效
//! - `BusyControls`: 每个操作控件同一时间最多一个进行中的请求

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::traits::BusyIndicator;
use crate::types::ActionControl;

/// Lock a std mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Identifies one list request: the session it belongs to and its sequence
/// number within that session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub generation: u64,
    pub seq: u64,
}

/// Per-session list request counter.
#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: u64,
}

impl RequestSequence {
    /// Issue the next ticket; every older ticket becomes stale.
    pub fn issue(&mut self, generation: u64) -> Ticket {
        self.latest += 1;
        Ticket {
            generation,
            seq: self.latest,
        }
    }

    pub fn is_latest(&self, ticket: Ticket) -> bool {
        ticket.seq == self.latest
    }
}

/// Keystroke debouncer.
#[derive(Debug, Default)]
pub struct Debouncer {
    latest: AtomicU64,
}

impl Debouncer {
    /// Invalidate every pending wait.
    pub fn bump(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Wait out `delay`; `true` if no newer keystroke arrived meanwhile.
    pub async fn settle(&self, delay: Duration) -> bool {
        let token = self.bump();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.latest.load(Ordering::SeqCst) == token
    }
}

/// Set of controls with a request in flight.
#[derive(Debug, Default)]
pub struct BusyControls {
    active: Mutex<HashSet<ActionControl>>,
}

impl BusyControls {
    /// Mark `control` busy and tell the view, or `None` if it already is.
    pub fn try_acquire<'a, V>(
        &'a self,
        control: ActionControl,
        indicator: &'a V,
    ) -> Option<BusyGuard<'a, V>>
    where
        V: BusyIndicator + ?Sized,
    {
        if !lock(&self.active).insert(control.clone()) {
            log::debug!("Control {control} is busy, ignoring re-trigger");
            return None;
        }
        indicator.set_busy(&control, true);
        Some(BusyGuard {
            controls: self,
            control,
            indicator,
        })
    }

    pub fn is_busy(&self, control: &ActionControl) -> bool {
        lock(&self.active).contains(control)
    }
}

/// Releases its control (and restores it in the view) when dropped.
pub struct BusyGuard<'a, V: BusyIndicator + ?Sized> {
    controls: &'a BusyControls,
    control: ActionControl,
    indicator: &'a V,
}

impl<V: BusyIndicator + ?Sized> Drop for BusyGuard<'_, V> {
    fn drop(&mut self) {
        lock(&self.controls.active).remove(&self.control);
        self.indicator.set_busy(&self.control, false);
    }
}
