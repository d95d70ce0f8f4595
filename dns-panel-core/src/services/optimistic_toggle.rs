//! 乐观开关
//!
//! 点击后立即显示目标值，请求失败时回滚到点击前记录的值。
//! 回滚值由本地字段保存，不从视图反推。

/// Local state of one optimistic boolean control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimisticToggle {
    committed: bool,
    displayed: bool,
    in_flight: bool,
}

impl OptimisticToggle {
    /// Start from the server's value.
    pub fn new(value: bool) -> Self {
        Self {
            committed: value,
            displayed: value,
            in_flight: false,
        }
    }

    /// Last value confirmed by the server.
    pub fn committed(&self) -> bool {
        self.committed
    }

    /// Value currently shown.
    pub fn displayed(&self) -> bool {
        self.displayed
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Show `desired` ahead of the request.
    ///
    /// Returns the value to roll back to, or `None` while a change is already in
    /// flight.
    pub fn begin(&mut self, desired: bool) -> Option<bool> {
        if self.in_flight {
            return None;
        }
        self.in_flight = true;
        self.displayed = desired;
        Some(self.committed)
    }

    /// The server accepted the change and reports `value`.
    pub fn commit(&mut self, value: bool) {
        self.committed = value;
        self.displayed = value;
        self.in_flight = false;
    }

    /// The request failed: show the pre-click value again and return it.
    pub fn rollback(&mut self) -> bool {
        self.displayed = self.committed;
        self.in_flight = false;
        self.committed
    }

    /// Adopt a freshly fetched server value unless a change is in flight.
    pub fn sync(&mut self, value: bool) {
        if !self.in_flight {
            self.committed = value;
            self.displayed = value;
        }
    }
}
