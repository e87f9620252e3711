/// Integer-percent progress over a fixed number of items.
///
/// `advance` returns the new percentage only when it crosses a boundary the
/// tracker has not reported before; callers use that as their reporting and
/// cancellation-poll point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PercentProgress {
    total: usize,
    reported: u32,
}

impl PercentProgress {
    pub fn new(total: usize) -> Self {
        Self { total, reported: 0 }
    }

    /// Record that `done` items are finished (0-based index of the item just
    /// completed is `done`, so the first call normally passes 0).
    pub fn advance(&mut self, done: usize) -> Option<u32> {
        if self.total == 0 {
            return None;
        }
        let percent = (100 * done / self.total) as u32;
        if percent > self.reported {
            self.reported = percent;
            Some(percent)
        } else {
            None
        }
    }
}
