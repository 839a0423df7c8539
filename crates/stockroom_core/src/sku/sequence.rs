//! Next-to-issue counter guarded by the allocator.

/// Process-lifetime counter. Holds the next value to issue, never one
/// already issued.
#[derive(Debug)]
pub(crate) struct SequenceState {
    counter: u64,
}

impl SequenceState {
    pub(crate) fn new() -> Self {
        Self { counter: 1 }
    }

    /// Overwrites the counter. Bootstrap-only.
    pub(crate) fn set_counter(&mut self, counter: u64) {
        self.counter = counter;
    }

    pub(crate) fn counter(&self) -> u64 {
        self.counter
    }

    /// Hands out the current value and advances past it.
    ///
    /// Returns `None` without advancing when the current value is above
    /// `ceiling`, or when advancing would overflow `u64`.
    pub(crate) fn reserve(&mut self, ceiling: Option<u64>) -> Option<u64> {
        let current = self.counter;
        if ceiling.is_some_and(|max| current > max) {
            return None;
        }
        self.counter = current.checked_add(1)?;
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::SequenceState;

    #[test]
    fn reserve_returns_current_and_advances() {
        let mut state = SequenceState::new();
        state.set_counter(42);
        assert_eq!(state.reserve(None), Some(42));
        assert_eq!(state.reserve(None), Some(43));
        assert_eq!(state.counter(), 44);
    }

    #[test]
    fn reserve_stops_at_ceiling_without_advancing() {
        let mut state = SequenceState::new();
        state.set_counter(999);
        assert_eq!(state.reserve(Some(999)), Some(999));
        assert_eq!(state.reserve(Some(999)), None);
        assert_eq!(state.reserve(Some(999)), None);
        assert_eq!(state.counter(), 1000);
    }

    #[test]
    fn reserve_never_wraps() {
        let mut state = SequenceState::new();
        state.set_counter(u64::MAX);
        assert_eq!(state.reserve(None), None);
        assert_eq!(state.counter(), u64::MAX);
    }
}
