//! Mock collaborators for testing
//!
//! [`MockClock`] and [`MockDai`] record every call in order so tests can
//! assert on the exact programming sequence, and can be told to fail or to
//! settle on an inexact rate. They use fixed-capacity `heapless` storage and
//! work in `no_std` host simulations as well as in tests.

use crate::control::{ClockControl, ClockDirection, ClockRole, DaiControl, DividerId};

/// Maximum number of calls each mock records. Further calls still execute,
/// are not recorded, and set the mock's `overflowed()` flag.
pub const MAX_RECORDED_CALLS: usize = 32;

/// Error returned by a mock told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MockError;

// ── Clock ────────────────────────────────────────────────────────────────────

/// Mock PLL
pub struct MockClock {
    rate: u32,
    achieved_offset: i32,
    reject_set_rate: bool,
    set_rate_calls: heapless::Vec<u32, MAX_RECORDED_CALLS>,
    overflowed: bool,
}

impl MockClock {
    /// Create a PLL currently running at `rate` Hz that hits every requested rate exactly.
    pub fn new(rate: u32) -> Self {
        Self {
            rate,
            achieved_offset: 0,
            reject_set_rate: false,
            set_rate_calls: heapless::Vec::new(),
            overflowed: false,
        }
    }

    /// Settle `offset` Hz away from every requested rate.
    #[must_use]
    pub fn with_achieved_offset(mut self, offset: i32) -> Self {
        self.achieved_offset = offset;
        self
    }

    /// Fail every `set_rate` call without changing the rate.
    #[must_use]
    pub fn rejecting_set_rate(mut self) -> Self {
        self.reject_set_rate = true;
        self
    }

    /// Rates passed to `set_rate`, in call order.
    pub fn set_rate_calls(&self) -> &[u32] {
        &self.set_rate_calls
    }

    /// `true` once a call was dropped because the recorder was full.
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }
}

impl ClockControl for MockClock {
    type Error = MockError;

    fn rate(&self) -> u32 {
        self.rate
    }

    fn set_rate(&mut self, rate: u32) -> Result<(), Self::Error> {
        if self.set_rate_calls.push(rate).is_err() {
            self.overflowed = true;
        }
        if self.reject_set_rate {
            return Err(MockError);
        }
        self.rate = rate.saturating_add_signed(self.achieved_offset);
        Ok(())
    }
}

// ── DAI ──────────────────────────────────────────────────────────────────────

/// One recorded DAI call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DaiCall {
    /// [`DaiControl::set_clock_source`]
    ClockSource {
        /// Targeted clock.
        role: ClockRole,
        /// Selector or ratio.
        value: u32,
        /// Pin direction.
        direction: ClockDirection,
    },
    /// [`DaiControl::set_divider`]
    Divider {
        /// Targeted divider.
        divider: DividerId,
        /// Divider value.
        value: u32,
    },
}

/// Mock DAI controller
#[derive(Default)]
pub struct MockDai {
    calls: heapless::Vec<DaiCall, MAX_RECORDED_CALLS>,
    failing_role: Option<ClockRole>,
    failing_divider: Option<DividerId>,
    overflowed: bool,
}

impl MockDai {
    /// Create a controller that accepts every call.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail `set_clock_source` calls for `role`.
    #[must_use]
    pub fn failing_clock_source(mut self, role: ClockRole) -> Self {
        self.failing_role = Some(role);
        self
    }

    /// Fail `set_divider` calls for `divider`.
    #[must_use]
    pub fn failing_divider(mut self, divider: DividerId) -> Self {
        self.failing_divider = Some(divider);
        self
    }

    /// Every call attempted so far, failed ones included.
    pub fn calls(&self) -> &[DaiCall] {
        &self.calls
    }

    /// `true` once a call was dropped because the recorder was full.
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    /// Forget recorded calls.
    pub fn clear(&mut self) {
        self.calls.clear();
        self.overflowed = false;
    }

    fn record(&mut self, call: DaiCall) {
        if self.calls.push(call).is_err() {
            self.overflowed = true;
        }
    }
}

impl DaiControl for MockDai {
    type Error = MockError;

    fn set_clock_source(
        &mut self,
        role: ClockRole,
        value: u32,
        direction: ClockDirection,
    ) -> Result<(), Self::Error> {
        self.record(DaiCall::ClockSource {
            role,
            value,
            direction,
        });
        if self.failing_role == Some(role) {
            return Err(MockError);
        }
        Ok(())
    }

    fn set_divider(&mut self, divider: DividerId, value: u32) -> Result<(), Self::Error> {
        self.record(DaiCall::Divider { divider, value });
        if self.failing_divider == Some(divider) {
            return Err(MockError);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_clock() {
        let mut clock = MockClock::new(0);
        clock.set_rate(45_158_400).unwrap();
        assert_eq!(clock.rate(), 45_158_400);
        assert_eq!(clock.set_rate_calls(), &[45_158_400]);
    }

    #[test]
    fn test_mock_clock_offset() {
        let mut clock = MockClock::new(0).with_achieved_offset(-23);
        clock.set_rate(49_152_000).unwrap();
        assert_eq!(clock.rate(), 49_151_977);
    }

    #[test]
    fn test_mock_clock_rejecting() {
        let mut clock = MockClock::new(12_288_000).rejecting_set_rate();
        assert_eq!(clock.set_rate(49_152_000), Err(MockError));
        assert_eq!(clock.rate(), 12_288_000);
        assert_eq!(clock.set_rate_calls().len(), 1);
    }

    #[test]
    fn test_mock_dai_records_failed_calls() {
        let mut dai = MockDai::new().failing_divider(DividerId::BitClock);
        dai.set_clock_source(ClockRole::CodecClock, 256, ClockDirection::Out)
            .unwrap();
        assert_eq!(dai.set_divider(DividerId::BitClock, 32), Err(MockError));
        assert_eq!(dai.calls().len(), 2);

        dai.clear();
        assert!(dai.calls().is_empty());
    }

    #[test]
    fn test_mock_clock_flags_dropped_calls() {
        let mut clock = MockClock::new(0);
        for rate in (0u32..).take(MAX_RECORDED_CALLS) {
            clock.set_rate(rate).unwrap();
        }
        assert!(!clock.overflowed());

        clock.set_rate(45_158_400).unwrap();
        assert!(clock.overflowed());
        assert_eq!(clock.set_rate_calls().len(), MAX_RECORDED_CALLS);
        // The call still took effect.
        assert_eq!(clock.rate(), 45_158_400);
    }

    #[test]
    fn test_mock_dai_flags_dropped_calls_until_cleared() {
        let mut dai = MockDai::new();
        for _ in 0..=MAX_RECORDED_CALLS {
            dai.set_divider(DividerId::BitClock, 32).unwrap();
        }
        assert!(dai.overflowed());
        assert_eq!(dai.calls().len(), MAX_RECORDED_CALLS);

        dai.clear();
        assert!(!dai.overflowed());
    }
}
