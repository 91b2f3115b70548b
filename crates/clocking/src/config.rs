//! Per-link configuration.
//!
//! The DAI source selections are fixed for a board. They live here, not in
//! the sequencer, so a board with a different mux wiring only overrides the
//! defaults.

use crate::control::OpClockSource;

/// Default link name.
pub const DEFAULT_LINK_NAME: &str = "wm8960";

/// Default stream name.
pub const DEFAULT_STREAM_NAME: &str = "wm8960 PCM";

/// Default root clock mux input: the first external source.
pub const DEFAULT_RECOVERED_CLOCK_INPUT: u32 = 1;

/// Default threshold above which an achieved PLL rate is reported as a
/// mismatch, in parts per million of the requested rate.
pub const DEFAULT_MISMATCH_TOLERANCE_PPM: u32 = 10;

/// Static description of one codec link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    /// Link name, used in log output.
    pub name: &'static str,
    /// Stream name, used in log output.
    pub stream_name: &'static str,
    /// Operating clock source selected in the op-clock step.
    pub op_clock_source: OpClockSource,
    /// Root clock mux input selected in the recovered-clock step.
    pub recovered_clock_input: u32,
    /// PLL deviation (ppm) tolerated before a mismatch is reported.
    pub mismatch_tolerance_ppm: u32,
}

impl LinkConfig {
    /// Reference configuration: peripheral op clock, first external root
    /// clock input, 10 ppm mismatch tolerance.
    pub const fn new() -> Self {
        Self {
            name: DEFAULT_LINK_NAME,
            stream_name: DEFAULT_STREAM_NAME,
            op_clock_source: OpClockSource::PeripheralClock,
            recovered_clock_input: DEFAULT_RECOVERED_CLOCK_INPUT,
            mismatch_tolerance_ppm: DEFAULT_MISMATCH_TOLERANCE_PPM,
        }
    }

    /// Override the link and stream names.
    #[must_use]
    pub const fn with_names(mut self, name: &'static str, stream_name: &'static str) -> Self {
        self.name = name;
        self.stream_name = stream_name;
        self
    }

    /// Override the operating clock source.
    #[must_use]
    pub const fn with_op_clock_source(mut self, source: OpClockSource) -> Self {
        self.op_clock_source = source;
        self
    }

    /// Override the root clock mux input.
    #[must_use]
    pub const fn with_recovered_clock_input(mut self, input: u32) -> Self {
        self.recovered_clock_input = input;
        self
    }

    /// Override the mismatch tolerance.
    #[must_use]
    pub const fn with_mismatch_tolerance_ppm(mut self, ppm: u32) -> Self {
        self.mismatch_tolerance_ppm = ppm;
        self
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self::new()
    }
}
