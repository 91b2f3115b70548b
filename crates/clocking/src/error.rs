//! Negotiation error taxonomy.
//!
//! Resolver failures (`UnsupportedWidth`, `UnsupportedFrameRate`) happen before
//! any collaborator is touched. A `DaiConfig` failure means the link was left
//! partially programmed: every step before the reported [`DaiStep`] was
//! applied, nothing after it was attempted.

use core::fmt;

/// A DAI programming step of the clock sequence, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DaiStep {
    /// Select the controller's operating clock source.
    OpClockSource,
    /// Select the recovered (root) clock source input.
    RecoveredClockSource,
    /// Program the codec clock output divider (rfs).
    OutputClockDivider,
    /// Program the bit clock divider (bfs).
    BitClockDivider,
}

impl DaiStep {
    /// All steps in the order the sequencer runs them.
    pub const ALL: [DaiStep; 4] = [
        DaiStep::OpClockSource,
        DaiStep::RecoveredClockSource,
        DaiStep::OutputClockDivider,
        DaiStep::BitClockDivider,
    ];

    /// Short name used in logs and error messages.
    pub const fn as_str(self) -> &'static str {
        match self {
            DaiStep::OpClockSource => "op clock source",
            DaiStep::RecoveredClockSource => "recovered clock source",
            DaiStep::OutputClockDivider => "output clock divider",
            DaiStep::BitClockDivider => "bit clock divider",
        }
    }
}

impl fmt::Display for DaiStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a stream format could not be negotiated on a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NegotiationError {
    /// The sample width has no supported slot layout.
    #[error("unsupported sample width: {width} bits")]
    UnsupportedWidth {
        /// Requested width in bits.
        width: u32,
    },
    /// The frame rate yields a root clock rate missing from the prescale table.
    #[error("unsupported frame rate: {frame_rate} Hz")]
    UnsupportedFrameRate {
        /// Requested frame rate in Hz.
        frame_rate: u32,
    },
    /// The DAI controller rejected one of the ordered programming steps.
    #[error("DAI configuration failed at step: {step}")]
    DaiConfig {
        /// The step that failed.
        step: DaiStep,
    },
}

impl NegotiationError {
    /// `true` when the failure came from the resolver, i.e. no hardware was touched.
    pub const fn is_format_rejection(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedWidth { .. } | Self::UnsupportedFrameRate { .. }
        )
    }
}
