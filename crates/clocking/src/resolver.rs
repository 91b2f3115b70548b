//! Format resolver: maps a [`StreamFormat`] to a [`ClockPlan`].
//!
//! # Clock chain
//!
//! ```text
//! PLL (pll_target_rate = rclk × psr)
//!   → /psr → root clock (rclk = fs × rfs) → codec clock output
//!                                          → /(rfs / bfs) → bit clock (fs × bfs)
//! ```
//!
//! The PLL can only produce the 25 root clock rates of [`PRESCALE_TABLE`]
//! exactly (five sample-rate families, five prescale ratios). Lookup is an
//! exact match, no rounding or tolerance is applied.
//!
//! Resolution is pure: no collaborator is touched and a failure at any step
//! returns an error without a partial plan.

use crate::error::NegotiationError;
use crate::format::{SampleWidth, StreamFormat};

/// Root clock rate (Hz) → prescale ratio, sorted by rate for binary search.
///
/// | rclk family (Hz)                                                | psr |
/// |-----------------------------------------------------------------|-----|
/// | 2 048 000 / 2 822 400 / 3 072 000 / 4 233 600 / 4 608 000       | 16  |
/// | 4 096 000 / 5 644 800 / 6 144 000 / 8 467 200 / 9 216 000       | 8   |
/// | 8 192 000 / 11 289 600 / 12 288 000 / 16 934 400 / 18 432 000   | 4   |
/// | 16 384 000 / 22 579 200 / 24 576 000 / 33 868 800 / 36 864 000  | 2   |
/// | 32 768 000 / 45 158 400 / 49 152 000 / 67 737 600 / 73 728 000  | 1   |
pub const PRESCALE_TABLE: &[(u32, u32)] = &[
    (2_048_000, 16),
    (2_822_400, 16),
    (3_072_000, 16),
    (4_096_000, 8),
    (4_233_600, 16),
    (4_608_000, 16),
    (5_644_800, 8),
    (6_144_000, 8),
    (8_192_000, 4),
    (8_467_200, 8),
    (9_216_000, 8),
    (11_289_600, 4),
    (12_288_000, 4),
    (16_384_000, 2),
    (16_934_400, 4),
    (18_432_000, 4),
    (22_579_200, 2),
    (24_576_000, 2),
    (32_768_000, 1),
    (33_868_800, 2),
    (36_864_000, 2),
    (45_158_400, 1),
    (49_152_000, 1),
    (67_737_600, 1),
    (73_728_000, 1),
];

/// Prescale ratio for an exact root clock rate, or `None` if the PLL cannot
/// produce it.
#[must_use]
pub fn prescale_ratio_for(bit_clock_rate: u32) -> Option<u32> {
    PRESCALE_TABLE
        .binary_search_by_key(&bit_clock_rate, |&(rate, _)| rate)
        .ok()
        .and_then(|index| PRESCALE_TABLE.get(index))
        .map(|&(_, psr)| psr)
}

/// Clock configuration derived from a [`StreamFormat`].
///
/// Only [`resolve`] builds a plan, so every plan in circulation satisfies
/// `bit_clock_rate = frame_rate × rfs` and
/// `pll_target_rate = bit_clock_rate × psr` for a table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockPlan {
    format: StreamFormat,
    bit_clock_scale: u32,
    frame_clock_scale: u32,
    bit_clock_rate: u32,
    prescale_ratio: u32,
    pll_target_rate: u32,
}

impl ClockPlan {
    /// The format this plan was resolved from.
    pub const fn format(&self) -> StreamFormat {
        self.format
    }

    /// bfs: bit clock rate / frame rate.
    pub const fn bit_clock_scale(&self) -> u32 {
        self.bit_clock_scale
    }

    /// rfs: root clock rate / frame rate.
    pub const fn frame_clock_scale(&self) -> u32 {
        self.frame_clock_scale
    }

    /// rclk in Hz: `frame_rate × rfs`.
    pub const fn bit_clock_rate(&self) -> u32 {
        self.bit_clock_rate
    }

    /// psr: PLL output / rclk.
    pub const fn prescale_ratio(&self) -> u32 {
        self.prescale_ratio
    }

    /// PLL output frequency in Hz: `rclk × psr`.
    pub const fn pll_target_rate(&self) -> u32 {
        self.pll_target_rate
    }
}

/// Derive the clock plan for `format`.
///
/// # Errors
///
/// - [`NegotiationError::UnsupportedWidth`] if the width is not 16 or 24.
/// - [`NegotiationError::UnsupportedFrameRate`] if `frame_rate × rfs` is not an
///   exact entry of [`PRESCALE_TABLE`].
pub fn resolve(format: StreamFormat) -> Result<ClockPlan, NegotiationError> {
    let StreamFormat { width, frame_rate } = format;

    let Some(layout) = SampleWidth::from_bits(width) else {
        error!("width not supported: {}", width);
        return Err(NegotiationError::UnsupportedWidth { width });
    };
    let bfs = layout.bit_clock_scale();
    let rfs = layout.frame_clock_scale();
    debug!("width={} frame_rate={} bfs={} rfs={}", width, frame_rate, bfs, rfs);

    // Anything past u32::MAX is far above the table, so overflow is just
    // another unsupported rate.
    let unsupported = NegotiationError::UnsupportedFrameRate { frame_rate };
    let Some(rclk) = frame_rate.checked_mul(rfs) else {
        error!("frame rate not supported: {}", frame_rate);
        return Err(unsupported);
    };

    let Some(psr) = prescale_ratio_for(rclk) else {
        error!("frame rate not supported: {} (rclk={})", frame_rate, rclk);
        return Err(unsupported);
    };

    let Some(pll_target_rate) = rclk.checked_mul(psr) else {
        return Err(unsupported);
    };
    debug!("rclk={} psr={} pll={}", rclk, psr, pll_target_rate);

    Ok(ClockPlan {
        format,
        bit_clock_scale: bfs,
        frame_clock_scale: rfs,
        bit_clock_rate: rclk,
        prescale_ratio: psr,
        pll_target_rate,
    })
}

/// Every stream format [`resolve`] accepts, grouped by width and ordered by
/// root clock rate.
///
/// A table rate is listed under a width only when it divides evenly by that
/// width's rfs.
pub fn supported_formats() -> impl Iterator<Item = StreamFormat> {
    SampleWidth::ALL.into_iter().flat_map(|layout| {
        let rfs = layout.frame_clock_scale();
        PRESCALE_TABLE.iter().filter_map(move |&(rclk, _)| {
            match (rclk.checked_rem(rfs), rclk.checked_div(rfs)) {
                (Some(0), Some(frame_rate)) => Some(StreamFormat::new(layout.bits(), frame_rate)),
                _ => None,
            }
        })
    })
}
