//! Clock sequencer: applies a [`ClockPlan`] to a codec link.
//!
//! ## Programming order
//! ```text
//! [PLL reconcile] → [op clock source] → [recovered clock source]
//!                 → [codec clock output (rfs)] → [bit clock divider (bfs)]
//! ```
//!
//! The PLL step never fails: a rejected or inexact rate request is logged and
//! the achieved rate is reported through [`PllReport`]. Each DAI step is
//! checked, and the first failure returns [`NegotiationError::DaiConfig`]
//! naming that step. Later steps are not attempted and earlier ones are not
//! rolled back; re-running the whole negotiation is safe because [`resolve`]
//! is pure and the PLL step is skipped when the rate already matches.
//!
//! A link serves one negotiation at a time (`&mut self`). Links that share a
//! PLL are not arbitrated.

use crate::config::LinkConfig;
use crate::control::{ClockControl, ClockDirection, ClockRole, DaiControl, DividerId};
use crate::error::{DaiStep, NegotiationError};
use crate::format::StreamFormat;
use crate::resolver::{resolve, ClockPlan};

// ── PLL reporting ────────────────────────────────────────────────────────────

/// Achieved PLL rate differs from the requested one beyond the link tolerance.
///
/// Advisory only: the sequence carries on with the achieved rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockRateMismatch {
    /// Rate passed to [`ClockControl::set_rate`] (Hz).
    pub requested: u32,
    /// Rate read back afterwards (Hz).
    pub achieved: u32,
    /// `|achieved - requested| / requested` in parts per million, rounded up
    /// and saturating.
    pub deviation_ppm: u32,
}

impl ClockRateMismatch {
    /// Compare an achieved rate with the requested one.
    ///
    /// Returns `Some` when the deviation exceeds `tolerance_ppm`.
    #[must_use]
    pub fn check(requested: u32, achieved: u32, tolerance_ppm: u32) -> Option<Self> {
        let deviation_ppm = deviation_ppm(requested, achieved);
        (deviation_ppm > tolerance_ppm).then_some(Self {
            requested,
            achieved,
            deviation_ppm,
        })
    }
}

/// Deviation in ppm, rounded up so any nonzero error is at least 1 ppm.
fn deviation_ppm(requested: u32, achieved: u32) -> u32 {
    let diff = u64::from(requested.abs_diff(achieved));
    if diff == 0 {
        return 0;
    }
    if requested == 0 {
        return u32::MAX;
    }
    diff.checked_mul(1_000_000)
        .map(|scaled| scaled.div_ceil(u64::from(requested)))
        .and_then(|ppm| u32::try_from(ppm).ok())
        .unwrap_or(u32::MAX)
}

/// What the PLL reconciliation step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PllReport {
    /// The PLL already ran at the target rate; nothing was written.
    Unchanged {
        /// Current (and target) rate in Hz.
        rate: u32,
    },
    /// A new rate was requested.
    Reprogrammed {
        /// Rate before the request (Hz).
        previous: u32,
        /// Requested rate (Hz).
        requested: u32,
        /// Rate read back after the request (Hz).
        achieved: u32,
        /// Set when `achieved` is outside the link tolerance.
        mismatch: Option<ClockRateMismatch>,
    },
}

impl PllReport {
    /// PLL rate after the step.
    pub const fn achieved_rate(&self) -> u32 {
        match *self {
            Self::Unchanged { rate } => rate,
            Self::Reprogrammed { achieved, .. } => achieved,
        }
    }

    /// `true` if [`ClockControl::set_rate`] was called.
    pub const fn was_reprogrammed(&self) -> bool {
        matches!(self, Self::Reprogrammed { .. })
    }

    /// The advisory mismatch, if any.
    pub const fn mismatch(&self) -> Option<ClockRateMismatch> {
        match *self {
            Self::Unchanged { .. } => None,
            Self::Reprogrammed { mismatch, .. } => mismatch,
        }
    }
}

/// Outcome of a successful [`negotiate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Negotiated {
    /// The plan that was applied.
    pub plan: ClockPlan,
    /// What the PLL step did.
    pub pll: PllReport,
}

// ── CodecLink ────────────────────────────────────────────────────────────────

/// Binding of one clock collaborator and one DAI collaborator for an audio link.
///
/// Holds no clock state of its own: the PLL rate lives in `C`, the
/// controller registers behind `D`.
pub struct CodecLink<C, D> {
    clock: C,
    dai: D,
    config: LinkConfig,
}

impl<C: ClockControl, D: DaiControl> CodecLink<C, D> {
    /// Bind collaborators with the reference [`LinkConfig`].
    pub fn new(clock: C, dai: D) -> Self {
        Self::with_config(clock, dai, LinkConfig::new())
    }

    /// Bind collaborators with an explicit configuration.
    pub fn with_config(clock: C, dai: D, config: LinkConfig) -> Self {
        info!("{}: link bound ({})", config.name, config.stream_name);
        Self { clock, dai, config }
    }

    /// Link configuration.
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Clock collaborator.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// DAI collaborator.
    pub fn dai(&self) -> &D {
        &self.dai
    }

    /// Unbind and hand the collaborators back.
    pub fn release(self) -> (C, D) {
        (self.clock, self.dai)
    }

    /// Resolve `format` and apply the resulting plan.
    ///
    /// A rejected format makes no collaborator calls.
    pub fn negotiate(&mut self, format: StreamFormat) -> Result<Negotiated, NegotiationError> {
        info!(
            "{}: negotiating width={} frame_rate={}",
            self.config.name, format.width, format.frame_rate
        );
        let plan = resolve(format)?;
        let pll = self.apply(&plan)?;
        info!("{}: clocks configured", self.config.name);
        Ok(Negotiated { plan, pll })
    }

    /// Program the PLL and the DAI for `plan`, strictly in order.
    ///
    /// # Errors
    ///
    /// [`NegotiationError::DaiConfig`] for the first DAI step that fails. The
    /// link keeps every setting applied before it.
    pub fn apply(&mut self, plan: &ClockPlan) -> Result<PllReport, NegotiationError> {
        let pll = self.reconcile_pll(plan.pll_target_rate());

        let op_clock = self.config.op_clock_source.id();
        let result = self
            .dai
            .set_clock_source(ClockRole::OpClock, op_clock, ClockDirection::In);
        self.check(DaiStep::OpClockSource, result)?;

        let input = self.config.recovered_clock_input;
        let result = self
            .dai
            .set_clock_source(ClockRole::RecoveredClockSource, input, ClockDirection::In);
        self.check(DaiStep::RecoveredClockSource, result)?;

        let result = self.dai.set_clock_source(
            ClockRole::CodecClock,
            plan.frame_clock_scale(),
            ClockDirection::Out,
        );
        self.check(DaiStep::OutputClockDivider, result)?;

        let result = self
            .dai
            .set_divider(DividerId::BitClock, plan.bit_clock_scale());
        self.check(DaiStep::BitClockDivider, result)?;

        Ok(pll)
    }

    fn reconcile_pll(&mut self, target: u32) -> PllReport {
        let name = self.config.name;
        let previous = self.clock.rate();
        if previous == target {
            debug!("{}: pll already at {}", name, previous);
            return PllReport::Unchanged { rate: previous };
        }

        info!("{}: pll is {}, wanted {}", name, previous, target);
        if self.clock.set_rate(target).is_err() {
            warn!("{}: pll rejected rate {}", name, target);
        }
        let achieved = self.clock.rate();
        info!("{}: pll want {}, got {}", name, target, achieved);

        let mismatch =
            ClockRateMismatch::check(target, achieved, self.config.mismatch_tolerance_ppm);
        if let Some(m) = mismatch {
            warn!(
                "{}: pll off by {} ppm (want {}, got {})",
                name, m.deviation_ppm, m.requested, m.achieved
            );
        }

        PllReport::Reprogrammed {
            previous,
            requested: target,
            achieved,
            mismatch,
        }
    }

    fn check<E>(&self, step: DaiStep, result: Result<(), E>) -> Result<(), NegotiationError> {
        result.map_err(|_| {
            error!("{}: {} setting error", self.config.name, step);
            NegotiationError::DaiConfig { step }
        })
    }
}

/// Apply `plan` to `link`. See [`CodecLink::apply`].
pub fn apply<C: ClockControl, D: DaiControl>(
    plan: &ClockPlan,
    link: &mut CodecLink<C, D>,
) -> Result<PllReport, NegotiationError> {
    link.apply(plan)
}

/// Resolve `format` and apply it to `link`. See [`CodecLink::negotiate`].
pub fn negotiate<C: ClockControl, D: DaiControl>(
    format: StreamFormat,
    link: &mut CodecLink<C, D>,
) -> Result<Negotiated, NegotiationError> {
    link.negotiate(format)
}
