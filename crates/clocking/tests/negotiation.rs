//! Tests for the clock sequencer: ordered programming, abort on first DAI
//! failure, PLL idempotence and mismatch reporting.
//!
//! The link must program, in this order:
//!   1. PLL rate (skipped when already correct)
//!   2. op clock ← peripheral clock
//!   3. root clock mux ← first external input
//!   4. codec clock output ← rfs
//!   5. bit clock divider ← bfs

// Test files legitimately use arithmetic and unwrap for verification; allow at file level.
#![allow(clippy::arithmetic_side_effects)]
#![allow(clippy::indexing_slicing)]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use clocking::mocks::{DaiCall, MockClock, MockDai};
use clocking::{
    apply, negotiate, resolve, ClockDirection, ClockRole, CodecLink, DaiStep, DividerId,
    LinkConfig, NegotiationError, OpClockSource, PllReport, StreamFormat,
};

const CD_16: StreamFormat = StreamFormat::new(16, 44_100);
const DVD_24: StreamFormat = StreamFormat::new(24, 48_000);

fn expected_dai_calls(rfs: u32, bfs: u32) -> [DaiCall; 4] {
    [
        DaiCall::ClockSource {
            role: ClockRole::OpClock,
            value: OpClockSource::PeripheralClock.id(),
            direction: ClockDirection::In,
        },
        DaiCall::ClockSource {
            role: ClockRole::RecoveredClockSource,
            value: 1,
            direction: ClockDirection::In,
        },
        DaiCall::ClockSource {
            role: ClockRole::CodecClock,
            value: rfs,
            direction: ClockDirection::Out,
        },
        DaiCall::Divider {
            divider: DividerId::BitClock,
            value: bfs,
        },
    ]
}

// ── Happy path ───────────────────────────────────────────────────────────────

#[test]
fn cd_format_programs_pll_then_dai_in_order() {
    let mut link = CodecLink::new(MockClock::new(49_152_000), MockDai::new());
    let negotiated = link.negotiate(CD_16).unwrap();

    assert_eq!(negotiated.plan.pll_target_rate(), 45_158_400);
    assert_eq!(
        negotiated.pll,
        PllReport::Reprogrammed {
            previous: 49_152_000,
            requested: 45_158_400,
            achieved: 45_158_400,
            mismatch: None,
        }
    );
    assert_eq!(link.clock().set_rate_calls(), &[45_158_400]);
    assert_eq!(link.dai().calls(), &expected_dai_calls(256, 32));
}

#[test]
fn dvd_format_uses_24_bit_ratios() {
    let mut link = CodecLink::new(MockClock::new(0), MockDai::new());
    let negotiated = negotiate(DVD_24, &mut link).unwrap();

    assert_eq!(negotiated.plan.bit_clock_rate(), 18_432_000);
    assert_eq!(negotiated.plan.prescale_ratio(), 4);
    assert_eq!(negotiated.plan.pll_target_rate(), 73_728_000);
    assert_eq!(link.clock().set_rate_calls(), &[73_728_000]);
    assert_eq!(link.dai().calls(), &expected_dai_calls(384, 48));
}

#[test]
fn custom_config_changes_source_selections() {
    let config = LinkConfig::new()
        .with_op_clock_source(OpClockSource::CodecClockIn)
        .with_recovered_clock_input(0);
    let mut link = CodecLink::with_config(MockClock::new(0), MockDai::new(), config);
    link.negotiate(CD_16).unwrap();

    let calls = link.dai().calls();
    assert_eq!(
        calls[0],
        DaiCall::ClockSource {
            role: ClockRole::OpClock,
            value: 1,
            direction: ClockDirection::In,
        }
    );
    assert_eq!(
        calls[1],
        DaiCall::ClockSource {
            role: ClockRole::RecoveredClockSource,
            value: 0,
            direction: ClockDirection::In,
        }
    );
}

// ── Idempotence ──────────────────────────────────────────────────────────────

#[test]
fn second_apply_skips_pll_reprogramming() {
    let plan = resolve(CD_16).unwrap();
    let mut link = CodecLink::new(MockClock::new(0), MockDai::new());

    let first = apply(&plan, &mut link).unwrap();
    assert!(first.was_reprogrammed());

    let second = apply(&plan, &mut link).unwrap();
    assert_eq!(second, PllReport::Unchanged { rate: 45_158_400 });
    assert_eq!(link.clock().set_rate_calls().len(), 1, "no redundant set_rate");
    // The DAI is still reprogrammed both times.
    assert_eq!(link.dai().calls().len(), 8);
    assert!(!link.dai().overflowed());
}

#[test]
fn pll_already_at_target_is_left_alone() {
    let mut link = CodecLink::new(MockClock::new(73_728_000), MockDai::new());
    let negotiated = link.negotiate(DVD_24).unwrap();
    assert!(!negotiated.pll.was_reprogrammed());
    assert!(link.clock().set_rate_calls().is_empty());
}

#[test]
fn borrowed_collaborators_keep_state_between_links() {
    let mut clock = MockClock::new(0);
    let mut dai = MockDai::new();

    CodecLink::new(&mut clock, &mut dai).negotiate(CD_16).unwrap();
    CodecLink::new(&mut clock, &mut dai).negotiate(CD_16).unwrap();

    assert_eq!(clock.set_rate_calls(), &[45_158_400]);
    assert_eq!(dai.calls().len(), 8);
}

// ── Abort on failure ─────────────────────────────────────────────────────────

#[test]
fn output_clock_divider_failure_stops_before_bit_clock() {
    let dai = MockDai::new().failing_clock_source(ClockRole::CodecClock);
    let mut link = CodecLink::new(MockClock::new(0), dai);

    assert_eq!(
        link.negotiate(CD_16),
        Err(NegotiationError::DaiConfig {
            step: DaiStep::OutputClockDivider
        })
    );
    let calls = link.dai().calls();
    assert_eq!(calls.len(), 3);
    assert!(
        !calls.iter().any(|c| matches!(c, DaiCall::Divider { .. })),
        "bit clock divider must not be attempted"
    );
    // No rollback: the PLL keeps its new rate.
    assert_eq!(link.clock().set_rate_calls(), &[45_158_400]);
}

#[test]
fn each_failing_step_is_reported_and_aborts() {
    let cases = [
        (MockDai::new().failing_clock_source(ClockRole::OpClock), DaiStep::OpClockSource, 1),
        (
            MockDai::new().failing_clock_source(ClockRole::RecoveredClockSource),
            DaiStep::RecoveredClockSource,
            2,
        ),
        (
            MockDai::new().failing_clock_source(ClockRole::CodecClock),
            DaiStep::OutputClockDivider,
            3,
        ),
        (MockDai::new().failing_divider(DividerId::BitClock), DaiStep::BitClockDivider, 4),
    ];

    for (dai, step, attempted) in cases {
        let mut link = CodecLink::new(MockClock::new(0), dai);
        assert_eq!(
            link.negotiate(DVD_24),
            Err(NegotiationError::DaiConfig { step })
        );
        let (_, dai) = link.release();
        assert_eq!(dai.calls().len(), attempted, "{step}");
    }
}

#[test]
fn unsupported_width_makes_no_hardware_calls() {
    let mut link = CodecLink::new(MockClock::new(12_288_000), MockDai::new());
    assert_eq!(
        link.negotiate(StreamFormat::new(32, 44_100)),
        Err(NegotiationError::UnsupportedWidth { width: 32 })
    );
    assert!(link.clock().set_rate_calls().is_empty());
    assert!(link.dai().calls().is_empty());
}

#[test]
fn unsupported_rate_makes_no_hardware_calls() {
    let mut link = CodecLink::new(MockClock::new(0), MockDai::new());
    assert_eq!(
        link.negotiate(StreamFormat::new(16, 1_000)),
        Err(NegotiationError::UnsupportedFrameRate { frame_rate: 1_000 })
    );
    assert!(link.clock().set_rate_calls().is_empty());
    assert!(link.dai().calls().is_empty());
}

#[test]
fn retry_after_failure_completes_without_touching_pll() {
    let mut clock = MockClock::new(0);

    let failing = MockDai::new().failing_divider(DividerId::BitClock);
    let mut link = CodecLink::new(&mut clock, failing);
    assert!(link.negotiate(CD_16).is_err());

    let mut link = CodecLink::new(&mut clock, MockDai::new());
    let negotiated = link.negotiate(CD_16).unwrap();
    assert!(!negotiated.pll.was_reprogrammed());
    assert_eq!(link.dai().calls(), &expected_dai_calls(256, 32));
}

// ── PLL mismatch ─────────────────────────────────────────────────────────────

#[test]
fn inexact_pll_within_tolerance_is_silent() {
    let clock = MockClock::new(0).with_achieved_offset(-23);
    let mut link = CodecLink::new(clock, MockDai::new());
    let negotiated = link.negotiate(StreamFormat::new(16, 192_000)).unwrap();

    assert_eq!(negotiated.pll.achieved_rate(), 49_151_977);
    assert_eq!(negotiated.pll.mismatch(), None);
}

#[test]
fn inexact_pll_beyond_tolerance_is_reported_but_not_fatal() {
    let clock = MockClock::new(0).with_achieved_offset(-152_000);
    let mut link = CodecLink::new(clock, MockDai::new());
    let negotiated = link.negotiate(StreamFormat::new(16, 192_000)).unwrap();

    let mismatch = negotiated.pll.mismatch().unwrap();
    assert_eq!(mismatch.requested, 49_152_000);
    assert_eq!(mismatch.achieved, 49_000_000);
    assert_eq!(mismatch.deviation_ppm, 3093);
    // The DAI was still fully programmed.
    assert_eq!(link.dai().calls().len(), 4);
}

#[test]
fn rejected_set_rate_is_not_fatal() {
    let clock = MockClock::new(12_288_000).rejecting_set_rate();
    let mut link = CodecLink::new(clock, MockDai::new());
    let negotiated = link.negotiate(CD_16).unwrap();

    assert_eq!(negotiated.pll.achieved_rate(), 12_288_000);
    assert!(negotiated.pll.mismatch().is_some());
    assert_eq!(link.dai().calls().len(), 4);
}

#[test]
fn zero_tolerance_flags_any_deviation() {
    let config = LinkConfig::new().with_mismatch_tolerance_ppm(0);
    let clock = MockClock::new(0).with_achieved_offset(1);
    let mut link = CodecLink::with_config(clock, MockDai::new(), config);
    let negotiated = link.negotiate(DVD_24).unwrap();
    assert_eq!(negotiated.pll.mismatch().unwrap().deviation_ppm, 1);
}
