//! Clock and format negotiation for an I2S codec link
//!
//! Maps a requested PCM format (sample width, frame rate) to a validated
//! clock plan and programs it into the source PLL and the DAI controller.
//!
//! # Architecture Layers
//!
//! ```text
//! Audio data path (stream open / parameter change)
//!         ↓
//! negotiate()
//!         ↓
//! Format resolver (pure)  →  Clock sequencer (ordered hardware writes)
//!                                    ↓
//!                      ClockControl + DaiControl (platform drivers)
//! ```
//!
//! # Features
//!
//! - `defmt`: `defmt::Format` derives and defmt log output
//! - `tracing`: log output through `tracing` (desktop builds)
//!
//! # Example
//!
//! ```
//! use clocking::mocks::{MockClock, MockDai};
//! use clocking::{CodecLink, StreamFormat};
//!
//! let mut link = CodecLink::new(MockClock::new(0), MockDai::new());
//! let negotiated = link.negotiate(StreamFormat::new(16, 44_100)).unwrap();
//! assert_eq!(negotiated.plan.pll_target_rate(), 45_158_400);
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
#![allow(clippy::doc_markdown)] // register and clock names in doc comments
#![allow(clippy::must_use_candidate)] // plain accessors
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

#[macro_use]
mod fmt;

pub mod config;
pub mod control;
pub mod error;
pub mod format;
pub mod mocks;
pub mod resolver;
pub mod sequencer;

pub use config::LinkConfig;
pub use control::{ClockControl, ClockDirection, ClockRole, DaiControl, DividerId, OpClockSource};
pub use error::{DaiStep, NegotiationError};
pub use format::{SampleWidth, StreamFormat};
pub use resolver::{prescale_ratio_for, resolve, supported_formats, ClockPlan};
pub use sequencer::{apply, negotiate, ClockRateMismatch, CodecLink, Negotiated, PllReport};
