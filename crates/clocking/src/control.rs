//! Collaborator abstractions driven by the clock sequencer.
//!
//! Both traits are blocking: every call is a bounded register access or a
//! call into a synchronous driver. Implementations live with the platform
//! (clock-tree driver, I2S controller driver); [`crate::mocks`] has recording
//! versions for tests.
//!
//! Both traits are implemented for `&mut T`, so a [`crate::CodecLink`] can
//! either own its collaborators or borrow them.

/// Source PLL control.
pub trait ClockControl {
    /// Error type
    type Error: core::fmt::Debug;

    /// Currently programmed output rate in Hz.
    fn rate(&self) -> u32;

    /// Request a new output rate in Hz.
    ///
    /// The hardware may settle on a nearby rate; callers re-read [`rate`](Self::rate).
    fn set_rate(&mut self, rate: u32) -> Result<(), Self::Error>;
}

/// Which clock of the DAI controller a [`DaiControl::set_clock_source`] call targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockRole {
    /// Operating clock of the controller. `value` is an [`OpClockSource`].
    OpClock,
    /// Root clock mux. `value` is the source input index.
    RecoveredClockSource,
    /// Codec clock output. `value` is the root clock / frame rate ratio (rfs).
    CodecClock,
}

/// Direction of a DAI clock pin or mux.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockDirection {
    /// Clock is consumed by the controller.
    In,
    /// Clock is driven out to the codec.
    Out,
}

/// Sources for [`ClockRole::OpClock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum OpClockSource {
    /// Codec clock pin, driven out.
    CodecClockOut = 0,
    /// Codec clock pin, driven in by the codec.
    CodecClockIn = 1,
    /// Bit clock pin, driven out.
    BitClockOut = 2,
    /// Internal peripheral bus clock.
    PeripheralClock = 3,
}

impl OpClockSource {
    /// Selector value passed to [`DaiControl::set_clock_source`].
    pub const fn id(self) -> u32 {
        self as u32
    }
}

/// Dividers of the DAI controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DividerId {
    /// Bit clock divider. Value is the bit clock / frame rate ratio (bfs).
    BitClock,
}

/// Digital audio interface controller.
pub trait DaiControl {
    /// Error type
    type Error: core::fmt::Debug;

    /// Route or configure one of the controller's clocks.
    ///
    /// The meaning of `value` depends on `role`, see [`ClockRole`].
    fn set_clock_source(
        &mut self,
        role: ClockRole,
        value: u32,
        direction: ClockDirection,
    ) -> Result<(), Self::Error>;

    /// Program a clock divider.
    fn set_divider(&mut self, divider: DividerId, value: u32) -> Result<(), Self::Error>;
}

impl<T: ClockControl + ?Sized> ClockControl for &mut T {
    type Error = T::Error;

    fn rate(&self) -> u32 {
        T::rate(self)
    }

    fn set_rate(&mut self, rate: u32) -> Result<(), Self::Error> {
        T::set_rate(self, rate)
    }
}

impl<T: DaiControl + ?Sized> DaiControl for &mut T {
    type Error = T::Error;

    fn set_clock_source(
        &mut self,
        role: ClockRole,
        value: u32,
        direction: ClockDirection,
    ) -> Result<(), Self::Error> {
        T::set_clock_source(self, role, value, direction)
    }

    fn set_divider(&mut self, divider: DividerId, value: u32) -> Result<(), Self::Error> {
        T::set_divider(self, divider, value)
    }
}
