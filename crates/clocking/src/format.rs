//! Stream format types negotiated per stream open.
//!
//! The bus carries two symbol-packing layouts only. The ratios come from
//! the bus protocol, they are not computed:
//!
//! | width | bfs | rfs |
//! |-------|-----|-----|
//! | 16    | 32  | 256 |
//! | 24    | 48  | 384 |

// ── StreamFormat ─────────────────────────────────────────────────────────────

/// PCM format requested by the audio data path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StreamFormat {
    /// Bits per sample.
    pub width: u32,
    /// Frames per second (Hz).
    pub frame_rate: u32,
}

impl StreamFormat {
    /// Create a format from a sample width (bits) and frame rate (Hz).
    #[must_use]
    pub const fn new(width: u32, frame_rate: u32) -> Self {
        Self { width, frame_rate }
    }

    /// The slot layout for this format's width, if the bus supports it.
    #[must_use]
    pub const fn sample_width(&self) -> Option<SampleWidth> {
        SampleWidth::from_bits(self.width)
    }
}

// ── SampleWidth ──────────────────────────────────────────────────────────────

/// Supported sample widths and their fixed clock ratios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleWidth {
    /// 16-bit samples in 16-bit slots.
    Bits16,
    /// 24-bit samples in 24-bit slots.
    Bits24,
}

impl SampleWidth {
    /// Every supported width, narrowest first.
    pub const ALL: [SampleWidth; 2] = [SampleWidth::Bits16, SampleWidth::Bits24];

    /// Classify a width in bits. Returns `None` for anything but 16 and 24.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            16 => Some(Self::Bits16),
            24 => Some(Self::Bits24),
            _ => None,
        }
    }

    /// Width in bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::Bits16 => 16,
            Self::Bits24 => 24,
        }
    }

    /// Bit clock to frame clock ratio (bfs): two slots per frame.
    #[must_use]
    pub const fn bit_clock_scale(self) -> u32 {
        match self {
            Self::Bits16 => 32,
            Self::Bits24 => 48,
        }
    }

    /// Root clock to frame clock ratio (rfs).
    #[must_use]
    pub const fn frame_clock_scale(self) -> u32 {
        match self {
            Self::Bits16 => 256,
            Self::Bits24 => 384,
        }
    }
}
