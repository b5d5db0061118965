//! Pixel format codes
//!
//! Codes follow the GenICam PFNC numbering that Aravis exposes as
//! `ARV_PIXEL_FORMAT_*`. The upper byte flags the colour class, the next byte
//! holds the bits occupied per pixel and the low word is the format id. The
//! crate never remaps them.

use std::fmt;

/// Numeric identifier of a raw sensor encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PixelFormatCode(pub u32);

impl PixelFormatCode {
    pub const BAYER_GR_8: Self = Self(0x0108_0008);
    pub const BAYER_RG_8: Self = Self(0x0108_0009);
    pub const BAYER_GB_8: Self = Self(0x0108_000A);
    pub const BAYER_BG_8: Self = Self(0x0108_000B);

    pub const BAYER_GR_10: Self = Self(0x0110_000C);
    pub const BAYER_RG_10: Self = Self(0x0110_000D);
    pub const BAYER_GB_10: Self = Self(0x0110_000E);
    pub const BAYER_BG_10: Self = Self(0x0110_000F);

    pub const BAYER_GR_12: Self = Self(0x0110_0010);
    pub const BAYER_RG_12: Self = Self(0x0110_0011);
    pub const BAYER_GB_12: Self = Self(0x0110_0012);
    pub const BAYER_BG_12: Self = Self(0x0110_0013);

    pub const BAYER_GR_12_PACKED: Self = Self(0x010C_002A);
    pub const BAYER_RG_12_PACKED: Self = Self(0x010C_002B);
    pub const BAYER_GB_12_PACKED: Self = Self(0x010C_002C);
    pub const BAYER_BG_12_PACKED: Self = Self(0x010C_002D);

    pub const BAYER_GR_16: Self = Self(0x0110_002E);
    pub const BAYER_RG_16: Self = Self(0x0110_002F);
    pub const BAYER_GB_16: Self = Self(0x0110_0030);
    pub const BAYER_BG_16: Self = Self(0x0110_0031);

    pub const fn value(self) -> u32 {
        self.0
    }

    /// Bits occupied per pixel as encoded in the code itself.
    pub const fn occupied_bits(self) -> u32 {
        (self.0 >> 16) & 0xFF
    }
}

impl From<u32> for PixelFormatCode {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for PixelFormatCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}
