use crate::frame_pipeline::format::PixelFormatCode;

/// Output colour channel, also the index into an RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Red = 0,
    Green = 1,
    Blue = 2,
}

/// Colour order of the top-left 2x2 tile, named by its first row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BayerArrangement {
    Gr,
    Rg,
    Gb,
    Bg,
}

impl BayerArrangement {
    pub fn tag(self) -> &'static str {
        match self {
            Self::Gr => "GR",
            Self::Rg => "RG",
            Self::Gb => "GB",
            Self::Bg => "BG",
        }
    }

    /// Channel grid indexed by `[row % 2][col % 2]`.
    pub fn channel_grid(self) -> [[Channel; 2]; 2] {
        use Channel::*;
        match self {
            Self::Gr => [[Green, Red], [Blue, Green]],
            Self::Rg => [[Red, Green], [Green, Blue]],
            Self::Gb => [[Green, Blue], [Red, Green]],
            Self::Bg => [[Blue, Green], [Green, Red]],
        }
    }

    pub fn channel_at(self, row: usize, col: usize) -> Channel {
        self.channel_grid()[row & 1][col & 1]
    }
}

/// How samples are laid out in the driver buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleLayout {
    /// One byte per sample.
    Byte8,
    /// 16-bit little-endian words, only the low `significant_bits` carry data.
    Word16 { significant_bits: u32 },
    /// GigE Vision 12-bit packed: two samples in three bytes.
    ///
    /// ```text
    /// b0 = p0[11:4]   b1 = p1[3:0] << 4 | p0[3:0]   b2 = p1[11:4]
    /// ```
    Packed12,
}

impl SampleLayout {
    pub fn bits_per_sample(self) -> u32 {
        match self {
            Self::Byte8 => 8,
            Self::Word16 { significant_bits } => significant_bits,
            Self::Packed12 => 12,
        }
    }

    /// Left shift that maps the sensor range onto the top of 16 bits.
    pub fn scale_shift(self) -> u32 {
        16 - self.bits_per_sample()
    }

    /// Exact buffer size for `pixels` samples, `None` on overflow.
    pub fn frame_len(self, pixels: usize) -> Option<usize> {
        match self {
            Self::Byte8 => Some(pixels),
            Self::Word16 { .. } => pixels.checked_mul(2),
            Self::Packed12 => pixels.checked_mul(3).map(|b| b.div_ceil(2)),
        }
    }
}

/// Everything the generic Bayer routine needs to know about one format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatDescriptor {
    pub code: PixelFormatCode,
    pub name: &'static str,
    pub plugin_id: &'static str,
    pub arrangement: BayerArrangement,
    pub layout: SampleLayout,
}

impl FormatDescriptor {
    pub fn bits_per_sample(&self) -> u32 {
        self.layout.bits_per_sample()
    }

    /// Largest raw sample value for this format.
    pub fn max_sample(&self) -> u16 {
        ((1u32 << self.bits_per_sample()) - 1) as u16
    }
}

macro_rules! bayer_formats {
    ($($code:ident, $name:literal, $arrangement:ident, $layout:expr;)*) => {
        /// The Bayer family: four arrangements at 8, 10, 12, packed 12 and 16 bits.
        ///
        /// Output scaling is the same for the whole family: RGB with 16 bits
        /// per channel, sensor samples shifted left by `16 - bits`.
        pub const BAYER_FAMILY: &[FormatDescriptor] = &[
            $(FormatDescriptor {
                code: PixelFormatCode::$code,
                name: $name,
                plugin_id: concat!("rs.arvdecode.", $name),
                arrangement: BayerArrangement::$arrangement,
                layout: $layout,
            },)*
        ];
    };
}

bayer_formats! {
    BAYER_GR_8, "BayerGR8", Gr, SampleLayout::Byte8;
    BAYER_RG_8, "BayerRG8", Rg, SampleLayout::Byte8;
    BAYER_GB_8, "BayerGB8", Gb, SampleLayout::Byte8;
    BAYER_BG_8, "BayerBG8", Bg, SampleLayout::Byte8;
    BAYER_GR_10, "BayerGR10", Gr, SampleLayout::Word16 { significant_bits: 10 };
    BAYER_RG_10, "BayerRG10", Rg, SampleLayout::Word16 { significant_bits: 10 };
    BAYER_GB_10, "BayerGB10", Gb, SampleLayout::Word16 { significant_bits: 10 };
    BAYER_BG_10, "BayerBG10", Bg, SampleLayout::Word16 { significant_bits: 10 };
    BAYER_GR_12, "BayerGR12", Gr, SampleLayout::Word16 { significant_bits: 12 };
    BAYER_RG_12, "BayerRG12", Rg, SampleLayout::Word16 { significant_bits: 12 };
    BAYER_GB_12, "BayerGB12", Gb, SampleLayout::Word16 { significant_bits: 12 };
    BAYER_BG_12, "BayerBG12", Bg, SampleLayout::Word16 { significant_bits: 12 };
    BAYER_GR_12_PACKED, "BayerGR12Packed", Gr, SampleLayout::Packed12;
    BAYER_RG_12_PACKED, "BayerRG12Packed", Rg, SampleLayout::Packed12;
    BAYER_GB_12_PACKED, "BayerGB12Packed", Gb, SampleLayout::Packed12;
    BAYER_BG_12_PACKED, "BayerBG12Packed", Bg, SampleLayout::Packed12;
    BAYER_GR_16, "BayerGR16", Gr, SampleLayout::Word16 { significant_bits: 16 };
    BAYER_RG_16, "BayerRG16", Rg, SampleLayout::Word16 { significant_bits: 16 };
    BAYER_GB_16, "BayerGB16", Gb, SampleLayout::Word16 { significant_bits: 16 };
    BAYER_BG_16, "BayerBG16", Bg, SampleLayout::Word16 { significant_bits: 16 };
}

pub fn descriptor_for(code: PixelFormatCode) -> Option<&'static FormatDescriptor> {
    BAYER_FAMILY.iter().find(|d| d.code == code)
}

/// Case-insensitive lookup by name, e.g. `bayerbg10`.
pub fn descriptor_by_name(name: &str) -> Option<&'static FormatDescriptor> {
    BAYER_FAMILY.iter().find(|d| d.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrangement_tags_match_first_row() {
        for arrangement in [
            BayerArrangement::Gr,
            BayerArrangement::Rg,
            BayerArrangement::Gb,
            BayerArrangement::Bg,
        ] {
            let first_row: String = (0..2)
                .map(|col| match arrangement.channel_at(0, col) {
                    Channel::Red => 'R',
                    Channel::Green => 'G',
                    Channel::Blue => 'B',
                })
                .collect();
            assert_eq!(first_row, arrangement.tag());
        }
    }

    #[test]
    fn every_tile_has_one_red_two_green_one_blue() {
        for arrangement in [
            BayerArrangement::Gr,
            BayerArrangement::Rg,
            BayerArrangement::Gb,
            BayerArrangement::Bg,
        ] {
            let mut counts = [0; 3];
            for row in arrangement.channel_grid() {
                for channel in row {
                    counts[channel as usize] += 1;
                }
            }
            assert_eq!(counts, [1, 2, 1]);
        }
    }

    #[test]
    fn frame_len_per_layout() {
        assert_eq!(SampleLayout::Byte8.frame_len(16), Some(16));
        assert_eq!(
            SampleLayout::Word16 { significant_bits: 10 }.frame_len(16),
            Some(32)
        );
        assert_eq!(SampleLayout::Packed12.frame_len(16), Some(24));
        assert_eq!(SampleLayout::Packed12.frame_len(3), Some(5));
        assert_eq!(SampleLayout::Word16 { significant_bits: 16 }.frame_len(usize::MAX), None);
    }

    #[test]
    fn family_codes_are_unique_and_consistent() {
        for (i, a) in BAYER_FAMILY.iter().enumerate() {
            for b in &BAYER_FAMILY[i + 1..] {
                assert_ne!(a.code, b.code);
                assert_ne!(a.plugin_id, b.plugin_id);
            }
            assert!(a.name.contains(a.arrangement.tag()));
        }
        assert_eq!(BAYER_FAMILY.len(), 20);
    }

    #[test]
    fn lookup_by_code_and_name() {
        let bg10 = descriptor_for(PixelFormatCode::BAYER_BG_10).unwrap();
        assert_eq!(bg10.name, "BayerBG10");
        assert_eq!(bg10.plugin_id, "rs.arvdecode.BayerBG10");
        assert_eq!(bg10.max_sample(), 1023);
        assert_eq!(descriptor_by_name("bayergb16").unwrap().code, PixelFormatCode::BAYER_GB_16);
        assert!(descriptor_for(PixelFormatCode(0x0108_0001)).is_none());
    }
}
