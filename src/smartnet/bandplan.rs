//! Band plan classification and channel-to-frequency resolution
//!
//! SmartNet OSW command values double as channel numbers. Whether a command
//! names a traffic channel, and which RF frequency it maps to, depends on the
//! site's band plan: 800 MHz (with standard, splinter and reband variants),
//! 900 MHz, or a linear 400 MHz UHF plan described by four numbers.

use std::fmt;

/// Highest 800 MHz command in the low (851 MHz) block
const LOW_800_MAX: u16 = 0x2CF;

/// Channel ranges per family, inclusive
const CHAN_800: [(u16, u16); 4] = [(0x000, 0x2F7), (0x32F, 0x33F), (0x3BE, 0x3BE), (0x3C1, 0x3FE)];
const CHAN_900_MAX: u16 = 0x1DE;
const UHF_CHANNEL_SPAN: u32 = 380;

/// Band family, taken from the first three characters of the band plan string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BandFamily {
    Band800,
    Band900,
    Uhf400,
    /// Anything else; never yields a channel
    Unrecognized(String),
}

impl BandFamily {
    pub fn from_prefix(prefix: &str) -> Self {
        match prefix {
            "800" => Self::Band800,
            "900" => Self::Band900,
            "400" => Self::Uhf400,
            other => Self::Unrecognized(other.to_string()),
        }
    }
}

impl fmt::Display for BandFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Band800 => write!(f, "800"),
            Self::Band900 => write!(f, "900"),
            Self::Uhf400 => write!(f, "400"),
            Self::Unrecognized(s) => write!(f, "unrecognized({})", s),
        }
    }
}

/// 800 MHz site variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BandSubtype {
    #[default]
    Standard,
    Splinter,
    Reband,
}

impl BandSubtype {
    /// Parse the suffix after the family prefix, e.g. `"_REBAND"` or `":splinter"`.
    ///
    /// Leading `_`, `-` and `:` are stripped and the rest is compared
    /// case-insensitively. Unknown or empty suffixes are `Standard`.
    pub fn from_suffix(suffix: &str) -> Self {
        let token = suffix
            .to_lowercase()
            .trim_start_matches(['_', '-', ':'])
            .to_string();
        match token.as_str() {
            "splinter" => Self::Splinter,
            "reband" => Self::Reband,
            _ => Self::Standard,
        }
    }
}

/// Linear mapping parameters for the 400 MHz UHF family
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UhfParams {
    /// First channel command
    pub offset: u16,
    /// Frequency of the first channel in MHz
    pub base: f64,
    /// Highest frequency in MHz
    pub high: f64,
    /// Channel spacing in MHz
    pub spacing: f64,
}

impl UhfParams {
    /// Exclusive upper command bound for frequency resolution.
    ///
    /// Computed as `offset + high - base / spacing`.
    pub fn high_cmd(&self) -> f64 {
        self.offset as f64 + self.high - self.base / self.spacing
    }
}

/// Band plan for one control channel session
#[derive(Debug, Clone, PartialEq)]
pub struct BandPlan {
    pub family: BandFamily,
    pub subtype: BandSubtype,
    /// Present only for the 400 MHz family
    pub uhf: Option<UhfParams>,
}

impl BandPlan {
    pub fn band_800(subtype: BandSubtype) -> Self {
        Self {
            family: BandFamily::Band800,
            subtype,
            uhf: None,
        }
    }

    pub fn band_900() -> Self {
        Self {
            family: BandFamily::Band900,
            subtype: BandSubtype::Standard,
            uhf: None,
        }
    }

    pub fn uhf_400(params: UhfParams) -> Self {
        Self {
            family: BandFamily::Uhf400,
            subtype: BandSubtype::Standard,
            uhf: Some(params),
        }
    }

    /// Whether `cmd` is a channel number under this plan
    pub fn is_channel(&self, cmd: u16) -> bool {
        match self.family {
            BandFamily::Band800 => CHAN_800.iter().any(|&(lo, hi)| (lo..=hi).contains(&cmd)),
            BandFamily::Band900 => cmd <= CHAN_900_MAX,
            BandFamily::Uhf400 => match self.uhf {
                Some(p) => {
                    let cmd = cmd as u32;
                    let lo = p.offset as u32;
                    cmd >= lo && cmd <= lo + UHF_CHANNEL_SPAN
                }
                None => false,
            },
            BandFamily::Unrecognized(_) => false,
        }
    }

    /// RF frequency of `cmd` in MHz.
    ///
    /// Returns 0.0 for anything [`is_channel`](Self::is_channel) rejects and for
    /// channel numbers outside every documented sub-range.
    pub fn frequency(&self, cmd: u16) -> f64 {
        if !self.is_channel(cmd) {
            return 0.0;
        }
        match self.family {
            BandFamily::Band800 => self.frequency_800(cmd),
            // 900 has a single linear block
            BandFamily::Band900 => 935.0125 + 0.0125 * cmd as f64,
            BandFamily::Uhf400 => match self.uhf {
                Some(p) => {
                    let c = cmd as f64;
                    if cmd >= p.offset && c < p.high_cmd() {
                        p.base + p.spacing * (cmd - p.offset) as f64
                    } else {
                        0.0
                    }
                }
                None => 0.0,
            },
            BandFamily::Unrecognized(_) => 0.0,
        }
    }

    fn frequency_800(&self, cmd: u16) -> f64 {
        let c = cmd as f64;
        match cmd {
            0x000..=LOW_800_MAX => match self.subtype {
                BandSubtype::Reband if (0x1B8..=0x22F).contains(&cmd) => {
                    851.0250 + 0.025 * (c - 0x1B8 as f64)
                }
                BandSubtype::Splinter if cmd <= 0x257 => 851.0000 + 0.025 * c,
                _ => 851.0125 + 0.025 * c,
            },
            0x2D0..=0x2F7 => 866.0000 + 0.025 * (c - 0x2D0 as f64),
            0x32F..=0x33F => 867.0000 + 0.025 * (c - 0x32F as f64),
            0x3BE => 868.9750,
            0x3C1..=0x3FE => 867.4250 + 0.025 * (c - 0x3C1 as f64),
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn uhf() -> BandPlan {
        BandPlan::uhf_400(UhfParams {
            offset: 380,
            base: 406.0,
            high: 420.0,
            spacing: 0.025,
        })
    }

    #[test]
    fn test_standard_800_low_block_is_linear() {
        let plan = BandPlan::band_800(BandSubtype::Standard);
        let mut prev: Option<f64> = None;
        for cmd in 0..=LOW_800_MAX {
            assert!(plan.is_channel(cmd));
            let f = plan.frequency(cmd);
            assert!((f - (851.0125 + 0.025 * cmd as f64)).abs() < EPS);
            if let Some(p) = prev {
                assert!((f - p - 0.025f64).abs() < EPS);
            }
            prev = Some(f);
        }
    }

    #[test]
    fn test_800_channel_boundaries() {
        let plan = BandPlan::band_800(BandSubtype::Standard);
        assert!(plan.is_channel(0x2F7));
        assert!(!plan.is_channel(0x2F8));
        assert!(!plan.is_channel(0x32E));
        assert!(plan.is_channel(0x32F));
        assert!(plan.is_channel(0x33F));
        assert!(!plan.is_channel(0x340));
        assert!(!plan.is_channel(0x3BD));
        assert!(plan.is_channel(0x3BE));
        assert!(!plan.is_channel(0x3BF));
        assert!(!plan.is_channel(0x3C0));
        assert!(plan.is_channel(0x3C1));
        assert!(plan.is_channel(0x3FE));
        assert!(!plan.is_channel(0x3FF));
        assert!(!plan.is_channel(0xFFFF));
    }

    #[test]
    fn test_800_upper_blocks() {
        let plan = BandPlan::band_800(BandSubtype::Standard);
        assert!((plan.frequency(0x2D0) - 866.0).abs() < EPS);
        assert!((plan.frequency(0x2F7) - 866.975).abs() < EPS);
        assert!((plan.frequency(0x32F) - 867.0).abs() < EPS);
        assert!((plan.frequency(0x3BE) - 868.975).abs() < EPS);
        assert!((plan.frequency(0x3C1) - 867.425).abs() < EPS);
        assert_eq!(plan.frequency(0x300), 0.0);
    }

    #[test]
    fn test_reband_and_splinter() {
        let reband = BandPlan::band_800(BandSubtype::Reband);
        assert!((reband.frequency(0x1B8) - 851.025).abs() < EPS);
        assert!((reband.frequency(0x22F) - (851.025 + 0.025 * 119.0)).abs() < EPS);
        // Outside the reband window falls back to the standard formula
        assert!((reband.frequency(0x100) - 857.4125).abs() < EPS);

        let splinter = BandPlan::band_800(BandSubtype::Splinter);
        assert!((splinter.frequency(0) - 851.0).abs() < EPS);
        assert!((splinter.frequency(0x257) - (851.0 + 0.025 * 0x257 as f64)).abs() < EPS);
        assert!((splinter.frequency(0x258) - (851.0125 + 0.025 * 0x258 as f64)).abs() < EPS);
    }

    #[test]
    fn test_900() {
        let plan = BandPlan::band_900();
        assert!(plan.is_channel(0x1DE));
        assert!(!plan.is_channel(0x1DF));
        assert!((plan.frequency(0) - 935.0125).abs() < EPS);
        assert!((plan.frequency(0x10) - 935.2125).abs() < EPS);
    }

    #[test]
    fn test_uhf_linear_mapping() {
        let plan = uhf();
        assert!(!plan.is_channel(379));
        assert!(plan.is_channel(380));
        assert!(plan.is_channel(760));
        assert!(!plan.is_channel(761));

        // high_cmd = 380 + 420 - 406 / 0.025 = -15440, so nothing resolves
        assert_eq!(plan.frequency(380), 0.0);

        let params = UhfParams {
            offset: 10,
            base: 1.0,
            high: 400.0,
            spacing: 1.0,
        };
        assert!((params.high_cmd() - 409.0).abs() < EPS);
        let wide = BandPlan::uhf_400(params);
        assert!((wide.frequency(10) - 1.0).abs() < EPS);
        assert!((wide.frequency(20) - 11.0).abs() < EPS);
        assert_eq!(wide.frequency(9), 0.0);
        assert_eq!(wide.frequency(409), 0.0);
    }

    #[test]
    fn test_unrecognized_family_is_never_a_channel() {
        let plan = BandPlan {
            family: BandFamily::from_prefix("700"),
            subtype: BandSubtype::Standard,
            uhf: None,
        };
        for cmd in [0u16, 0x100, 0x2F7, 0x3BE, 0xFFFF] {
            assert!(!plan.is_channel(cmd));
            assert_eq!(plan.frequency(cmd), 0.0);
        }
    }

    #[test]
    fn test_subtype_suffix_parsing() {
        assert_eq!(BandSubtype::from_suffix(""), BandSubtype::Standard);
        assert_eq!(BandSubtype::from_suffix("_reband"), BandSubtype::Reband);
        assert_eq!(BandSubtype::from_suffix("-:SPLINTER"), BandSubtype::Splinter);
        assert_eq!(BandSubtype::from_suffix("_std"), BandSubtype::Standard);
        assert_eq!(BandSubtype::from_suffix("reband "), BandSubtype::Standard);
    }

    #[test]
    fn test_non_channels_resolve_to_zero() {
        let wide = BandPlan::uhf_400(UhfParams {
            offset: 0,
            base: 1.0,
            high: 2000.0,
            spacing: 1.0,
        });
        for plan in [BandPlan::band_800(BandSubtype::Reband), BandPlan::band_900(), wide] {
            for cmd in 0..=0x7FFu16 {
                let f = plan.frequency(cmd);
                if !plan.is_channel(cmd) {
                    assert_eq!(f, 0.0, "{} cmd {:#x}", plan.family, cmd);
                }
                if f > 0.0 {
                    assert!(plan.is_channel(cmd));
                }
            }
        }
    }
}
