//! Swizzle pattern lookup.
//!
//! Patterns are compiled-in tables produced by the `swizzle-tables` build
//! step. Each row is stored as four deduplicated nibble indices; a row is
//! expanded into one [`AddrBitSetting`] per address bit on demand.

use crate::addr_lib::AddrLib;
use crate::bits::log2;
use crate::config::{ChipSettings, GlobalAddressingParams};
use crate::error::AddrError;
use crate::swizzle_mode::SwizzleMode;
use crate::types::ResourceType;

/// Address bits a pattern row describes.
pub const MAX_PATTERN_BITS: usize = 20;

/// Bank-select bits skipped above the pipe bits.
pub(crate) const COLUMN_BITS: u32 = 2;

/// Most bank bits a pipe/bank XOR covers.
pub(crate) const MAX_BANK_XOR_BITS: u32 = 4;

/// Rows per pipe configuration in the hashed tables, one per element size.
const ROWS_PER_CONFIG: usize = 5;

/// HTile rows per pipe configuration (one per sample count) and CMask rows
/// (one per fmask element size).
const XMASK_ROWS_PER_CONFIG: usize = 4;

/// Compact pattern row: indices into the nibble tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatInfo {
    /// Most coordinate bits XORed into any one address bit.
    pub max_item_count: u8,
    pub nibble01_idx: u16,
    pub nibble2_idx: u16,
    pub nibble3_idx: u16,
    pub nibble4_idx: u16,
}

#[allow(dead_code)]
pub(crate) mod tables {
    use super::PatInfo;
    include!(concat!(env!("OUT_DIR"), "/swizzle_patterns.rs"));
}

/// The coordinate bits XORed together to form one address bit. Lanes are
/// 16-bit masks packed as `x | y << 16 | z << 32 | s << 48`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct AddrBitSetting(u64);

impl AddrBitSetting {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    pub const fn x(self) -> u32 {
        (self.0 & 0xFFFF) as u32
    }

    pub const fn y(self) -> u32 {
        ((self.0 >> 16) & 0xFFFF) as u32
    }

    pub const fn z(self) -> u32 {
        ((self.0 >> 32) & 0xFFFF) as u32
    }

    pub const fn s(self) -> u32 {
        ((self.0 >> 48) & 0xFFFF) as u32
    }

    pub const fn item_count(self) -> u32 {
        self.0.count_ones()
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

pub type SwizzlePattern = [AddrBitSetting; MAX_PATTERN_BITS];

/// Expand a compact row into its per-bit settings.
pub fn expand_pattern(info: &PatInfo) -> SwizzlePattern {
    let mut pattern = [AddrBitSetting::default(); MAX_PATTERN_BITS];
    let n01 = &tables::SW_PATTERN_NIBBLE01[info.nibble01_idx as usize];
    let n2 = &tables::SW_PATTERN_NIBBLE2[info.nibble2_idx as usize];
    let n3 = &tables::SW_PATTERN_NIBBLE3[info.nibble3_idx as usize];
    let n4 = &tables::SW_PATTERN_NIBBLE4[info.nibble4_idx as usize];

    let raw = n01.iter().chain(n2).chain(n3).chain(n4);
    for (slot, &bits) in pattern.iter_mut().zip(raw) {
        *slot = AddrBitSetting::from_raw(bits);
    }
    pattern
}

/// Evaluate the low `num_bits` of a pattern at a coordinate.
pub fn offset_from_pattern(pattern: &SwizzlePattern, num_bits: u32, x: u32, y: u32, z: u32, s: u32) -> u32 {
    pattern
        .iter()
        .take(num_bits as usize)
        .enumerate()
        .fold(0, |offset, (i, bit)| {
            let terms = (bit.x() & x) ^ (bit.y() & y) ^ (bit.z() & z) ^ (bit.s() & s);
            offset | ((terms.count_ones() & 1) << i)
        })
}

/// Row group of the hashed tables matching a pipe configuration.
pub(crate) fn pattern_config_index(
    settings: &ChipSettings,
    params: &GlobalAddressingParams,
) -> Result<usize, AddrError> {
    let pipes = params.pipes_log2 as usize;
    if settings.support_rb_plus {
        let pkr = params.num_pkr_log2 as usize;
        let index = tables::RBPLUS_CONFIG_INDEX
            .get(pipes)
            .and_then(|row| row.get(pkr))
            .copied()
            .unwrap_or(u8::MAX);
        if index == u8::MAX {
            return Err(AddrError::unsupported(format!(
                "no RB+ tables for {pipes} pipe bits and {pkr} packer bits"
            )));
        }
        Ok(usize::from(index))
    } else if pipes < tables::LEGACY_CONFIG_COUNT {
        Ok(pipes)
    } else {
        Err(AddrError::unsupported(format!("no tables for {pipes} pipe bits")))
    }
}

macro_rules! hashed {
    ($rb_plus:expr, $legacy:ident, $rbplus:ident) => {
        if $rb_plus {
            tables::$rbplus
        } else {
            tables::$legacy
        }
    };
}

impl AddrLib {
    /// Table for a mode and fragment count, plus whether rows are grouped
    /// by pipe configuration.
    fn pattern_table(
        &self,
        rsrc: ResourceType,
        mode: SwizzleMode,
        num_frags: u32,
    ) -> Option<(&'static [PatInfo], bool)> {
        use SwizzleMode as M;

        let rb = self.settings.support_rb_plus;
        let frags_log2 = match num_frags {
            0 | 1 => 0,
            2 | 4 | 8 => log2(num_frags),
            _ => return None,
        };

        if frags_log2 > 0 {
            let table = match (mode, frags_log2) {
                (M::Sw64kbZX, 1) => hashed!(rb, SW_64K_Z_X_2XAA_PATINFO, SW_64K_Z_X_2XAA_RBPLUS_PATINFO),
                (M::Sw64kbZX, 2) => hashed!(rb, SW_64K_Z_X_4XAA_PATINFO, SW_64K_Z_X_4XAA_RBPLUS_PATINFO),
                (M::Sw64kbZX, 3) => hashed!(rb, SW_64K_Z_X_8XAA_PATINFO, SW_64K_Z_X_8XAA_RBPLUS_PATINFO),
                (M::Sw64kbRX, 1) => hashed!(rb, SW_64K_R_X_2XAA_PATINFO, SW_64K_R_X_2XAA_RBPLUS_PATINFO),
                (M::Sw64kbRX, 2) => hashed!(rb, SW_64K_R_X_4XAA_PATINFO, SW_64K_R_X_4XAA_RBPLUS_PATINFO),
                (M::Sw64kbRX, 3) => hashed!(rb, SW_64K_R_X_8XAA_PATINFO, SW_64K_R_X_8XAA_RBPLUS_PATINFO),
                _ => return None,
            };
            return (rsrc == ResourceType::Tex2d).then_some((table, true));
        }

        let thick = mode.is_thick(rsrc);
        let entry = match rsrc {
            ResourceType::Tex3d if thick => match mode {
                M::Sw4kbS => (tables::SW_4K_S3_PATINFO, false),
                M::Sw4kbSX => (hashed!(rb, SW_4K_S3_X_PATINFO, SW_4K_S3_X_RBPLUS_PATINFO), true),
                M::Sw64kbS => (tables::SW_64K_S3_PATINFO, false),
                M::Sw64kbST => (hashed!(rb, SW_64K_S3_T_PATINFO, SW_64K_S3_T_RBPLUS_PATINFO), true),
                M::Sw64kbSX => (hashed!(rb, SW_64K_S3_X_PATINFO, SW_64K_S3_X_RBPLUS_PATINFO), true),
                M::Sw64kbZT => (hashed!(rb, SW_64K_Z3_T_PATINFO, SW_64K_Z3_T_RBPLUS_PATINFO), true),
                M::Sw64kbZX => (hashed!(rb, SW_64K_Z3_X_PATINFO, SW_64K_Z3_X_RBPLUS_PATINFO), true),
                _ => return None,
            },
            ResourceType::Tex3d => match mode {
                M::Sw64kbDX => (hashed!(rb, SW_64K_D3_X_PATINFO, SW_64K_D3_X_RBPLUS_PATINFO), true),
                M::Sw64kbRX => (hashed!(rb, SW_64K_R_X_1XAA_PATINFO, SW_64K_R_X_1XAA_RBPLUS_PATINFO), true),
                _ => return None,
            },
            ResourceType::Tex1d | ResourceType::Tex2d => match mode {
                M::Sw256bS => (tables::SW_256_S_PATINFO, false),
                M::Sw256bD => (tables::SW_256_D_PATINFO, false),
                M::Sw4kbS => (tables::SW_4K_S_PATINFO, false),
                M::Sw4kbD => (tables::SW_4K_D_PATINFO, false),
                M::Sw4kbSX => (hashed!(rb, SW_4K_S_X_PATINFO, SW_4K_S_X_RBPLUS_PATINFO), true),
                M::Sw4kbDX => (hashed!(rb, SW_4K_D_X_PATINFO, SW_4K_D_X_RBPLUS_PATINFO), true),
                M::Sw64kbS => (tables::SW_64K_S_PATINFO, false),
                M::Sw64kbD => (tables::SW_64K_D_PATINFO, false),
                M::Sw64kbST => (hashed!(rb, SW_64K_S_T_PATINFO, SW_64K_S_T_RBPLUS_PATINFO), true),
                M::Sw64kbDT => (hashed!(rb, SW_64K_D_T_PATINFO, SW_64K_D_T_RBPLUS_PATINFO), true),
                M::Sw64kbZT => (hashed!(rb, SW_64K_Z_T_PATINFO, SW_64K_Z_T_RBPLUS_PATINFO), true),
                M::Sw64kbSX => (hashed!(rb, SW_64K_S_X_PATINFO, SW_64K_S_X_RBPLUS_PATINFO), true),
                M::Sw64kbDX => (hashed!(rb, SW_64K_D_X_PATINFO, SW_64K_D_X_RBPLUS_PATINFO), true),
                M::Sw64kbZX => (hashed!(rb, SW_64K_Z_X_1XAA_PATINFO, SW_64K_Z_X_1XAA_RBPLUS_PATINFO), true),
                M::Sw64kbRX => (hashed!(rb, SW_64K_R_X_1XAA_PATINFO, SW_64K_R_X_1XAA_RBPLUS_PATINFO), true),
                _ => return None,
            },
        };

        // 1D surfaces only use the standard layouts.
        if rsrc == ResourceType::Tex1d && !mode.is_standard() {
            return None;
        }
        Some(entry)
    }

    /// Compact pattern row for a surface, or `None` for linear modes and
    /// combinations without a table.
    pub fn swizzle_pattern_info(
        &self,
        rsrc: ResourceType,
        mode: SwizzleMode,
        elem_log2: u32,
        num_frags: u32,
    ) -> Option<&'static PatInfo> {
        if elem_log2 as usize >= ROWS_PER_CONFIG {
            return None;
        }
        let (table, hashed) = self.pattern_table(rsrc, mode, num_frags)?;
        let row = if hashed {
            self.config_index * ROWS_PER_CONFIG + elem_log2 as usize
        } else {
            elem_log2 as usize
        };
        table.get(row)
    }

    pub fn swizzle_pattern(
        &self,
        rsrc: ResourceType,
        mode: SwizzleMode,
        elem_log2: u32,
        num_frags: u32,
    ) -> Option<SwizzlePattern> {
        self.swizzle_pattern_info(rsrc, mode, elem_log2, num_frags)
            .map(expand_pattern)
    }

    fn xmask_row(&self, index: u32) -> usize {
        let index = (index as usize).min(XMASK_ROWS_PER_CONFIG - 1);
        self.config_index * XMASK_ROWS_PER_CONFIG + index
    }

    pub(crate) fn htile_pattern(&self, samples_log2: u32) -> SwizzlePattern {
        let table = hashed!(self.settings.support_rb_plus, HTILE_PATINFO, HTILE_RBPLUS_PATINFO);
        expand_pattern(&table[self.xmask_row(samples_log2)])
    }

    pub(crate) fn cmask_pattern(&self, fmask_elem_log2: u32) -> SwizzlePattern {
        let table = hashed!(self.settings.support_rb_plus, CMASK_PATINFO, CMASK_RBPLUS_PATINFO);
        expand_pattern(&table[self.xmask_row(fmask_elem_log2)])
    }

    pub(crate) fn dcc_pattern(&self, elem_log2: u32, pipe_aligned: bool) -> SwizzlePattern {
        let table = hashed!(
            self.settings.support_rb_plus,
            DCC_64K_R_X_PATINFO,
            DCC_64K_R_X_RBPLUS_PATINFO
        );
        let group = self.config_index * 2 + usize::from(pipe_aligned);
        expand_pattern(&table[group * ROWS_PER_CONFIG + elem_log2 as usize])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_parity() {
        let mut pattern = [AddrBitSetting::default(); MAX_PATTERN_BITS];
        pattern[0] = AddrBitSetting::from_raw(0x1);
        pattern[1] = AddrBitSetting::from_raw(0x2 | (0x1 << 16));
        assert_eq!(offset_from_pattern(&pattern, 2, 1, 0, 0, 0), 0b01);
        assert_eq!(offset_from_pattern(&pattern, 2, 2, 1, 0, 0), 0b00);
        assert_eq!(offset_from_pattern(&pattern, 2, 0, 1, 0, 0), 0b10);
        assert_eq!(offset_from_pattern(&pattern, 1, 3, 1, 0, 0), 0b01);
    }

    #[test]
    fn test_lane_accessors() {
        let bit = AddrBitSetting::from_raw(0x4 | (0x8 << 16) | (0x10 << 32) | (0x2 << 48));
        assert_eq!((bit.x(), bit.y(), bit.z(), bit.s()), (0x4, 0x8, 0x10, 0x2));
        assert_eq!(bit.item_count(), 4);
    }

    #[test]
    fn test_nibble_zero_is_empty() {
        assert!(tables::SW_PATTERN_NIBBLE01[0].iter().all(|&v| v == 0));
        assert!(tables::SW_PATTERN_NIBBLE4[0].iter().all(|&v| v == 0));
    }

    #[test]
    fn test_table_shapes() {
        assert_eq!(tables::SW_64K_S_PATINFO.len(), ROWS_PER_CONFIG);
        assert_eq!(
            tables::SW_64K_S_X_PATINFO.len(),
            tables::LEGACY_CONFIG_COUNT * ROWS_PER_CONFIG
        );
        assert_eq!(
            tables::SW_64K_S_X_RBPLUS_PATINFO.len(),
            tables::RBPLUS_CONFIG_COUNT * ROWS_PER_CONFIG
        );
        assert_eq!(
            tables::HTILE_PATINFO.len(),
            tables::LEGACY_CONFIG_COUNT * XMASK_ROWS_PER_CONFIG
        );
        assert_eq!(
            tables::CMASK_RBPLUS_PATINFO.len(),
            tables::RBPLUS_CONFIG_COUNT * XMASK_ROWS_PER_CONFIG
        );
        assert_eq!(
            tables::DCC_64K_R_X_RBPLUS_PATINFO.len(),
            tables::RBPLUS_CONFIG_COUNT * 2 * ROWS_PER_CONFIG
        );
    }
}
