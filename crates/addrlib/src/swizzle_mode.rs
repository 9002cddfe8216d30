//! Swizzle (tiling) modes and the mode sets used for validation and
//! preferred-setting selection.

use crate::types::ResourceType;

/// Hardware swizzle mode. Discriminants are the values programmed into
/// resource descriptors.
///
/// The gaps (12–15, 28–31) are variable-block modes that gfx10 does not
/// expose. `Sw256bR`, `Sw4kbZ`, `Sw4kbR`, `Sw64kbZ`, `Sw64kbR`, `Sw64kbRT`,
/// `Sw4kbZX` and `Sw4kbRX` are encodable but not addressable on gfx10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum SwizzleMode {
    Linear = 0,
    Sw256bS = 1,
    Sw256bD = 2,
    Sw256bR = 3,
    Sw4kbZ = 4,
    Sw4kbS = 5,
    Sw4kbD = 6,
    Sw4kbR = 7,
    Sw64kbZ = 8,
    Sw64kbS = 9,
    Sw64kbD = 10,
    Sw64kbR = 11,
    Sw64kbZT = 16,
    Sw64kbST = 17,
    Sw64kbDT = 18,
    Sw64kbRT = 19,
    Sw4kbZX = 20,
    Sw4kbSX = 21,
    Sw4kbDX = 22,
    Sw4kbRX = 23,
    Sw64kbZX = 24,
    Sw64kbSX = 25,
    Sw64kbDX = 26,
    Sw64kbRX = 27,
    LinearGeneral = 32,
}

impl SwizzleMode {
    pub const ALL: [SwizzleMode; 25] = [
        Self::Linear,
        Self::Sw256bS,
        Self::Sw256bD,
        Self::Sw256bR,
        Self::Sw4kbZ,
        Self::Sw4kbS,
        Self::Sw4kbD,
        Self::Sw4kbR,
        Self::Sw64kbZ,
        Self::Sw64kbS,
        Self::Sw64kbD,
        Self::Sw64kbR,
        Self::Sw64kbZT,
        Self::Sw64kbST,
        Self::Sw64kbDT,
        Self::Sw64kbRT,
        Self::Sw4kbZX,
        Self::Sw4kbSX,
        Self::Sw4kbDX,
        Self::Sw4kbRX,
        Self::Sw64kbZX,
        Self::Sw64kbSX,
        Self::Sw64kbDX,
        Self::Sw64kbRX,
        Self::LinearGeneral,
    ];

    /// Decode a descriptor value.
    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| *mode as u32 == raw)
    }

    pub const fn raw(self) -> u32 {
        self as u32
    }

    pub const fn is_linear(self) -> bool {
        matches!(self, Self::Linear | Self::LinearGeneral)
    }

    pub const fn is_block_256b(self) -> bool {
        matches!(self, Self::Sw256bS | Self::Sw256bD | Self::Sw256bR)
    }

    pub const fn is_block_4kb(self) -> bool {
        matches!(
            self,
            Self::Sw4kbZ
                | Self::Sw4kbS
                | Self::Sw4kbD
                | Self::Sw4kbR
                | Self::Sw4kbZX
                | Self::Sw4kbSX
                | Self::Sw4kbDX
                | Self::Sw4kbRX
        )
    }

    pub const fn is_block_64kb(self) -> bool {
        !self.is_linear() && !self.is_block_256b() && !self.is_block_4kb()
    }

    /// Log2 of the swizzle block in bytes; 0 for linear modes.
    pub const fn block_size_log2(self) -> u32 {
        if self.is_linear() {
            0
        } else if self.is_block_256b() {
            8
        } else if self.is_block_4kb() {
            12
        } else {
            16
        }
    }

    // Non-linear modes cycle Z, S, D, R in their low two bits.
    const fn kind_bits(self) -> u32 {
        self as u32 & 3
    }

    pub const fn is_z_order(self) -> bool {
        !self.is_linear() && self.kind_bits() == 0
    }

    pub const fn is_standard(self) -> bool {
        !self.is_linear() && self.kind_bits() == 1
    }

    pub const fn is_display(self) -> bool {
        !self.is_linear() && self.kind_bits() == 2
    }

    /// Render-optimized ("rotated") ordering.
    pub const fn is_rt_opt(self) -> bool {
        !self.is_linear() && self.kind_bits() == 3
    }

    /// Partially-resident (`_T`) modes.
    pub const fn is_prt(self) -> bool {
        matches!(
            self,
            Self::Sw64kbZT | Self::Sw64kbST | Self::Sw64kbDT | Self::Sw64kbRT
        )
    }

    /// Any mode with pipe/bank hashing, `_T` or `_X`.
    pub const fn is_xor(self) -> bool {
        (self as u32) >= 16 && (self as u32) <= 27
    }

    pub const fn is_non_prt_xor(self) -> bool {
        self.is_xor() && !self.is_prt()
    }

    /// Thick modes keep a 3-D block footprint. Only 3-D Z and S modes do.
    pub const fn is_thick(self, rsrc: ResourceType) -> bool {
        matches!(rsrc, ResourceType::Tex3d) && (self.is_z_order() || self.is_standard())
    }

    pub const fn is_thin(self, rsrc: ResourceType) -> bool {
        !self.is_thick(rsrc)
    }
}

impl std::fmt::Display for SwizzleMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Linear => "LINEAR",
            Self::Sw256bS => "256B_S",
            Self::Sw256bD => "256B_D",
            Self::Sw256bR => "256B_R",
            Self::Sw4kbZ => "4KB_Z",
            Self::Sw4kbS => "4KB_S",
            Self::Sw4kbD => "4KB_D",
            Self::Sw4kbR => "4KB_R",
            Self::Sw64kbZ => "64KB_Z",
            Self::Sw64kbS => "64KB_S",
            Self::Sw64kbD => "64KB_D",
            Self::Sw64kbR => "64KB_R",
            Self::Sw64kbZT => "64KB_Z_T",
            Self::Sw64kbST => "64KB_S_T",
            Self::Sw64kbDT => "64KB_D_T",
            Self::Sw64kbRT => "64KB_R_T",
            Self::Sw4kbZX => "4KB_Z_X",
            Self::Sw4kbSX => "4KB_S_X",
            Self::Sw4kbDX => "4KB_D_X",
            Self::Sw4kbRX => "4KB_R_X",
            Self::Sw64kbZX => "64KB_Z_X",
            Self::Sw64kbSX => "64KB_S_X",
            Self::Sw64kbDX => "64KB_D_X",
            Self::Sw64kbRX => "64KB_R_X",
            Self::LinearGeneral => "LINEAR_GENERAL",
        };
        f.write_str(name)
    }
}

/// A set of swizzle modes, one bit per mode value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SwModeSet(u64);

impl SwModeSet {
    pub const EMPTY: Self = Self(0);

    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    pub const fn of(modes: &[SwizzleMode]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < modes.len() {
            bits |= 1 << modes[i] as u32;
            i += 1;
        }
        Self(bits)
    }

    pub const fn contains(self, mode: SwizzleMode) -> bool {
        self.0 & (1 << mode as u32) != 0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn intersect(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    /// The mode with the highest value in the set.
    pub fn highest(self) -> Option<SwizzleMode> {
        if self.0 == 0 {
            return None;
        }
        SwizzleMode::from_raw(63 - self.0.leading_zeros())
    }

    pub fn iter(self) -> impl Iterator<Item = SwizzleMode> {
        SwizzleMode::ALL
            .into_iter()
            .filter(move |mode| self.contains(*mode))
    }
}

use SwizzleMode as M;

pub const LINEAR_MASK: SwModeSet = SwModeSet::of(&[M::Linear]);

/// Byte-pitched linear; never chosen by the selector.
pub const LINEAR_GENERAL_MASK: SwModeSet = SwModeSet::of(&[M::LinearGeneral]);

pub const BLK256B_MASK: SwModeSet = SwModeSet::of(&[M::Sw256bS, M::Sw256bD]);

pub const BLK4KB_MASK: SwModeSet =
    SwModeSet::of(&[M::Sw4kbS, M::Sw4kbD, M::Sw4kbSX, M::Sw4kbDX]);

pub const BLK64KB_MASK: SwModeSet = SwModeSet::of(&[
    M::Sw64kbS,
    M::Sw64kbD,
    M::Sw64kbZT,
    M::Sw64kbST,
    M::Sw64kbDT,
    M::Sw64kbZX,
    M::Sw64kbSX,
    M::Sw64kbDX,
    M::Sw64kbRX,
]);

pub const Z_MASK: SwModeSet = SwModeSet::of(&[M::Sw64kbZT, M::Sw64kbZX]);

pub const STANDARD_MASK: SwModeSet = SwModeSet::of(&[
    M::Sw256bS,
    M::Sw4kbS,
    M::Sw64kbS,
    M::Sw64kbST,
    M::Sw4kbSX,
    M::Sw64kbSX,
]);

pub const DISPLAY_MASK: SwModeSet = SwModeSet::of(&[
    M::Sw256bD,
    M::Sw4kbD,
    M::Sw64kbD,
    M::Sw64kbDT,
    M::Sw4kbDX,
    M::Sw64kbDX,
]);

pub const RENDER_MASK: SwModeSet = SwModeSet::of(&[M::Sw64kbRX]);

pub const X_MASK: SwModeSet = SwModeSet::of(&[
    M::Sw4kbSX,
    M::Sw4kbDX,
    M::Sw64kbZX,
    M::Sw64kbSX,
    M::Sw64kbDX,
    M::Sw64kbRX,
]);

pub const T_MASK: SwModeSet = SwModeSet::of(&[M::Sw64kbZT, M::Sw64kbST, M::Sw64kbDT]);

pub const XOR_MASK: SwModeSet = X_MASK.union(T_MASK);

pub const RSRC_1D_MASK: SwModeSet = LINEAR_MASK
    .union(LINEAR_GENERAL_MASK)
    .union(STANDARD_MASK);

pub const RSRC_2D_MASK: SwModeSet = LINEAR_MASK
    .union(LINEAR_GENERAL_MASK)
    .union(BLK256B_MASK)
    .union(BLK4KB_MASK)
    .union(BLK64KB_MASK);

pub const RSRC_3D_MASK: SwModeSet = SwModeSet::of(&[
    M::Linear,
    M::LinearGeneral,
    M::Sw4kbS,
    M::Sw64kbS,
    M::Sw64kbZT,
    M::Sw64kbST,
    M::Sw4kbSX,
    M::Sw64kbZX,
    M::Sw64kbSX,
    M::Sw64kbDX,
    M::Sw64kbRX,
]);

pub const RSRC_2D_PRT_MASK: SwModeSet = BLK4KB_MASK.union(BLK64KB_MASK).without(X_MASK);

pub const RSRC_3D_PRT_MASK: SwModeSet = RSRC_2D_PRT_MASK.intersect(RSRC_3D_MASK);

/// 3-D modes addressed slice by slice.
pub const RSRC_3D_THIN_MASK: SwModeSet = SwModeSet::of(&[M::Sw64kbDX, M::Sw64kbRX]);

pub const RSRC_3D_THICK_4KB_MASK: SwModeSet = SwModeSet::of(&[M::Sw4kbS, M::Sw4kbSX]);

pub const RSRC_3D_THICK_64KB_MASK: SwModeSet = SwModeSet::of(&[
    M::Sw64kbS,
    M::Sw64kbZT,
    M::Sw64kbST,
    M::Sw64kbZX,
    M::Sw64kbSX,
]);

pub const RSRC_3D_THICK_MASK: SwModeSet = RSRC_3D_THICK_4KB_MASK.union(RSRC_3D_THICK_64KB_MASK);

/// Modes with multi-fragment pattern tables.
pub const MSAA_MASK: SwModeSet = SwModeSet::of(&[M::Sw64kbZX, M::Sw64kbRX]);

/// Scan-out capable modes on DCN 2.0 displays, 64bpp surfaces.
pub const DCN20_BPP64_MASK: SwModeSet = SwModeSet::of(&[
    M::Linear,
    M::Sw4kbD,
    M::Sw4kbDX,
    M::Sw64kbD,
    M::Sw64kbDT,
    M::Sw64kbDX,
]);

/// Scan-out capable modes on DCN 2.0 displays, other depths.
pub const DCN20_NON_BPP64_MASK: SwModeSet = SwModeSet::of(&[
    M::Linear,
    M::Sw4kbS,
    M::Sw4kbSX,
    M::Sw64kbS,
    M::Sw64kbST,
    M::Sw64kbSX,
    M::Sw64kbRX,
]);

/// Scan-out capable modes on DCN 2.1 and later.
pub const DCN21_MASK: SwModeSet = SwModeSet::of(&[
    M::Linear,
    M::Sw4kbS,
    M::Sw4kbSX,
    M::Sw64kbS,
    M::Sw64kbST,
    M::Sw64kbSX,
    M::Sw64kbD,
    M::Sw64kbDT,
    M::Sw64kbDX,
    M::Sw64kbRX,
]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates() {
        assert!(M::Sw64kbSX.is_standard() && M::Sw64kbSX.is_non_prt_xor());
        assert!(M::Sw64kbZT.is_xor() && !M::Sw64kbZT.is_non_prt_xor());
        assert!(M::Sw64kbRX.is_rt_opt());
        assert!(!M::Linear.is_z_order());
        assert_eq!(M::Sw4kbDX.block_size_log2(), 12);
        assert_eq!(M::Sw256bS.block_size_log2(), 8);
        assert_eq!(M::Sw64kbZT.block_size_log2(), 16);
        assert!(M::Sw64kbSX.is_thick(ResourceType::Tex3d));
        assert!(M::Sw64kbDX.is_thin(ResourceType::Tex3d));
        assert!(M::Sw64kbSX.is_thin(ResourceType::Tex2d));
    }

    #[test]
    fn test_mask_layout() {
        assert_eq!(BLK64KB_MASK.len(), 9);
        assert!(RSRC_2D_PRT_MASK.contains(M::Sw64kbZT));
        assert!(!RSRC_2D_PRT_MASK.contains(M::Sw64kbZX));
        assert_eq!(RSRC_3D_PRT_MASK, SwModeSet::of(&[M::Sw4kbS, M::Sw64kbS, M::Sw64kbZT, M::Sw64kbST]));
        let linear = LINEAR_MASK.union(LINEAR_GENERAL_MASK);
        assert!(RSRC_3D_THICK_MASK.union(RSRC_3D_THIN_MASK).union(linear) == RSRC_3D_MASK);
        assert_eq!(RSRC_2D_MASK.without(LINEAR_GENERAL_MASK).highest(), Some(M::Sw64kbRX));
        for rsrc in [RSRC_1D_MASK, RSRC_2D_MASK, RSRC_3D_MASK] {
            assert!(rsrc.contains(M::LinearGeneral));
        }
        assert!(!LINEAR_MASK.contains(M::LinearGeneral));
    }

    #[test]
    fn test_from_raw_round_trip() {
        for mode in SwizzleMode::ALL {
            assert_eq!(SwizzleMode::from_raw(mode.raw()), Some(mode));
        }
        assert_eq!(SwizzleMode::from_raw(12), None);
    }
}
