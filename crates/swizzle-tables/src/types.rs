/// Number of address bits a pattern row can describe.
pub const MAX_PATTERN_BITS: usize = 20;

/// Pipe interleave granularity (256 bytes), the only one the tables model.
pub const PIPE_INTERLEAVE_LOG2: u32 = 8;

/// Column bits between the pipe and bank fields of the interleave.
pub const COLUMN_BITS: u32 = 2;

/// Upper bound on bank XOR bits.
pub const MAX_BANK_XOR_BITS: u32 = 4;

/// Element sizes covered by every row group: 1, 2, 4, 8 and 16 bytes.
pub const ELEM_LOG2_COUNT: u32 = 5;

/// HTile rows per configuration (sample counts 1 to 8) and CMask rows
/// (fmask element sizes 1 to 8 bytes).
pub const XMASK_ROW_COUNT: u32 = 4;

/// Source coordinate of one pattern component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    X,
    Y,
    Z,
    S,
}

impl Channel {
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// A single coordinate bit, `index` counted in elements (x), rows (y),
/// slices (z) or samples (s).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoordBit {
    pub channel: Channel,
    pub index: u32,
}

impl CoordBit {
    pub const fn new(channel: Channel, index: u32) -> Self {
        Self { channel, index }
    }
}

/// One output address bit: the coordinate bits XORed together to form it.
///
/// Each channel is a 16-bit mask, packed as `x | y << 16 | z << 32 | s << 48`
/// in the raw form consumed by the addressing library.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BitSetting {
    pub x: u16,
    pub y: u16,
    pub z: u16,
    pub s: u16,
}

impl BitSetting {
    pub fn from_bit(bit: CoordBit) -> Self {
        let mut setting = Self::default();
        setting.toggle(bit);
        setting
    }

    fn lane_mut(&mut self, channel: Channel) -> &mut u16 {
        match channel {
            Channel::X => &mut self.x,
            Channel::Y => &mut self.y,
            Channel::Z => &mut self.z,
            Channel::S => &mut self.s,
        }
    }

    /// Flip one coordinate bit in or out of the XOR set.
    pub fn toggle(&mut self, bit: CoordBit) {
        debug_assert!(bit.index < 16, "coordinate bit {bit:?} does not fit a lane");
        *self.lane_mut(bit.channel) ^= 1 << bit.index;
    }

    pub fn xor_with(self, other: &BitSetting) -> Self {
        Self {
            x: self.x ^ other.x,
            y: self.y ^ other.y,
            z: self.z ^ other.z,
            s: self.s ^ other.s,
        }
    }

    pub fn item_count(&self) -> u32 {
        self.x.count_ones() + self.y.count_ones() + self.z.count_ones() + self.s.count_ones()
    }

    pub fn is_empty(&self) -> bool {
        self.item_count() == 0
    }

    pub fn to_raw(&self) -> u64 {
        u64::from(self.x)
            | (u64::from(self.y) << 16)
            | (u64::from(self.z) << 32)
            | (u64::from(self.s) << 48)
    }
}

/// A full pattern row, bit 0 first.
pub type Pattern = [BitSetting; MAX_PATTERN_BITS];

/// Micro-tile ordering family of a swizzle mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Standard,
    Display,
    ZOrder,
    RenderOpt,
}

/// Hash terms folded into the pipe/bank bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XorKind {
    /// Plain tiling, every bit one-hot.
    None,
    /// Partially-resident (`_T`) modes: in-block terms only.
    Prt,
    /// Full XOR (`_X`) modes: in-block plus out-of-block terms.
    Full,
}

/// Everything that determines one pattern table, apart from the pipe
/// configuration row and element size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternKey {
    pub family: Family,
    pub xor: XorKind,
    pub thick: bool,
    pub block_log2: u32,
    pub frag_log2: u32,
    /// Fold slice bit 0 into the first pipe bit when packers are present.
    pub slice_hash: bool,
}

impl PatternKey {
    pub const fn thin(family: Family, xor: XorKind, block_log2: u32) -> Self {
        Self {
            family,
            xor,
            thick: false,
            block_log2,
            frag_log2: 0,
            slice_hash: false,
        }
    }

    pub const fn thick(family: Family, xor: XorKind, block_log2: u32) -> Self {
        Self {
            thick: true,
            ..Self::thin(family, xor, block_log2)
        }
    }

    pub const fn with_frags(self, frag_log2: u32) -> Self {
        Self { frag_log2, ..self }
    }

    pub const fn with_slice_hash(self) -> Self {
        Self {
            slice_hash: true,
            ..self
        }
    }
}

/// Pipe configuration a row group is synthesized for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipeConfig {
    pub rb_plus: bool,
    pub pipes_log2: u32,
    pub pkr_log2: u32,
}

/// Legacy parts: one row group per pipe count, 1 to 64 pipes.
pub fn legacy_configs() -> Vec<PipeConfig> {
    (0..=6)
        .map(|pipes_log2| PipeConfig {
            rb_plus: false,
            pipes_log2,
            pkr_log2: 0,
        })
        .collect()
}

/// RB+ parts: one row group per (pipes, packers) pair with packers <= pipes,
/// ordered pipes-major.
pub fn rb_plus_configs() -> Vec<PipeConfig> {
    (0..=4)
        .flat_map(|pipes_log2| {
            (0..=pipes_log2).map(move |pkr_log2| PipeConfig {
                rb_plus: true,
                pipes_log2,
                pkr_log2,
            })
        })
        .collect()
}

/// A named table of synthesized rows, ready for emission.
#[derive(Debug, Clone)]
pub struct PatternTable {
    /// Rust identifier of the generated static.
    pub name: String,
    pub rows: Vec<Pattern>,
}

/// Configuration for writing the generated table source (used by build.rs).
#[derive(Debug, Clone)]
pub struct TableBuildConfig {
    /// Output directory, typically `OUT_DIR`.
    pub out_dir: std::path::PathBuf,
    /// File name of the generated Rust source.
    pub file_name: String,
}

/// Summary of a generated table source file.
#[derive(Debug, Clone)]
pub struct GeneratedTables {
    pub path: std::path::PathBuf,
    pub table_count: usize,
    pub row_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_packing() {
        let mut setting = BitSetting::from_bit(CoordBit::new(Channel::X, 3));
        setting.toggle(CoordBit::new(Channel::Y, 1));
        setting.toggle(CoordBit::new(Channel::S, 0));
        assert_eq!(setting.to_raw(), 0x8 | (0x2 << 16) | (0x1 << 48));
        assert_eq!(setting.item_count(), 3);
    }

    #[test]
    fn test_rb_plus_configs_are_triangular() {
        let configs = rb_plus_configs();
        assert_eq!(configs.len(), 15);
        assert!(configs.iter().all(|c| c.pkr_log2 <= c.pipes_log2));
        assert_eq!(legacy_configs().len(), 7);
    }
}
