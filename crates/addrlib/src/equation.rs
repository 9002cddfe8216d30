//! Swizzle equations: per address bit, up to three coordinate bits XORed
//! together. Built once per (resource type, mode, element size) from the
//! single-fragment pattern; the X channel is in byte units.

use crate::block::{compute_block_dims, MAX_ELEM_LOG2};
use crate::bits::log2;
use crate::pattern::{AddrBitSetting, MAX_PATTERN_BITS, PatInfo, SwizzlePattern, expand_pattern};
use crate::swizzle_mode::SwizzleMode;
use crate::types::{Dim3d, ResourceType};
use thiserror::Error;

/// Most components one address bit may XOR together.
pub const MAX_EQUATION_ITEMS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    X,
    Y,
    Z,
}

impl Channel {
    const fn lane(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

/// One coordinate bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelBit {
    pub channel: Channel,
    pub index: u32,
}

impl ChannelBit {
    pub const fn new(channel: Channel, index: u32) -> Self {
        Self { channel, index }
    }

    #[inline]
    fn eval(self, x: u32, y: u32, z: u32) -> u32 {
        let coord = match self.channel {
            Channel::X => x,
            Channel::Y => y,
            Channel::Z => z,
        };
        coord.checked_shr(self.index).unwrap_or(0) & 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EquationError {
    #[error("address bit {bit} is not one-hot in a non-XOR pattern")]
    NotOneHot { bit: u32 },
    #[error("address bit {bit} has {items} components")]
    TooManyItems { bit: u32, items: u32 },
    #[error("address bit {bit} references a sample bit")]
    SampleComponent { bit: u32 },
    #[error("address bit {bit} could not be resolved")]
    Unresolved { bit: u32 },
    #[error("coordinate bit {0:?} is assigned twice")]
    DoubleAssignment(ChannelBit),
    #[error("{channel:?} covers {actual:#x}, block needs {expected:#x}")]
    Coverage {
        channel: Channel,
        actual: u32,
        expected: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwizzleEquation {
    /// Address bits within the block.
    pub num_bits: u32,
    pub addr: [Option<ChannelBit>; MAX_PATTERN_BITS],
    pub xor1: [Option<ChannelBit>; MAX_PATTERN_BITS],
    pub xor2: [Option<ChannelBit>; MAX_PATTERN_BITS],
}

impl SwizzleEquation {
    fn empty(num_bits: u32) -> Self {
        Self {
            num_bits,
            addr: [None; MAX_PATTERN_BITS],
            xor1: [None; MAX_PATTERN_BITS],
            xor2: [None; MAX_PATTERN_BITS],
        }
    }

    /// Offset inside the block. `x_bytes` is the x coordinate scaled by the
    /// element size.
    pub fn offset(&self, x_bytes: u32, y: u32, z: u32) -> u32 {
        (0..self.num_bits as usize).fold(0, |offset, i| {
            let bit = [self.addr[i], self.xor1[i], self.xor2[i]]
                .into_iter()
                .flatten()
                .fold(0, |v, src| v ^ src.eval(x_bytes, y, z));
            offset | (bit << i)
        })
    }

    /// Highest Y bit XORed into an address bit at or above `from`, with
    /// the address position it lands on.
    pub fn max_y_xor(&self, from: usize) -> Option<(usize, u32)> {
        (from..self.num_bits as usize)
            .flat_map(|pos| [(pos, self.xor1[pos]), (pos, self.xor2[pos])])
            .filter_map(|(pos, src)| match src {
                Some(bit) if bit.channel == Channel::Y => Some((pos, bit.index)),
                _ => None,
            })
            .max_by_key(|&(_, index)| index)
    }
}

fn components(setting: AddrBitSetting, elem_log2: u32, bit: u32) -> Result<Vec<ChannelBit>, EquationError> {
    if setting.s() != 0 {
        return Err(EquationError::SampleComponent { bit });
    }
    let lanes = [
        (Channel::X, setting.x(), elem_log2),
        (Channel::Y, setting.y(), 0),
        (Channel::Z, setting.z(), 0),
    ];
    let mut out = Vec::with_capacity(setting.item_count() as usize);
    for (channel, mut mask, shift) in lanes {
        while mask != 0 {
            let index = mask.trailing_zeros();
            out.push(ChannelBit::new(channel, index + shift));
            mask &= mask - 1;
        }
    }
    Ok(out)
}

fn assign(
    eq: &mut SwizzleEquation,
    assigned: &mut [u32; 3],
    pos: usize,
    bit: ChannelBit,
) -> Result<(), EquationError> {
    let lane = &mut assigned[bit.channel.lane()];
    if *lane & (1 << bit.index) != 0 {
        return Err(EquationError::DoubleAssignment(bit));
    }
    *lane |= 1 << bit.index;
    eq.addr[pos] = Some(bit);
    Ok(())
}

/// Convert a single-fragment pattern into an equation.
///
/// `block_log2` is the block footprint in elements (log2 per axis). Bits
/// that XOR several components are resolved by peeling off components that
/// are already placed or lie outside the block; exactly one must remain.
pub fn convert_pattern_to_equation(
    pattern: &SwizzlePattern,
    elem_log2: u32,
    block_size_log2: u32,
    block_log2: Dim3d,
    is_xor: bool,
) -> Result<SwizzleEquation, EquationError> {
    let mut eq = SwizzleEquation::empty(block_size_log2);
    let mut assigned = [0u32; 3];
    let limits = [block_log2.w + elem_log2, block_log2.h, block_log2.d];

    for i in 0..elem_log2 {
        assign(&mut eq, &mut assigned, i as usize, ChannelBit::new(Channel::X, i))?;
    }

    let mut pending = Vec::new();
    for i in elem_log2..block_size_log2 {
        let comps = components(pattern[i as usize], elem_log2, i)?;
        match comps.len() {
            0 => return Err(EquationError::Unresolved { bit: i }),
            1 => assign(&mut eq, &mut assigned, i as usize, comps[0])?,
            _ if !is_xor => return Err(EquationError::NotOneHot { bit: i }),
            n if n as u32 > MAX_EQUATION_ITEMS => {
                return Err(EquationError::TooManyItems {
                    bit: i,
                    items: n as u32,
                });
            }
            _ => pending.push((i, comps)),
        }
    }

    while !pending.is_empty() {
        let before = pending.len();
        let mut still_pending: Vec<(u32, Vec<ChannelBit>)> = Vec::new();

        for (i, comps) in pending {
            let (free, peeled): (Vec<ChannelBit>, Vec<ChannelBit>) =
                comps.into_iter().partition(|bit| {
                    let lane = bit.channel.lane();
                    bit.index < limits[lane] && assigned[lane] & (1 << bit.index) == 0
                });
            if let [only] = free[..] {
                let pos = i as usize;
                assign(&mut eq, &mut assigned, pos, only)?;
                eq.xor1[pos] = peeled.first().copied();
                eq.xor2[pos] = peeled.get(1).copied();
            } else {
                still_pending.push((i, free.into_iter().chain(peeled).collect()));
            }
        }

        if still_pending.len() == before {
            return Err(EquationError::Unresolved {
                bit: still_pending[0].0,
            });
        }
        pending = still_pending;
    }

    let channels = [Channel::X, Channel::Y, Channel::Z];
    for (lane, channel) in channels.into_iter().enumerate() {
        let expected = (1u32 << limits[lane]) - 1;
        if assigned[lane] != expected {
            return Err(EquationError::Coverage {
                channel,
                actual: assigned[lane],
                expected,
            });
        }
    }
    Ok(eq)
}

const MODE_SLOTS: usize = 28;
const RSRC_SLOTS: usize = 2;
const ELEM_SLOTS: usize = MAX_ELEM_LOG2 as usize + 1;

/// Equations of every valid single-fragment (2D/3D, mode, element size)
/// combination. 1D surfaces share the 2D entries.
#[derive(Debug, Clone, Default)]
pub struct EquationTable {
    equations: Vec<SwizzleEquation>,
    lookup: [[[Option<usize>; ELEM_SLOTS]; MODE_SLOTS]; RSRC_SLOTS],
}

impl EquationTable {
    /// Build from a pattern lookup. Patterns with more than three items per
    /// bit, or that fail conversion, get no equation.
    pub(crate) fn build<F>(pattern_info: F) -> Self
    where
        F: Fn(ResourceType, SwizzleMode, u32) -> Option<&'static PatInfo>,
    {
        let mut table = Self::default();

        for rsrc in [ResourceType::Tex2d, ResourceType::Tex3d] {
            for mode in SwizzleMode::ALL {
                if mode.is_linear() {
                    continue;
                }
                for elem_log2 in 0..=MAX_ELEM_LOG2 {
                    let Some(info) = pattern_info(rsrc, mode, elem_log2) else {
                        continue;
                    };
                    if u32::from(info.max_item_count) > MAX_EQUATION_ITEMS {
                        continue;
                    }
                    if let Some(eq) = Self::convert(rsrc, mode, elem_log2, info) {
                        table.lookup[Self::rsrc_slot(rsrc)][mode.raw() as usize]
                            [elem_log2 as usize] = Some(table.equations.len());
                        table.equations.push(eq);
                    }
                }
            }
        }
        table
    }

    fn convert(rsrc: ResourceType, mode: SwizzleMode, elem_log2: u32, info: &PatInfo) -> Option<SwizzleEquation> {
        let dims = compute_block_dims(rsrc, mode, 8 << elem_log2, 1).ok()?;
        let block_log2 = Dim3d::new(log2(dims.w), log2(dims.h), log2(dims.d));
        let converted = convert_pattern_to_equation(
            &expand_pattern(info),
            elem_log2,
            mode.block_size_log2(),
            block_log2,
            mode.is_xor(),
        );
        if let Err(err) = &converted {
            log::error!("{mode} ({rsrc:?}, elem_log2 {elem_log2}) has no equation: {err}");
        }
        debug_assert!(converted.is_ok(), "pattern/equation mismatch for {mode}");
        converted.ok()
    }

    const fn rsrc_slot(rsrc: ResourceType) -> usize {
        match rsrc {
            ResourceType::Tex1d | ResourceType::Tex2d => 0,
            ResourceType::Tex3d => 1,
        }
    }

    pub fn index(&self, rsrc: ResourceType, mode: SwizzleMode, elem_log2: u32) -> Option<usize> {
        self.lookup[Self::rsrc_slot(rsrc)]
            .get(mode.raw() as usize)?
            .get(elem_log2 as usize)
            .copied()
            .flatten()
    }

    pub fn get(&self, index: usize) -> Option<&SwizzleEquation> {
        self.equations.get(index)
    }

    pub fn len(&self) -> usize {
        self.equations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.equations.is_empty()
    }
}
