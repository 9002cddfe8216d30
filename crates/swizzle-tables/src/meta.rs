//! Compression metadata pattern synthesis (HTile, CMask, DCC).
//!
//! Metadata patterns address nibbles. They walk pixel coordinates in Morton
//! order, skipping the coordinate bits that fall inside one compressed
//! block, so any prefix of a row covers a whole meta block regardless of
//! its final size.

use crate::dims;
use crate::types::{
    BitSetting, Channel, CoordBit, MAX_PATTERN_BITS, PIPE_INTERLEAVE_LOG2, Pattern, PipeConfig,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaKind {
    /// 4 bytes per 8x8 depth tile.
    Htile,
    /// One nibble per 8x8 color tile.
    Cmask,
    /// One byte per 256B compressed block.
    Dcc,
}

/// Morton sequence over pixel bits, x first, dropping `x < skip_x` and
/// `y < skip_y`.
fn morton_pixels(skip_x: u32, skip_y: u32, count: usize) -> Vec<CoordBit> {
    (0u32..)
        .flat_map(|i| [CoordBit::new(Channel::X, i), CoordBit::new(Channel::Y, i)])
        .filter(|bit| match bit.channel {
            Channel::X => bit.index >= skip_x,
            _ => bit.index >= skip_y,
        })
        .take(count)
        .collect()
}

/// Synthesize one metadata row.
///
/// `elem_log2` is the data element size for DCC, the sample count for
/// HTile and the fmask element size for CMask. The latter two only move the
/// pipe hash, since the pixel grid of an 8x8 tile does not change.
pub fn synthesize_meta(
    kind: MetaKind,
    elem_log2: u32,
    pipe_aligned: bool,
    cfg: &PipeConfig,
) -> Pattern {
    let (lead, skip_x, skip_y) = match kind {
        MetaKind::Htile => (3, 3, 3),
        MetaKind::Cmask => (0, 3, 3),
        MetaKind::Dcc => {
            let (cw, ch) = dims::thin_micro_dims_log2(elem_log2);
            (1, cw, ch)
        }
    };

    let mut pattern = [BitSetting::default(); MAX_PATTERN_BITS];
    let sequence = morton_pixels(skip_x, skip_y, MAX_PATTERN_BITS - lead);
    for (slot, bit) in pattern.iter_mut().skip(lead).zip(sequence) {
        *slot = BitSetting::from_bit(bit);
    }

    if pipe_aligned {
        let linear = pattern;
        for p in 0..cfg.pipes_log2 {
            // Nibble address bit of byte bit `pil + p`.
            let nibble_bit = (PIPE_INTERLEAVE_LOG2 + 1 + p) as usize;
            let mut shift = cfg.pipes_log2 + u32::from(cfg.rb_plus && p < cfg.pkr_log2);
            if kind != MetaKind::Dcc {
                shift += elem_log2;
            }
            let source = nibble_bit + shift as usize;
            if source < MAX_PATTERN_BITS {
                pattern[nibble_bit] = pattern[nibble_bit].xor_with(&linear[source]);
            }
        }
    }
    pattern
}
