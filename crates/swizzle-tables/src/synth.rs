//! Data-surface swizzle pattern synthesis.
//!
//! A pattern starts from the 256B micro-tile order of its family, grows to
//! the full block by alternating axes, and for XOR modes folds pipe and bank
//! hash terms into the interleave bits.

use crate::dims;
use crate::types::Channel::{S, X, Y, Z};
use crate::types::{
    BitSetting, COLUMN_BITS, Channel, CoordBit, Family, MAX_BANK_XOR_BITS, MAX_PATTERN_BITS,
    PIPE_INTERLEAVE_LOG2, Pattern, PatternKey, PipeConfig, XorKind,
};

const MICRO_BLOCK_LOG2: u32 = 8;

type MicroOrder = &'static [(Channel, u32)];

/// Standard micro-tile orders, by element size.
const STANDARD_MICRO: [MicroOrder; 5] = [
    &[(X, 0), (X, 1), (X, 2), (X, 3), (Y, 0), (Y, 1), (Y, 2), (Y, 3)],
    &[(X, 0), (X, 1), (X, 2), (Y, 0), (Y, 1), (Y, 2), (X, 3)],
    &[(X, 0), (X, 1), (Y, 0), (Y, 1), (Y, 2), (X, 2)],
    &[(X, 0), (Y, 0), (Y, 1), (X, 1), (X, 2)],
    &[(X, 0), (Y, 0), (X, 1), (Y, 1)],
];

/// Display micro-tile orders. 8bpp swaps the two low row bits.
const DISPLAY_MICRO: [MicroOrder; 5] = [
    &[(X, 0), (X, 1), (X, 2), (Y, 1), (Y, 0), (Y, 2), (X, 3), (Y, 3)],
    &[(X, 0), (X, 1), (X, 2), (Y, 0), (Y, 1), (Y, 2), (X, 3)],
    &[(X, 0), (X, 1), (X, 2), (Y, 0), (Y, 1), (Y, 2)],
    &[(X, 0), (X, 1), (Y, 0), (X, 2), (Y, 1)],
    &[(X, 0), (Y, 0), (X, 1), (Y, 1)],
];

/// Places coordinate bits one address bit at a time, never exceeding the
/// per-channel bit count of the block.
struct PatternBuilder {
    bits: Pattern,
    pos: u32,
    next: [u32; 4],
    limit: [u32; 4],
}

impl PatternBuilder {
    fn new(start: u32, limit: [u32; 4]) -> Self {
        Self {
            bits: [BitSetting::default(); MAX_PATTERN_BITS],
            pos: start,
            next: [0; 4],
            limit,
        }
    }

    fn place(&mut self, bit: CoordBit) -> Result<(), String> {
        if self.pos as usize >= MAX_PATTERN_BITS {
            return Err(format!("bit {} exceeds the pattern width", self.pos));
        }
        self.bits[self.pos as usize] = BitSetting::from_bit(bit);
        let next = &mut self.next[bit.channel.index()];
        *next = (*next).max(bit.index + 1);
        self.pos += 1;
        Ok(())
    }

    fn push_order(&mut self, order: MicroOrder) -> Result<(), String> {
        for &(channel, index) in order {
            self.place(CoordBit::new(channel, index))?;
        }
        Ok(())
    }

    /// Fill up to (not including) address bit `end`, taking channels from
    /// `cycle` in rotation and skipping any that are already complete.
    fn fill(&mut self, cycle: &[Channel], end: u32) -> Result<(), String> {
        let mut turn = 0;
        while self.pos < end {
            let pick = (0..cycle.len())
                .map(|k| (turn + k) % cycle.len())
                .find(|&slot| self.next[cycle[slot].index()] < self.limit[cycle[slot].index()]);
            let Some(slot) = pick else {
                return Err(format!("ran out of {cycle:?} bits at address bit {}", self.pos));
            };
            let channel = cycle[slot];
            self.place(CoordBit::new(channel, self.next[channel.index()]))?;
            turn = slot + 1;
        }
        Ok(())
    }

    fn finish(self) -> Result<Pattern, String> {
        if self.next != self.limit {
            return Err(format!(
                "placed {:?} coordinate bits, block needs {:?}",
                self.next, self.limit
            ));
        }
        Ok(self.bits)
    }
}

/// Synthesize the pattern row for one element size under one pipe config.
pub fn synthesize(key: &PatternKey, elem_log2: u32, cfg: &PipeConfig) -> Result<Pattern, String> {
    let (mut pattern, dims) = if key.thick {
        synthesize_thick(key, elem_log2)?
    } else {
        synthesize_thin(key, elem_log2)?
    };

    if key.xor != XorKind::None {
        apply_pipe_bank_hash(&mut pattern, key, dims, cfg);
    }
    Ok(pattern)
}

fn synthesize_thin(key: &PatternKey, elem_log2: u32) -> Result<(Pattern, [u32; 3]), String> {
    let frags = key.frag_log2;
    let (w, h) = dims::thin_block_dims_log2(elem_log2, frags, key.block_log2);
    let mut builder = PatternBuilder::new(elem_log2, [w, h, 0, frags]);

    match key.family {
        Family::ZOrder => {
            builder.fill(&[S], elem_log2 + frags)?;
            builder.fill(&[X, Y], MICRO_BLOCK_LOG2)?;
        }
        Family::Standard => builder.push_order(STANDARD_MICRO[elem_log2 as usize])?,
        Family::Display => builder.push_order(DISPLAY_MICRO[elem_log2 as usize])?,
        Family::RenderOpt => {
            builder.fill(&[X, Y], MICRO_BLOCK_LOG2)?;
            builder.fill(&[S], MICRO_BLOCK_LOG2 + frags)?;
        }
    }
    builder.fill(&[Y, X], key.block_log2)?;

    Ok((builder.finish()?, [w, h, 0]))
}

fn synthesize_thick(key: &PatternKey, elem_log2: u32) -> Result<(Pattern, [u32; 3]), String> {
    if key.frag_log2 != 0 {
        return Err("thick blocks are single-fragment".into());
    }
    let (w, h, d) = dims::thick_block_dims_log2(elem_log2, key.block_log2);
    let mut builder = PatternBuilder::new(elem_log2, [w, h, d, 0]);

    match key.family {
        Family::ZOrder => builder.fill(&[Z, X, Y], MICRO_BLOCK_LOG2)?,
        Family::Standard => {
            let (mw, mh, _) = dims::thick_micro_dims_log2(elem_log2);
            builder.fill(&[X], elem_log2 + mw)?;
            builder.fill(&[Y], elem_log2 + mw + mh)?;
            builder.fill(&[Z], MICRO_BLOCK_LOG2)?;
        }
        family => return Err(format!("{family:?} has no thick form")),
    }
    builder.fill(&[X, Y], MICRO_BLOCK_LOG2 + 2)?;
    builder.fill(&[Z, Y, X], key.block_log2)?;

    Ok((builder.finish()?, [w, h, d]))
}

/// Address bits that carry pipe and bank hash terms, pipe bits first.
pub fn hash_positions(block_log2: u32, cfg: &PipeConfig) -> Vec<u32> {
    let pipe_bits = block_log2
        .saturating_sub(PIPE_INTERLEAVE_LOG2)
        .min(cfg.pipes_log2);
    let bank_base = PIPE_INTERLEAVE_LOG2 + cfg.pipes_log2 + COLUMN_BITS;
    let bank_bits = block_log2.saturating_sub(bank_base).min(MAX_BANK_XOR_BITS);

    (0..pipe_bits)
        .map(|p| PIPE_INTERLEAVE_LOG2 + p)
        .chain((0..bank_bits).map(|b| bank_base + b))
        .collect()
}

fn apply_pipe_bank_hash(pattern: &mut Pattern, key: &PatternKey, dims: [u32; 3], cfg: &PipeConfig) {
    let positions = hash_positions(key.block_log2, cfg);

    // In-block donors: the remaining interleave bits, highest first.
    let mut donors: Vec<u32> = (PIPE_INTERLEAVE_LOG2..key.block_log2)
        .rev()
        .filter(|bit| !positions.contains(bit))
        .collect();

    let lanes: &[Channel] = if key.thick { &[X, Y, Z] } else { &[X, Y] };
    // Packers hash on rows first.
    let lane_offset = usize::from(cfg.rb_plus && cfg.pkr_log2 > 0 && !key.thick);

    for (k, &bit) in positions.iter().enumerate() {
        let mut setting = pattern[bit as usize];

        if let Some(slot) = donors.iter().position(|&d| d > bit) {
            let donor = donors.remove(slot);
            setting = setting.xor_with(&pattern[donor as usize]);
        }

        if key.xor == XorKind::Full {
            let step = k + lane_offset;
            let channel = lanes[step % lanes.len()];
            let index = dims[channel.index()] + (step / lanes.len()) as u32;
            setting.toggle(CoordBit::new(channel, index));
        }

        pattern[bit as usize] = setting;
    }

    if key.slice_hash && cfg.rb_plus && cfg.pkr_log2 > 0 {
        if let Some(&first) = positions.first() {
            pattern[first as usize].toggle(CoordBit::new(Z, 0));
        }
    }
}

/// Largest number of components XORed into any one bit.
pub fn max_item_count(pattern: &Pattern) -> u32 {
    pattern.iter().map(BitSetting::item_count).max().unwrap_or(0)
}
