//! Pipe/bank XOR values that spread surfaces over channels and banks.

use crate::addr_lib::AddrLib;
use crate::bits::reverse_bits;
use crate::error::AddrError;
use crate::pattern::COLUMN_BITS;
use crate::swizzle_mode::SwizzleMode;

/// Bank rotation sequences, indexed by bank XOR bit count minus one.
const XOR_BANK_ROT: [[u32; 8]; 4] = [
    [0, 1, 0, 1, 0, 1, 0, 1],
    [0, 2, 1, 3, 2, 0, 3, 1],
    [0, 4, 2, 6, 1, 5, 3, 7],
    [0, 8, 4, 12, 2, 10, 6, 14],
];

impl AddrLib {
    /// Pipe XOR bits a block of `blk_log2` bytes can carry.
    pub(crate) fn pipe_xor_bits(&self, blk_log2: u32) -> u32 {
        blk_log2
            .saturating_sub(self.params.pipe_interleave_log2)
            .min(self.params.pipes_log2)
    }

    /// Base pipe/bank XOR of the `surf_index`-th surface.
    ///
    /// Consecutive surfaces rotate through the banks of a 64KB block. Modes
    /// without a non-PRT XOR get zero.
    pub fn compute_pipe_bank_xor(&self, surf_index: u32, mode: SwizzleMode) -> Result<u32, AddrError> {
        if !mode.is_non_prt_xor() {
            return Ok(0);
        }
        let blk_log2 = mode.block_size_log2();
        let bank_bits = self.bank_xor_bits(blk_log2);
        if bank_bits == 0 || blk_log2 != 16 {
            return Ok(0);
        }
        let rot = &XOR_BANK_ROT[(bank_bits - 1) as usize];
        Ok(rot[(surf_index % 8) as usize] << (self.params.pipes_log2 + COLUMN_BITS))
    }

    /// Pipe/bank XOR of one slice of an array surface: the base value with
    /// the bit-reversed slice index folded into the pipe bits.
    pub fn compute_slice_pipe_bank_xor(
        &self,
        mode: SwizzleMode,
        base_pipe_bank_xor: u32,
        slice: u32,
    ) -> Result<u32, AddrError> {
        if !mode.is_non_prt_xor() {
            return Err(AddrError::invalid(format!("{mode} has no slice XOR")));
        }
        let pipe_bits = self.pipe_xor_bits(mode.block_size_log2());
        Ok(base_pipe_bank_xor ^ reverse_bits(slice, pipe_bits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addr_lib::LibCreateInput;
    use crate::config::{ChipFamily, revision};

    fn lib() -> AddrLib {
        AddrLib::new(&LibCreateInput {
            chip_family: ChipFamily::Navi,
            chip_revision: revision::NAVI10,
            gb_addr_config: 0x2,
        })
        .unwrap()
    }

    #[test]
    fn test_bank_rotation() {
        let lib = lib();
        let xors: Vec<u32> = (0..9)
            .map(|i| lib.compute_pipe_bank_xor(i, SwizzleMode::Sw64kbSX).unwrap())
            .collect();
        assert_eq!(xors, [0, 0x80, 0x40, 0xc0, 0x20, 0xa0, 0x60, 0xe0, 0]);
    }

    #[test]
    fn test_no_xor_without_bank_bits() {
        let lib = lib();
        assert_eq!(lib.compute_pipe_bank_xor(3, SwizzleMode::Sw4kbSX).unwrap(), 0);
        assert_eq!(lib.compute_pipe_bank_xor(3, SwizzleMode::Sw64kbS).unwrap(), 0);
        assert_eq!(lib.compute_pipe_bank_xor(3, SwizzleMode::Sw64kbZT).unwrap(), 0);
    }

    #[test]
    fn test_slice_xor_reverses_pipe_bits() {
        let lib = lib();
        let mode = SwizzleMode::Sw64kbRX;
        assert_eq!(lib.compute_slice_pipe_bank_xor(mode, 0, 1).unwrap(), 0b10);
        assert_eq!(lib.compute_slice_pipe_bank_xor(mode, 0, 2).unwrap(), 0b01);
        assert_eq!(lib.compute_slice_pipe_bank_xor(mode, 0x80, 3).unwrap(), 0x83);
        assert!(lib.compute_slice_pipe_bank_xor(SwizzleMode::Sw64kbR, 0, 1).is_err());
    }
}
