//! Coordinate to byte-address translation for data surfaces.

use crate::addr_lib::AddrLib;
use crate::block::elem_log2;
use crate::error::AddrError;
use crate::pattern::{COLUMN_BITS, MAX_BANK_XOR_BITS, offset_from_pattern};
use crate::types::{SurfaceAddress, SurfaceCoord, SurfaceDescriptor, SurfaceLayout};

impl AddrLib {
    /// Bank XOR bits a block of `blk_log2` bytes can carry.
    pub(crate) fn bank_xor_bits(&self, blk_log2: u32) -> u32 {
        let base = self.params.pipe_interleave_log2 + self.params.pipes_log2 + COLUMN_BITS;
        if blk_log2 > base {
            (blk_log2 - base).min(MAX_BANK_XOR_BITS)
        } else {
            0
        }
    }

    /// Place a surface's pipe/bank XOR onto the interleave bits of a block.
    pub(crate) fn block_pipe_bank_xor(&self, pipe_bank_xor: u32, blk_log2: u32) -> u32 {
        let pipe_mask = (1u32 << self.params.pipes_log2) - 1;
        let bank_mask = ((1u32 << self.bank_xor_bits(blk_log2)) - 1)
            << (self.params.pipes_log2 + COLUMN_BITS);
        let blk_mask = (1u32 << blk_log2) - 1;
        ((pipe_bank_xor & (pipe_mask | bank_mask)) << self.params.pipe_interleave_log2) & blk_mask
    }

    /// Byte address of a coordinate. Computes the layout first; use
    /// [`compute_surface_addr_with_layout`](Self::compute_surface_addr_with_layout)
    /// to translate many coordinates of one surface.
    pub fn compute_surface_addr_from_coord(
        &self,
        desc: &SurfaceDescriptor,
        coord: &SurfaceCoord,
    ) -> Result<SurfaceAddress, AddrError> {
        let layout = self.compute_surface_info(desc)?;
        self.compute_surface_addr_with_layout(desc, &layout, coord)
    }

    /// Byte address of a coordinate, given the surface's layout.
    /// Coordinates are in elements.
    pub fn compute_surface_addr_with_layout(
        &self,
        desc: &SurfaceDescriptor,
        layout: &SurfaceLayout,
        coord: &SurfaceCoord,
    ) -> Result<SurfaceAddress, AddrError> {
        let desc = desc.normalized();
        let mode = desc.swizzle_mode;

        let Some(mip) = layout.mip_info.get(coord.mip_id as usize) else {
            return Err(AddrError::invalid(format!("mip {} out of range", coord.mip_id)));
        };
        if coord.slice >= desc.num_slices || coord.sample >= desc.num_samples {
            return Err(AddrError::invalid(format!(
                "slice {} / sample {} out of range",
                coord.slice, coord.sample
            )));
        }
        let bytes = u64::from(layout.bpp >> 3);

        if mode.is_linear() {
            let addr = layout.slice_size * u64::from(coord.slice)
                + mip.offset
                + (u64::from(coord.y) * u64::from(mip.pitch) + u64::from(coord.x)) * bytes;
            return Ok(SurfaceAddress {
                addr,
                bit_position: 0,
            });
        }

        let rsrc = desc.resource_type;
        let elem_log2 = elem_log2(layout.bpp)?;
        let blk_log2 = mode.block_size_log2();
        let pipe_bank_xor = if mode.is_xor() {
            self.block_pipe_bank_xor(coord.pipe_bank_xor, blk_log2)
        } else {
            0
        };

        let thin = mode.is_thin(rsrc);
        let (slice_size, slice_id) = if thin {
            (layout.slice_size, coord.slice)
        } else {
            (
                layout.slice_size * u64::from(layout.block_slices),
                coord.slice / layout.block_slices,
            )
        };

        let (x, y, z) = if mip.in_mip_tail {
            (
                coord.x + mip.mip_tail_coord_x,
                coord.y + mip.mip_tail_coord_y,
                coord.slice + mip.mip_tail_coord_z,
            )
        } else {
            (coord.x, coord.y, coord.slice)
        };

        let blocks_per_row = u64::from(mip.pitch / layout.block_width);
        let block_index = u64::from(coord.y / layout.block_height) * blocks_per_row
            + u64::from(coord.x / layout.block_width);

        let equation = match layout.equation_index {
            Some(index) if desc.num_frags == 1 => self.equation(index),
            _ => None,
        };
        let offset = match equation {
            Some(eq) => eq.offset(x << elem_log2, y, z),
            None => {
                let pattern = self
                    .swizzle_pattern(rsrc, mode, elem_log2, desc.num_frags)
                    .ok_or_else(|| AddrError::invalid(format!("{mode} has no pattern for this surface")))?;
                offset_from_pattern(&pattern, blk_log2, x, y, z, coord.sample)
            }
        };

        let addr = slice_size * u64::from(slice_id)
            + mip.macro_block_offset
            + (block_index << blk_log2)
            + u64::from(offset ^ pipe_bank_xor);
        Ok(SurfaceAddress {
            addr,
            bit_position: 0,
        })
    }

    /// The inverse translation is not provided by this engine.
    pub fn compute_surface_coord_from_addr(
        &self,
        _desc: &SurfaceDescriptor,
        _addr: u64,
    ) -> Result<SurfaceCoord, AddrError> {
        Err(AddrError::NotImplemented("surface coordinate from address"))
    }
}
