//! Compression metadata surfaces: HTile (depth), CMask (fmask) and DCC
//! (color). Each is laid out in meta blocks sized by
//! [`AddrLib::meta_block_size`] and addressed through a nibble pattern.

use crate::addr_lib::AddrLib;
use crate::bits::{log2, pow2_align};
use crate::block::{MetaBlockSize, blk256_size_log2, elem_log2};
use crate::error::AddrError;
use crate::layout::{MAX_IMAGE_DIM, MAX_MIP_LEVELS, mip_size};
use crate::pattern::{SwizzlePattern, offset_from_pattern};
use crate::swizzle_mode::SwizzleMode;
use crate::types::{Dim3d, ResourceType, SurfaceAddress, SurfaceDescriptor, SurfaceLayout};

/// The data a meta surface describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaDataKind {
    Color,
    DepthStencil,
    Fmask,
}

/// Input to the HTile, CMask and DCC queries. Dimensions are those of the
/// data surface, in elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetaSurfaceDescriptor {
    pub pipe_aligned: bool,
    pub resource_type: ResourceType,
    pub swizzle_mode: SwizzleMode,
    /// Data element size; only DCC reads it.
    pub bpp: u32,
    pub unaligned_width: u32,
    pub unaligned_height: u32,
    pub num_slices: u32,
    pub num_samples: u32,
    pub num_frags: u32,
    pub num_mip_levels: u32,
    pub first_mip_id_in_tail: u32,
}

impl MetaSurfaceDescriptor {
    /// Describe the metadata of a data surface from its layout.
    pub fn for_surface(desc: &SurfaceDescriptor, layout: &SurfaceLayout) -> Self {
        let desc = desc.normalized();
        Self {
            pipe_aligned: true,
            resource_type: desc.resource_type,
            swizzle_mode: desc.swizzle_mode,
            bpp: layout.bpp,
            unaligned_width: desc.width,
            unaligned_height: desc.height,
            num_slices: desc.num_slices,
            num_samples: desc.num_samples,
            num_frags: desc.num_frags,
            num_mip_levels: desc.num_mip_levels,
            first_mip_id_in_tail: layout.first_mip_id_in_tail,
        }
    }

    fn check_dims(&self) -> Result<(), AddrError> {
        let dims = [self.unaligned_width, self.unaligned_height, self.num_slices];
        if dims.iter().any(|&d| d > MAX_IMAGE_DIM) || self.num_mip_levels > MAX_MIP_LEVELS {
            return Err(AddrError::invalid(format!(
                "{}x{}x{} with {} mips is too large for metadata",
                self.unaligned_width, self.unaligned_height, self.num_slices, self.num_mip_levels
            )));
        }
        Ok(())
    }

    /// Fmask element size, log2 bytes: one bit per fragment state plus an
    /// unknown state, per sample.
    fn fmask_elem_log2(&self) -> u32 {
        let samples = self.num_samples.max(1);
        let frags = if self.num_frags == 0 { samples } else { self.num_frags };
        let bits_per_sample = log2(frags) + 1;
        let bpp = (samples * bits_per_sample).next_power_of_two().max(8);
        log2(bpp >> 3).min(3)
    }

    fn single_mip(&self) -> Self {
        Self {
            num_mip_levels: 1,
            first_mip_id_in_tail: 1,
            ..*self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetaMipInfo {
    pub in_mip_tail: bool,
    pub offset: u64,
    pub slice_size: u64,
}

/// Layout of a meta surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaSurfaceLayout {
    /// Data-surface width covered, in elements.
    pub pitch: u32,
    pub height: u32,
    pub depth: u32,
    pub base_align: u32,
    pub slice_size: u64,
    pub total_size: u64,
    pub meta_block: MetaBlockSize,
    pub blocks_per_slice: u32,
    /// Data-surface footprint of one compressed unit (DCC only; HTile and
    /// CMask compress 8x8 tiles).
    pub compress_block: Dim3d,
    pub mip_info: Vec<MetaMipInfo>,
}

/// A data-surface coordinate to locate in a meta surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetaCoord {
    pub x: u32,
    pub y: u32,
    pub slice: u32,
    /// Pipe/bank XOR of the data surface; only the pipe bits apply.
    pub pipe_xor: u32,
}

/// Meta chain: the tail block first, then mips above it, smallest first.
fn meta_mip_chain(
    input: &MetaSurfaceDescriptor,
    meta_block: &MetaBlockSize,
) -> (Vec<MetaMipInfo>, u64, u32) {
    let block_bytes = u64::from(meta_block.size());
    let mip0 = Dim3d::new(input.unaligned_width, input.unaligned_height, 1);

    if input.num_mip_levels <= 1 {
        let pitch = pow2_align(input.unaligned_width, meta_block.w);
        let height = pow2_align(input.unaligned_height, meta_block.h);
        let blocks = (pitch / meta_block.w) * (height / meta_block.h);
        let slice_size = u64::from(blocks) * block_bytes;
        let mip = MetaMipInfo {
            in_mip_tail: false,
            offset: 0,
            slice_size,
        };
        return (vec![mip], slice_size, blocks);
    }

    let num_mips = input.num_mip_levels;
    let first_in_tail = input.first_mip_id_in_tail.min(num_mips);
    let mut mip_info = vec![MetaMipInfo::default(); num_mips as usize];
    let mut offset = if first_in_tail == num_mips { 0 } else { block_bytes };

    for level in (0..first_in_tail).rev() {
        let mip = mip_size(mip0, level);
        let blocks = (pow2_align(mip.w, meta_block.w) / meta_block.w)
            * (pow2_align(mip.h, meta_block.h) / meta_block.h);
        let slice_size = u64::from(blocks) * block_bytes;
        mip_info[level as usize] = MetaMipInfo {
            in_mip_tail: false,
            offset,
            slice_size,
        };
        offset += slice_size;
    }
    for info in &mut mip_info[first_in_tail as usize..] {
        info.in_mip_tail = true;
    }
    if let Some(first_tail) = mip_info.get_mut(first_in_tail as usize) {
        first_tail.slice_size = block_bytes;
    }

    (mip_info, offset, (offset / block_bytes) as u32)
}

impl AddrLib {
    /// HTile layout of a `64KB_Z_X` depth surface.
    pub fn compute_htile_info(&self, input: &MetaSurfaceDescriptor) -> Result<MetaSurfaceLayout, AddrError> {
        if input.swizzle_mode != SwizzleMode::Sw64kbZX || !input.pipe_aligned {
            return Err(AddrError::invalid("HTile needs a pipe-aligned 64KB_Z_X surface"));
        }
        input.check_dims()?;
        let meta_block = self.meta_block_size(
            MetaDataKind::DepthStencil,
            ResourceType::Tex2d,
            input.swizzle_mode,
            0,
            0,
            true,
        );
        let base_align = meta_block.size().max(1 << (self.params.pipes_log2 + 11));
        Ok(self.meta_surface_layout(input, meta_block, base_align, Dim3d::new(8, 8, 1)))
    }

    /// CMask layout of a `64KB_Z_X` 2-D surface.
    pub fn compute_cmask_info(&self, input: &MetaSurfaceDescriptor) -> Result<MetaSurfaceLayout, AddrError> {
        if input.resource_type != ResourceType::Tex2d
            || input.swizzle_mode != SwizzleMode::Sw64kbZX
            || !input.pipe_aligned
        {
            return Err(AddrError::invalid("CMask needs a pipe-aligned 2D 64KB_Z_X surface"));
        }
        input.check_dims()?;
        let meta_block = self.meta_block_size(
            MetaDataKind::Fmask,
            ResourceType::Tex2d,
            input.swizzle_mode,
            0,
            0,
            true,
        );
        Ok(self.meta_surface_layout(input, meta_block, meta_block.size(), Dim3d::new(8, 8, 1)))
    }

    /// DCC layout of a color surface.
    pub fn compute_dcc_info(&self, input: &MetaSurfaceDescriptor) -> Result<MetaSurfaceLayout, AddrError> {
        let mode = input.swizzle_mode;
        if mode.is_linear() || mode.is_block_256b() {
            return Err(AddrError::invalid(format!("{mode} surfaces have no DCC")));
        }
        input.check_dims()?;
        let elem_log2 = elem_log2(input.bpp)?;
        let frag_log2 = log2(input.num_frags.max(1));
        let comp = blk256_size_log2(input.resource_type, mode, elem_log2, frag_log2);
        let meta_block = self.meta_block_size(
            MetaDataKind::Color,
            input.resource_type,
            mode,
            elem_log2,
            frag_log2,
            input.pipe_aligned,
        );
        let compress_block = Dim3d::new(1 << comp.w, 1 << comp.h, 1 << comp.d);
        Ok(self.meta_surface_layout(input, meta_block, meta_block.size(), compress_block))
    }

    fn meta_surface_layout(
        &self,
        input: &MetaSurfaceDescriptor,
        meta_block: MetaBlockSize,
        base_align: u32,
        compress_block: Dim3d,
    ) -> MetaSurfaceLayout {
        let depth = pow2_align(input.num_slices.max(1), meta_block.d);
        let (mip_info, slice_size, blocks_per_slice) = meta_mip_chain(input, &meta_block);
        MetaSurfaceLayout {
            pitch: pow2_align(input.unaligned_width, meta_block.w),
            height: pow2_align(input.unaligned_height, meta_block.h),
            depth,
            base_align,
            slice_size,
            total_size: slice_size * u64::from(depth / meta_block.d),
            meta_block,
            blocks_per_slice,
            compress_block,
            mip_info,
        }
    }

    /// Shared meta addressing: the pattern addresses nibbles within a meta
    /// block of `2^block_log2` bytes.
    fn meta_address(
        &self,
        layout: &MetaSurfaceLayout,
        pattern: &SwizzlePattern,
        block_log2: u32,
        coord: &MetaCoord,
    ) -> SurfaceAddress {
        let block_mask = (1u32 << block_log2) - 1;
        let nibble = offset_from_pattern(pattern, block_log2 + 1, coord.x, coord.y, coord.slice, 0);
        let blocks_per_row = u64::from(layout.pitch / layout.meta_block.w);
        let block_index = u64::from(coord.y / layout.meta_block.h) * blocks_per_row
            + u64::from(coord.x / layout.meta_block.w);
        let pipe_mask = (1u32 << self.params.pipes_log2) - 1;
        let pipe_xor = ((coord.pipe_xor & pipe_mask) << self.params.pipe_interleave_log2) & block_mask;

        SurfaceAddress {
            addr: layout.slice_size * u64::from(coord.slice)
                + (block_index << block_log2)
                + u64::from((nibble >> 1) ^ pipe_xor),
            bit_position: (nibble & 1) << 2,
        }
    }

    /// Byte address of the HTile entry covering a pixel.
    pub fn compute_htile_addr_from_coord(
        &self,
        input: &MetaSurfaceDescriptor,
        coord: &MetaCoord,
    ) -> Result<SurfaceAddress, AddrError> {
        if input.num_mip_levels > 1 {
            return Err(AddrError::NotImplemented("HTile addressing of mipmapped surfaces"));
        }
        let layout = self.compute_htile_info(&input.single_mip())?;
        // Four bytes per 8x8 tile.
        let block_log2 = log2(layout.meta_block.w) + log2(layout.meta_block.h) - 4;
        let samples_log2 = log2(input.num_frags.max(1)).min(3);
        Ok(self.meta_address(&layout, &self.htile_pattern(samples_log2), block_log2, coord))
    }

    /// Byte address and nibble position of the CMask entry covering a pixel.
    pub fn compute_cmask_addr_from_coord(
        &self,
        input: &MetaSurfaceDescriptor,
        coord: &MetaCoord,
    ) -> Result<SurfaceAddress, AddrError> {
        if input.num_mip_levels > 1 {
            return Err(AddrError::NotImplemented("CMask addressing of mipmapped surfaces"));
        }
        let layout = self.compute_cmask_info(&input.single_mip())?;
        // One nibble per 8x8 tile.
        let block_log2 = log2(layout.meta_block.w) + log2(layout.meta_block.h) - 7;
        let pattern = self.cmask_pattern(input.fmask_elem_log2());
        Ok(self.meta_address(&layout, &pattern, block_log2, coord))
    }

    /// Byte address of the DCC key of a 256B color block.
    pub fn compute_dcc_addr_from_coord(
        &self,
        input: &MetaSurfaceDescriptor,
        coord: &MetaCoord,
    ) -> Result<SurfaceAddress, AddrError> {
        if input.resource_type != ResourceType::Tex2d
            || input.swizzle_mode != SwizzleMode::Sw64kbRX
            || input.num_frags > 1
            || input.num_mip_levels > 1
        {
            return Err(AddrError::unsupported(
                "DCC addressing covers single-sample, single-mip 2D 64KB_R_X surfaces",
            ));
        }
        let layout = self.compute_dcc_info(input)?;
        let elem_log2 = elem_log2(input.bpp)?;
        // One key byte per 256 data bytes.
        let block_log2 = log2(layout.meta_block.w) + log2(layout.meta_block.h) + elem_log2 - 8;
        let pattern = self.dcc_pattern(elem_log2, input.pipe_aligned);
        Ok(self.meta_address(&layout, &pattern, block_log2, coord))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_input(width: u32, mips: u32, first_in_tail: u32) -> MetaSurfaceDescriptor {
        MetaSurfaceDescriptor {
            pipe_aligned: true,
            resource_type: ResourceType::Tex2d,
            swizzle_mode: SwizzleMode::Sw64kbZX,
            bpp: 32,
            unaligned_width: width,
            unaligned_height: width,
            num_slices: 1,
            num_samples: 1,
            num_frags: 1,
            num_mip_levels: mips,
            first_mip_id_in_tail: first_in_tail,
        }
    }

    #[test]
    fn test_meta_chain_puts_tail_first() {
        let block = MetaBlockSize {
            w: 512,
            h: 256,
            d: 1,
            size_log2: 13,
        };
        let (mips, slice, blocks) = meta_mip_chain(&chain_input(256, 4, 2), &block);
        assert_eq!(mips[1].offset, 8192);
        assert_eq!(mips[0].offset, 16384);
        assert_eq!(slice, 24576);
        assert_eq!(blocks, 3);
        assert!(mips[2].in_mip_tail && mips[3].in_mip_tail);
        assert_eq!(mips[2].slice_size, 8192);
        assert_eq!(mips[3].slice_size, 0);
    }

    #[test]
    fn test_meta_chain_without_tail() {
        let block = MetaBlockSize {
            w: 64,
            h: 64,
            d: 1,
            size_log2: 12,
        };
        let (mips, slice, _) = meta_mip_chain(&chain_input(128, 2, 2), &block);
        assert_eq!(mips[1].offset, 0);
        assert_eq!(mips[0].offset, 4096);
        assert_eq!(slice, 4096 * 5);
    }

    #[test]
    fn test_fmask_elem_size() {
        let with = |samples, frags| MetaSurfaceDescriptor {
            num_samples: samples,
            num_frags: frags,
            ..chain_input(64, 1, 1)
        };
        // 1 sample, 1 fragment: 1 bit rounds up to a byte.
        assert_eq!(with(1, 1).fmask_elem_log2(), 0);
        assert_eq!(with(4, 4).fmask_elem_log2(), 1);
        assert_eq!(with(8, 8).fmask_elem_log2(), 2);
        assert_eq!(with(16, 8).fmask_elem_log2(), 3);
        assert_eq!(with(8, 0).fmask_elem_log2(), 2);
    }
}
