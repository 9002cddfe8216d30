//! Surface layout: padded dimensions, sizes and per-mip placement for
//! linear, 256B micro-tiled and 4KB/64KB macro-tiled surfaces.

use crate::addr_lib::AddrLib;
use crate::bits::{align_up, pow2_align, round_half};
use crate::block::{
    BLOCK_256_2D, BLOCK_256_3D, compute_block_dims, elem_log2, is_in_mip_tail, linear_pitch_align,
    max_mips_in_tail,
};
use crate::error::AddrError;
use crate::format::SurfaceFormat;
use crate::swizzle_mode::{
    DCN20_BPP64_MASK, DCN20_NON_BPP64_MASK, DCN21_MASK, RSRC_1D_MASK, RSRC_2D_MASK,
    RSRC_2D_PRT_MASK, RSRC_3D_MASK, RSRC_3D_PRT_MASK, RSRC_3D_THIN_MASK, SwModeSet, SwizzleMode,
    Z_MASK,
};
use crate::types::{Dim3d, MipInfo, ResourceType, StereoInfo, SurfaceDescriptor, SurfaceLayout};

const LINEAR_ALIGN: u32 = 256;
const PRT_ALIGN: u32 = 64 * 1024;

/// Largest width, height, slice count or pitch, in elements.
pub(crate) const MAX_IMAGE_DIM: u32 = 32768;
pub(crate) const MAX_MIP_LEVELS: u32 = 16;

/// Dimensions of mip `level` of a chain.
pub(crate) fn mip_size(mip0: Dim3d, level: u32) -> Dim3d {
    Dim3d::new(
        (mip0.w >> level).max(1),
        (mip0.h >> level).max(1),
        (mip0.d >> level).max(1),
    )
}

/// Apply a caller-supplied pitch and slice size on top of the natural ones.
fn apply_custom_pitch_height(
    desc: &SurfaceDescriptor,
    elem_bytes: u32,
    pitch_align: u32,
    pitch: &mut u32,
    height: &mut u32,
) -> Result<(), AddrError> {
    if desc.pitch_in_element > 0 {
        if desc.pitch_in_element % pitch_align != 0 {
            return Err(AddrError::invalid(format!(
                "pitch {} is not a multiple of {pitch_align}",
                desc.pitch_in_element
            )));
        }
        if desc.pitch_in_element < *pitch {
            return Err(AddrError::invalid(format!(
                "pitch {} is below the minimum {}",
                desc.pitch_in_element, *pitch
            )));
        }
        *pitch = desc.pitch_in_element;
    }

    if desc.slice_align > 0 {
        let row_bytes = u64::from(elem_bytes) * u64::from(*pitch);
        let custom_height = u64::from(desc.slice_align) / row_bytes;
        if custom_height * row_bytes != u64::from(desc.slice_align) {
            return Err(AddrError::invalid(format!(
                "slice size {} is not a whole number of {row_bytes}-byte rows",
                desc.slice_align
            )));
        }
        let custom_height = custom_height as u32;
        if desc.num_slices > 1 && *height != custom_height {
            return Err(AddrError::invalid("slice size disagrees with the array height"));
        }
        *height = custom_height;
    }
    Ok(())
}

impl AddrLib {
    /// Compute the full layout of a surface.
    pub fn compute_surface_info(&self, desc: &SurfaceDescriptor) -> Result<SurfaceLayout, AddrError> {
        let mut local = desc.normalized();

        let (expand_x, expand_y) = if local.format != SurfaceFormat::Invalid {
            let info = local.format.element_info();
            local.bpp = info.bpp;
            local.width = local.width.div_ceil(info.expand_x).max(1);
            local.height = local.height.div_ceil(info.expand_y).max(1);
            (info.expand_x, info.expand_y)
        } else {
            (1, 1)
        };

        validate_non_sw_mode_params(&local)?;
        self.validate_sw_mode_params(&local)?;

        let mut layout = if local.swizzle_mode.is_linear() {
            compute_linear(&local)?
        } else if local.swizzle_mode.is_block_256b() {
            compute_micro(&local)?
        } else {
            self.compute_macro(&local)?
        };

        layout.bpp = local.bpp;
        layout.pixel_pitch = layout.pitch * expand_x;
        layout.pixel_height = layout.height * expand_y;

        if !local.swizzle_mode.is_linear() && local.num_frags == 1 {
            let e = elem_log2(local.bpp)?;
            layout.equation_index = self.equation_index(local.resource_type, local.swizzle_mode, e);
        }

        if local.flags.qb_stereo {
            let right_swizzle = layout.stereo.map_or(0, |s| s.right_swizzle);
            layout.stereo = Some(StereoInfo {
                eye_height: layout.height,
                right_offset: layout.surf_size,
                right_swizzle,
            });
            layout.height <<= 1;
            layout.pixel_height <<= 1;
            layout.slice_size <<= 1;
            layout.surf_size <<= 1;
        }

        debug_assert!(
            layout.base_align.is_power_of_two() || local.swizzle_mode == SwizzleMode::LinearGeneral
        );
        Ok(layout)
    }

    fn validate_sw_mode_params(&self, desc: &SurfaceDescriptor) -> Result<(), AddrError> {
        let mode = desc.swizzle_mode;
        let flags = &desc.flags;
        let msaa = desc.num_frags > 1;
        let zbuffer = flags.is_zbuffer();

        if msaa {
            let min_block = u64::from(self.params.pipe_interleave_bytes()) * u64::from(desc.num_frags);
            if !mode.is_linear() && (1u64 << mode.block_size_log2()) < min_block {
                return Err(AddrError::invalid(format!(
                    "{mode} block is smaller than {} fragments of pipe interleave",
                    desc.num_frags
                )));
            }
        }

        if flags.display && !self.is_valid_display_mode(desc) {
            return Err(AddrError::invalid(format!("{mode} is not displayable at {} bpp", desc.bpp)));
        }

        if desc.bpp == 96 && !mode.is_linear() {
            return Err(AddrError::invalid("96 bpp surfaces must be linear"));
        }

        let allowed = match desc.resource_type {
            ResourceType::Tex1d => RSRC_1D_MASK.contains(mode),
            ResourceType::Tex2d => {
                RSRC_2D_MASK.contains(mode)
                    && (!flags.prt || RSRC_2D_PRT_MASK.contains(mode))
                    && (!flags.fmask || Z_MASK.contains(mode))
            }
            ResourceType::Tex3d => {
                RSRC_3D_MASK.contains(mode)
                    && (!flags.prt || RSRC_3D_PRT_MASK.contains(mode))
                    && (!flags.view_3d_as_2d_array || RSRC_3D_THIN_MASK.contains(mode))
            }
        };
        if !allowed {
            return Err(AddrError::invalid(format!(
                "{mode} is not allowed for {:?} with {:?}",
                desc.resource_type, desc.flags
            )));
        }

        let type_ok = if mode.is_linear() {
            !zbuffer && !msaa && desc.bpp % 8 == 0
        } else if mode.is_z_order() {
            desc.bpp <= 64
                && !(msaa && (flags.color || desc.bpp > 32))
                && !desc.format.is_block_compressed()
                && !desc.format.is_macro_pixel_packed()
        } else if mode.is_standard() || mode.is_display() {
            !zbuffer && !msaa
        } else if mode.is_rt_opt() {
            !zbuffer
        } else {
            false
        };
        if !type_ok {
            return Err(AddrError::invalid(format!(
                "{mode} cannot hold this surface ({} bpp, {} fragments)",
                desc.bpp, desc.num_frags
            )));
        }

        if mode.is_block_256b() && (zbuffer || desc.resource_type == ResourceType::Tex3d || msaa) {
            return Err(AddrError::invalid("256B blocks are color-only, 2D and single-sample"));
        }
        Ok(())
    }

    fn is_valid_display_mode(&self, desc: &SurfaceDescriptor) -> bool {
        if desc.resource_type != ResourceType::Tex2d {
            return false;
        }
        let mask: SwModeSet = if self.settings.is_dcn20 {
            match desc.bpp {
                8 | 16 | 32 => DCN20_NON_BPP64_MASK,
                64 => DCN20_BPP64_MASK,
                _ => SwModeSet::EMPTY,
            }
        } else {
            match desc.bpp {
                8 | 16 | 32 | 64 => DCN21_MASK,
                _ => SwModeSet::EMPTY,
            }
        };
        mask.contains(desc.swizzle_mode)
    }

    /// Height alignment and right-eye XOR for quad-buffer stereo.
    ///
    /// The right eye must land on the same pipe/bank as the left, so the
    /// height is padded to the highest Y bit hashed into the block.
    fn stereo_alignment(
        &self,
        desc: &SurfaceDescriptor,
        elem_log2: u32,
        block_height: u32,
    ) -> Result<(u32, u32), AddrError> {
        let eq = self
            .equation_index(desc.resource_type, desc.swizzle_mode, elem_log2)
            .and_then(|index| self.equation(index))
            .ok_or_else(|| {
                AddrError::invalid(format!("{} has no equation for stereo", desc.swizzle_mode))
            })?;

        let pil = self.params.pipe_interleave_log2 as usize;
        let Some((y_pos, y_index)) = eq.max_y_xor(pil) else {
            return Ok((block_height, 0));
        };
        let align = 1u32 << y_index;
        if align < block_height {
            return Ok((block_height, 0));
        }
        let aligned_height = pow2_align(desc.height, align);
        let right_xor = if (aligned_height >> y_index) & 1 == 1 {
            1 << (y_pos - pil)
        } else {
            0
        };
        Ok((align, right_xor))
    }

    fn compute_macro(&self, desc: &SurfaceDescriptor) -> Result<SurfaceLayout, AddrError> {
        let rsrc = desc.resource_type;
        let mode = desc.swizzle_mode;
        let blk = compute_block_dims(rsrc, mode, desc.bpp, desc.num_frags)?;
        let index = elem_log2(desc.bpp)?;
        let bytes = u64::from(desc.bpp >> 3);
        let blk_log2 = mode.block_size_log2();
        let block_size = 1u64 << blk_log2;
        let thin = mode.is_thin(rsrc);

        let mut height_align = blk.h;
        let mut stereo = None;
        if desc.flags.qb_stereo {
            let (align, right_swizzle) = self.stereo_alignment(desc, index, blk.h)?;
            height_align = align;
            stereo = Some(StereoInfo {
                right_swizzle,
                ..StereoInfo::default()
            });
        }

        let mut layout = SurfaceLayout {
            pitch: pow2_align(desc.width, blk.w),
            height: pow2_align(desc.height, height_align),
            num_slices: pow2_align(desc.num_slices, blk.d),
            base_align: 1 << blk_log2,
            block_width: blk.w,
            block_height: blk.h,
            block_slices: blk.d,
            first_mip_id_in_tail: desc.num_mip_levels,
            stereo,
            ..SurfaceLayout::default()
        };

        if desc.num_mip_levels == 1 {
            layout.slice_size = u64::from(layout.pitch) * u64::from(layout.height) * bytes * u64::from(desc.num_frags);
            layout.surf_size = layout.slice_size * u64::from(layout.num_slices);
            layout.mip_info = vec![MipInfo {
                pitch: layout.pitch,
                height: layout.height,
                depth: layout.num_slices,
                ..MipInfo::default()
            }];
            return Ok(layout);
        }

        let num_mips = desc.num_mip_levels;
        let tail_max_dim = self.mip_tail_dim(rsrc, mode, blk);
        let mip0 = Dim3d::new(
            desc.width,
            desc.height,
            if rsrc == ResourceType::Tex3d { desc.num_slices } else { 1 },
        );
        let max_in_tail = max_mips_in_tail(blk_log2, !thin);

        let mut fixed_tail = tail_max_dim;
        if self.settings.ds_mipmap_htile_fix && mode.is_z_order() && index <= 1 {
            let micro = BLOCK_256_2D[index as usize];
            fixed_tail.w /= micro.w / BLOCK_256_2D[2].w;
            fixed_tail.h /= micro.h / BLOCK_256_2D[2].h;
        }

        let mut mip_info = vec![MipInfo::default(); num_mips as usize];
        let mut mip_size_bytes = vec![0u64; num_mips as usize];
        let mut mip_slab_bytes = vec![0u64; num_mips as usize];
        let mut first_in_tail = num_mips;
        let mut chain_slice_size = 0u64;

        for level in 0..num_mips {
            let mip = mip_size(mip0, level);
            let tail_dims = Dim3d::new(mip.w, mip.h, if thin { 1 } else { mip.d });
            if is_in_mip_tail(fixed_tail, max_in_tail, tail_dims, num_mips - level) {
                first_in_tail = level;
                chain_slice_size += block_size / u64::from(blk.d);
                break;
            }
            let pitch = pow2_align(mip.w, blk.w);
            let height = pow2_align(mip.h, blk.h);
            let depth = pow2_align(mip.d, blk.d);
            let slice_size = u64::from(pitch) * u64::from(height) * bytes;
            mip_size_bytes[level as usize] = slice_size * u64::from(depth);
            mip_slab_bytes[level as usize] = slice_size * u64::from(blk.d);
            chain_slice_size += slice_size;
            mip_info[level as usize] = MipInfo {
                pitch,
                height,
                depth,
                ..MipInfo::default()
            };
        }

        layout.slice_size = chain_slice_size;
        layout.surf_size = chain_slice_size * u64::from(layout.num_slices);
        layout.mip_chain_in_tail = first_in_tail == 0;
        layout.first_mip_id_in_tail = first_in_tail;

        // The tail block comes first, then the mips above it, smallest first.
        let (mut offset, mut macro_offset) = if first_in_tail != num_mips {
            let tail_depth = mip_size(mip0, first_in_tail).d;
            let slabs = u64::from(pow2_align(tail_depth, blk.d) / blk.d);
            (block_size * slabs, block_size)
        } else {
            (0, 0)
        };
        for level in (0..first_in_tail as usize).rev() {
            mip_info[level].offset = offset;
            mip_info[level].macro_block_offset = macro_offset;
            offset += mip_size_bytes[level];
            macro_offset += mip_slab_bytes[level];
        }

        let (micro_w, micro_h, micro_d) = if thin {
            let micro = BLOCK_256_2D[index as usize];
            (micro.w, micro.h, 1)
        } else {
            let micro = BLOCK_256_3D[index as usize];
            (micro.w, micro.h, micro.d)
        };
        let mut pitch = tail_max_dim.w;
        let mut height = tail_max_dim.h;
        let mut depth = if thin { 1 } else { pow2_align(tail_max_dim.d, micro_d) };
        let tail_depth_slabs = if thin { 1 } else { depth / micro_d };

        for level in first_in_tail..num_mips {
            let m = max_in_tail - 1 - (level - first_in_tail);
            let tail_offset = if m > 6 { 16 << m } else { m << 8 };
            let (x, y) = mip_tail_coord(tail_offset, blk_log2, index);

            mip_info[level as usize] = MipInfo {
                pitch,
                height,
                depth,
                offset: u64::from(tail_offset) * u64::from(tail_depth_slabs),
                macro_block_offset: 0,
                mip_tail_offset: tail_offset,
                mip_tail_coord_x: x * micro_w,
                mip_tail_coord_y: y * micro_h,
                mip_tail_coord_z: 0,
                in_mip_tail: true,
            };

            pitch = (pitch >> 1).max(micro_w);
            height = (height >> 1).max(micro_h);
            depth = if thin {
                1
            } else {
                pow2_align((depth >> 1).max(1), micro_d)
            };
        }

        layout.mip_info = mip_info;
        Ok(layout)
    }
}

/// Position of a tail mip in 256B micro-block units.
///
/// Tail offsets interleave y then x bits, starting at bit 8. Odd block
/// sizes swap the axes, and odd element sizes (non-square micro blocks)
/// move one x bit into y.
pub(crate) fn mip_tail_coord(tail_offset: u32, blk_log2: u32, elem_log2: u32) -> (u32, u32) {
    let deinterleave = |first: u32| (0..6).fold(0, |acc, k| acc | (((tail_offset >> (first + 2 * k)) & 1) << k));
    let mut x = deinterleave(9);
    let mut y = deinterleave(8);

    if blk_log2 & 1 == 1 {
        std::mem::swap(&mut x, &mut y);
        if elem_log2 & 1 == 1 {
            y = (y << 1) | (x & 1);
            x >>= 1;
        }
    }
    (x, y)
}

pub(crate) fn validate_non_sw_mode_params(desc: &SurfaceDescriptor) -> Result<(), AddrError> {
    if desc.bpp == 0 || desc.bpp > 128 {
        return Err(AddrError::invalid(format!("{} bpp is out of range", desc.bpp)));
    }
    let dims = [desc.width, desc.height, desc.num_slices, desc.pitch_in_element];
    if dims.iter().any(|&d| d > MAX_IMAGE_DIM) || desc.num_mip_levels > MAX_MIP_LEVELS {
        return Err(AddrError::invalid(format!(
            "{}x{}x{} (pitch {}) with {} mips exceeds {MAX_IMAGE_DIM} elements or {MAX_MIP_LEVELS} mips",
            desc.width, desc.height, desc.num_slices, desc.pitch_in_element, desc.num_mip_levels
        )));
    }
    if desc.num_frags > 8 || desc.num_samples > 16 {
        return Err(AddrError::invalid(format!(
            "{} samples / {} fragments is out of range",
            desc.num_samples, desc.num_frags
        )));
    }

    let flags = &desc.flags;
    let mipmap = desc.num_mip_levels > 1;
    let msaa = desc.num_frags > 1;
    let ok = match desc.resource_type {
        ResourceType::Tex1d => !(msaa || flags.display || flags.qb_stereo) && desc.height == 1,
        ResourceType::Tex2d => {
            !((msaa && mipmap) || (flags.qb_stereo && msaa) || (flags.qb_stereo && mipmap))
        }
        ResourceType::Tex3d => !(msaa || flags.display || flags.qb_stereo),
    };
    if !ok {
        return Err(AddrError::invalid(format!(
            "{:?} does not allow {:?} with {} mips and {} fragments",
            desc.resource_type, desc.flags, desc.num_mip_levels, desc.num_frags
        )));
    }
    Ok(())
}

fn compute_linear(desc: &SurfaceDescriptor) -> Result<SurfaceLayout, AddrError> {
    let elem_bytes = desc.bpp >> 3;
    let general = desc.swizzle_mode == SwizzleMode::LinearGeneral;
    let alignment = if desc.flags.prt { PRT_ALIGN } else { LINEAR_ALIGN };
    let pitch_align = linear_pitch_align(desc.swizzle_mode, desc.bpp, alignment);

    if general && (desc.num_mip_levels > 1 || desc.num_slices > 1) {
        return Err(AddrError::invalid("general linear surfaces are single mip and slice"));
    }

    let mut pitch = align_up(desc.width, pitch_align);
    let mut mip_info = Vec::with_capacity(desc.num_mip_levels as usize);
    let actual_height;

    if desc.resource_type == ResourceType::Tex1d {
        actual_height = desc.num_mip_levels;
        if !desc.flags.prt {
            let mut ignored = actual_height;
            apply_custom_pitch_height(desc, elem_bytes, pitch_align, &mut pitch, &mut ignored)?;
        }
        for level in 0..desc.num_mip_levels {
            let offset = u64::from(pitch) * u64::from(elem_bytes) * u64::from(level);
            mip_info.push(MipInfo {
                pitch,
                height: 1,
                depth: 1,
                offset,
                macro_block_offset: offset,
                ..MipInfo::default()
            });
        }
    } else {
        let mut slice0_height = desc.height;
        apply_custom_pitch_height(desc, elem_bytes, pitch_align, &mut pitch, &mut slice0_height)?;

        let depth = if desc.resource_type == ResourceType::Tex3d {
            desc.num_slices
        } else {
            1
        };
        let mut chain_height = 0u32;
        let mut mip_height = desc.height;
        for _ in 0..desc.num_mip_levels {
            let offset = u64::from(pitch) * u64::from(chain_height) * u64::from(elem_bytes);
            mip_info.push(MipInfo {
                pitch,
                height: mip_height,
                depth,
                offset,
                macro_block_offset: offset,
                ..MipInfo::default()
            });
            chain_height += mip_height;
            mip_height = round_half(mip_height).max(1);
        }
        actual_height = if desc.num_mip_levels > 1 {
            chain_height
        } else {
            slice0_height
        };
    }

    let slice_size = u64::from(pitch) * u64::from(actual_height) * u64::from(elem_bytes);
    Ok(SurfaceLayout {
        pitch,
        height: if desc.num_mip_levels > 1 { desc.height } else { actual_height },
        num_slices: desc.num_slices,
        base_align: if general { elem_bytes } else { alignment },
        slice_size,
        surf_size: slice_size * u64::from(desc.num_slices),
        block_width: if general { 1 } else { pitch_align },
        block_height: 1,
        block_slices: 1,
        first_mip_id_in_tail: desc.num_mip_levels,
        mip_info,
        ..SurfaceLayout::default()
    })
}

fn compute_micro(desc: &SurfaceDescriptor) -> Result<SurfaceLayout, AddrError> {
    let blk = compute_block_dims(desc.resource_type, desc.swizzle_mode, desc.bpp, desc.num_frags)?;
    let bytes = desc.bpp >> 3;
    let mut layout = SurfaceLayout {
        pitch: pow2_align(desc.width, blk.w),
        height: pow2_align(desc.height, blk.h),
        num_slices: desc.num_slices,
        base_align: 1 << desc.swizzle_mode.block_size_log2(),
        block_width: blk.w,
        block_height: blk.h,
        block_slices: blk.d,
        first_mip_id_in_tail: desc.num_mip_levels,
        ..SurfaceLayout::default()
    };

    if desc.num_mip_levels > 1 {
        let mip0 = Dim3d::new(desc.width, desc.height, 1);
        let mut mip_info = vec![MipInfo::default(); desc.num_mip_levels as usize];
        let mut chain_size = 0u64;
        // Smallest mip first.
        for level in (0..desc.num_mip_levels).rev() {
            let mip = mip_size(mip0, level);
            let pitch = pow2_align(mip.w, blk.w);
            let height = pow2_align(mip.h, blk.h);
            mip_info[level as usize] = MipInfo {
                pitch,
                height,
                depth: 1,
                offset: chain_size,
                macro_block_offset: chain_size,
                ..MipInfo::default()
            };
            chain_size += u64::from(pitch) * u64::from(height) * u64::from(bytes);
        }
        layout.slice_size = chain_size;
        layout.mip_info = mip_info;
    } else {
        apply_custom_pitch_height(desc, bytes, blk.w, &mut layout.pitch, &mut layout.height)?;
        if layout.height % blk.h != 0 {
            return Err(AddrError::invalid(format!(
                "slice size gives height {}, not a multiple of {}",
                layout.height, blk.h
            )));
        }
        layout.slice_size = u64::from(layout.pitch) * u64::from(layout.height) * u64::from(bytes);
        layout.mip_info = vec![MipInfo {
            pitch: layout.pitch,
            height: layout.height,
            depth: desc.num_slices,
            ..MipInfo::default()
        }];
    }
    layout.surf_size = layout.slice_size * u64::from(layout.num_slices);
    Ok(layout)
}
