//! Surface descriptors and layout results.

use crate::format::SurfaceFormat;
use crate::swizzle_mode::SwizzleMode;

/// Resource dimensionality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResourceType {
    Tex1d,
    #[default]
    Tex2d,
    Tex3d,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dim2d {
    pub w: u32,
    pub h: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dim3d {
    pub w: u32,
    pub h: u32,
    pub d: u32,
}

impl Dim3d {
    pub const fn new(w: u32, h: u32, d: u32) -> Self {
        Self { w, h, d }
    }
}

/// Usage flags of a data surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceFlags {
    pub color: bool,
    pub depth: bool,
    pub stencil: bool,
    pub fmask: bool,
    pub display: bool,
    pub prt: bool,
    pub qb_stereo: bool,
    pub view_3d_as_2d_array: bool,
    pub opt4space: bool,
    pub minimize_align: bool,
}

impl SurfaceFlags {
    pub const fn is_zbuffer(&self) -> bool {
        self.depth || self.stencil
    }
}

/// Input to [`AddrLib::compute_surface_info`](crate::AddrLib::compute_surface_info).
///
/// Zero `width`, `height`, `num_slices`, `num_mip_levels` and `num_samples`
/// are read as 1; zero `num_frags` means "same as `num_samples`". When
/// `format` is not [`SurfaceFormat::Invalid`] it overrides `bpp` and the
/// dimensions are taken in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceDescriptor {
    pub flags: SurfaceFlags,
    pub resource_type: ResourceType,
    pub swizzle_mode: SwizzleMode,
    pub format: SurfaceFormat,
    pub bpp: u32,
    pub width: u32,
    pub height: u32,
    pub num_slices: u32,
    pub num_mip_levels: u32,
    pub num_samples: u32,
    pub num_frags: u32,
    /// Caller-requested pitch in elements (linear and 256B only).
    pub pitch_in_element: u32,
    /// Caller-requested slice size in bytes (linear and 256B only).
    pub slice_align: u32,
}

impl Default for SurfaceDescriptor {
    fn default() -> Self {
        Self {
            flags: SurfaceFlags::default(),
            resource_type: ResourceType::Tex2d,
            swizzle_mode: SwizzleMode::Linear,
            format: SurfaceFormat::Invalid,
            bpp: 0,
            width: 0,
            height: 0,
            num_slices: 1,
            num_mip_levels: 1,
            num_samples: 1,
            num_frags: 0,
            pitch_in_element: 0,
            slice_align: 0,
        }
    }
}

impl SurfaceDescriptor {
    /// Single-sample, single-mip 2-D surface.
    pub fn new_2d(swizzle_mode: SwizzleMode, bpp: u32, width: u32, height: u32) -> Self {
        Self {
            swizzle_mode,
            bpp,
            width,
            height,
            ..Self::default()
        }
    }

    /// Apply the "zero means one" defaults.
    pub(crate) fn normalized(&self) -> Self {
        let num_samples = self.num_samples.max(1);
        Self {
            width: self.width.max(1),
            height: self.height.max(1),
            num_slices: self.num_slices.max(1),
            num_mip_levels: self.num_mip_levels.max(1),
            num_samples,
            num_frags: if self.num_frags == 0 {
                num_samples
            } else {
                self.num_frags
            },
            ..*self
        }
    }
}

/// Placement of one mip level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MipInfo {
    /// Padded pitch in elements.
    pub pitch: u32,
    /// Padded height in elements.
    pub height: u32,
    pub depth: u32,
    /// Byte offset of the level from the start of its slice (or, for
    /// thick modes, its block slab).
    pub offset: u64,
    /// Byte offset of the macro block holding the level.
    pub macro_block_offset: u64,
    /// Byte offset inside the tail block.
    pub mip_tail_offset: u32,
    pub mip_tail_coord_x: u32,
    pub mip_tail_coord_y: u32,
    pub mip_tail_coord_z: u32,
    pub in_mip_tail: bool,
}

/// Quad-buffer stereo placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StereoInfo {
    /// Height of one eye.
    pub eye_height: u32,
    /// Byte offset of the right eye.
    pub right_offset: u64,
    /// Pipe/bank XOR to apply to the right eye.
    pub right_swizzle: u32,
}

/// Output of [`AddrLib::compute_surface_info`](crate::AddrLib::compute_surface_info).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SurfaceLayout {
    /// Padded pitch in elements.
    pub pitch: u32,
    /// Padded height in elements.
    pub height: u32,
    pub num_slices: u32,
    pub pixel_pitch: u32,
    pub pixel_height: u32,
    /// Bits per element after format expansion.
    pub bpp: u32,
    /// Power of two, except for general linear surfaces where it is the
    /// element size.
    pub base_align: u32,
    pub slice_size: u64,
    pub surf_size: u64,
    pub block_width: u32,
    pub block_height: u32,
    pub block_slices: u32,
    pub mip_chain_in_tail: bool,
    pub first_mip_id_in_tail: u32,
    pub mip_info: Vec<MipInfo>,
    /// Equation usable for single-fragment addressing, if any.
    pub equation_index: Option<usize>,
    pub stereo: Option<StereoInfo>,
}

/// A texel (or sample) to translate to a byte address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceCoord {
    pub x: u32,
    pub y: u32,
    pub slice: u32,
    pub sample: u32,
    pub mip_id: u32,
    pub pipe_bank_xor: u32,
}

/// Byte address plus the bit offset inside that byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceAddress {
    pub addr: u64,
    pub bit_position: u32,
}
