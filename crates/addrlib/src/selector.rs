//! Preferred swizzle mode selection.
//!
//! The allowed modes are narrowed by client constraints and hardware rules.
//! A block size is then chosen by comparing padded sizes, and within that
//! block the swizzle type comes from a fixed priority list.

use crate::addr_lib::AddrLib;
use crate::error::AddrError;
use crate::format::SurfaceFormat;
use crate::layout::validate_non_sw_mode_params;
use crate::swizzle_mode::{
    BLK256B_MASK, BLK4KB_MASK, BLK64KB_MASK, DCN20_BPP64_MASK, DCN20_NON_BPP64_MASK, DCN21_MASK,
    DISPLAY_MASK, LINEAR_MASK, MSAA_MASK, RENDER_MASK, RSRC_1D_MASK, RSRC_2D_MASK,
    RSRC_2D_PRT_MASK, RSRC_3D_MASK, RSRC_3D_PRT_MASK, RSRC_3D_THIN_MASK, STANDARD_MASK,
    SwModeSet, SwizzleMode, XOR_MASK, Z_MASK,
};
use crate::types::{ResourceType, SurfaceDescriptor, SurfaceFlags};

/// Memory granule classes, smallest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BlockType {
    Linear,
    Micro,
    Thin4kb,
    Thick4kb,
    Thin64kb,
    Thick64kb,
}

impl BlockType {
    pub const ALL: [BlockType; 6] = [
        Self::Linear,
        Self::Micro,
        Self::Thin4kb,
        Self::Thick4kb,
        Self::Thin64kb,
        Self::Thick64kb,
    ];

    /// Block class of a mode used by a resource of type `rsrc`.
    pub fn of(mode: SwizzleMode, rsrc: ResourceType) -> Self {
        let thick = mode.is_thick(rsrc);
        if mode.is_linear() {
            Self::Linear
        } else if mode.is_block_256b() {
            Self::Micro
        } else if mode.is_block_4kb() {
            if thick { Self::Thick4kb } else { Self::Thin4kb }
        } else if thick {
            Self::Thick64kb
        } else {
            Self::Thin64kb
        }
    }
}

/// Swizzle ordering families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwizzleType {
    Z,
    S,
    D,
    R,
}

impl SwizzleType {
    pub const ALL: [SwizzleType; 4] = [Self::Z, Self::S, Self::D, Self::R];

    pub fn of(mode: SwizzleMode) -> Option<Self> {
        if mode.is_linear() {
            None
        } else if mode.is_z_order() {
            Some(Self::Z)
        } else if mode.is_standard() {
            Some(Self::S)
        } else if mode.is_display() {
            Some(Self::D)
        } else {
            Some(Self::R)
        }
    }

    fn modes(self) -> SwModeSet {
        match self {
            Self::Z => Z_MASK,
            Self::S => STANDARD_MASK,
            Self::D => DISPLAY_MASK,
            Self::R => RENDER_MASK,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BlockSet(u8);

impl BlockSet {
    pub const EMPTY: Self = Self(0);

    pub fn of(blocks: &[BlockType]) -> Self {
        blocks.iter().fold(Self::EMPTY, |set, b| set.with(*b))
    }

    pub const fn with(self, block: BlockType) -> Self {
        Self(self.0 | 1 << block as u8)
    }

    pub const fn without(self, block: BlockType) -> Self {
        Self(self.0 & !(1 << block as u8))
    }

    pub const fn contains(self, block: BlockType) -> bool {
        self.0 & (1 << block as u8) != 0
    }

    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn largest(self) -> Option<BlockType> {
        BlockType::ALL.into_iter().rev().find(|b| self.contains(*b))
    }

    pub fn iter(self) -> impl Iterator<Item = BlockType> {
        BlockType::ALL.into_iter().filter(move |b| self.contains(*b))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SwizzleTypeSet(u8);

impl SwizzleTypeSet {
    pub const EMPTY: Self = Self(0);

    pub fn of(types: &[SwizzleType]) -> Self {
        types.iter().fold(Self::EMPTY, |set, t| set.with(*t))
    }

    pub const fn with(self, ty: SwizzleType) -> Self {
        Self(self.0 | 1 << ty as u8)
    }

    pub const fn contains(self, ty: SwizzleType) -> bool {
        self.0 & (1 << ty as u8) != 0
    }

    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

fn blocks_of(modes: SwModeSet, rsrc: ResourceType) -> BlockSet {
    modes
        .iter()
        .fold(BlockSet::EMPTY, |set, mode| set.with(BlockType::of(mode, rsrc)))
}

fn types_of(modes: SwModeSet) -> SwizzleTypeSet {
    modes
        .iter()
        .filter_map(SwizzleType::of)
        .fold(SwizzleTypeSet::EMPTY, SwizzleTypeSet::with)
}

fn modes_in_block(modes: SwModeSet, block: BlockType, rsrc: ResourceType) -> SwModeSet {
    SwModeSet::of(
        &modes
            .iter()
            .filter(|mode| BlockType::of(*mode, rsrc) == block)
            .collect::<Vec<_>>(),
    )
}

/// Whether a bigger block of `new_size` bytes is worth taking over
/// `min_size`, given a `low:high` waste ratio.
fn bigger_block_acceptable(min_size: u64, new_size: u64, ratio_low: u64, ratio_high: u64) -> bool {
    min_size * ratio_low > new_size * ratio_high
}

/// Input to [`AddrLib::get_preferred_surface_setting`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreferredSettingInput {
    pub flags: SurfaceFlags,
    pub resource_type: ResourceType,
    pub format: SurfaceFormat,
    pub bpp: u32,
    pub width: u32,
    pub height: u32,
    pub num_slices: u32,
    pub num_mip_levels: u32,
    pub num_samples: u32,
    pub num_frags: u32,
    pub forbidden_blocks: BlockSet,
    /// Allowed swizzle types; empty allows all.
    pub preferred_types: SwizzleTypeSet,
    pub no_xor: bool,
    /// Largest acceptable base alignment; 0 for no limit.
    pub max_align: u32,
    /// Padded sizes are compared after rounding up to this power of two.
    pub min_size_align: u32,
    /// Acceptable size ratio of a bigger block over the smallest padded
    /// size. Zero uses the built-in performance ratio.
    pub memory_budget: f32,
}

impl Default for PreferredSettingInput {
    fn default() -> Self {
        Self {
            flags: SurfaceFlags::default(),
            resource_type: ResourceType::Tex2d,
            format: SurfaceFormat::Invalid,
            bpp: 0,
            width: 0,
            height: 0,
            num_slices: 1,
            num_mip_levels: 1,
            num_samples: 1,
            num_frags: 0,
            forbidden_blocks: BlockSet::EMPTY,
            preferred_types: SwizzleTypeSet::EMPTY,
            no_xor: false,
            max_align: 0,
            min_size_align: 0,
            memory_budget: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreferredSetting {
    pub swizzle_mode: SwizzleMode,
    pub resource_type: ResourceType,
    /// Modes that satisfied every constraint, before size selection.
    pub valid_modes: SwModeSet,
    pub valid_blocks: BlockSet,
    pub valid_types: SwizzleTypeSet,
    pub can_xor: bool,
}

impl AddrLib {
    /// Choose a swizzle mode for a surface.
    pub fn get_preferred_surface_setting(
        &self,
        input: &PreferredSettingInput,
    ) -> Result<PreferredSetting, AddrError> {
        let rsrc = input.resource_type;
        let bpp = if input.format != SurfaceFormat::Invalid {
            input.format.bits_per_pixel()
        } else {
            input.bpp
        };
        let desc = SurfaceDescriptor {
            flags: input.flags,
            resource_type: rsrc,
            swizzle_mode: SwizzleMode::Linear,
            format: input.format,
            bpp,
            width: input.width,
            height: input.height,
            num_slices: input.num_slices,
            num_mip_levels: input.num_mip_levels,
            num_samples: input.num_samples,
            num_frags: input.num_frags,
            pitch_in_element: 0,
            slice_align: 0,
        }
        .normalized();
        validate_non_sw_mode_params(&desc)?;

        let mut allowed = self.allowed_modes(input, &desc);
        if allowed.is_empty() {
            return Err(AddrError::invalid("no swizzle mode satisfies the constraints"));
        }

        let result_sets = PreferredSetting {
            swizzle_mode: SwizzleMode::Linear,
            resource_type: rsrc,
            valid_modes: allowed,
            valid_blocks: blocks_of(allowed, rsrc),
            valid_types: types_of(allowed),
            can_xor: !allowed.intersect(XOR_MASK).is_empty(),
        };

        if allowed == LINEAR_MASK {
            return Ok(result_sets);
        }

        let compute_min_size = input.flags.minimize_align || input.memory_budget >= 1.0;
        if desc.height > 1 && !compute_min_size {
            allowed = allowed.without(LINEAR_MASK);
        }

        let blocks = blocks_of(allowed, rsrc);
        if blocks.len() > 1 {
            let block = self.select_block(input, &desc, allowed, blocks, compute_min_size)?;
            allowed = modes_in_block(allowed, block, rsrc);
        }

        let types = types_of(allowed);
        if types.len() > 1 {
            allowed = allowed.intersect(self.preferred_type(input, rsrc, allowed, types).modes());
        }

        let swizzle_mode = allowed
            .highest()
            .ok_or_else(|| AddrError::invalid("no swizzle mode left after selection"))?;
        log::debug!("preferred {swizzle_mode} out of {} valid modes", result_sets.valid_modes.len());
        Ok(PreferredSetting {
            swizzle_mode,
            ..result_sets
        })
    }

    /// Constraint intersection.
    fn allowed_modes(&self, input: &PreferredSettingInput, desc: &SurfaceDescriptor) -> SwModeSet {
        let rsrc = desc.resource_type;
        let is_3d = rsrc == ResourceType::Tex3d;
        let bpp = desc.bpp;
        let msaa = desc.num_frags > 1;
        let flags = &desc.flags;

        let mut allowed = BlockType::ALL
            .into_iter()
            .filter(|b| !input.forbidden_blocks.contains(*b))
            .fold(SwModeSet::EMPTY, |set, block| {
                let modes = match block {
                    BlockType::Linear => LINEAR_MASK,
                    BlockType::Micro => BLK256B_MASK,
                    BlockType::Thin4kb | BlockType::Thick4kb => BLK4KB_MASK,
                    BlockType::Thin64kb | BlockType::Thick64kb => BLK64KB_MASK,
                };
                set.union(modes_in_block(modes, block, rsrc))
            });

        if !input.preferred_types.is_empty() {
            for ty in SwizzleType::ALL {
                if !input.preferred_types.contains(ty) {
                    allowed = allowed.without(ty.modes());
                }
            }
        }
        if input.no_xor {
            allowed = allowed.without(XOR_MASK);
        }
        if input.max_align > 0 {
            if input.max_align < 1 << 16 {
                allowed = allowed.without(BLK64KB_MASK);
            }
            if input.max_align < 1 << 12 {
                allowed = allowed.without(BLK4KB_MASK);
            }
            if input.max_align < 256 {
                allowed = allowed.without(BLK256B_MASK);
            }
        }

        allowed = allowed.intersect(match rsrc {
            ResourceType::Tex1d => RSRC_1D_MASK,
            ResourceType::Tex2d if flags.prt => RSRC_2D_PRT_MASK,
            ResourceType::Tex2d => RSRC_2D_MASK,
            ResourceType::Tex3d if flags.prt => RSRC_3D_PRT_MASK,
            ResourceType::Tex3d => RSRC_3D_MASK,
        });
        if is_3d && flags.view_3d_as_2d_array {
            allowed = allowed.intersect(RSRC_3D_THIN_MASK.union(LINEAR_MASK));
        }

        if desc.format.is_block_compressed()
            || desc.format.is_macro_pixel_packed()
            || bpp > 64
            || (msaa && (bpp > 32 || flags.color))
        {
            allowed = allowed.without(Z_MASK);
        }
        if bpp == 96 {
            allowed = allowed.intersect(LINEAR_MASK);
        }
        if msaa {
            allowed = allowed.intersect(MSAA_MASK);
        }
        if flags.is_zbuffer() || flags.fmask || desc.format.is_depth() {
            allowed = allowed.intersect(Z_MASK);
        }
        if flags.display {
            allowed = allowed.intersect(if self.settings.is_dcn20 {
                if bpp == 64 { DCN20_BPP64_MASK } else { DCN20_NON_BPP64_MASK }
            } else {
                DCN21_MASK
            });
        }
        allowed
    }

    /// Pick the block class whose padded size wins under the space ratio.
    fn select_block(
        &self,
        input: &PreferredSettingInput,
        desc: &SurfaceDescriptor,
        allowed: SwModeSet,
        mut blocks: BlockSet,
        compute_min_size: bool,
    ) -> Result<BlockType, AddrError> {
        let rsrc = desc.resource_type;
        let (ratio_low, ratio_high) = if compute_min_size {
            (1, 1)
        } else if input.flags.opt4space {
            (3, 2)
        } else {
            (2, 1)
        };
        let size_align = u64::from(input.min_size_align.max(1).next_power_of_two());

        let mut padded = [0u64; BlockType::ALL.len()];
        let mut best: Option<(BlockType, u64)> = None;
        for block in blocks.iter() {
            let Some(mode) = modes_in_block(allowed, block, rsrc).highest() else {
                continue;
            };
            let layout = self.compute_surface_info(&SurfaceDescriptor {
                swizzle_mode: mode,
                ..*desc
            })?;
            let size = layout.surf_size.next_multiple_of(size_align);
            padded[block as usize] = size;
            log::trace!("{mode}: padded size {size}");
            let better = match best {
                None => true,
                Some((_, min)) => bigger_block_acceptable(min, size, ratio_low, ratio_high),
            };
            if better {
                best = Some((block, size));
            }
        }
        let Some((mut choice, min_size)) = best else {
            return Err(AddrError::invalid("no block size can hold the surface"));
        };

        if input.memory_budget > 1.0 {
            let budget = f64::from(input.memory_budget);
            for block in BlockType::ALL {
                if block < choice {
                    blocks = blocks.without(block);
                } else if block > choice
                    && blocks.contains(block)
                    && padded[block as usize] as f64 > min_size as f64 * budget
                {
                    blocks = blocks.without(block);
                }
            }
            if blocks.len() > 1 {
                blocks = blocks.without(BlockType::Linear);
            }
            choice = blocks.largest().unwrap_or(choice);
        }
        Ok(choice)
    }

    /// Fixed swizzle type priority by format class and dimensionality.
    fn preferred_type(
        &self,
        input: &PreferredSettingInput,
        rsrc: ResourceType,
        allowed: SwModeSet,
        types: SwizzleTypeSet,
    ) -> SwizzleType {
        use SwizzleType::{D, R, S, Z};

        let order: [SwizzleType; 4] = if input.format.is_block_compressed() {
            [D, S, R, Z]
        } else if input.format.is_macro_pixel_packed() {
            [S, D, R, Z]
        } else if rsrc == ResourceType::Tex3d {
            let thick_64kb = blocks_of(allowed, rsrc).contains(BlockType::Thick64kb);
            if input.flags.color && thick_64kb && types.contains(D) {
                [D, S, R, Z]
            } else {
                [S, R, Z, D]
            }
        } else {
            [R, D, S, Z]
        };
        order
            .into_iter()
            .find(|ty| types.contains(*ty))
            .unwrap_or(Z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swizzle_mode::X_MASK;

    #[test]
    fn test_block_type_of_mode() {
        assert_eq!(BlockType::of(SwizzleMode::Sw64kbSX, ResourceType::Tex3d), BlockType::Thick64kb);
        assert_eq!(BlockType::of(SwizzleMode::Sw64kbDX, ResourceType::Tex3d), BlockType::Thin64kb);
        assert_eq!(BlockType::of(SwizzleMode::Sw64kbSX, ResourceType::Tex2d), BlockType::Thin64kb);
        assert_eq!(BlockType::of(SwizzleMode::Sw4kbS, ResourceType::Tex3d), BlockType::Thick4kb);
        assert_eq!(BlockType::of(SwizzleMode::Sw256bD, ResourceType::Tex2d), BlockType::Micro);
    }

    #[test]
    fn test_block_set() {
        let set = BlockSet::of(&[BlockType::Micro, BlockType::Thin64kb]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.largest(), Some(BlockType::Thin64kb));
        assert!(!set.without(BlockType::Micro).contains(BlockType::Micro));
        assert_eq!(BlockSet::EMPTY.largest(), None);
    }

    #[test]
    fn test_bigger_block_ratio() {
        // Default ratio accepts a bigger block up to twice the size.
        assert!(bigger_block_acceptable(100, 199, 2, 1));
        assert!(!bigger_block_acceptable(100, 200, 2, 1));
        // Minimum size needs a strict win.
        assert!(!bigger_block_acceptable(100, 100, 1, 1));
    }

    #[test]
    fn test_swizzle_type_of_mode() {
        assert_eq!(SwizzleType::of(SwizzleMode::Linear), None);
        assert_eq!(SwizzleType::of(SwizzleMode::Sw64kbZX), Some(SwizzleType::Z));
        assert_eq!(SwizzleType::of(SwizzleMode::Sw4kbDX), Some(SwizzleType::D));
        assert_eq!(SwizzleType::of(SwizzleMode::Sw64kbRX), Some(SwizzleType::R));
        assert!(types_of(BLK64KB_MASK).contains(SwizzleType::S));
        assert!(!types_of(LINEAR_MASK.union(X_MASK)).is_empty());
    }
}
