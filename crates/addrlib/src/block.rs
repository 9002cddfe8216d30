//! Block footprints: 256B micro blocks, 4KB/64KB macro blocks, mip tails and
//! compression meta blocks.

use crate::addr_lib::AddrLib;
use crate::bits::{gcd, log2};
use crate::error::AddrError;
use crate::meta::MetaDataKind;
use crate::swizzle_mode::SwizzleMode;
use crate::types::{Dim2d, Dim3d, ResourceType};

/// 256B thin micro block in elements, by element size log2.
pub const BLOCK_256_2D: [Dim2d; 5] = [
    Dim2d { w: 16, h: 16 },
    Dim2d { w: 16, h: 8 },
    Dim2d { w: 8, h: 8 },
    Dim2d { w: 8, h: 4 },
    Dim2d { w: 4, h: 4 },
];

/// 256B thick micro block in elements.
pub const BLOCK_256_3D: [Dim3d; 5] = [
    Dim3d::new(8, 4, 8),
    Dim3d::new(4, 4, 8),
    Dim3d::new(4, 4, 4),
    Dim3d::new(4, 2, 4),
    Dim3d::new(2, 2, 4),
];

/// 1KB thick block in elements, the base thick macro blocks grow from.
pub const BLOCK_1K_3D: [Dim3d; 5] = [
    Dim3d::new(16, 8, 8),
    Dim3d::new(8, 8, 8),
    Dim3d::new(8, 8, 4),
    Dim3d::new(8, 4, 4),
    Dim3d::new(4, 4, 4),
];

pub const MAX_ELEM_LOG2: u32 = 4;

/// Element size log2 for a tiled surface. Tiled elements are 1 to 16
/// power-of-two bytes.
pub fn elem_log2(bpp: u32) -> Result<u32, AddrError> {
    let bytes = bpp >> 3;
    if bpp % 8 != 0 || !bytes.is_power_of_two() || bytes > 16 {
        return Err(AddrError::invalid(format!("{bpp} bpp has no tiled element size")));
    }
    Ok(log2(bytes))
}

/// Log2 footprint of one 256B block; `d` is zero for thin modes.
pub fn blk256_size_log2(
    rsrc: ResourceType,
    mode: SwizzleMode,
    elem_log2: u32,
    samples_log2: u32,
) -> Dim3d {
    if mode.is_thin(rsrc) {
        let mut bits = 8 - elem_log2;
        if mode.is_z_order() {
            bits -= samples_log2;
        }
        Dim3d::new(bits - bits / 2, bits / 2, 0)
    } else {
        let bits = 8 - elem_log2;
        let base = bits / 3;
        Dim3d::new(
            base + u32::from(bits % 3 > 1),
            base,
            base + u32::from(bits % 3 > 0),
        )
    }
}

/// Pitch alignment of a linear surface, in elements.
pub fn linear_pitch_align(mode: SwizzleMode, bpp: u32, alignment: u32) -> u32 {
    let bytes = (bpp >> 3).max(1);
    if mode == SwizzleMode::LinearGeneral {
        1
    } else {
        alignment / gcd(alignment, bytes)
    }
}

/// Swizzle block footprint in elements.
pub fn compute_block_dims(
    rsrc: ResourceType,
    mode: SwizzleMode,
    bpp: u32,
    num_frags: u32,
) -> Result<Dim3d, AddrError> {
    if mode.is_linear() {
        return Ok(Dim3d::new(linear_pitch_align(mode, bpp, 256), 1, 1));
    }

    let elem_log2 = elem_log2(bpp)?;
    let blk_log2 = mode.block_size_log2();

    if mode.is_thick(rsrc) {
        let base = BLOCK_1K_3D[elem_log2 as usize];
        let amp = blk_log2 - 10;
        let avg = amp / 3;
        let rest = amp % 3;
        Ok(Dim3d::new(
            base.w << avg,
            base.h << (avg + rest / 2),
            base.d << (avg + u32::from(rest != 0)),
        ))
    } else {
        let base = BLOCK_256_2D[elem_log2 as usize];
        let amp = blk_log2 - 8;
        let width_amp = amp / 2;
        let mut dims = Dim3d::new(base.w << width_amp, base.h << (amp - width_amp), 1);

        if num_frags > 1 {
            let frags_log2 = log2(num_frags);
            let q = frags_log2 >> 1;
            let r = frags_log2 & 1;
            if blk_log2 & 1 == 1 {
                dims.w >>= q;
                dims.h >>= q + r;
            } else {
                dims.w >>= q + r;
                dims.h >>= q;
            }
        }
        Ok(dims)
    }
}

/// Largest number of mips the tail block can hold.
pub fn max_mips_in_tail(blk_log2: u32, thick: bool) -> u32 {
    let effective = if thick {
        blk_log2 - (blk_log2 - 8) / 3
    } else {
        blk_log2
    };
    if effective <= 11 {
        1 + (1 << (effective - 9))
    } else {
        effective - 4
    }
}

/// A mip joins the tail once it fits the tail footprint and few enough
/// levels remain.
pub fn is_in_mip_tail(tail: Dim3d, max_in_tail: u32, mip: Dim3d, levels_to_end: u32) -> bool {
    mip.w <= tail.w && mip.h <= tail.h && mip.d <= tail.d && levels_to_end <= max_in_tail
}

/// Size of a compression meta block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetaBlockSize {
    /// Footprint in data-surface elements.
    pub w: u32,
    pub h: u32,
    pub d: u32,
    /// Meta block size in bytes, log2.
    pub size_log2: u32,
}

impl MetaBlockSize {
    pub const fn size(&self) -> u32 {
        1 << self.size_log2
    }
}

impl AddrLib {
    /// Half of the block along one axis: the space the mip tail occupies.
    pub(crate) fn mip_tail_dim(&self, rsrc: ResourceType, mode: SwizzleMode, blk: Dim3d) -> Dim3d {
        let blk_log2 = mode.block_size_log2();
        let mut out = blk;
        if mode.is_thick(rsrc) {
            match blk_log2 % 3 {
                0 => out.h >>= 1,
                1 => out.w >>= 1,
                _ => out.d >>= 1,
            }
        } else if blk_log2 & 1 == 1 {
            out.h >>= 1;
        } else {
            out.w >>= 1;
        }
        out
    }

    pub(crate) fn effective_num_pipes_log2(&self) -> u32 {
        let sa_pipes = self.params.num_sa_log2 + 1;
        if !self.settings.support_rb_plus || sa_pipes >= self.params.pipes_log2 {
            self.params.pipes_log2
        } else {
            sa_pipes
        }
    }

    pub(crate) fn is_rb_aligned(&self, rsrc: ResourceType, mode: SwizzleMode) -> bool {
        match rsrc {
            ResourceType::Tex2d => mode.is_z_order() || mode.is_rt_opt(),
            ResourceType::Tex3d => mode.is_display(),
            ResourceType::Tex1d => false,
        }
    }

    pub(crate) fn pipe_rotate_amount(&self, rsrc: ResourceType, mode: SwizzleMode) -> u32 {
        let pipes = self.params.pipes_log2;
        let sa_pipes = self.params.num_sa_log2 + 1;
        if self.settings.support_rb_plus && pipes >= sa_pipes && pipes > 1 {
            if pipes == sa_pipes && self.is_rb_aligned(rsrc, mode) {
                1
            } else {
                pipes - sa_pipes
            }
        } else {
            0
        }
    }

    fn compressed_block_size_log2(
        &self,
        kind: MetaDataKind,
        rsrc: ResourceType,
        mode: SwizzleMode,
        elem_log2: u32,
        samples_log2: u32,
    ) -> Dim3d {
        match kind {
            MetaDataKind::Color => blk256_size_log2(rsrc, mode, elem_log2, samples_log2),
            MetaDataKind::DepthStencil | MetaDataKind::Fmask => Dim3d::new(3, 3, 0),
        }
    }

    /// Pipe bits that overlap the compressed block in a 2-D meta block.
    pub(crate) fn meta_overlap_log2(
        &self,
        kind: MetaDataKind,
        rsrc: ResourceType,
        mode: SwizzleMode,
        elem_log2: u32,
        samples_log2: u32,
    ) -> u32 {
        let comp = self.compressed_block_size_log2(kind, rsrc, mode, elem_log2, samples_log2);
        let micro = blk256_size_log2(rsrc, mode, elem_log2, samples_log2);
        let comp_size_log2 = comp.w + comp.h;
        let blk256_log2 = micro.w + micro.h;

        let mut overlap = self.effective_num_pipes_log2() as i32
            - comp_size_log2.max(blk256_log2) as i32;
        if self.settings.support_rb_plus && self.params.pipes_log2 > 1 {
            overlap += 1;
        }
        // 16Bpe 8xaa loses one overlap bit.
        if elem_log2 == 4 && samples_log2 == 3 {
            overlap -= 1;
        }
        overlap.max(0) as u32
    }

    pub(crate) fn meta_3d_overlap_log2(&self, mode: SwizzleMode, elem_log2: u32) -> u32 {
        let micro = blk256_size_log2(ResourceType::Tex3d, mode, elem_log2, 0);
        let mut overlap = self.effective_num_pipes_log2() as i32 - micro.w as i32;
        if self.settings.support_rb_plus {
            overlap += 1;
        }
        if overlap < 0 || mode.is_standard() {
            0
        } else {
            overlap as u32
        }
    }

    /// Meta block covering a data surface of the given kind and mode.
    pub fn meta_block_size(
        &self,
        kind: MetaDataKind,
        rsrc: ResourceType,
        mode: SwizzleMode,
        elem_log2: u32,
        samples_log2: u32,
        pipe_align: bool,
    ) -> MetaBlockSize {
        let meta_elem_log2: i32 = match kind {
            MetaDataKind::Color => 0,
            MetaDataKind::DepthStencil => 2,
            MetaDataKind::Fmask => -1,
        };
        let meta_cache_log2: i32 = match kind {
            MetaDataKind::Color => 6,
            MetaDataKind::DepthStencil | MetaDataKind::Fmask => 8,
        };
        let samples_log2 = match kind {
            MetaDataKind::DepthStencil => samples_log2,
            _ => samples_log2.min(self.params.max_comp_frag_log2),
        } as i32;
        let e = elem_log2 as i32;
        let comp_blk_log2: i32 = match kind {
            MetaDataKind::Color => 8,
            _ => 6 + samples_log2 + e,
        };

        let pipes = self.params.pipes_log2 as i32;
        let sa_pipes = self.params.num_sa_log2 as i32 + 1;
        let pil = self.params.pipe_interleave_log2 as i32;
        let blk_log2 = mode.block_size_log2() as i32;
        let rb_plus = self.settings.support_rb_plus;
        let mut num_pipes_log2 = self.effective_num_pipes_log2() as i32;

        if mode.is_thin(rsrc) {
            let meta_log2 = if !pipe_align || mode.is_standard() || mode.is_display() {
                if pipe_align {
                    (pil + num_pipes_log2).max(12).min(blk_log2)
                } else {
                    blk_log2.min(12)
                }
            } else {
                if rb_plus && pipes == sa_pipes && pipes > 1 {
                    num_pipes_log2 += 1;
                }
                let rotate = self.pipe_rotate_amount(rsrc, mode) as i32;

                let mut meta_log2 = if num_pipes_log2 >= 4 {
                    let mut overlap =
                        self.meta_overlap_log2(kind, rsrc, mode, elem_log2, samples_log2 as u32)
                            as i32;
                    if rotate > 0
                        && e == 4
                        && samples_log2 == 3
                        && (mode.is_z_order() || self.effective_num_pipes_log2() > 3)
                    {
                        overlap += 1;
                    }
                    let mut size = (meta_cache_log2 + overlap + num_pipes_log2)
                        .max(pil + num_pipes_log2);
                    if rb_plus
                        && mode.is_rt_opt()
                        && num_pipes_log2 == 6
                        && samples_log2 == 3
                        && self.params.max_comp_frag_log2 == 3
                    {
                        size = size.max(15);
                    }
                    size
                } else {
                    (pil + num_pipes_log2).max(12)
                };

                if kind == MetaDataKind::DepthStencil {
                    // At least 2KB per pipe.
                    meta_log2 = meta_log2.max(11 + num_pipes_log2);
                }

                let comp_frag_log2 = (self.params.max_comp_frag_log2 as i32).min(samples_log2);
                if mode.is_rt_opt() && comp_frag_log2 > 1 && rotate >= 1 {
                    meta_log2 = meta_log2.max(8 + pipes + rotate.max(comp_frag_log2 - 1));
                }
                meta_log2
            };

            let bits = (meta_log2 + comp_blk_log2 - e - samples_log2 - meta_elem_log2) as u32;
            MetaBlockSize {
                w: 1 << (bits - bits / 2),
                h: 1 << (bits / 2),
                d: 1,
                size_log2: meta_log2 as u32,
            }
        } else {
            let meta_log2 = if pipe_align {
                if rb_plus && pipes == sa_pipes && pipes > 1 && self.is_rb_aligned(rsrc, mode) {
                    num_pipes_log2 += 1;
                }
                let overlap = self.meta_3d_overlap_log2(mode, elem_log2) as i32;
                (meta_cache_log2 + overlap + num_pipes_log2)
                    .max(pil + num_pipes_log2)
                    .max(12)
            } else {
                12
            };

            let bits = (meta_log2 + comp_blk_log2 - e - samples_log2 - meta_elem_log2) as u32;
            let base = bits / 3;
            MetaBlockSize {
                w: 1 << (base + u32::from(bits % 3 > 0)),
                h: 1 << (base + u32::from(bits % 3 > 1)),
                d: 1 << base,
                size_log2: meta_log2 as u32,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_dims_64kb() {
        let dims = compute_block_dims(ResourceType::Tex2d, SwizzleMode::Sw64kbSX, 32, 1).unwrap();
        assert_eq!(dims, Dim3d::new(128, 128, 1));
        let dims = compute_block_dims(ResourceType::Tex2d, SwizzleMode::Sw64kbZX, 32, 8).unwrap();
        assert_eq!(dims, Dim3d::new(32, 64, 1));
        let dims = compute_block_dims(ResourceType::Tex3d, SwizzleMode::Sw64kbSX, 8, 1).unwrap();
        assert_eq!(dims, Dim3d::new(64, 32, 32));
        let dims = compute_block_dims(ResourceType::Tex3d, SwizzleMode::Sw4kbS, 32, 1).unwrap();
        assert_eq!(dims, Dim3d::new(8, 16, 8));
    }

    #[test]
    fn test_block_dims_fill_block() {
        for mode in [SwizzleMode::Sw256bD, SwizzleMode::Sw4kbSX, SwizzleMode::Sw64kbRX] {
            for e in 0..=MAX_ELEM_LOG2 {
                let dims = compute_block_dims(ResourceType::Tex2d, mode, 8 << e, 1).unwrap();
                assert_eq!(
                    (dims.w * dims.h) << e,
                    1 << mode.block_size_log2(),
                    "{mode} elem_log2 {e}"
                );
            }
        }
    }

    #[test]
    fn test_blk256_split() {
        let thin = blk256_size_log2(ResourceType::Tex2d, SwizzleMode::Sw64kbSX, 1, 0);
        assert_eq!((thin.w, thin.h), (4, 3));
        let z = blk256_size_log2(ResourceType::Tex2d, SwizzleMode::Sw64kbZX, 0, 2);
        assert_eq!((z.w, z.h), (3, 3));
        let thick = blk256_size_log2(ResourceType::Tex3d, SwizzleMode::Sw64kbSX, 0, 0);
        assert_eq!(thick, Dim3d::new(3, 2, 3));
    }

    #[test]
    fn test_max_mips_in_tail() {
        assert_eq!(max_mips_in_tail(16, false), 12);
        assert_eq!(max_mips_in_tail(12, false), 8);
        assert_eq!(max_mips_in_tail(16, true), 10);
        assert_eq!(max_mips_in_tail(12, true), 5);
    }

    #[test]
    fn test_bad_element_size() {
        assert!(elem_log2(96).is_err());
        assert!(elem_log2(256).is_err());
        assert_eq!(elem_log2(128).unwrap(), 4);
    }
}
