//! Chip capability settings and the global addressing parameters decoded
//! from `GB_ADDR_CONFIG`.

use crate::error::AddrError;
use gfx_registers::GbAddrConfigReg;
use gfx_registers::components::gb_addr_config_reg::pipe_interleave_size::PipeInterleaveSizeE;

/// GPU family as reported by the kernel driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipFamily {
    /// gfx10 ("Navi") parts.
    Navi,
    Unknown,
}

/// First external revision id of each gfx10 part.
pub mod revision {
    pub const NAVI10: u32 = 0x01;
    pub const NAVI12: u32 = 0x0A;
    pub const NAVI14: u32 = 0x14;
    pub const SIENNA_CICHLID: u32 = 0x28;
    pub const NAVY_FLOUNDER: u32 = 0x32;
    pub const DIMGREY_CAVEFISH: u32 = 0x3C;
    pub const BEIGE_GOBY: u32 = 0x46;
    pub const UNKNOWN: u32 = 0xFF;
}

/// Capability switches that differ between parts of the same family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChipSettings {
    /// Extended pipe/bank XOR with packers (RB+).
    pub support_rb_plus: bool,
    /// Shrink the mip tail of small-element Z surfaces so HTile mips align.
    pub ds_mipmap_htile_fix: bool,
    /// Display engine is DCN 2.0; later parts use the DCN 2.1 rules.
    pub is_dcn20: bool,
}

impl ChipSettings {
    /// Map a chip to its capability settings.
    pub fn for_chip(family: ChipFamily, chip_revision: u32) -> Result<Self, AddrError> {
        use revision::*;

        if family != ChipFamily::Navi {
            return Err(AddrError::unsupported(format!("chip family {family:?}")));
        }
        let settings = match chip_revision {
            NAVI10..NAVI14 => Self {
                support_rb_plus: false,
                ds_mipmap_htile_fix: true,
                is_dcn20: true,
            },
            NAVI14..SIENNA_CICHLID => Self {
                support_rb_plus: true,
                ds_mipmap_htile_fix: true,
                is_dcn20: true,
            },
            SIENNA_CICHLID..UNKNOWN => Self {
                support_rb_plus: true,
                ds_mipmap_htile_fix: false,
                is_dcn20: false,
            },
            _ => return Err(AddrError::unsupported(format!("revision {chip_revision:#x}"))),
        };
        Ok(settings)
    }
}

/// Immutable per-instance tiling parameters. Counts are log2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalAddressingParams {
    pub pipes_log2: u32,
    pub pipe_interleave_log2: u32,
    pub max_comp_frag_log2: u32,
    pub num_pkr_log2: u32,
    pub num_sa_log2: u32,
}

impl GlobalAddressingParams {
    /// Decode the register value.
    ///
    /// Only a 256-byte pipe interleave is modeled. RB+ parts carry at most
    /// 16 pipes and never more packers than pipes.
    pub fn decode(reg: GbAddrConfigReg, settings: &ChipSettings) -> Result<Self, AddrError> {
        let pipes_log2 = reg
            .num_pipes()
            .map_err(|e| AddrError::unsupported(format!("NUM_PIPES: {e}")))?
            .log2();
        let interleave = reg
            .pipe_interleave_size()
            .map_err(|e| AddrError::unsupported(format!("PIPE_INTERLEAVE_SIZE: {e}")))?;
        if interleave != PipeInterleaveSizeE::Bytes256 {
            return Err(AddrError::unsupported(format!(
                "pipe interleave {interleave:?}"
            )));
        }

        let num_pkr_log2 = if settings.support_rb_plus {
            let pkr = u32::from(reg.num_pkrs());
            if pipes_log2 > 4 || pkr > pipes_log2 {
                return Err(AddrError::unsupported(format!(
                    "RB+ with {pipes_log2} pipe bits and {pkr} packer bits"
                )));
            }
            pkr
        } else {
            0
        };

        Ok(Self {
            pipes_log2,
            pipe_interleave_log2: interleave.log2(),
            max_comp_frag_log2: u32::from(reg.max_compressed_frags()),
            num_pkr_log2,
            num_sa_log2: num_pkr_log2.saturating_sub(1),
        })
    }

    pub const fn num_pipes(&self) -> u32 {
        1 << self.pipes_log2
    }

    pub const fn pipe_interleave_bytes(&self) -> u32 {
        1 << self.pipe_interleave_log2
    }
}
