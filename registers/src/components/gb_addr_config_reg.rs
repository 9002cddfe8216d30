//! Register: GB_ADDR_CONFIG

// Instances of named component types
pub use crate::components::num_pipes_e as num_pipes;
pub use crate::components::pipe_interleave_size_e as pipe_interleave_size;

use crate::reg::{field, with_field};

/// GB_ADDR_CONFIG
///
/// Global tiling configuration of the graphics block. Every swizzle,
/// pipe/bank XOR and metadata layout decision is parameterized by the
/// pipe count, pipe interleave and packer count read from this register.
/// Count fields hold log2 values.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct GbAddrConfigReg(u32);

impl core::default::Default for GbAddrConfigReg {
    fn default() -> Self {
        Self(0x0)
    }
}

impl crate::reg::Register for GbAddrConfigReg {
    type Regwidth = u32;

    fn from_raw(val: Self::Regwidth) -> Self {
        Self(val)
    }

    fn to_raw(self) -> Self::Regwidth {
        self.0
    }
}

impl GbAddrConfigReg {
    /// Wrap a raw register readback.
    #[must_use]
    pub const fn from_bits(val: u32) -> Self {
        Self(val)
    }

    #[must_use]
    pub const fn bits(&self) -> u32 {
        self.0
    }

    pub const NUM_PIPES_OFFSET: usize = 0;
    pub const NUM_PIPES_WIDTH: usize = 3;
    pub const NUM_PIPES_MASK: u32 = 0x7;

    /// NUM_PIPES
    #[inline(always)]
    pub fn num_pipes(&self) -> Result<num_pipes::NumPipesE, crate::encode::UnknownVariant<u8>> {
        let val = field(self.0, Self::NUM_PIPES_OFFSET, Self::NUM_PIPES_MASK);
        num_pipes::NumPipesE::from_bits(val as u8)
    }

    /// NUM_PIPES
    #[inline(always)]
    pub fn set_num_pipes(&mut self, val: num_pipes::NumPipesE) {
        self.0 = with_field(
            self.0,
            Self::NUM_PIPES_OFFSET,
            Self::NUM_PIPES_MASK,
            val.bits() as u32,
        );
    }

    pub const PIPE_INTERLEAVE_SIZE_OFFSET: usize = 3;
    pub const PIPE_INTERLEAVE_SIZE_WIDTH: usize = 3;
    pub const PIPE_INTERLEAVE_SIZE_MASK: u32 = 0x7;

    /// PIPE_INTERLEAVE_SIZE
    #[inline(always)]
    pub fn pipe_interleave_size(
        &self,
    ) -> Result<pipe_interleave_size::PipeInterleaveSizeE, crate::encode::UnknownVariant<u8>> {
        let val = field(
            self.0,
            Self::PIPE_INTERLEAVE_SIZE_OFFSET,
            Self::PIPE_INTERLEAVE_SIZE_MASK,
        );
        pipe_interleave_size::PipeInterleaveSizeE::from_bits(val as u8)
    }

    /// PIPE_INTERLEAVE_SIZE
    #[inline(always)]
    pub fn set_pipe_interleave_size(&mut self, val: pipe_interleave_size::PipeInterleaveSizeE) {
        self.0 = with_field(
            self.0,
            Self::PIPE_INTERLEAVE_SIZE_OFFSET,
            Self::PIPE_INTERLEAVE_SIZE_MASK,
            val.bits() as u32,
        );
    }

    pub const MAX_COMPRESSED_FRAGS_OFFSET: usize = 6;
    pub const MAX_COMPRESSED_FRAGS_WIDTH: usize = 2;
    pub const MAX_COMPRESSED_FRAGS_MASK: u32 = 0x3;

    /// MAX_COMPRESSED_FRAGS
    ///
    /// Log2 of the fragment count the color compressor keeps separately.
    #[inline(always)]
    #[must_use]
    pub fn max_compressed_frags(&self) -> u8 {
        field(
            self.0,
            Self::MAX_COMPRESSED_FRAGS_OFFSET,
            Self::MAX_COMPRESSED_FRAGS_MASK,
        ) as u8
    }

    /// MAX_COMPRESSED_FRAGS
    #[inline(always)]
    pub fn set_max_compressed_frags(&mut self, val: u8) {
        self.0 = with_field(
            self.0,
            Self::MAX_COMPRESSED_FRAGS_OFFSET,
            Self::MAX_COMPRESSED_FRAGS_MASK,
            val as u32,
        );
    }

    pub const NUM_PKRS_OFFSET: usize = 8;
    pub const NUM_PKRS_WIDTH: usize = 3;
    pub const NUM_PKRS_MASK: u32 = 0x7;

    /// NUM_PKRS
    ///
    /// Log2 of the packer count. Only meaningful on RB+ parts.
    #[inline(always)]
    #[must_use]
    pub fn num_pkrs(&self) -> u8 {
        field(self.0, Self::NUM_PKRS_OFFSET, Self::NUM_PKRS_MASK) as u8
    }

    /// NUM_PKRS
    #[inline(always)]
    pub fn set_num_pkrs(&mut self, val: u8) {
        self.0 = with_field(self.0, Self::NUM_PKRS_OFFSET, Self::NUM_PKRS_MASK, val as u32);
    }

    pub const NUM_SHADER_ENGINES_OFFSET: usize = 19;
    pub const NUM_SHADER_ENGINES_WIDTH: usize = 2;
    pub const NUM_SHADER_ENGINES_MASK: u32 = 0x3;

    /// NUM_SHADER_ENGINES
    #[inline(always)]
    #[must_use]
    pub fn num_shader_engines(&self) -> u8 {
        field(
            self.0,
            Self::NUM_SHADER_ENGINES_OFFSET,
            Self::NUM_SHADER_ENGINES_MASK,
        ) as u8
    }

    /// NUM_SHADER_ENGINES
    #[inline(always)]
    pub fn set_num_shader_engines(&mut self, val: u8) {
        self.0 = with_field(
            self.0,
            Self::NUM_SHADER_ENGINES_OFFSET,
            Self::NUM_SHADER_ENGINES_MASK,
            val as u32,
        );
    }

    pub const NUM_RB_PER_SE_OFFSET: usize = 26;
    pub const NUM_RB_PER_SE_WIDTH: usize = 2;
    pub const NUM_RB_PER_SE_MASK: u32 = 0x3;

    /// NUM_RB_PER_SE
    #[inline(always)]
    #[must_use]
    pub fn num_rb_per_se(&self) -> u8 {
        field(self.0, Self::NUM_RB_PER_SE_OFFSET, Self::NUM_RB_PER_SE_MASK) as u8
    }

    /// NUM_RB_PER_SE
    #[inline(always)]
    pub fn set_num_rb_per_se(&mut self, val: u8) {
        self.0 = with_field(
            self.0,
            Self::NUM_RB_PER_SE_OFFSET,
            Self::NUM_RB_PER_SE_MASK,
            val as u32,
        );
    }
}

impl core::fmt::Debug for GbAddrConfigReg {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GbAddrConfigReg")
            .field("num_pipes", &self.num_pipes())
            .field("pipe_interleave_size", &self.pipe_interleave_size())
            .field("max_compressed_frags", &self.max_compressed_frags())
            .field("num_pkrs", &self.num_pkrs())
            .field("num_shader_engines", &self.num_shader_engines())
            .field("num_rb_per_se", &self.num_rb_per_se())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let reg = GbAddrConfigReg::default();
        assert_eq!(reg.num_pipes(), Ok(num_pipes::NumPipesE::Pipes1));
        assert_eq!(
            reg.pipe_interleave_size(),
            Ok(pipe_interleave_size::PipeInterleaveSizeE::Bytes256)
        );
        assert_eq!(reg.max_compressed_frags(), 0);
        assert_eq!(reg.num_pkrs(), 0);
        assert_eq!(reg.num_shader_engines(), 0);
        assert_eq!(reg.num_rb_per_se(), 0);
    }
}
