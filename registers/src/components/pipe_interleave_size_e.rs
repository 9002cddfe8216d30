//! Field Enum: PIPE_INTERLEAVE_SIZE

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipeInterleaveSizeE {
    Bytes256 = 0,
    Bytes512 = 1,
    Bytes1K = 2,
    Bytes2K = 3,
}

impl PipeInterleaveSizeE {
    /// Decode a bit pattern into an encoded enum variant.
    ///
    /// # Errors
    /// Returns an error if the bit pattern does not match any encoded variants.
    pub const fn from_bits(bits: u8) -> Result<Self, crate::encode::UnknownVariant<u8>> {
        match bits {
            0 => Ok(Self::Bytes256),
            1 => Ok(Self::Bytes512),
            2 => Ok(Self::Bytes1K),
            3 => Ok(Self::Bytes2K),
            bits => Err(crate::encode::UnknownVariant::new(bits)),
        }
    }

    /// The bit pattern of the variant
    #[must_use]
    pub const fn bits(&self) -> u8 {
        *self as u8
    }

    /// Interleave size in bytes, log2.
    #[must_use]
    pub const fn log2(&self) -> u32 {
        8 + *self as u32
    }
}
