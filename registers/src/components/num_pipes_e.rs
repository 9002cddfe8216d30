//! Field Enum: NUM_PIPES

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumPipesE {
    Pipes1 = 0,
    Pipes2 = 1,
    Pipes4 = 2,
    Pipes8 = 3,
    Pipes16 = 4,
    Pipes32 = 5,
    Pipes64 = 6,
}

impl NumPipesE {
    /// Decode a bit pattern into an encoded enum variant.
    ///
    /// # Errors
    /// Returns an error if the bit pattern does not match any encoded variants.
    pub const fn from_bits(bits: u8) -> Result<Self, crate::encode::UnknownVariant<u8>> {
        match bits {
            0 => Ok(Self::Pipes1),
            1 => Ok(Self::Pipes2),
            2 => Ok(Self::Pipes4),
            3 => Ok(Self::Pipes8),
            4 => Ok(Self::Pipes16),
            5 => Ok(Self::Pipes32),
            6 => Ok(Self::Pipes64),
            bits => Err(crate::encode::UnknownVariant::new(bits)),
        }
    }

    /// The bit pattern of the variant
    #[must_use]
    pub const fn bits(&self) -> u8 {
        *self as u8
    }

    /// Pipe count as a power of two; the encoding is the log2 directly.
    #[must_use]
    pub const fn log2(&self) -> u32 {
        *self as u32
    }
}
