//! Register trait and field extraction shared by all register types

use num_traits::PrimInt;

/// A hardware register with a fixed-width raw representation.
pub trait Register: Copy {
    type Regwidth: PrimInt + core::fmt::Debug;

    /// Wrap a raw register value. Every bit pattern is representable;
    /// reserved bits are carried through untouched.
    fn from_raw(val: Self::Regwidth) -> Self;

    fn to_raw(self) -> Self::Regwidth;
}

/// Extract the field at `offset` with the given right-aligned `mask`.
#[inline(always)]
#[must_use]
pub fn field<T: PrimInt>(raw: T, offset: usize, mask: T) -> T {
    (raw >> offset) & mask
}

/// Return `raw` with the field at `offset` replaced by `val`.
#[inline(always)]
#[must_use]
pub fn with_field<T: PrimInt>(raw: T, offset: usize, mask: T, val: T) -> T {
    (raw & !(mask << offset)) | ((val & mask) << offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_round_trip() {
        let raw = with_field(0u32, 8, 0x7, 0x5);
        assert_eq!(raw, 0x500);
        assert_eq!(field(raw, 8, 0x7), 0x5);
        // Value wider than the mask is truncated.
        assert_eq!(with_field(raw, 8, 0x7, 0xF), 0x700);
    }
}
