//! Small integer helpers shared by the layout and address paths.

/// Log2 of a power of two; for other values, the index of the top set bit.
#[inline]
pub(crate) fn log2(value: u32) -> u32 {
    debug_assert!(value != 0);
    31 - value.leading_zeros()
}

#[inline]
pub(crate) fn is_pow2(value: u32) -> bool {
    value != 0 && value & (value - 1) == 0
}

/// Round `value` up to a power-of-two `align`.
#[inline]
pub(crate) fn pow2_align(value: u32, align: u32) -> u32 {
    debug_assert!(is_pow2(align));
    (value + align - 1) & !(align - 1)
}

/// Round `value` up to any non-zero multiple of `align`.
#[inline]
pub(crate) fn align_up(value: u32, align: u32) -> u32 {
    value.div_ceil(align) * align
}

/// `ceil(value / 2)`.
#[inline]
pub(crate) fn round_half(value: u32) -> u32 {
    (value >> 1) + (value & 1)
}

/// Reverse the low `num_bits` bits of `value`.
#[inline]
pub(crate) fn reverse_bits(value: u32, num_bits: u32) -> u32 {
    if num_bits == 0 {
        0
    } else {
        (value & ((1 << num_bits) - 1)).reverse_bits() >> (32 - num_bits)
    }
}

/// Greatest common divisor.
pub(crate) fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_bits() {
        assert_eq!(reverse_bits(0b001, 3), 0b100);
        assert_eq!(reverse_bits(0b110, 3), 0b011);
        assert_eq!(reverse_bits(0b1111, 2), 0b11);
        assert_eq!(reverse_bits(5, 0), 0);
    }

    #[test]
    fn test_alignment() {
        assert_eq!(pow2_align(200, 64), 256);
        assert_eq!(align_up(100, 64), 128);
        assert_eq!(align_up(21, 21), 21);
        assert_eq!(gcd(256, 12), 4);
        assert_eq!(log2(65536), 16);
        assert_eq!(log2(96), 6);
    }
}
