//! Block footprints in log2 units, mirroring how the hardware sizes a
//! swizzle block for a given element size.

/// Width/height split of a 256-byte thin micro block.
pub fn thin_micro_dims_log2(elem_log2: u32) -> (u32, u32) {
    let bits = 8 - elem_log2;
    (bits - bits / 2, bits / 2)
}

/// Width/height/depth split of a 256-byte thick micro block.
pub fn thick_micro_dims_log2(elem_log2: u32) -> (u32, u32, u32) {
    let bits = 8 - elem_log2;
    let base = bits / 3;
    let rem = bits % 3;
    (base + u32::from(rem > 1), base, base + u32::from(rem > 0))
}

/// Thin block of `2^block_log2` bytes holding `2^frag_log2` fragments.
pub fn thin_block_dims_log2(elem_log2: u32, frag_log2: u32, block_log2: u32) -> (u32, u32) {
    let (mut w, mut h) = thin_micro_dims_log2(elem_log2);
    let amp = block_log2 - 8;
    w += amp / 2;
    h += amp - amp / 2;

    let q = frag_log2 >> 1;
    let r = frag_log2 & 1;
    if block_log2 & 1 == 1 {
        w -= q;
        h -= q + r;
    } else {
        w -= q + r;
        h -= q;
    }
    (w, h)
}

/// Thick block of `2^block_log2` bytes, grown from the 1KB thick block.
pub fn thick_block_dims_log2(elem_log2: u32, block_log2: u32) -> (u32, u32, u32) {
    let bits = 10 - elem_log2;
    let base = bits / 3;
    let rem = bits % 3;
    let (mut w, mut h, mut d) = (base + u32::from(rem > 0), base + u32::from(rem > 1), base);

    let amp = block_log2 - 10;
    let avg = amp / 3;
    let rest = amp % 3;
    w += avg;
    h += avg + rest / 2;
    d += avg + u32::from(rest != 0);
    (w, h, d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thin_64k_dims_fill_block() {
        for elem_log2 in 0..5 {
            let (w, h) = thin_block_dims_log2(elem_log2, 0, 16);
            assert_eq!(w + h + elem_log2, 16);
            assert!(w >= h);
        }
        assert_eq!(thin_block_dims_log2(2, 0, 16), (7, 7));
        assert_eq!(thin_block_dims_log2(2, 3, 16), (5, 6));
    }

    #[test]
    fn test_thick_dims_match_1k_table() {
        // 1KB thick blocks: 16x8x8, 8x8x8, 8x8x4, 8x4x4, 4x4x4.
        let expected = [(4, 3, 3), (3, 3, 3), (3, 3, 2), (3, 2, 2), (2, 2, 2)];
        for (elem_log2, dims) in expected.iter().enumerate() {
            assert_eq!(thick_block_dims_log2(elem_log2 as u32, 10), *dims);
        }
        assert_eq!(thick_block_dims_log2(0, 16), (6, 5, 5));
    }

    #[test]
    fn test_thick_micro_dims() {
        // 256B thick blocks: 8x4x8, 4x4x8, 4x4x4, 4x2x4, 2x2x4.
        let expected = [(3, 2, 3), (2, 2, 3), (2, 2, 2), (2, 1, 2), (1, 1, 2)];
        for (elem_log2, dims) in expected.iter().enumerate() {
            assert_eq!(thick_micro_dims_log2(elem_log2 as u32), *dims);
        }
    }
}
