use addrlib::block::compute_block_dims;
use addrlib::pattern::offset_from_pattern;
use addrlib::{AddrLib, ChipFamily, LibCreateInput, ResourceType, SwizzleMode, revision};

/// Every configuration the tables cover, legacy and RB+.
fn all_libs() -> Vec<AddrLib> {
    let mut libs = Vec::new();
    for pipes in 0..=5u32 {
        let legacy = AddrLib::new(&LibCreateInput {
            chip_family: ChipFamily::Navi,
            chip_revision: revision::NAVI10,
            gb_addr_config: pipes,
        });
        libs.extend(legacy);
        for pkr in 0..=pipes {
            let rb_plus = AddrLib::new(&LibCreateInput {
                chip_family: ChipFamily::Navi,
                chip_revision: revision::SIENNA_CICHLID,
                gb_addr_config: pipes | (pkr << 8),
            });
            libs.extend(rb_plus);
        }
    }
    libs
}

/// Equation and pattern agree on every coordinate. Both are XOR-linear in
/// the coordinate bits, so checking each single bit covers the space.
#[test]
fn test_equation_matches_pattern() {
    let libs = all_libs();
    assert!(libs.len() >= 8, "only {} configurations built", libs.len());

    let mut checked = 0;
    for lib in &libs {
        for rsrc in [ResourceType::Tex2d, ResourceType::Tex3d] {
            for mode in SwizzleMode::ALL {
                for e in 0..5u32 {
                    let Some(index) = lib.equation_index(rsrc, mode, e) else {
                        continue;
                    };
                    let eq = lib.equation(index).unwrap();
                    let pattern = lib.swizzle_pattern(rsrc, mode, e, 1).unwrap();
                    let blk_log2 = mode.block_size_log2();
                    assert_eq!(eq.num_bits, blk_log2);

                    let mut coords = vec![(0, 0, 0)];
                    for bit in 0..14 {
                        coords.push((1 << bit, 0, 0));
                        coords.push((0, 1 << bit, 0));
                        coords.push((0, 0, 1 << bit));
                    }
                    coords.push((0x155, 0x2aa, 0x3));
                    for (x, y, z) in coords {
                        assert_eq!(
                            eq.offset(x << e, y, z),
                            offset_from_pattern(&pattern, blk_log2, x, y, z, 0),
                            "{mode} {rsrc:?} e={e} at ({x}, {y}, {z})"
                        );
                    }
                    checked += 1;
                }
            }
        }
    }
    assert!(checked > 100);
}

/// Inside one block the equation is a bijection onto the block's bytes.
#[test]
fn test_equation_covers_block() {
    let lib = AddrLib::new(&LibCreateInput {
        chip_family: ChipFamily::Navi,
        chip_revision: revision::NAVI10,
        gb_addr_config: 0x2,
    })
    .unwrap();

    for (mode, bpp) in [(SwizzleMode::Sw4kbSX, 32), (SwizzleMode::Sw64kbRX, 64), (SwizzleMode::Sw4kbD, 8)] {
        let e = (bpp / 8u32).trailing_zeros();
        let blk = compute_block_dims(ResourceType::Tex2d, mode, bpp, 1).unwrap();
        let eq = lib
            .equation(lib.equation_index(ResourceType::Tex2d, mode, e).unwrap())
            .unwrap();
        let mut seen = vec![false; 1 << mode.block_size_log2()];
        for y in 0..blk.h {
            for x in 0..blk.w {
                let offset = eq.offset(x << e, y, 0) as usize;
                assert_eq!(offset % (1 << e), 0);
                assert!(!seen[offset], "{mode}: ({x}, {y}) collides at {offset:#x}");
                seen[offset] = true;
            }
        }
    }
}

#[test]
fn test_no_equation_for_linear_or_unsupported() {
    let lib = AddrLib::new(&LibCreateInput {
        chip_family: ChipFamily::Navi,
        chip_revision: revision::NAVI10,
        gb_addr_config: 0x2,
    })
    .unwrap();
    assert!(lib.equation_index(ResourceType::Tex2d, SwizzleMode::Linear, 2).is_none());
    assert!(lib.equation_index(ResourceType::Tex2d, SwizzleMode::Sw64kbR, 2).is_none());
    // 1D surfaces share the 2D equations.
    assert_eq!(
        lib.equation_index(ResourceType::Tex1d, SwizzleMode::Sw64kbSX, 2),
        lib.equation_index(ResourceType::Tex2d, SwizzleMode::Sw64kbSX, 2)
    );
}
