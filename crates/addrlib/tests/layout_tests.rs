use addrlib::swizzle_mode::{RSRC_1D_MASK, RSRC_2D_MASK, RSRC_3D_MASK};
use addrlib::{
    AddrError, AddrLib, ChipFamily, LibCreateInput, ResourceType, SurfaceCoord, SurfaceDescriptor,
    SurfaceFlags, SurfaceFormat, SwizzleMode, revision,
};

fn navi10(gb_addr_config: u32) -> AddrLib {
    AddrLib::new(&LibCreateInput {
        chip_family: ChipFamily::Navi,
        chip_revision: revision::NAVI10,
        gb_addr_config,
    })
    .unwrap()
}

fn depth_flags() -> SurfaceFlags {
    SurfaceFlags {
        depth: true,
        ..SurfaceFlags::default()
    }
}

#[test]
fn test_64kb_s_x_color() {
    let lib = navi10(0x2);
    let layout = lib
        .compute_surface_info(&SurfaceDescriptor::new_2d(SwizzleMode::Sw64kbSX, 32, 256, 256))
        .unwrap();
    assert_eq!(layout.pitch, 256);
    assert_eq!(layout.height, 256);
    assert_eq!(layout.slice_size, 256 * 256 * 4);
    assert_eq!(layout.surf_size, 262144);
    assert_eq!(layout.base_align, 65536);
    assert_eq!((layout.block_width, layout.block_height), (128, 128));
    assert!(layout.equation_index.is_some());
}

#[test]
fn test_depth_mip_chain_with_tail() {
    let lib = navi10(0x2);
    let desc = SurfaceDescriptor {
        flags: depth_flags(),
        num_mip_levels: 4,
        ..SurfaceDescriptor::new_2d(SwizzleMode::Sw64kbZX, 32, 256, 256)
    };
    let layout = lib.compute_surface_info(&desc).unwrap();

    assert_eq!(layout.first_mip_id_in_tail, 2);
    assert!(!layout.mip_chain_in_tail);
    assert_eq!(layout.slice_size, 393216);
    assert_eq!(layout.mip_info[1].macro_block_offset, 65536);
    assert_eq!(layout.mip_info[0].macro_block_offset, 131072);

    for (level, mip) in layout.mip_info.iter().enumerate() {
        assert_eq!(mip.in_mip_tail, level >= 2, "mip {level}");
        if mip.in_mip_tail {
            let size = 256 >> level;
            assert!(mip.mip_tail_coord_x + size <= layout.block_width);
            assert!(mip.mip_tail_coord_y + size <= layout.block_height);
        }
    }
}

#[test]
fn test_96bpp_must_be_linear() {
    let lib = navi10(0x2);
    let err = lib
        .compute_surface_info(&SurfaceDescriptor::new_2d(SwizzleMode::Sw64kbSX, 96, 64, 64))
        .unwrap_err();
    assert!(matches!(err, AddrError::InvalidParameters(_)));

    let layout = lib
        .compute_surface_info(&SurfaceDescriptor::new_2d(SwizzleMode::Linear, 96, 64, 64))
        .unwrap();
    assert_eq!(layout.bpp, 96);
}

#[test]
fn test_linear_pitch_alignment() {
    let lib = navi10(0x2);
    let layout = lib
        .compute_surface_info(&SurfaceDescriptor::new_2d(SwizzleMode::Linear, 32, 100, 10))
        .unwrap();
    assert_eq!(layout.pitch, 128);
    assert_eq!(layout.height, 10);
    assert_eq!(layout.slice_size, 128 * 10 * 4);
    assert_eq!(layout.base_align, 256);
}

#[test]
fn test_custom_pitch_rejected_when_too_small() {
    let lib = navi10(0x2);
    let desc = SurfaceDescriptor {
        pitch_in_element: 64,
        ..SurfaceDescriptor::new_2d(SwizzleMode::Linear, 32, 100, 10)
    };
    assert!(matches!(
        lib.compute_surface_info(&desc),
        Err(AddrError::InvalidParameters(_))
    ));

    let desc = SurfaceDescriptor {
        pitch_in_element: 192,
        ..desc
    };
    assert_eq!(lib.compute_surface_info(&desc).unwrap().pitch, 192);
}

#[test]
fn test_block_compressed_format() {
    let lib = navi10(0x2);
    let desc = SurfaceDescriptor {
        format: SurfaceFormat::Bc1,
        ..SurfaceDescriptor::new_2d(SwizzleMode::Sw64kbSX, 0, 1024, 1024)
    };
    let layout = lib.compute_surface_info(&desc).unwrap();
    assert_eq!(layout.bpp, 64);
    assert_eq!(layout.pitch, 256);
    assert_eq!(layout.pixel_pitch, 1024);
    assert_eq!(layout.pixel_height, 1024);
}

#[test]
fn test_stereo_pads_to_hashed_y_bit() {
    let lib = navi10(0x2);
    let desc = SurfaceDescriptor {
        flags: SurfaceFlags {
            qb_stereo: true,
            ..SurfaceFlags::default()
        },
        ..SurfaceDescriptor::new_2d(SwizzleMode::Sw64kbSX, 32, 256, 300)
    };
    let layout = lib.compute_surface_info(&desc).unwrap();
    let stereo = layout.stereo.unwrap();
    assert_eq!(stereo.eye_height, 512);
    assert_eq!(layout.height, 1024);
    assert_eq!(stereo.right_offset, 256 * 512 * 4);
    assert_eq!(layout.surf_size, 2 * 256 * 512 * 4);
    assert_eq!(stereo.right_swizzle, 0x80);
}

#[test]
fn test_rejects_msaa_mipmaps() {
    let lib = navi10(0x2);
    let desc = SurfaceDescriptor {
        num_samples: 4,
        num_mip_levels: 2,
        ..SurfaceDescriptor::new_2d(SwizzleMode::Sw64kbRX, 32, 64, 64)
    };
    assert!(matches!(
        lib.compute_surface_info(&desc),
        Err(AddrError::InvalidParameters(_))
    ));
}

#[test]
fn test_stereo_without_right_eye_xor() {
    let lib = navi10(0x2);
    let desc = SurfaceDescriptor {
        flags: SurfaceFlags {
            qb_stereo: true,
            ..SurfaceFlags::default()
        },
        ..SurfaceDescriptor::new_2d(SwizzleMode::Sw64kbSX, 32, 256, 600)
    };
    let layout = lib.compute_surface_info(&desc).unwrap();
    let stereo = layout.stereo.unwrap();
    // 600 pads to 1024, whose hashed Y bit is clear.
    assert_eq!(stereo.eye_height, 1024);
    assert_eq!(stereo.right_swizzle, 0);
    assert_eq!(stereo.right_offset, 256 * 1024 * 4);
    assert_eq!(layout.height, 2048);
}

#[test]
fn test_linear_general_is_byte_pitched() {
    let lib = navi10(0x2);
    let desc = SurfaceDescriptor::new_2d(SwizzleMode::LinearGeneral, 32, 100, 10);
    let layout = lib.compute_surface_info(&desc).unwrap();
    assert_eq!(layout.pitch, 100);
    assert_eq!(layout.height, 10);
    assert_eq!(layout.base_align, 4);
    assert_eq!(layout.slice_size, 4000);
    assert_eq!(layout.surf_size, 4000);
    assert_eq!(layout.equation_index, None);

    let coord = SurfaceCoord {
        x: 3,
        y: 2,
        ..SurfaceCoord::default()
    };
    assert_eq!(lib.compute_surface_addr_from_coord(&desc, &coord).unwrap().addr, 812);

    let rgb = lib
        .compute_surface_info(&SurfaceDescriptor::new_2d(SwizzleMode::LinearGeneral, 96, 10, 3))
        .unwrap();
    assert_eq!(rgb.base_align, 12);
    assert_eq!(rgb.surf_size, 360);
    assert_eq!(rgb.surf_size % u64::from(rgb.base_align), 0);

    for desc in [
        SurfaceDescriptor {
            num_mip_levels: 2,
            ..desc
        },
        SurfaceDescriptor {
            num_slices: 2,
            ..desc
        },
    ] {
        assert!(matches!(
            lib.compute_surface_info(&desc),
            Err(AddrError::InvalidParameters(_))
        ));
    }
}

#[test]
fn test_1d_surfaces() {
    let lib = navi10(0x2);
    let desc = SurfaceDescriptor {
        resource_type: ResourceType::Tex1d,
        num_mip_levels: 4,
        ..SurfaceDescriptor::new_2d(SwizzleMode::Linear, 32, 100, 1)
    };
    let layout = lib.compute_surface_info(&desc).unwrap();
    assert_eq!(layout.pitch, 128);
    assert_eq!(layout.slice_size, 128 * 4 * 4);
    assert_eq!(layout.mip_info[2].offset, 1024);

    let coord = SurfaceCoord {
        x: 5,
        mip_id: 2,
        ..SurfaceCoord::default()
    };
    assert_eq!(lib.compute_surface_addr_from_coord(&desc, &coord).unwrap().addr, 1044);

    let general = SurfaceDescriptor {
        resource_type: ResourceType::Tex1d,
        ..SurfaceDescriptor::new_2d(SwizzleMode::LinearGeneral, 8, 100, 1)
    };
    let layout = lib.compute_surface_info(&general).unwrap();
    assert_eq!((layout.pitch, layout.surf_size), (100, 100));

    for desc in [
        SurfaceDescriptor {
            height: 2,
            ..desc
        },
        SurfaceDescriptor {
            resource_type: ResourceType::Tex1d,
            ..SurfaceDescriptor::new_2d(SwizzleMode::Sw64kbZX, 32, 100, 1)
        },
    ] {
        assert!(matches!(
            lib.compute_surface_info(&desc),
            Err(AddrError::InvalidParameters(_))
        ));
    }
}

#[test]
fn test_rejects_oversized_surfaces() {
    let lib = navi10(0x2);
    let base = SurfaceDescriptor::new_2d(SwizzleMode::Sw64kbSX, 32, 32, 32);
    for desc in [
        SurfaceDescriptor {
            height: u32::MAX,
            ..base
        },
        SurfaceDescriptor {
            width: 32769,
            ..base
        },
        SurfaceDescriptor {
            num_slices: 1 << 20,
            ..base
        },
        SurfaceDescriptor {
            num_mip_levels: 17,
            ..base
        },
        SurfaceDescriptor {
            swizzle_mode: SwizzleMode::Linear,
            pitch_in_element: u32::MAX,
            ..base
        },
    ] {
        assert!(matches!(
            lib.compute_surface_info(&desc),
            Err(AddrError::InvalidParameters(_))
        ));
    }

    let widest = SurfaceDescriptor {
        width: 32768,
        height: 1,
        ..base
    };
    assert_eq!(lib.compute_surface_info(&widest).unwrap().pitch, 32768);
}

/// Whether validation lets a plain single-sample surface through.
fn accepts(rsrc: ResourceType, mode: SwizzleMode, bpp: u32, mips: u32) -> bool {
    let allowed = match rsrc {
        ResourceType::Tex1d => RSRC_1D_MASK,
        ResourceType::Tex2d => RSRC_2D_MASK,
        ResourceType::Tex3d => RSRC_3D_MASK,
    };
    let general_ok = mode != SwizzleMode::LinearGeneral || (mips == 1 && rsrc != ResourceType::Tex3d);
    allowed.contains(mode) && !(mode.is_z_order() && bpp > 64) && general_ok
}

/// Every combination is accepted or rejected as expected. Accepted sizes
/// are a multiple of the base alignment, which is a power of two, and tail
/// mips sit inside their block.
#[test]
fn test_layout_invariants_across_modes() {
    let lib = navi10(0x3);
    let mut checked = 0;
    for rsrc in [ResourceType::Tex1d, ResourceType::Tex2d, ResourceType::Tex3d] {
        for mode in SwizzleMode::ALL {
            for bpp in [8, 16, 32, 64, 128] {
                for (w, h, mips) in [(1, 1, 1), (17, 33, 1), (300, 200, 9), (1024, 64, 5)] {
                    let desc = SurfaceDescriptor {
                        resource_type: rsrc,
                        num_slices: if rsrc == ResourceType::Tex3d { 8 } else { 1 },
                        num_mip_levels: mips,
                        ..SurfaceDescriptor::new_2d(mode, bpp, w, if rsrc == ResourceType::Tex1d { 1 } else { h })
                    };
                    let result = lib.compute_surface_info(&desc);
                    let context = format!("{mode} {rsrc:?} {bpp}bpp {w}x{h} {mips} mips");
                    if !accepts(rsrc, mode, bpp, mips) {
                        assert!(
                            matches!(result, Err(AddrError::InvalidParameters(_))),
                            "{context}: {result:?}"
                        );
                        continue;
                    }
                    let layout = result.unwrap_or_else(|e| panic!("{context}: {e}"));
                    checked += 1;
                    assert!(layout.base_align.is_power_of_two(), "{context}");
                    assert_eq!(layout.surf_size % u64::from(layout.base_align), 0, "{context}");
                    assert_eq!(layout.mip_info.len(), mips as usize);
                    for (level, mip) in layout.mip_info.iter().enumerate() {
                        assert_eq!(mip.in_mip_tail, level as u32 >= layout.first_mip_id_in_tail);
                        if mip.in_mip_tail {
                            assert!(mip.mip_tail_coord_x < layout.block_width, "{context} mip {level}");
                            assert!(mip.mip_tail_coord_y < layout.block_height, "{context} mip {level}");
                            assert_eq!(mip.mip_tail_coord_z, 0);
                        }
                    }
                }
            }
        }
    }
    assert!(checked > 100);
}

#[test]
fn test_thick_mip_tail() {
    let lib = navi10(0x2);
    let desc = SurfaceDescriptor {
        resource_type: ResourceType::Tex3d,
        num_slices: 64,
        num_mip_levels: 7,
        ..SurfaceDescriptor::new_2d(SwizzleMode::Sw64kbSX, 32, 64, 64)
    };
    let layout = lib.compute_surface_info(&desc).unwrap();
    assert_eq!((layout.block_width, layout.block_height, layout.block_slices), (32, 32, 16));
    assert!(layout.first_mip_id_in_tail < 7);
    let tail = &layout.mip_info[layout.first_mip_id_in_tail as usize..];
    assert!(tail.iter().all(|mip| mip.in_mip_tail && mip.macro_block_offset == 0));
    // Tail mips occupy distinct 256B slots of the tail block.
    for pair in tail.windows(2) {
        assert!(pair[0].mip_tail_offset > pair[1].mip_tail_offset);
    }
    for mip in tail {
        assert_eq!(mip.mip_tail_coord_x % 4, 0);
        assert_eq!(mip.mip_tail_coord_y % 4, 0);
        assert_eq!(mip.mip_tail_coord_z, 0);
    }
}
