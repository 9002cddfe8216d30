//! Synthesizer for the gfx10 swizzle and compression-metadata pattern tables.
//!
//! The addressing library consumes these tables as compile-time constants;
//! its build script calls [`write_tables`] to emit them into `OUT_DIR`.

/// Error types for table synthesis.
pub mod error;

/// Pattern, key and configuration types.
pub mod types;

/// Block footprints in log2 units.
pub mod dims;

/// Data-surface pattern synthesis.
pub mod synth;

/// HTile, CMask and DCC pattern synthesis.
pub mod meta;

/// Rust source generation with nibble deduplication.
pub mod output_gen;

pub use error::TableError;
pub use types::{GeneratedTables, PatternTable, TableBuildConfig};

use meta::MetaKind;
use std::fs;
use types::{ELEM_LOG2_COUNT, Family, PatternKey, PipeConfig, XMASK_ROW_COUNT, XorKind};

/// Tables independent of the pipe configuration: five rows each.
const PLAIN_TABLES: &[(&str, PatternKey)] = &[
    ("SW_256_S", PatternKey::thin(Family::Standard, XorKind::None, 8)),
    ("SW_256_D", PatternKey::thin(Family::Display, XorKind::None, 8)),
    ("SW_4K_S", PatternKey::thin(Family::Standard, XorKind::None, 12)),
    ("SW_4K_D", PatternKey::thin(Family::Display, XorKind::None, 12)),
    ("SW_4K_S3", PatternKey::thick(Family::Standard, XorKind::None, 12)),
    ("SW_64K_S", PatternKey::thin(Family::Standard, XorKind::None, 16)),
    ("SW_64K_D", PatternKey::thin(Family::Display, XorKind::None, 16)),
    ("SW_64K_S3", PatternKey::thick(Family::Standard, XorKind::None, 16)),
];

/// Tables with pipe/bank hashing: one row group per pipe configuration,
/// emitted once for legacy parts and once with an `_RBPLUS` suffix.
const HASHED_TABLES: &[(&str, PatternKey)] = &[
    ("SW_4K_S_X", PatternKey::thin(Family::Standard, XorKind::Full, 12)),
    ("SW_4K_D_X", PatternKey::thin(Family::Display, XorKind::Full, 12)),
    ("SW_4K_S3_X", PatternKey::thick(Family::Standard, XorKind::Full, 12)),
    ("SW_64K_S_T", PatternKey::thin(Family::Standard, XorKind::Prt, 16)),
    ("SW_64K_D_T", PatternKey::thin(Family::Display, XorKind::Prt, 16)),
    ("SW_64K_Z_T", PatternKey::thin(Family::ZOrder, XorKind::Prt, 16)),
    ("SW_64K_S3_T", PatternKey::thick(Family::Standard, XorKind::Prt, 16)),
    ("SW_64K_Z3_T", PatternKey::thick(Family::ZOrder, XorKind::Prt, 16)),
    ("SW_64K_S_X", PatternKey::thin(Family::Standard, XorKind::Full, 16)),
    ("SW_64K_D_X", PatternKey::thin(Family::Display, XorKind::Full, 16)),
    ("SW_64K_S3_X", PatternKey::thick(Family::Standard, XorKind::Full, 16)),
    (
        "SW_64K_D3_X",
        PatternKey::thin(Family::Display, XorKind::Full, 16).with_slice_hash(),
    ),
    ("SW_64K_Z3_X", PatternKey::thick(Family::ZOrder, XorKind::Full, 16)),
    ("SW_64K_Z_X_1XAA", PatternKey::thin(Family::ZOrder, XorKind::Full, 16)),
    ("SW_64K_Z_X_2XAA", PatternKey::thin(Family::ZOrder, XorKind::Full, 16).with_frags(1)),
    ("SW_64K_Z_X_4XAA", PatternKey::thin(Family::ZOrder, XorKind::Full, 16).with_frags(2)),
    ("SW_64K_Z_X_8XAA", PatternKey::thin(Family::ZOrder, XorKind::Full, 16).with_frags(3)),
    ("SW_64K_R_X_1XAA", PatternKey::thin(Family::RenderOpt, XorKind::Full, 16)),
    ("SW_64K_R_X_2XAA", PatternKey::thin(Family::RenderOpt, XorKind::Full, 16).with_frags(1)),
    ("SW_64K_R_X_4XAA", PatternKey::thin(Family::RenderOpt, XorKind::Full, 16).with_frags(2)),
    ("SW_64K_R_X_8XAA", PatternKey::thin(Family::RenderOpt, XorKind::Full, 16).with_frags(3)),
];

fn data_rows(
    name: &str,
    key: &PatternKey,
    configs: &[PipeConfig],
) -> Result<Vec<types::Pattern>, TableError> {
    let mut rows = Vec::with_capacity(configs.len() * ELEM_LOG2_COUNT as usize);
    for cfg in configs {
        for elem_log2 in 0..ELEM_LOG2_COUNT {
            let row = synth::synthesize(key, elem_log2, cfg).map_err(|message| {
                TableError::Synthesis {
                    table: name.to_string(),
                    elem_log2,
                    message,
                }
            })?;
            rows.push(row);
        }
    }
    Ok(rows)
}

fn meta_tables(suffix: &str, configs: &[PipeConfig]) -> Vec<PatternTable> {
    // HTile rows by samples log2, CMask rows by fmask element log2.
    let xmask = |kind: MetaKind| {
        configs
            .iter()
            .flat_map(|cfg| (0..XMASK_ROW_COUNT).map(move |n| meta::synthesize_meta(kind, n, true, cfg)))
            .collect::<Vec<_>>()
    };
    let htile = xmask(MetaKind::Htile);
    let cmask = xmask(MetaKind::Cmask);
    // DCC groups: per config, unaligned rows then pipe-aligned rows.
    let dcc = configs
        .iter()
        .flat_map(|cfg| {
            [false, true].into_iter().flat_map(move |aligned| {
                (0..ELEM_LOG2_COUNT)
                    .map(move |elem_log2| meta::synthesize_meta(MetaKind::Dcc, elem_log2, aligned, cfg))
            })
        })
        .collect();

    vec![
        PatternTable {
            name: format!("HTILE{suffix}_PATINFO"),
            rows: htile,
        },
        PatternTable {
            name: format!("CMASK{suffix}_PATINFO"),
            rows: cmask,
        },
        PatternTable {
            name: format!("DCC_64K_R_X{suffix}_PATINFO"),
            rows: dcc,
        },
    ]
}

/// Synthesize every table in memory, in emission order.
pub fn build_tables() -> Result<Vec<PatternTable>, TableError> {
    let legacy = types::legacy_configs();
    let rb_plus = types::rb_plus_configs();
    let mut tables = Vec::new();

    // Plain tables do not depend on the pipe configuration.
    for (name, key) in PLAIN_TABLES {
        tables.push(PatternTable {
            name: format!("{name}_PATINFO"),
            rows: data_rows(name, key, &legacy[..1])?,
        });
    }

    for (name, key) in HASHED_TABLES {
        tables.push(PatternTable {
            name: format!("{name}_PATINFO"),
            rows: data_rows(name, key, &legacy)?,
        });
        tables.push(PatternTable {
            name: format!("{name}_RBPLUS_PATINFO"),
            rows: data_rows(name, key, &rb_plus)?,
        });
    }

    tables.extend(meta_tables("", &legacy));
    tables.extend(meta_tables("_RBPLUS", &rb_plus));

    for table in &tables {
        check_coverage(table)?;
    }
    Ok(tables)
}

/// The one-hot bits of a row must each name a distinct coordinate bit.
fn check_coverage(table: &PatternTable) -> Result<(), TableError> {
    for (row_idx, row) in table.rows.iter().enumerate() {
        let mut seen = [0u16; 4];
        for setting in row.iter().filter(|s| s.item_count() == 1) {
            let lanes = [setting.x, setting.y, setting.z, setting.s];
            for (lane, &bits) in lanes.iter().enumerate() {
                if seen[lane] & bits != 0 {
                    return Err(TableError::Coverage {
                        table: table.name.clone(),
                        row: row_idx,
                        message: format!("lane {lane} bit {bits:#x} placed twice"),
                    });
                }
                seen[lane] |= bits;
            }
        }
    }
    Ok(())
}

/// Synthesize all tables and write them as Rust source to
/// `config.out_dir/config.file_name`.
pub fn write_tables(config: &TableBuildConfig) -> Result<GeneratedTables, TableError> {
    fs::create_dir_all(&config.out_dir)?;

    let tables = build_tables()?;
    for table in &tables {
        log::info!("Synthesized {} ({} rows)", table.name, table.rows.len());
    }

    let source = output_gen::render_tables(&tables, &types::rb_plus_configs());
    let path = config.out_dir.join(&config.file_name);
    fs::write(&path, source)?;

    Ok(GeneratedTables {
        path,
        table_count: tables.len(),
        row_count: tables.iter().map(|t| t.rows.len()).sum(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_tables_row_counts() {
        let tables = build_tables().unwrap();
        let find = |name: &str| tables.iter().find(|t| t.name == name).unwrap();
        assert_eq!(find("SW_64K_S_PATINFO").rows.len(), 5);
        assert_eq!(find("SW_64K_S_X_PATINFO").rows.len(), 35);
        assert_eq!(find("SW_64K_S_X_RBPLUS_PATINFO").rows.len(), 75);
        assert_eq!(find("HTILE_PATINFO").rows.len(), 28);
        assert_eq!(find("CMASK_RBPLUS_PATINFO").rows.len(), 60);
        assert_eq!(find("DCC_64K_R_X_RBPLUS_PATINFO").rows.len(), 150);
    }

    #[test]
    fn test_write_tables_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let config = TableBuildConfig {
            out_dir: dir.path().join("generated"),
            file_name: "swizzle_patterns.rs".into(),
        };
        let generated = write_tables(&config).unwrap();
        assert!(generated.path.exists());
        assert_eq!(generated.table_count, PLAIN_TABLES.len() + HASHED_TABLES.len() * 2 + 6);

        let source = fs::read_to_string(&generated.path).unwrap();
        assert!(source.starts_with("// @generated"));
        assert!(source.contains("pub static SW_PATTERN_NIBBLE01: &[[u64; 8]]"));
        assert!(source.contains("pub static SW_64K_R_X_8XAA_RBPLUS_PATINFO: &[PatInfo]"));
    }
}
