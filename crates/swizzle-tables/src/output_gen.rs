use crate::synth::max_item_count;
use crate::types::{Pattern, PatternTable, PipeConfig};
use std::collections::HashMap;
use std::fmt::Write as _;

/// Deduplicated slices of pattern rows. Entry 0 is always all-zero so
/// unused upper bits share it.
struct Nibbles<const N: usize> {
    entries: Vec<[u64; N]>,
    lookup: HashMap<[u64; N], usize>,
}

impl<const N: usize> Nibbles<N> {
    fn new() -> Self {
        let zero = [0u64; N];
        Self {
            entries: vec![zero],
            lookup: HashMap::from([(zero, 0)]),
        }
    }

    fn intern(&mut self, slice: &[u64]) -> usize {
        let mut key = [0u64; N];
        key.copy_from_slice(slice);
        if let Some(&idx) = self.lookup.get(&key) {
            return idx;
        }
        let idx = self.entries.len();
        self.entries.push(key);
        self.lookup.insert(key, idx);
        idx
    }

    fn render(&self, out: &mut String, name: &str) {
        let _ = writeln!(out, "pub static {name}: &[[u64; {N}]] = &[");
        for entry in &self.entries {
            let cells: Vec<String> = entry.iter().map(|v| format!("{v:#x}")).collect();
            let _ = writeln!(out, "    [{}],", cells.join(", "));
        }
        out.push_str("];\n\n");
    }
}

struct PatInfoRow {
    max_item_count: u32,
    nibble01: usize,
    nibble2: usize,
    nibble3: usize,
    nibble4: usize,
}

/// Render all tables as Rust source. The including module must have a
/// `PatInfo` struct with matching fields in scope.
pub fn render_tables(tables: &[PatternTable], rb_plus_configs: &[PipeConfig]) -> String {
    let mut n01 = Nibbles::<8>::new();
    let mut n2 = Nibbles::<4>::new();
    let mut n3 = Nibbles::<4>::new();
    let mut n4 = Nibbles::<4>::new();

    let mut intern_row = |row: &Pattern| {
        let raw: Vec<u64> = row.iter().map(|s| s.to_raw()).collect();
        PatInfoRow {
            max_item_count: max_item_count(row),
            nibble01: n01.intern(&raw[0..8]),
            nibble2: n2.intern(&raw[8..12]),
            nibble3: n3.intern(&raw[12..16]),
            nibble4: n4.intern(&raw[16..20]),
        }
    };

    let infos: Vec<(String, Vec<PatInfoRow>)> = tables
        .iter()
        .map(|table| (table.name.clone(), table.rows.iter().map(&mut intern_row).collect()))
        .collect();

    let mut out = String::new();
    out.push_str("// @generated by swizzle-tables. Do not edit.\n");
    out.push_str("//\n");
    out.push_str("// Rows of XOR tables are grouped five per pipe configuration (one per\n");
    out.push_str("// element size). Legacy groups are indexed by pipes log2; RB+ groups\n");
    out.push_str("// by RBPLUS_CONFIG_INDEX[pipes log2][packers log2].\n\n");

    let _ = writeln!(out, "pub const LEGACY_CONFIG_COUNT: usize = 7;");
    let _ = writeln!(out, "pub const RBPLUS_CONFIG_COUNT: usize = {};", rb_plus_configs.len());
    let mut index = [[u8::MAX; 5]; 5];
    for (i, cfg) in rb_plus_configs.iter().enumerate() {
        index[cfg.pipes_log2 as usize][cfg.pkr_log2 as usize] = i as u8;
    }
    out.push_str("pub static RBPLUS_CONFIG_INDEX: [[u8; 5]; 5] = [\n");
    for row in index {
        let cells: Vec<String> = row.iter().map(u8::to_string).collect();
        let _ = writeln!(out, "    [{}],", cells.join(", "));
    }
    out.push_str("];\n\n");

    n01.render(&mut out, "SW_PATTERN_NIBBLE01");
    n2.render(&mut out, "SW_PATTERN_NIBBLE2");
    n3.render(&mut out, "SW_PATTERN_NIBBLE3");
    n4.render(&mut out, "SW_PATTERN_NIBBLE4");

    for (name, rows) in &infos {
        let _ = writeln!(out, "pub static {name}: &[PatInfo] = &[");
        for row in rows {
            let _ = writeln!(
                out,
                "    PatInfo {{ max_item_count: {}, nibble01_idx: {}, nibble2_idx: {}, nibble3_idx: {}, nibble4_idx: {} }},",
                row.max_item_count, row.nibble01, row.nibble2, row.nibble3, row.nibble4
            );
        }
        out.push_str("];\n\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BitSetting, Channel, CoordBit, MAX_PATTERN_BITS};

    #[test]
    fn test_identical_rows_share_nibbles() {
        let mut row = [BitSetting::default(); MAX_PATTERN_BITS];
        row[3] = BitSetting::from_bit(CoordBit::new(Channel::X, 0));
        let table = PatternTable {
            name: "TEST_PATINFO".into(),
            rows: vec![row, row],
        };
        let source = render_tables(&[table], &[]);
        assert!(source.contains("pub static TEST_PATINFO: &[PatInfo]"));
        let line = "PatInfo { max_item_count: 1, nibble01_idx: 1, nibble2_idx: 0, nibble3_idx: 0, nibble4_idx: 0 }";
        assert_eq!(source.matches(line).count(), 2);
    }
}
