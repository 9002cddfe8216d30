use std::path::PathBuf;
use swizzle_tables::{TableBuildConfig, write_tables};

fn main() {
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").unwrap());

    println!("cargo:rerun-if-changed=build.rs");

    let config = TableBuildConfig {
        out_dir,
        file_name: "swizzle_patterns.rs".into(),
    };

    match write_tables(&config) {
        Ok(generated) => {
            eprintln!(
                "swizzle_tables: wrote {} table(s), {} row(s) to {}",
                generated.table_count,
                generated.row_count,
                generated.path.display()
            );
        }
        Err(e) => {
            panic!("Swizzle table generation failed: {}", e);
        }
    }
}
