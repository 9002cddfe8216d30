/// Errors that can occur while synthesizing or writing pattern tables.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// I/O error writing the generated source.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A pattern could not be built for the requested key.
    #[error("Synthesis error in {table} (elem_log2 {elem_log2}): {message}")]
    Synthesis {
        table: String,
        elem_log2: u32,
        message: String,
    },

    /// A synthesized pattern failed its coverage check.
    #[error("Coverage error in {table} row {row}: {message}")]
    Coverage {
        table: String,
        row: usize,
        message: String,
    },
}
