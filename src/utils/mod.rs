pub mod environment;
pub mod paths;
pub mod terminal;

pub use environment::{default_cache_dir, default_docs_dir};
pub use paths::{
    MAX_INDEX_SECTION_BYTES, MAX_REFERENCE_BYTES, decode_storage_key, format_path_with_tilde,
    storage_key, validate_file_size, write_atomic,
};
pub use terminal::strip_ansi_codes;
