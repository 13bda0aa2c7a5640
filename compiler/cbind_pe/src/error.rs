//! Image format errors.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("failed to read `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not a PE image: missing MZ signature")]
    BadDosMagic,

    #[error("not a PE image: missing PE signature at offset {offset:#x}")]
    BadPeSignature { offset: usize },

    #[error("image truncated: read past end of file at offset {offset:#x}")]
    Truncated { offset: usize },

    #[error("address {rva:#x} is not inside any section")]
    UnmappedAddress { rva: u32 },
}
