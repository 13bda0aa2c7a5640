use cbind_lower::LowerError;
use cbind_pe::ImageError;

use crate::source::DeclarationError;

/// Fatal failure of a generator run. Recovered failures (inert macros,
/// unresolved exports) never surface here.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error(transparent)]
    Lower(#[from] LowerError),

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error(transparent)]
    Declaration(#[from] DeclarationError),
}
