pub mod error;
pub mod format;
pub mod validate;

pub use error::{Error, Result};
pub use format::{FormatTag, ImageFormat};
pub use validate::{BatchPolicy, ValidationError};
