//! Board symmetries, canonical hashing, and converters between equivalent
//! positions.

pub mod converter;
pub mod hash;
pub mod transform;

pub use converter::{Converter, ConverterRegistry};
pub use hash::{CanonicalHash, Fingerprint, VARIANTS};
pub use transform::{Transform, COMPOSITION};
