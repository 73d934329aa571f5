pub mod random;
pub mod serde_helpers;
pub mod tracing;
pub mod validation;
