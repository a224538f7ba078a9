//! Masking of sensitive configuration values before display

pub mod redactor;
pub mod rules;

pub use redactor::{Redactor, DEFAULT_MASK};
pub use rules::SensitiveKeySet;
