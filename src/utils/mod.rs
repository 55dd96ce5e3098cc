//! Utility functions for code generation and URL processing.
//!
//! - [`code_generator`] - Short code generation and alias validation
//! - [`url_validator`] - Destination URL validation

pub mod code_generator;
pub mod url_validator;
