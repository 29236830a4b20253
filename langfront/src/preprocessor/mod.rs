//! # Preprocessor
//!
//! Out of scope for the core pipeline (spec §1): invocation of an external
//! C preprocessor is a CLI/orchestration concern, not an algorithmic one.
//! This module only fixes the seam — a trait the CLI can implement against
//! a real preprocessor — and ships the identity implementation the library
//! itself uses. Grounded in `original_source`'s `IPreprocessor.h`.

use std::io;

/// Transforms source text before it reaches the scanner.
pub trait Preprocessor {
    fn process(&mut self, source: &str) -> io::Result<String>;
}

/// A [`Preprocessor`] that returns its input unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityPreprocessor;

impl Preprocessor for IdentityPreprocessor {
    fn process(&mut self, source: &str) -> io::Result<String> {
        Ok(source.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_preprocessor_is_a_no_op() {
        let mut pp = IdentityPreprocessor;
        assert_eq!(pp.process("int x;").unwrap(), "int x;");
    }
}
