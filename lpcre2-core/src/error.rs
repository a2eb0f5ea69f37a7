use std::fmt;

use crate::options::OptionKind;

pub type Result<T> = std::result::Result<T, Error>;

/// Which pass of a substitution failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubstituteStage {
    Probe,
    Fill,
}

impl fmt::Display for SubstituteStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubstituteStage::Probe => f.write_str("probe"),
            SubstituteStage::Fill => f.write_str("fill"),
        }
    }
}

/// Everything that can abort a binding call.
///
/// A failed match is not an error: `Pattern::match_at` reports it as
/// `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("compile pattern `{pattern}` error at {offset}: {message}")]
    Compile {
        pattern: String,
        offset: usize,
        message: String,
    },

    #[error("match error ({code}): {message}")]
    Match { code: i32, message: String },

    #[error("substitute {stage} error ({code}): {message}")]
    Substitute {
        stage: SubstituteStage,
        code: i32,
        message: String,
    },

    #[error("index out of range: {index} (group count {count})")]
    IndexOutOfRange { index: i64, count: usize },

    #[error("subject too short for group {index}: span ends at {end}, subject has {len} bytes")]
    SubjectTooShort { index: usize, end: usize, len: usize },

    #[error("out of memory")]
    OutOfMemory,

    #[error("{0} has been finalized")]
    Finalized(&'static str),

    #[error("null {0} handle")]
    NullHandle(&'static str),

    #[error("option {name} mismatch: binding 0x{binding:08x} != engine 0x{engine:08x}")]
    OptionMismatch {
        name: &'static str,
        binding: u32,
        engine: u32,
    },

    #[error("unsupported {kind} option bits 0x{bits:08x}")]
    UnsupportedOptions { kind: OptionKind, bits: u32 },
}
