// PCRE2 bindings for embedding hosts: Lua (through mlua) and plain C.
//
// The engine does all matching. This crate owns the native resources it
// hands out (compiled patterns, match data), releases each exactly once, and
// keeps its published option constants identical to the engine's.

pub mod capi;
pub mod config;
pub mod engine;
pub mod error;
pub mod handle;
pub mod iter;
pub mod lua;
pub mod match_result;
pub mod options;
pub mod pattern;
pub mod substitute;

use once_cell::sync::Lazy;
use std::sync::Arc;

pub use config::{Config, IterStart, OptionPolicy};
pub use error::{Error, Result, SubstituteStage};
pub use handle::Handle;
pub use iter::Groups;
pub use match_result::{MatchResult, Span, NO_MATCH};
pub use pattern::Pattern;

static OPTIONS_VERIFIED: Lazy<Result<()>> = Lazy::new(|| {
    let verified = options::verify();
    match &verified {
        Ok(()) => log::debug!("option table verified ({} entries)", options::TABLE.len()),
        Err(e) => log::error!("refusing to load: {}", e),
    }
    verified
});

/// Check the option table against the linked engine. Runs the check once
/// per process; every host entry point calls this before doing anything.
pub fn init() -> Result<()> {
    (*OPTIONS_VERIFIED).clone()
}

/// Compile `pattern` into a shareable handle.
pub fn compile(pattern: &[u8], options: u32) -> Result<Arc<Pattern>> {
    init()?;
    Ok(Arc::new(Pattern::compile(pattern, options)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_repeatable() {
        assert!(init().is_ok());
        assert!(init().is_ok());
    }

    #[test]
    fn compile_match_substitute() {
        let p = compile(br"(\w+) (\w+)", 0).unwrap();
        let m = p.match_at(b"hello world!", 0, 0).unwrap().unwrap();
        assert_eq!(m.group_count(), 2);
        assert_eq!(p.substitute(b"hello world!", b"$2 $1", 0).unwrap(), b"world hello!".to_vec());
    }
}
