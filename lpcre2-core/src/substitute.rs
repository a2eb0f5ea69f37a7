//! Two-pass substitution: ask the engine how much room the output needs,
//! allocate exactly that, then substitute for real.

use crate::engine::{self, Code};
use crate::error::{Error, Result, SubstituteStage};
use crate::options::{self, OptionKind, SUBSTITUTE_OVERFLOW_LENGTH};
use crate::pattern::Pattern;

fn engine_error(stage: SubstituteStage, code: i32) -> Error {
    Error::Substitute { stage, code, message: engine::error_message(code) }
}

/// Capacity the output needs, including the engine's terminating zero.
fn probe_capacity(code: &Code, subject: &[u8], replacement: &[u8], options: u32) -> Result<usize> {
    let mut nothing = [0u8; 0];
    let (rc, needed) = code.substitute_into(
        subject,
        replacement,
        options | SUBSTITUTE_OVERFLOW_LENGTH,
        &mut nothing,
    );
    // The terminating zero never fits in an empty buffer, so anything but
    // "buffer too small", success included, is a failure.
    if rc != engine::ERROR_NOMEMORY {
        return Err(engine_error(SubstituteStage::Probe, rc));
    }
    Ok(needed)
}

/// Length of the output `substitute` would produce, without producing it.
pub fn probe(pattern: &Pattern, subject: &[u8], replacement: &[u8], options: u32) -> Result<usize> {
    let options = options::restrict(OptionKind::Substitute, options, pattern.option_policy())?;
    let capacity = pattern.with_code(|code| probe_capacity(code, subject, replacement, options))??;
    Ok(capacity.saturating_sub(1))
}

/// Substitute `replacement` for matches of `pattern` in `subject`.
///
/// Only the first match is replaced unless `SUBSTITUTE_GLOBAL` is set. When
/// nothing matches the output equals `subject`.
pub fn substitute(
    pattern: &Pattern,
    subject: &[u8],
    replacement: &[u8],
    options: u32,
) -> Result<Vec<u8>> {
    let options = options::restrict(OptionKind::Substitute, options, pattern.option_policy())?;
    pattern.with_code(|code| {
        let capacity = probe_capacity(code, subject, replacement, options)?;

        let mut out = Vec::new();
        out.try_reserve_exact(capacity).map_err(|_| Error::OutOfMemory)?;
        out.resize(capacity, 0);

        let (rc, written) = code.substitute_into(subject, replacement, options, &mut out);
        if rc < 0 {
            return Err(engine_error(SubstituteStage::Fill, rc));
        }
        out.truncate(written);
        log::trace!("substituted {} match(es), {} byte(s) out", rc, written);
        Ok(out)
    })?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{SUBSTITUTE_EXTENDED, SUBSTITUTE_GLOBAL, SUBSTITUTE_REPLACEMENT_ONLY};

    #[test]
    fn amalgamate_include() {
        let p = Pattern::compile(br#"^(\s*#\s*include\s+"[-.\w/]+")"#, 0).unwrap();
        let out = substitute(&p, br#"#include "test.h""#, b"/* AMALGAMATE: $1 */", 0).unwrap();
        assert_eq!(out, br#"/* AMALGAMATE: #include "test.h" */"#.to_vec());
    }

    #[test]
    fn first_only_unless_global() {
        let p = Pattern::compile(b"o", 0).unwrap();
        assert_eq!(substitute(&p, b"foo boo", b"0", 0).unwrap(), b"f0o boo".to_vec());
        let global = substitute(&p, b"foo boo", b"0", SUBSTITUTE_GLOBAL).unwrap();
        assert_eq!(global, b"f00 b00".to_vec());
    }

    #[test]
    fn no_match_returns_subject() {
        let p = Pattern::compile(b"xyz", 0).unwrap();
        let subject = b"nothing to see here";
        let out = substitute(&p, subject, b"!", SUBSTITUTE_GLOBAL).unwrap();
        assert_eq!(out, subject.to_vec());
        assert_eq!(probe(&p, subject, b"!", SUBSTITUTE_GLOBAL).unwrap(), out.len());
    }

    #[test]
    fn probe_length_equals_written_length() {
        let p = Pattern::compile(br"(\w+)@(\w+)", 0).unwrap();
        for (subject, repl) in [
            (&b"mail bob@example now"[..], &b"<$2:$1>"[..]),
            (&b"a@b c@d e@f"[..], &b""[..]),
            (&b"x@y"[..], &b"$1$1$1$1$1$1$1$1"[..]),
        ] {
            let out = substitute(&p, subject, repl, SUBSTITUTE_GLOBAL).unwrap();
            assert_eq!(probe(&p, subject, repl, SUBSTITUTE_GLOBAL).unwrap(), out.len());
        }
    }

    #[test]
    fn replacement_only_and_extended() {
        let p = Pattern::compile(br"(\d+)", 0).unwrap();
        let opts = SUBSTITUTE_GLOBAL | SUBSTITUTE_REPLACEMENT_ONLY;
        let out = substitute(&p, b"a1b22c", b"[$1]", opts).unwrap();
        assert_eq!(out, b"[1][22]".to_vec());
        let out = substitute(&p, b"n=7", br"\U${1}x", SUBSTITUTE_EXTENDED).unwrap();
        assert_eq!(out, b"n=7X".to_vec());
    }

    #[test]
    fn output_can_contain_nul() {
        let p = Pattern::compile(b"-", 0).unwrap();
        let out = substitute(&p, b"a-b", b"\0", 0).unwrap();
        assert_eq!(out, b"a\0b".to_vec());
    }

    #[test]
    fn bad_replacement_is_probe_error() {
        let p = Pattern::compile(b"(a)", 0).unwrap();
        let err = substitute(&p, b"a", b"$9", 0).unwrap_err();
        assert!(matches!(err, Error::Substitute { stage: SubstituteStage::Probe, .. }), "{}", err);
    }

    #[test]
    fn empty_output() {
        // Even an empty result needs room for the terminating zero, so the
        // probe still overflows.
        let p = Pattern::compile(b"a", 0).unwrap();
        assert_eq!(substitute(&p, b"", b"b", 0).unwrap(), Vec::<u8>::new());
        assert_eq!(substitute(&p, b"a", b"", 0).unwrap(), Vec::<u8>::new());
        assert_eq!(probe(&p, b"a", b"", 0).unwrap(), 0);
    }
}
