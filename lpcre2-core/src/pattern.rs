use std::fmt;
use std::sync::Arc;

use crate::config::{Config, OptionPolicy};
use crate::engine::{self, Code, MatchData};
use crate::error::{Error, Result};
use crate::handle::Handle;
use crate::match_result::MatchResult;
use crate::options::{self, OptionKind};
use crate::substitute;

/// A compiled pattern.
///
/// The compiled code is released by [`Pattern::finalize`] or on drop,
/// whichever comes first. A `Pattern` is `Send + Sync`; share it through an
/// `Arc` to match from several threads.
pub struct Pattern {
    code: Handle<Code>,
    source: Vec<u8>,
    options: u32,
    policy: OptionPolicy,
}

impl Pattern {
    /// Compile `pattern` with the default configuration.
    pub fn compile(pattern: &[u8], options: u32) -> Result<Pattern> {
        Self::compile_with(pattern, options, &Config::default())
    }

    pub fn compile_with(pattern: &[u8], options: u32, config: &Config) -> Result<Pattern> {
        let policy = config.option_policy;
        let options = options::restrict(OptionKind::Compile, options, policy)?;
        let code = Code::compile(pattern, options)?;
        log::debug!(
            "compiled pattern `{}` with options 0x{:08x}",
            String::from_utf8_lossy(pattern),
            options
        );
        Ok(Pattern {
            code: Handle::new("pattern", code),
            source: pattern.to_vec(),
            options,
            policy,
        })
    }

    /// Release the compiled code. Returns `true` if this call released it.
    pub fn finalize(&self) -> bool {
        self.code.finalize()
    }

    pub fn is_finalized(&self) -> bool {
        self.code.is_finalized()
    }

    /// The pattern text as given to `compile`.
    pub fn as_bytes(&self) -> &[u8] {
        &self.source
    }

    /// Compile options actually applied.
    pub fn options(&self) -> u32 {
        self.options
    }

    pub fn option_policy(&self) -> OptionPolicy {
        self.policy
    }

    /// Number of capture groups in the pattern, not counting group 0.
    pub fn capture_count(&self) -> Result<u32> {
        self.code.with(|code| code.capture_count())?
    }

    /// Match against `subject` starting at byte `offset`.
    ///
    /// Returns `Ok(None)` when the pattern does not match. The match data of
    /// a failed attempt is released before returning.
    pub fn match_at(
        self: &Arc<Self>,
        subject: &[u8],
        offset: usize,
        options: u32,
    ) -> Result<Option<MatchResult>> {
        let options = options::restrict(OptionKind::Match, options, self.policy)?;
        let (rc, data) = self.code.with(|code| -> Result<_> {
            let mut data = MatchData::for_code(code)?;
            let rc = code.match_into(&mut data, subject, offset, options);
            Ok((rc, data))
        })??;

        if rc == engine::ERROR_NOMATCH {
            log::trace!("no match at offset {}", offset);
            return Ok(None);
        }
        if rc <= 0 {
            // 0 means the ovector was too small, which pattern-sized match
            // data rules out; treat it like any other engine failure.
            return Err(Error::Match { code: rc, message: engine::error_message(rc) });
        }
        log::trace!("matched with {} group(s) at offset {}", rc - 1, offset);
        Ok(Some(MatchResult::new(self.clone(), data, rc - 1)))
    }

    /// Substitute `replacement` into `subject`; see [`substitute::substitute`].
    pub fn substitute(&self, subject: &[u8], replacement: &[u8], options: u32) -> Result<Vec<u8>> {
        substitute::substitute(self, subject, replacement, options)
    }

    pub(crate) fn with_code<R>(&self, f: impl FnOnce(&Code) -> R) -> Result<R> {
        self.code.with(f)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pattern")
            .field("source", &String::from_utf8_lossy(&self.source))
            .field("options", &format_args!("0x{:08x}", self.options))
            .field("finalized", &self.is_finalized())
            .finish()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.source))
    }
}
