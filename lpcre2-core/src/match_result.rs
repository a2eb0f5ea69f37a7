use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use crate::config::IterStart;
use crate::engine::MatchData;
use crate::error::{Error, Result};
use crate::handle::Handle;
use crate::iter::Groups;
use crate::pattern::Pattern;

/// Result code of an attempt that did not match. Never stored in a
/// `MatchResult`; a failed match yields `None` instead.
pub const NO_MATCH: i32 = -1;

/// Byte span of one group inside the subject it was matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub offset: usize,
    pub length: usize,
}

impl Span {
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    pub fn range(&self) -> Range<usize> {
        self.offset..self.end()
    }

    /// One-based inclusive bounds, as Lua's `string.sub` takes them.
    pub fn one_based(&self) -> (usize, usize) {
        (self.offset + 1, self.offset + self.length)
    }
}

/// A successful match.
///
/// Owns the engine's match data and keeps the pattern that produced it
/// alive. Spans index into the subject passed to `match_at`; the caller must
/// pass that same subject to the slicing accessors.
pub struct MatchResult {
    pattern: Arc<Pattern>,
    data: Handle<MatchData>,
    rc: i32,
}

impl MatchResult {
    pub(crate) fn new(pattern: Arc<Pattern>, data: MatchData, rc: i32) -> Self {
        MatchResult { pattern, data: Handle::new("match data", data), rc }
    }

    /// Number of capture groups beyond the whole match.
    pub fn rc(&self) -> i32 {
        self.rc
    }

    pub fn group_count(&self) -> usize {
        self.rc.max(0) as usize
    }

    pub fn pattern(&self) -> &Arc<Pattern> {
        &self.pattern
    }

    pub fn finalize(&self) -> bool {
        self.data.finalize()
    }

    pub fn is_finalized(&self) -> bool {
        self.data.is_finalized()
    }

    fn check_index(&self, index: i64) -> Result<usize> {
        if index < 0 || index > self.rc as i64 {
            return Err(Error::IndexOutOfRange { index, count: self.group_count() });
        }
        Ok(index as usize)
    }

    /// Span of group `index`; `None` if the group did not participate.
    pub fn span(&self, index: i64) -> Result<Option<Span>> {
        let idx = self.check_index(index)?;
        self.data.with(|data| {
            data.pair(idx).map(|(start, end)| Span {
                offset: start,
                length: end.saturating_sub(start),
            })
        })
    }

    /// Zero-based offset and length of group `index`.
    pub fn group_offset_and_length(&self, index: i64) -> Result<Option<(usize, usize)>> {
        Ok(self.span(index)?.map(|s| (s.offset, s.length)))
    }

    /// One-based inclusive start and end of group `index`.
    pub fn group_offset(&self, index: i64) -> Result<Option<(usize, usize)>> {
        Ok(self.span(index)?.map(|s| s.one_based()))
    }

    /// Text of group `index`, borrowed from `subject`.
    pub fn group<'s>(&self, subject: &'s [u8], index: i64) -> Result<Option<&'s [u8]>> {
        match self.span(index)? {
            Some(span) => Ok(Some(slice(subject, index as usize, span)?)),
            None => Ok(None),
        }
    }

    /// Owned copies of groups `0..=rc`, in order.
    pub fn all_groups(&self, subject: &[u8]) -> Result<Vec<Option<Vec<u8>>>> {
        (0..=self.rc as i64)
            .map(|i| Ok(self.group(subject, i)?.map(|g| g.to_vec())))
            .collect()
    }

    /// Iterate the capture groups, starting at group 1.
    pub fn iter<'m, 's>(&'m self, subject: &'s [u8]) -> Result<Groups<'m, 's>> {
        self.iter_from(subject, IterStart::FirstCapture)
    }

    pub fn iter_from<'m, 's>(
        &'m self,
        subject: &'s [u8],
        start: IterStart,
    ) -> Result<Groups<'m, 's>> {
        // A subject too short for any span is rejected up front.
        for i in 0..=self.rc as i64 {
            self.group(subject, i)?;
        }
        Ok(Groups::new(self, subject, start))
    }
}

pub(crate) fn slice(subject: &[u8], index: usize, span: Span) -> Result<&[u8]> {
    subject.get(span.range()).ok_or(Error::SubjectTooShort {
        index,
        end: span.end(),
        len: subject.len(),
    })
}

impl fmt::Debug for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchResult")
            .field("pattern", &self.pattern)
            .field("rc", &self.rc)
            .field("finalized", &self.is_finalized())
            .finish()
    }
}
