use crate::config::IterStart;
use crate::error::Result;
use crate::match_result::{slice, MatchResult};

/// Lazy view over a match's groups, paired with the subject.
///
/// Yields `Ok((index, text))` where `text` is `None` for a group that did
/// not participate. Nothing is yielded for a match without capture groups,
/// whatever the start. If the match data is finalized while iterating, the
/// next step yields `Err(Error::Finalized)` and the iterator then ends.
pub struct Groups<'m, 's> {
    result: &'m MatchResult,
    subject: &'s [u8],
    next: usize,
    failed: bool,
}

impl<'m, 's> Groups<'m, 's> {
    pub(crate) fn new(result: &'m MatchResult, subject: &'s [u8], start: IterStart) -> Self {
        Groups { result, subject, next: start.index(), failed: false }
    }

    fn step(&self, index: usize) -> Result<Option<&'s [u8]>> {
        match self.result.span(index as i64)? {
            Some(span) => Ok(Some(slice(self.subject, index, span)?)),
            None => Ok(None),
        }
    }
}

impl<'m, 's> Iterator for Groups<'m, 's> {
    type Item = Result<(usize, Option<&'s [u8]>)>;

    fn next(&mut self) -> Option<Self::Item> {
        let rc = self.result.rc();
        if self.failed || rc <= 0 || self.next > rc as usize {
            return None;
        }
        let index = self.next;
        match self.step(index) {
            Ok(text) => {
                self.next += 1;
                Some(Ok((index, text)))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rc = self.result.rc();
        if self.failed || rc <= 0 {
            return (0, Some(0));
        }
        let left = (rc as usize + 1).saturating_sub(self.next);
        (0, Some(left))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::config::IterStart;
    use crate::error::Error;
    use crate::pattern::Pattern;

    fn matched(pattern: &[u8], subject: &[u8]) -> crate::MatchResult {
        let p = Arc::new(Pattern::compile(pattern, 0).unwrap());
        p.match_at(subject, 0, 0).unwrap().unwrap()
    }

    #[test]
    fn starts_at_first_capture_by_default() {
        let subject = b"hello world!";
        let m = matched(br"(\w+) (\w+)", subject);
        let got: Vec<_> = m.iter(subject).unwrap().collect::<Result<_, _>>().unwrap();
        assert_eq!(got, vec![(1, Some(&b"hello"[..])), (2, Some(&b"world"[..]))]);
    }

    #[test]
    fn whole_match_start_includes_group_zero() {
        let subject = b"hello world!";
        let m = matched(br"(\w+) (\w+)", subject);
        let idx: Vec<usize> = m
            .iter_from(subject, IterStart::WholeMatch)
            .unwrap()
            .map(|g| g.unwrap().0)
            .collect();
        assert_eq!(idx, vec![0, 1, 2]);
    }

    #[test]
    fn no_captures_yields_nothing() {
        let m = matched(b"abc", b"abc");
        assert_eq!(m.iter(b"abc").unwrap().count(), 0);
        assert_eq!(m.iter_from(b"abc", IterStart::WholeMatch).unwrap().count(), 0);
    }

    #[test]
    fn agrees_with_all_groups_and_restarts() {
        let subject = b"2024-10-16";
        let m = matched(br"(\d+)-(\d+)-(\d+)", subject);
        let all = m.all_groups(subject).unwrap();
        for _ in 0..2 {
            let iterated: Vec<Option<Vec<u8>>> =
                m.iter(subject).unwrap().map(|g| g.unwrap().1.map(|t| t.to_vec())).collect();
            assert_eq!(iterated, all[1..].to_vec());
        }
    }

    #[test]
    fn unset_groups_are_yielded_as_none() {
        let m = matched(b"(a)|(b)", b"b");
        let got: Vec<_> = m.iter(b"b").unwrap().collect::<Result<_, _>>().unwrap();
        assert_eq!(got, vec![(1, None), (2, Some(&b"b"[..]))]);
    }

    #[test]
    fn finalize_mid_iteration_is_reported() {
        let subject = b"abc";
        let m = matched(b"(a)(b)(c)", subject);
        let mut it = m.iter(subject).unwrap();
        assert_eq!(it.next(), Some(Ok((1, Some(&b"a"[..])))));
        assert!(m.finalize());
        assert_eq!(it.next(), Some(Err(Error::Finalized("match data"))));
        assert_eq!(it.next(), None);
        assert!(matches!(m.span(2), Err(Error::Finalized(_))));
    }
}
