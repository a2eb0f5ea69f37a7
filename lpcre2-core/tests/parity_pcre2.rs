// Spans reported by the binding must agree with the `pcre2` crate, which
// drives the same engine through its own wrapper.

use lpcre2_core::options;
use pcre2::bytes::RegexBuilder;

struct Case {
    pattern: &'static str,
    subject: &'static [u8],
    caseless: bool,
    multiline: bool,
}

const fn case(pattern: &'static str, subject: &'static [u8]) -> Case {
    Case { pattern, subject, caseless: false, multiline: false }
}

const CASES: &[Case] = &[
    case(r"(\w+) (\w+)", b"hello world!"),
    case(r"(a)|(b)", b"xxb"),
    case(r"(\d+)-(\d+)?-(\d+)", b"id 12--34"),
    Case { pattern: r"^foo(bar)?$", subject: b"x\nFOO\ny", caseless: true, multiline: true },
    case(r"(?<year>\d{4})(-)?", b"in 2024"),
    case(r"q", b"no such letter"),
    case(r"", b""),
    case(r"(x*)", b"abc"),
];

fn spans_from_binding(case: &Case) -> Option<Vec<Option<(usize, usize)>>> {
    let mut opts = 0;
    if case.caseless {
        opts |= options::CASELESS;
    }
    if case.multiline {
        opts |= options::MULTILINE;
    }
    let pattern = lpcre2_core::compile(case.pattern.as_bytes(), opts).unwrap();
    let m = pattern.match_at(case.subject, 0, 0).unwrap()?;
    let count = pattern.capture_count().unwrap() as usize;
    // Trailing unset groups are beyond rc; report them as unset.
    Some(
        (0..=count)
            .map(|i| {
                if i > m.group_count() {
                    return None;
                }
                m.span(i as i64).unwrap().map(|s| (s.offset, s.end()))
            })
            .collect(),
    )
}

fn spans_from_pcre2(case: &Case) -> Option<Vec<Option<(usize, usize)>>> {
    let re = RegexBuilder::new()
        .caseless(case.caseless)
        .multi_line(case.multiline)
        .build(case.pattern)
        .unwrap();
    let caps = re.captures(case.subject).unwrap()?;
    Some((0..caps.len()).map(|i| caps.get(i).map(|m| (m.start(), m.end()))).collect())
}

#[test]
fn spans_agree_with_pcre2_crate() {
    for case in CASES {
        assert_eq!(
            spans_from_binding(case),
            spans_from_pcre2(case),
            "pattern {:?} subject {:?}",
            case.pattern,
            String::from_utf8_lossy(case.subject)
        );
    }
}

#[test]
fn substitute_agrees_with_manual_replacement() {
    let pattern = lpcre2_core::compile(br"(\w+)@(\w+)", 0).unwrap();
    let subject = b"mail bob@example or amy@test";
    let re = RegexBuilder::new().build(r"(\w+)@(\w+)").unwrap();

    let mut expected = Vec::new();
    let mut last = 0;
    for caps in re.captures_iter(subject) {
        let caps = caps.unwrap();
        let whole = caps.get(0).unwrap();
        expected.extend_from_slice(&subject[last..whole.start()]);
        expected.extend_from_slice(caps.get(2).unwrap().as_bytes());
        expected.push(b'.');
        expected.extend_from_slice(caps.get(1).unwrap().as_bytes());
        last = whole.end();
    }
    expected.extend_from_slice(&subject[last..]);

    let out = pattern.substitute(subject, b"$2.$1", options::SUBSTITUTE_GLOBAL).unwrap();
    assert_eq!(out, expected);
}
