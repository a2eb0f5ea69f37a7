//! Option Mapping Table.
//!
//! The binding publishes its own option constants. Their values must be
//! identical to the engine's, which `verify` checks once at load time; a
//! mismatch means the binding is stale against the linked PCRE2 and it must
//! refuse to load.

use std::fmt;

use crate::config::OptionPolicy;
use crate::error::{Error, Result};

/// Which engine entry point an option belongs to. The three namespaces
/// overlap numerically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Compile,
    Match,
    Substitute,
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionKind::Compile => f.write_str("compile"),
            OptionKind::Match => f.write_str("match"),
            OptionKind::Substitute => f.write_str("substitute"),
        }
    }
}

pub const ALLOW_EMPTY_CLASS: u32 = 0x0000_0001;
pub const CASELESS: u32 = 0x0000_0008;
pub const DOTALL: u32 = 0x0000_0020;
pub const EXTENDED: u32 = 0x0000_0080;
pub const MULTILINE: u32 = 0x0000_0400;
pub const UCP: u32 = 0x0002_0000;
pub const UNGREEDY: u32 = 0x0004_0000;
pub const UTF: u32 = 0x0008_0000;

pub const NOTBOL: u32 = 0x0000_0001;
pub const NOTEOL: u32 = 0x0000_0002;
pub const NOTEMPTY: u32 = 0x0000_0004;
pub const NOTEMPTY_ATSTART: u32 = 0x0000_0008;
pub const ENDANCHORED: u32 = 0x2000_0000;
pub const NO_UTF_CHECK: u32 = 0x4000_0000;
pub const ANCHORED: u32 = 0x8000_0000;

pub const SUBSTITUTE_GLOBAL: u32 = 0x0000_0100;
pub const SUBSTITUTE_EXTENDED: u32 = 0x0000_0200;
pub const SUBSTITUTE_UNSET_EMPTY: u32 = 0x0000_0400;
pub const SUBSTITUTE_UNKNOWN_UNSET: u32 = 0x0000_0800;
pub const SUBSTITUTE_REPLACEMENT_ONLY: u32 = 0x0002_0000;

/// Set internally by the probe pass; never accepted from callers.
pub(crate) const SUBSTITUTE_OVERFLOW_LENGTH: u32 = 0x0000_1000;

/// One row of the mapping: the name published to hosts, the binding's
/// value and the engine's value for the same option.
#[derive(Debug, Clone, Copy)]
pub struct OptionEntry {
    pub name: &'static str,
    pub kind: OptionKind,
    pub value: u32,
    pub engine: u32,
}

macro_rules! option_table {
    ($($kind:ident: $name:ident => $engine:ident),* $(,)?) => {
        pub const TABLE: &[OptionEntry] = &[
            $(OptionEntry {
                name: stringify!($engine),
                kind: OptionKind::$kind,
                value: $name,
                engine: pcre2_sys::$engine,
            },)*
        ];
    };
}

option_table! {
    Compile: ALLOW_EMPTY_CLASS => PCRE2_ALLOW_EMPTY_CLASS,
    Compile: CASELESS => PCRE2_CASELESS,
    Compile: DOTALL => PCRE2_DOTALL,
    Compile: EXTENDED => PCRE2_EXTENDED,
    Compile: MULTILINE => PCRE2_MULTILINE,
    Compile: UCP => PCRE2_UCP,
    Compile: UNGREEDY => PCRE2_UNGREEDY,
    Compile: UTF => PCRE2_UTF,

    Match: NOTBOL => PCRE2_NOTBOL,
    Match: NOTEOL => PCRE2_NOTEOL,
    Match: NOTEMPTY => PCRE2_NOTEMPTY,
    Match: NOTEMPTY_ATSTART => PCRE2_NOTEMPTY_ATSTART,
    Match: ENDANCHORED => PCRE2_ENDANCHORED,
    Match: NO_UTF_CHECK => PCRE2_NO_UTF_CHECK,
    Match: ANCHORED => PCRE2_ANCHORED,

    Substitute: SUBSTITUTE_GLOBAL => PCRE2_SUBSTITUTE_GLOBAL,
    Substitute: SUBSTITUTE_EXTENDED => PCRE2_SUBSTITUTE_EXTENDED,
    Substitute: SUBSTITUTE_UNSET_EMPTY => PCRE2_SUBSTITUTE_UNSET_EMPTY,
    Substitute: SUBSTITUTE_UNKNOWN_UNSET => PCRE2_SUBSTITUTE_UNKNOWN_UNSET,
    Substitute: SUBSTITUTE_REPLACEMENT_ONLY => PCRE2_SUBSTITUTE_REPLACEMENT_ONLY,
}

/// Check every published constant against the engine's value.
pub fn verify() -> Result<()> {
    verify_table(TABLE)?;
    if SUBSTITUTE_OVERFLOW_LENGTH != pcre2_sys::PCRE2_SUBSTITUTE_OVERFLOW_LENGTH {
        return Err(Error::OptionMismatch {
            name: "PCRE2_SUBSTITUTE_OVERFLOW_LENGTH",
            binding: SUBSTITUTE_OVERFLOW_LENGTH,
            engine: pcre2_sys::PCRE2_SUBSTITUTE_OVERFLOW_LENGTH,
        });
    }
    Ok(())
}

/// First entry of `table` whose binding value differs from the engine's.
pub fn verify_table(table: &[OptionEntry]) -> Result<()> {
    for entry in table {
        if entry.value != entry.engine {
            return Err(Error::OptionMismatch {
                name: entry.name,
                binding: entry.value,
                engine: entry.engine,
            });
        }
    }
    Ok(())
}

fn kind_bits(kind: OptionKind) -> u32 {
    TABLE
        .iter()
        .filter(|e| e.kind == kind)
        .fold(0, |acc, e| acc | e.value)
}

/// Bits accepted for `kind`. Substitution also takes match-time options.
pub fn mask(kind: OptionKind) -> u32 {
    match kind {
        OptionKind::Substitute => kind_bits(OptionKind::Substitute) | kind_bits(OptionKind::Match),
        k => kind_bits(k),
    }
}

/// Restrict `bits` to what `kind` accepts, either dropping or rejecting the
/// rest depending on `policy`.
pub fn restrict(kind: OptionKind, bits: u32, policy: OptionPolicy) -> Result<u32> {
    let allowed = mask(kind);
    let extra = bits & !allowed;
    if extra == 0 {
        return Ok(bits);
    }
    match policy {
        OptionPolicy::Reject => Err(Error::UnsupportedOptions { kind, bits: extra }),
        OptionPolicy::Mask => {
            log::debug!("dropping unsupported {} option bits 0x{:08x}", kind, extra);
            Ok(bits & allowed)
        }
    }
}

/// Value of a published option name, e.g. `"PCRE2_DOTALL"`.
pub fn lookup(name: &str) -> Option<u32> {
    TABLE.iter().find(|e| e.name == name).map(|e| e.value)
}

/// Names of the `kind` options set in `bits`, in table order.
pub fn names(kind: OptionKind, bits: u32) -> Vec<&'static str> {
    TABLE
        .iter()
        .filter(|e| e.kind == kind && bits & e.value == e.value)
        .map(|e| e.name)
        .collect()
}
