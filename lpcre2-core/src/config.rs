//! Per-module configuration.
//!
//! A `Config` is built once when a host opens the module and is then shared
//! by reference with everything the module creates. There is no
//! process-wide mutable state.

use std::env;

/// Where group iteration starts.
///
/// Both modes yield nothing for a match without capture groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IterStart {
    /// Include group 0, the whole match.
    WholeMatch,
    /// Start at the first capture group.
    #[default]
    FirstCapture,
}

impl IterStart {
    pub fn index(self) -> usize {
        match self {
            IterStart::WholeMatch => 0,
            IterStart::FirstCapture => 1,
        }
    }
}

/// What to do with option bits that an entry point does not accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptionPolicy {
    /// Drop them.
    #[default]
    Mask,
    /// Fail the call with `Error::UnsupportedOptions`.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Name used for `package.preload` and for the global table.
    pub module_name: String,
    pub iter_start: IterStart,
    pub option_policy: OptionPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            module_name: "lpcre2".to_string(),
            iter_start: IterStart::default(),
            option_policy: OptionPolicy::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_module_name(mut self, name: impl Into<String>) -> Self {
        self.module_name = name.into();
        self
    }

    pub fn with_iter_start(mut self, start: IterStart) -> Self {
        self.iter_start = start;
        self
    }

    pub fn with_option_policy(mut self, policy: OptionPolicy) -> Self {
        self.option_policy = policy;
        self
    }

    /// Defaults overridden by `LPCRE2_ITER_START` (`whole` | `captures`) and
    /// `LPCRE2_OPTION_POLICY` (`mask` | `reject`).
    pub fn from_env() -> Self {
        let mut cfg = Config::default();
        if let Ok(v) = env::var("LPCRE2_ITER_START") {
            match parse_iter_start(&v) {
                Some(s) => cfg.iter_start = s,
                None => log::warn!("ignoring LPCRE2_ITER_START={:?}", v),
            }
        }
        if let Ok(v) = env::var("LPCRE2_OPTION_POLICY") {
            match parse_option_policy(&v) {
                Some(p) => cfg.option_policy = p,
                None => log::warn!("ignoring LPCRE2_OPTION_POLICY={:?}", v),
            }
        }
        cfg
    }
}

fn parse_iter_start(s: &str) -> Option<IterStart> {
    match s.trim().to_ascii_lowercase().as_str() {
        "whole" | "0" => Some(IterStart::WholeMatch),
        "captures" | "1" => Some(IterStart::FirstCapture),
        _ => None,
    }
}

fn parse_option_policy(s: &str) -> Option<OptionPolicy> {
    match s.trim().to_ascii_lowercase().as_str() {
        "mask" => Some(OptionPolicy::Mask),
        "reject" => Some(OptionPolicy::Reject),
        _ => None,
    }
}
