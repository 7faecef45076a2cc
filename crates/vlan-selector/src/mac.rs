//! MAC address normalization
//!
//! Access points disagree on how they print a MAC: `AA:BB:CC:DD:EE:FF`,
//! `aa-bb-cc-dd-ee-ff`, `aabb.ccdd.eeff` and bare `AABBCCDDEEFF` all show up.
//! Every address is reduced to one canonical string before comparison.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Six pairs of hex digits joined by `:` or `-`
static SEPARATED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9A-Fa-f]{2}[:-]){5}[0-9A-Fa-f]{2}$").expect("valid MAC pattern")
});

/// Twelve hex digits, no separators
static BARE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Fa-f]{12}$").expect("valid MAC pattern"));

/// A link-layer address in canonical form
///
/// The inner string is lowercase with `:`, `-` and space removed. No length
/// or digit validation is applied, so a malformed input yields a key that
/// simply never matches a configured entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacAddress(String);

impl MacAddress {
    /// Canonical string (twelve lowercase hex digits for a well-formed MAC)
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MacAddress {
    fn from(raw: &str) -> Self {
        normalize(raw)
    }
}

/// Canonicalize any textual MAC representation. Total and idempotent.
pub fn normalize(raw: &str) -> MacAddress {
    MacAddress(
        raw.chars()
            .filter(|c| !matches!(c, ':' | '-' | ' '))
            .map(|c| c.to_ascii_lowercase())
            .collect(),
    )
}

/// Whether `value` is written as a MAC address: `AA:BB:CC:DD:EE:FF`,
/// `AA-BB-CC-DD-EE-FF` or `AABBCCDDEEFF`
pub fn is_mac_shaped(value: &str) -> bool {
    SEPARATED.is_match(value) || BARE.is_match(value)
}
