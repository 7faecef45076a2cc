//! MAC to VLAN mapping snapshot
//!
//! Built from the generic `mapping` section of the configuration:
//!
//! ```yaml
//! mapping:
//!   default: 99
//!   10:
//!     - aa:bb:cc:dd:ee:ff
//!     - 11-22-33-44-55-66
//! ```
//!
//! The snapshot is immutable. Reloading builds a new one.

use crate::mac::{MacAddress, normalize};
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

/// Reserved key holding the fallback VLAN
pub const DEFAULT_KEY: &str = "default";

/// VLAN identifier as sent in Tunnel-Private-Group-Id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct VlanId(pub u32);

impl VlanId {
    pub fn get(self) -> u32 {
        self.0
    }

    /// Interpret a YAML scalar as a VLAN id
    ///
    /// Accepts non-negative whole numbers, `10.0` included, and strings
    /// holding one.
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => match n.as_u64() {
                Some(v) => u32::try_from(v).ok().map(VlanId),
                None => n.as_f64().and_then(Self::from_whole_float),
            },
            Value::String(s) => {
                let s = s.trim();
                match s.parse::<u32>() {
                    Ok(v) => Some(VlanId(v)),
                    Err(_) => s.parse::<f64>().ok().and_then(Self::from_whole_float),
                }
            }
            _ => None,
        }
    }

    fn from_whole_float(v: f64) -> Option<Self> {
        let in_range = v.is_finite() && v >= 0.0 && v <= f64::from(u32::MAX);
        (in_range && v.fract() == 0.0).then(|| VlanId(v as u32))
    }
}

impl fmt::Display for VlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for VlanId {
    fn from(value: u32) -> Self {
        VlanId(value)
    }
}

/// Entries skipped or overridden while building a snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Top-level keys that are neither `default` nor an integer VLAN id
    pub skipped_vlan_keys: usize,
    /// VLAN ids whose value is not a list
    pub skipped_vlan_values: usize,
    /// List items that are not scalars (nested lists, mappings, null)
    pub skipped_macs: usize,
    /// MACs listed again under a later VLAN (the later one wins)
    pub overridden_macs: usize,
    /// `default` present but not an integer
    pub invalid_default: bool,
}

impl LoadReport {
    /// Total number of entries that did not make it into the snapshot as written
    pub fn total_skipped(&self) -> usize {
        self.skipped_vlan_keys
            + self.skipped_vlan_values
            + self.skipped_macs
            + self.overridden_macs
            + usize::from(self.invalid_default)
    }

    pub fn is_clean(&self) -> bool {
        self.total_skipped() == 0
    }
}

/// What to do with one top-level entry of the mapping section
enum EntryDecision<'a> {
    Default(Option<VlanId>),
    Vlan(VlanId, &'a [Value]),
    SkipKey,
    SkipValue(VlanId),
}

fn classify<'a>(key: &Value, value: &'a Value) -> EntryDecision<'a> {
    if key.as_str() == Some(DEFAULT_KEY) {
        return EntryDecision::Default(VlanId::from_value(value));
    }
    let Some(vlan) = VlanId::from_value(key) else {
        return EntryDecision::SkipKey;
    };
    match value {
        Value::Sequence(macs) => EntryDecision::Vlan(vlan, macs),
        _ => EntryDecision::SkipValue(vlan),
    }
}

/// Text of a MAC list item
///
/// An unquoted all-digit MAC such as `112233445566` parses as a YAML
/// integer and is taken by its decimal text.
fn mac_text(item: &Value) -> Option<Cow<'_, str>> {
    match item {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        _ => None,
    }
}

/// Immutable MAC to VLAN lookup table
#[derive(Debug, Clone, Default)]
pub struct MacVlanMapping {
    entries: HashMap<MacAddress, VlanId>,
    default_vlan: Option<VlanId>,
    vlan_count: usize,
    report: LoadReport,
}

impl MacVlanMapping {
    /// Build a snapshot from the `mapping` section
    ///
    /// Entries are processed in source order. A MAC listed under several
    /// VLANs ends up in the last one.
    pub fn from_mapping(mapping: &Mapping) -> Self {
        let mut snapshot = MacVlanMapping::default();

        for (key, value) in mapping {
            match classify(key, value) {
                EntryDecision::Default(Some(vlan)) => snapshot.default_vlan = Some(vlan),
                EntryDecision::Default(None) => {
                    snapshot.default_vlan = None;
                    if !value.is_null() {
                        debug!(value = ?value, "Ignoring non-numeric default VLAN");
                        snapshot.report.invalid_default = true;
                    }
                }
                EntryDecision::SkipKey => {
                    debug!(key = ?key, "Skipping mapping entry with non-numeric VLAN id");
                    snapshot.report.skipped_vlan_keys += 1;
                }
                EntryDecision::SkipValue(vlan) => {
                    debug!(vlan = %vlan, "Skipping VLAN whose MAC list is not a list");
                    snapshot.report.skipped_vlan_values += 1;
                }
                EntryDecision::Vlan(vlan, macs) => {
                    snapshot.vlan_count += 1;
                    snapshot.insert_macs(vlan, macs);
                }
            }
        }

        snapshot
    }

    fn insert_macs(&mut self, vlan: VlanId, macs: &[Value]) {
        for item in macs {
            let Some(raw) = mac_text(item) else {
                debug!(vlan = %vlan, item = ?item, "Skipping non-scalar MAC entry");
                self.report.skipped_macs += 1;
                continue;
            };
            let mac = normalize(&raw);
            if let Some(previous) = self.entries.insert(mac.clone(), vlan) {
                if previous != vlan {
                    warn!(
                        mac = %mac,
                        previous_vlan = %previous,
                        vlan = %vlan,
                        "MAC listed under several VLANs, last one wins"
                    );
                    self.report.overridden_macs += 1;
                }
            }
        }
    }

    /// VLAN configured for exactly this MAC, ignoring the default
    pub fn lookup(&self, mac: &MacAddress) -> Option<VlanId> {
        self.entries.get(mac).copied()
    }

    pub fn default_vlan(&self) -> Option<VlanId> {
        self.default_vlan
    }

    /// Number of distinct MAC addresses mapped
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of VLAN groups that contributed a MAC list
    pub fn vlan_count(&self) -> usize {
        self.vlan_count
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }
}
