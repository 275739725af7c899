//! Subnet labels.
//!
//! Labels are decorations keyed by a leaf's `"<address>/<mask>"` key. The
//! tree never looks at them; the session keeps them in step with the leaves.

use crate::error::{Result, SubnetError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Fixed label palette: name and colour.
pub const PALETTE: [(&str, &str); 10] = [
    ("A", "#dc3545"),
    ("B", "#fd7e14"),
    ("C", "#ffc107"),
    ("D", "#28a745"),
    ("E", "#20c997"),
    ("F", "#17a2b8"),
    ("G", "#007bff"),
    ("H", "#6610f2"),
    ("I", "#6f42c1"),
    ("J", "#e83e8c"),
];

/// A named, coloured label.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub name: String,
    pub color: String,
}

impl Label {
    /// Look up a palette entry by name (case-insensitive).
    pub fn from_palette(name: &str) -> Option<Label> {
        PALETTE
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(n, c)| Label {
                name: n.to_string(),
                color: c.to_string(),
            })
    }

    /// Colour as an RGB triple, `None` when it is not `#rrggbb`.
    pub fn rgb(&self) -> Option<(u8, u8, u8)> {
        let hex = self.color.strip_prefix('#')?;
        if hex.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        Some((channel(0)?, channel(2)?, channel(4)?))
    }
}

/// Subnet key to label mapping. Each label name is used at most once.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct LabelMap {
    labels: BTreeMap<String, Label>,
}

impl LabelMap {
    pub fn new() -> LabelMap {
        LabelMap::default()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn get(&self, key: &str) -> Option<&Label> {
        self.labels.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Label)> {
        self.labels.iter()
    }

    /// Key currently holding the label `name`.
    pub fn holder(&self, name: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(_, l)| l.name == name)
            .map(|(k, _)| k.as_str())
    }

    /// Assign palette label `name` to `key`, replacing any label on that key.
    pub fn assign(&mut self, key: &str, name: &str) -> Result<&Label> {
        let label = Label::from_palette(name)
            .ok_or_else(|| SubnetError::Parse(format!("unknown label '{name}'")))?;
        if let Some(holder) = self.holder(&label.name) {
            if holder != key {
                return Err(SubnetError::InvalidOperation(format!(
                    "label {} is already assigned to {holder}",
                    label.name
                )));
            }
        }
        log::debug!("assign label {} to {key}", label.name);
        self.labels.insert(key.to_string(), label);
        Ok(&self.labels[key])
    }

    pub fn remove(&mut self, key: &str) -> Option<Label> {
        self.labels.remove(key)
    }

    pub fn clear(&mut self) {
        self.labels.clear();
    }

    /// Palette entries not assigned to any subnet.
    pub fn available(&self) -> Vec<Label> {
        PALETTE
            .iter()
            .filter(|(name, _)| self.holder(name).is_none())
            .filter_map(|(name, _)| Label::from_palette(name))
            .collect()
    }

    /// Drop labels whose key is not one of `leaf_keys`. Returns how many
    /// were dropped.
    pub fn retain_leaves(&mut self, leaf_keys: &HashSet<String>) -> usize {
        let before = self.labels.len();
        self.labels.retain(|key, _| leaf_keys.contains(key));
        let dropped = before - self.labels.len();
        if dropped > 0 {
            log::debug!("dropped {dropped} labels of removed subnets");
        }
        dropped
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| SubnetError::Parse(format!("labels: {e}")))
    }

    /// Parse the share link JSON form. Duplicate names keep the first key.
    pub fn from_json(json: &str) -> Result<LabelMap> {
        let raw: BTreeMap<String, Label> = serde_json::from_str(json)
            .map_err(|e| SubnetError::Parse(format!("labels: {e}")))?;
        let mut map = LabelMap::new();
        for (key, label) in raw {
            let key = unsigned_key(&key);
            if map.holder(&label.name).is_some() || map.labels.contains_key(&key) {
                log::warn!("label {} used twice, ignoring {key}", label.name);
                continue;
            }
            map.labels.insert(key, label);
        }
        Ok(map)
    }
}

/// Keys written with a signed 32-bit address, e.g. `-1062731776/16`, map
/// onto the unsigned form. Anything else is kept as written.
fn unsigned_key(key: &str) -> String {
    let Some((addr, mask)) = key.split_once('/') else {
        return key.to_string();
    };
    match addr.parse::<i32>() {
        Ok(signed) if signed < 0 => format!("{}/{mask}", signed as u32),
        _ => key.to_string(),
    }
}
