// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Attribute records that can be attached to any topology node.
//!
//! A record is a self-describing, kernel-agnostic tuple: a name plus ordered
//! lists of strings, integers and doubles. Nodes keep their records in
//! insertion order, and several records may share a name.

use serde::{Deserialize, Serialize};

use crate::arena::TopologyArena;
use crate::error::{Error, Result};
use crate::keys::TopologyKey;

/// A generic attribute record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttributeRecord {
    pub name: String,
    pub strings: Vec<String>,
    pub ints: Vec<i32>,
    pub doubles: Vec<f64>,
}

impl AttributeRecord {
    /// Creates an empty record with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Appends a string value.
    pub fn with_string(mut self, value: impl Into<String>) -> Self {
        self.strings.push(value.into());
        self
    }

    /// Appends an integer value.
    pub fn with_int(mut self, value: i32) -> Self {
        self.ints.push(value);
        self
    }

    /// Appends a double value.
    pub fn with_double(mut self, value: f64) -> Self {
        self.doubles.push(value);
        self
    }
}

impl PartialEq for AttributeRecord {
    fn eq(&self, other: &Self) -> bool {
        // Lengths first, then the string data: names differ most often.
        self.strings.len() == other.strings.len()
            && self.ints.len() == other.ints.len()
            && self.doubles.len() == other.doubles.len()
            && self.name == other.name
            && self.strings == other.strings
            && self.ints == other.ints
            && self.doubles == other.doubles
    }
}

impl TopologyArena {
    /// Appends a record to a node's attribute list.
    pub fn attach(&mut self, key: TopologyKey, record: AttributeRecord) -> Result<()> {
        if !self.contains(key) {
            return Err(Error::NotFound(key));
        }
        self.attributes.entry(key).or_default().push(record);
        Ok(())
    }

    /// Removes the first record equal to `record`. Returns whether one was
    /// removed.
    pub fn detach(&mut self, key: TopologyKey, record: &AttributeRecord) -> bool {
        let Some(list) = self.attributes.get_mut(&key) else {
            return false;
        };
        let Some(pos) = list.iter().position(|r| r == record) else {
            return false;
        };
        list.remove(pos);
        if list.is_empty() {
            self.attributes.remove(&key);
        }
        true
    }

    /// Removes every record with the given name and returns them.
    pub fn detach_named(&mut self, key: TopologyKey, name: &str) -> Vec<AttributeRecord> {
        let Some(list) = self.attributes.get_mut(&key) else {
            return Vec::new();
        };
        let (removed, kept): (Vec<_>, Vec<_>) =
            std::mem::take(list).into_iter().partition(|r| r.name == name);
        if kept.is_empty() {
            self.attributes.remove(&key);
        } else {
            *list = kept;
        }
        removed
    }

    /// Removes and returns all records of a node.
    pub fn detach_all(&mut self, key: TopologyKey) -> Vec<AttributeRecord> {
        self.attributes.remove(&key).unwrap_or_default()
    }

    /// Returns the records of a node, optionally filtered by name, in
    /// insertion order.
    pub fn query(&self, key: TopologyKey, name: Option<&str>) -> Vec<&AttributeRecord> {
        self.attributes
            .get(&key)
            .map(|list| {
                list.iter()
                    .filter(|r| name.map_or(true, |n| r.name == n))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the full attribute list of a node.
    pub fn attributes_of(&self, key: TopologyKey) -> &[AttributeRecord] {
        self.attributes
            .get(&key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    // --- Live state ---

    /// Returns the local tolerance of a node; `0.0` means unset.
    pub fn local_tolerance(&self, key: TopologyKey) -> f64 {
        self.tolerances.get(&key).copied().unwrap_or(0.0)
    }

    /// Sets the local tolerance of a node. Setting `0.0` clears it.
    pub fn set_local_tolerance(&mut self, key: TopologyKey, tolerance: f64) -> Result<()> {
        if !self.contains(key) {
            return Err(Error::NotFound(key));
        }
        if tolerance == 0.0 {
            self.tolerances.remove(&key);
        } else {
            self.tolerances.insert(key, tolerance);
        }
        Ok(())
    }

    /// Returns the entity name of a node; empty means unset.
    pub fn entity_name(&self, key: TopologyKey) -> &str {
        self.names.get(&key).map(String::as_str).unwrap_or("")
    }

    /// Sets the entity name of a node. An empty name clears it.
    pub fn set_entity_name(&mut self, key: TopologyKey, name: impl Into<String>) -> Result<()> {
        if !self.contains(key) {
            return Err(Error::NotFound(key));
        }
        let name = name.into();
        if name.is_empty() {
            self.names.remove(&key);
        } else {
            self.names.insert(key, name);
        }
        Ok(())
    }

    /// Drops every attribute and live value held for a node.
    pub(crate) fn forget_metadata(&mut self, key: TopologyKey) {
        self.attributes.remove(&key);
        self.tolerances.remove(&key);
        self.names.remove(&key);
    }
}
