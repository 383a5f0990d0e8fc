// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Built-in attribute kinds.

use crate::arena::TopologyArena;
use crate::attributes::AttributeRecord;
use crate::error::{Error, Result};
use crate::keys::TopologyKey;
use crate::lifecycle::AttributeKind;

fn expect_shape(
    record: &AttributeRecord,
    strings: usize,
    ints: usize,
    doubles: usize,
) -> Result<()> {
    if record.strings.len() == strings && record.ints.len() == ints && record.doubles.len() == doubles
    {
        return Ok(());
    }
    Err(Error::AttributeShape {
        name: record.name.clone(),
        reason: format!(
            "expected {strings} string(s), {ints} int(s), {doubles} double(s); found {}, {}, {}",
            record.strings.len(),
            record.ints.len(),
            record.doubles.len()
        ),
    })
}

/// Local geometric tolerance of a node.
///
/// One double; `0.0` means unset. When two owners merge, the smaller of the
/// two non-zero tolerances wins and a zero counts as "no opinion". This
/// treats an explicit zero tolerance the same as an unset one.
#[derive(Debug, Clone, Copy)]
pub struct EntityTolerance;

impl AttributeKind for EntityTolerance {
    const NAME: &'static str = "ENTITY_TOL";
    type Value = f64;

    fn default_value() -> f64 {
        0.0
    }

    fn read_live(arena: &TopologyArena, owner: TopologyKey) -> f64 {
        arena.local_tolerance(owner)
    }

    fn write_live(arena: &mut TopologyArena, owner: TopologyKey, value: &f64) -> Result<()> {
        arena.set_local_tolerance(owner, *value)
    }

    fn decode(record: &AttributeRecord) -> Result<f64> {
        expect_shape(record, 0, 0, 1)?;
        Ok(record.doubles[0])
    }

    fn encode(value: &f64) -> AttributeRecord {
        AttributeRecord::new(Self::NAME).with_double(*value)
    }

    fn merge(survivor: &f64, other: &f64) -> f64 {
        match (*survivor == 0.0, *other == 0.0) {
            (true, _) => *other,
            (_, true) => *survivor,
            _ => survivor.min(*other),
        }
    }
}

/// User-facing name of a node. One string; empty means unset.
///
/// On merge the surviving owner keeps its name; it adopts the other name
/// only when it has none.
#[derive(Debug, Clone, Copy)]
pub struct EntityName;

impl AttributeKind for EntityName {
    const NAME: &'static str = "ENTITY_NAME";
    type Value = String;

    fn default_value() -> String {
        String::new()
    }

    fn read_live(arena: &TopologyArena, owner: TopologyKey) -> String {
        arena.entity_name(owner).to_string()
    }

    fn write_live(arena: &mut TopologyArena, owner: TopologyKey, value: &String) -> Result<()> {
        arena.set_entity_name(owner, value.clone())
    }

    fn decode(record: &AttributeRecord) -> Result<String> {
        expect_shape(record, 1, 0, 0)?;
        Ok(record.strings[0].clone())
    }

    fn encode(value: &String) -> AttributeRecord {
        AttributeRecord::new(Self::NAME).with_string(value.clone())
    }

    fn merge(survivor: &String, other: &String) -> String {
        if survivor.is_empty() {
            other.clone()
        } else {
            survivor.clone()
        }
    }
}
