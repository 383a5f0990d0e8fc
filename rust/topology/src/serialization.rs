// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON snapshots of topology arenas.
//!
//! The snapshot is the same set of flattened tables the binary codec
//! writes, rendered with serde. It is meant for fixtures and diagnostics;
//! the binary format stays the interchange format.

use crate::arena::TopologyArena;
use crate::error::{Error, Result};
use crate::tables::TopologyTables;

impl TopologyArena {
    /// Serializes the arena to a JSON string.
    ///
    /// SlotMap keys are replaced by sequential per-kind indices.
    pub fn to_json(&self) -> Result<String> {
        let tables = TopologyTables::from_arena(self)?;
        serde_json::to_string_pretty(&tables).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserializes an arena from a JSON string.
    ///
    /// Indices are checked the same way as in a binary import.
    pub fn from_json(json: &str) -> Result<Self> {
        let tables: TopologyTables =
            serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))?;
        tables.to_arena()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Sense;
    use crate::attributes::AttributeRecord;
    use crate::construction::make_polygon_face;
    use crate::error::ErrorCategory;
    use crate::keys::TopologyKey;

    #[test]
    fn roundtrip_empty_arena() {
        let arena = TopologyArena::new();
        let json = arena.to_json().unwrap();
        let restored = TopologyArena::from_json(&json).unwrap();

        assert_eq!(restored.counts().total(), 0);
    }

    #[test]
    fn roundtrip_points_only() {
        let mut arena = TopologyArena::new();
        arena.add_point(1.0, 2.0, 3.0);
        arena.add_point(4.0, 5.0, 6.0);

        let json = arena.to_json().unwrap();
        let restored = TopologyArena::from_json(&json).unwrap();

        assert_eq!(restored.point_count(), 2);
        let mut coords: Vec<[f64; 3]> = restored
            .points()
            .map(|(_, p)| [p.x, p.y, p.z])
            .collect();
        coords.sort_by(|a, b| a[0].total_cmp(&b[0]));
        assert_eq!(coords, vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
    }

    #[test]
    fn roundtrip_square_body_with_attributes() {
        let mut arena = TopologyArena::new();
        let pts = [
            arena.add_point(0.0, 0.0, 0.0),
            arena.add_point(2.0, 0.0, 0.0),
            arena.add_point(2.0, 2.0, 0.0),
            arena.add_point(0.0, 2.0, 0.0),
        ];
        let (face, _, _) = make_polygon_face(&mut arena, &pts).unwrap();
        let shell = arena.add_shell_with_sense(&[face], Sense::Reversed).unwrap();
        let lump = arena.add_lump(&[shell]).unwrap();
        let body = arena.add_body(&[lump]).unwrap();
        arena.translate(body, 0.0, 0.0, 5.0).unwrap();
        arena
            .attach(
                TopologyKey::Face(face),
                AttributeRecord::new("COLOR").with_int(255).with_int(0).with_int(0),
            )
            .unwrap();

        let json = arena.to_json().unwrap();
        assert!(json.contains("\"COLOR\""));
        let restored = TopologyArena::from_json(&json).unwrap();

        assert_eq!(restored.counts(), arena.counts());
        let (_, shell) = restored.shells().next().unwrap();
        assert_eq!(shell.sense, Sense::Reversed);
        let (rf, _) = restored.faces().next().unwrap();
        assert_eq!(restored.query(rf.into(), Some("COLOR"))[0].ints, vec![255, 0, 0]);
        let rb = restored.body_keys()[0];
        assert_eq!(restored.body_transform(rb), arena.body_transform(body));
    }

    #[test]
    fn invalid_json_is_serialization_error() {
        let err = TopologyArena::from_json("{ not json").unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
        assert_eq!(err.category(), ErrorCategory::Corrupt);
    }

    #[test]
    fn dangling_index_is_rejected() {
        let json = r#"{
            "points": [], "curves": [], "coedges": [], "loops": [],
            "faces": [], "shells": [], "lumps": [],
            "bodies": [{ "lumps": [0], "transform": [[1,0,0,0],[0,1,0,0],[0,0,1,0],[0,0,0,1]] }]
        }"#;
        let err = TopologyArena::from_json(json).unwrap_err();
        assert!(matches!(err, Error::CorruptIndex { .. }));
    }
}
