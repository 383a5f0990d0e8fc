// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed attributes layered over generic records.
//!
//! An [`AttributeKind`] knows how to decode and encode one record shape and
//! how to read and write the matching live value on a node.
//! [`TypedAttribute`] drives that kind through its lifecycle:
//!
//! ```text
//! Unbound ──construct──▶ Constructed ──actuate──▶ Actuated ◀──▶ Updated
//!                                                 (mark_dirty / update)
//! ```
//!
//! `update` marks the wrapper pending delete when the live value is the
//! default; no record is kept for default values.

use std::fmt;
use std::marker::PhantomData;

use crate::arena::TopologyArena;
use crate::attributes::AttributeRecord;
use crate::error::{Error, Result};
use crate::keys::TopologyKey;

/// One kind of typed attribute.
pub trait AttributeKind {
    /// Record name, unique per kind.
    const NAME: &'static str;

    /// Decoded value.
    type Value: Clone + PartialEq + fmt::Debug;

    /// The unset sentinel.
    fn default_value() -> Self::Value;

    /// Reads the owner's live value.
    fn read_live(arena: &TopologyArena, owner: TopologyKey) -> Self::Value;

    /// Writes the owner's live value.
    fn write_live(arena: &mut TopologyArena, owner: TopologyKey, value: &Self::Value)
        -> Result<()>;

    /// Decodes a record, failing if its field counts do not match.
    fn decode(record: &AttributeRecord) -> Result<Self::Value>;

    /// Encodes a value as a record named [`Self::NAME`].
    fn encode(value: &Self::Value) -> AttributeRecord;

    /// Resolves the values of two owners collapsing into one. `survivor`
    /// belongs to the owner that remains.
    fn merge(survivor: &Self::Value, other: &Self::Value) -> Self::Value;

    fn is_default(value: &Self::Value) -> bool {
        *value == Self::default_value()
    }
}

/// Lifecycle position of a [`TypedAttribute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Unbound,
    Constructed,
    Actuated,
    Updated,
}

/// A typed attribute bound to one owner node.
pub struct TypedAttribute<A: AttributeKind> {
    owner: Option<TopologyKey>,
    value: A::Value,
    state: LifecycleState,
    pending_delete: bool,
    _kind: PhantomData<A>,
}

impl<A: AttributeKind> fmt::Debug for TypedAttribute<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedAttribute")
            .field("name", &A::NAME)
            .field("owner", &self.owner)
            .field("value", &self.value)
            .field("state", &self.state)
            .field("pending_delete", &self.pending_delete)
            .finish()
    }
}

impl<A: AttributeKind> TypedAttribute<A> {
    /// Binds a wrapper to `owner`.
    ///
    /// Without a record the value is taken from the owner's live state.
    /// With a record the value is decoded from it; the record must carry
    /// this kind's name and shape.
    pub fn construct(
        arena: &TopologyArena,
        owner: TopologyKey,
        record: Option<&AttributeRecord>,
    ) -> Result<Self> {
        if !arena.contains(owner) {
            return Err(Error::OwnerGone(owner));
        }
        let value = match record {
            Some(r) if r.name != A::NAME => {
                return Err(Error::AttributeShape {
                    name: r.name.clone(),
                    reason: format!("expected a {} record", A::NAME),
                });
            }
            Some(r) => A::decode(r)?,
            None => A::read_live(arena, owner),
        };
        Ok(Self {
            owner: Some(owner),
            value,
            state: LifecycleState::Constructed,
            pending_delete: false,
            _kind: PhantomData,
        })
    }

    pub fn owner(&self) -> Option<TopologyKey> {
        self.owner
    }

    pub fn value(&self) -> &A::Value {
        &self.value
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_pending_delete(&self) -> bool {
        self.pending_delete
    }

    fn live_owner(&self, arena: &TopologyArena) -> Result<TopologyKey> {
        let owner = self.owner.ok_or(Error::Unbound(A::NAME))?;
        if !arena.contains(owner) {
            return Err(Error::OwnerGone(owner));
        }
        Ok(owner)
    }

    /// Installs the value on the owner, unless the owner already has a
    /// live value of its own. Repeated calls do nothing.
    pub fn actuate(&mut self, arena: &mut TopologyArena) -> Result<()> {
        let owner = self.live_owner(arena)?;
        if matches!(
            self.state,
            LifecycleState::Actuated | LifecycleState::Updated
        ) {
            return Ok(());
        }
        if A::is_default(&A::read_live(arena, owner)) && !A::is_default(&self.value) {
            A::write_live(arena, owner, &self.value)?;
        }
        self.state = LifecycleState::Actuated;
        Ok(())
    }

    /// Re-reads the owner's live value and refreshes the owner's record.
    ///
    /// Any record of this kind already on the owner is removed first. A
    /// default live value leaves no record and marks the wrapper pending
    /// delete. Calling again without [`Self::mark_dirty`] does nothing.
    pub fn update(&mut self, arena: &mut TopologyArena) -> Result<()> {
        let owner = self.live_owner(arena)?;
        match self.state {
            LifecycleState::Updated => return Ok(()),
            LifecycleState::Constructed => self.actuate(arena)?,
            _ => {}
        }

        let live = A::read_live(arena, owner);
        arena.detach_named(owner, A::NAME);
        if A::is_default(&live) {
            tracing::debug!(attribute = A::NAME, ?owner, "Default value, record dropped");
            self.pending_delete = true;
        } else {
            arena.attach(owner, A::encode(&live))?;
            self.pending_delete = false;
        }
        self.value = live;
        self.state = LifecycleState::Updated;
        Ok(())
    }

    /// Signals that the owner's live value may have changed.
    pub fn mark_dirty(&mut self) {
        if self.state == LifecycleState::Updated {
            self.state = LifecycleState::Actuated;
        }
    }

    /// Folds the wrapper of an owner that is being merged away into this
    /// one. The merged value is written to this owner's live state.
    pub fn merge_owner(&mut self, arena: &mut TopologyArena, other: TypedAttribute<A>) -> Result<()> {
        let owner = self.live_owner(arena)?;
        let merged = A::merge(&self.value, &other.value);
        tracing::debug!(
            attribute = A::NAME,
            ?owner,
            survivor = ?self.value,
            other = ?other.value,
            merged = ?merged,
            "Merged attribute owners"
        );
        A::write_live(arena, owner, &merged)?;
        self.value = merged;
        self.pending_delete = false;
        self.state = LifecycleState::Actuated;
        Ok(())
    }

    /// Updates this wrapper, then returns a copy of its record for the new
    /// owner created by a split. `None` when the value is the default.
    pub fn split_owner(&mut self, arena: &mut TopologyArena) -> Result<Option<AttributeRecord>> {
        self.update(arena)?;
        if self.pending_delete {
            return Ok(None);
        }
        Ok(Some(A::encode(&self.value)))
    }

    /// Releases the owner. The wrapper can no longer actuate or update.
    pub fn unbind(&mut self) {
        self.owner = None;
        self.state = LifecycleState::Unbound;
    }

    /// Constructs and actuates a wrapper for every record of this kind in
    /// the arena, typically right after loading a file. Returns the number
    /// of owners restored.
    pub fn restore_all(arena: &mut TopologyArena) -> Result<usize> {
        let owners: Vec<(TopologyKey, AttributeRecord)> = arena
            .attributes
            .iter()
            .filter_map(|(&key, records)| {
                records
                    .iter()
                    .find(|r| r.name == A::NAME)
                    .map(|r| (key, r.clone()))
            })
            .collect();

        for (owner, record) in &owners {
            let mut attr = Self::construct(arena, *owner, Some(record))?;
            attr.actuate(arena)?;
        }
        tracing::debug!(attribute = A::NAME, count = owners.len(), "Restored attributes");
        Ok(owners.len())
    }
}
