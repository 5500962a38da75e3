use crate::packets::{ClientboundKind, ServerboundKind};
use crate::state::State;
use crate::tables;
use crate::version::Version;
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

/// The id tables for one protocol version: bijective id <-> shape maps per
/// (state, direction) slot.
#[derive(Debug, Default)]
pub struct Definition {
    sb_ids: HashMap<(State, ServerboundKind), i32>,
    sb_kinds: HashMap<(State, i32), ServerboundKind>,
    cb_ids: HashMap<(State, ClientboundKind), i32>,
    cb_kinds: HashMap<(State, i32), ClientboundKind>,
}

impl Definition {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn serverbound(&mut self, state: State, id: i32, kind: ServerboundKind) {
        let prev_kind = self.sb_kinds.insert((state, id), kind);
        let prev_id = self.sb_ids.insert((state, kind), id);
        assert!(
            prev_kind.is_none() && prev_id.is_none(),
            "duplicate serverbound entry: {} 0x{:02X} {}",
            state,
            id,
            kind
        );
    }

    pub(crate) fn clientbound(&mut self, state: State, id: i32, kind: ClientboundKind) {
        let prev_kind = self.cb_kinds.insert((state, id), kind);
        let prev_id = self.cb_ids.insert((state, kind), id);
        assert!(
            prev_kind.is_none() && prev_id.is_none(),
            "duplicate clientbound entry: {} 0x{:02X} {}",
            state,
            id,
            kind
        );
    }

    pub fn serverbound_id(&self, state: State, kind: ServerboundKind) -> Option<i32> {
        self.sb_ids.get(&(state, kind)).copied()
    }

    pub fn serverbound_kind(&self, state: State, id: i32) -> Option<ServerboundKind> {
        self.sb_kinds.get(&(state, id)).copied()
    }

    pub fn clientbound_id(&self, state: State, kind: ClientboundKind) -> Option<i32> {
        self.cb_ids.get(&(state, kind)).copied()
    }

    pub fn clientbound_kind(&self, state: State, id: i32) -> Option<ClientboundKind> {
        self.cb_kinds.get(&(state, id)).copied()
    }

    pub(crate) fn serverbound_entries(
        &self,
    ) -> impl Iterator<Item = (&(State, ServerboundKind), &i32)> {
        self.sb_ids.iter()
    }

    pub(crate) fn clientbound_entries(
        &self,
    ) -> impl Iterator<Item = (&(State, ClientboundKind), &i32)> {
        self.cb_ids.iter()
    }
}

/// Versions that changed an id we speak declare their own table; everything
/// else inherits from the nearest earlier declared version.
static BASE: Lazy<BTreeMap<Version, Arc<Definition>>> = Lazy::new(tables::base_definitions);

/// Read-through cache for inherited lookups. The base map is immutable, so
/// memoizing a fallback result is just another handle to the same table.
static INHERITED: Lazy<RwLock<HashMap<Version, Arc<Definition>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Look up the id tables for `version`, falling back to the nearest earlier
/// declared version. The fallback is memoized on first use.
pub fn definition(version: Version) -> Option<Arc<Definition>> {
    if let Some(def) = BASE.get(&version) {
        return Some(Arc::clone(def));
    }
    if let Some(def) = INHERITED.read().expect("registry cache poisoned").get(&version) {
        return Some(Arc::clone(def));
    }

    let def = BASE
        .range(..version)
        .next_back()
        .map(|(_, def)| Arc::clone(def))?;
    INHERITED
        .write()
        .expect("registry cache poisoned")
        .insert(version, Arc::clone(&def));
    Some(def)
}

/// The numeric id for a serverbound shape, or `None` when the shape has no
/// id in this (version, state) — a programmer error on the write path.
pub fn serverbound_id(version: Version, state: State, kind: ServerboundKind) -> Option<i32> {
    definition(version)?.serverbound_id(state, kind)
}

/// The serverbound shape a numeric id names, if any.
pub fn serverbound_kind(version: Version, state: State, id: i32) -> Option<ServerboundKind> {
    definition(version)?.serverbound_kind(state, id)
}

/// The numeric id for a clientbound shape, if any.
pub fn clientbound_id(version: Version, state: State, kind: ClientboundKind) -> Option<i32> {
    definition(version)?.clientbound_id(state, kind)
}

/// The clientbound shape a numeric id names. `None` marks an unknown packet
/// the reader will drain and skip.
pub fn clientbound_kind(version: Version, state: State, id: i32) -> Option<ClientboundKind> {
    definition(version)?.clientbound_kind(state, id)
}
