//! Handle-keyed storage for engine-owned data
//!
//! Every datablock in a session lives in a [`SlotMap`] so that handles stay
//! valid while the datablock's string identifier is renamed underneath it.

pub use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// Handle to an object (prop or lamp) in the session store
    pub struct ObjectKey;

    /// Handle to an action in the session store
    pub struct ActionKey;

    /// Handle to a scene in the session store
    pub struct SceneKey;
}

/// Handle-based map using slot map for stable references
pub type HandleMap<K, T> = SlotMap<K, T>;
