//! Global identifier namespace
//!
//! Every datablock family (objects, actions, scenes) has one namespace shared
//! by the whole session. A requested identifier that is already taken is
//! silently replaced by the first free `stem.NNN` variant, which is exactly
//! the renaming behavior the registry has to work around.

use std::collections::HashMap;

use slotmap::Key;

/// Identifier index for one datablock family
#[derive(Debug, Clone)]
pub struct Namespace<K: Key> {
    default_name: &'static str,
    names: HashMap<String, K>,
}

impl<K: Key> Namespace<K> {
    /// Create an empty namespace whose blank requests resolve to `default_name`
    pub fn new(default_name: &'static str) -> Self {
        Self {
            default_name,
            names: HashMap::new(),
        }
    }

    /// Look up the key currently holding `name`
    pub fn get(&self, name: &str) -> Option<K> {
        self.names.get(name).copied()
    }

    /// Whether `name` is held by any datablock
    pub fn is_taken(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Number of claimed identifiers
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no identifier is claimed
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Claim an identifier for `key`, returning the one actually assigned
    pub fn claim(&mut self, requested: &str, key: K) -> String {
        let requested = if requested.is_empty() { self.default_name } else { requested };
        let name = unique_name(requested, |candidate| self.names.contains_key(candidate));
        self.names.insert(name.clone(), key);
        name
    }

    /// Release `name`, if `key` holds it
    pub fn release(&mut self, name: &str, key: K) {
        if self.names.get(name) == Some(&key) {
            self.names.remove(name);
        }
    }

    /// Move `key` from `current` to `requested`, returning the assigned identifier
    ///
    /// Renaming to the identifier already held is a no-op.
    pub fn rename(&mut self, key: K, current: &str, requested: &str) -> String {
        if current == requested {
            return current.to_string();
        }
        self.release(current, key);
        self.claim(requested, key)
    }
}

/// First identifier derived from `requested` for which `is_taken` is false
///
/// `requested` itself wins when free. Otherwise any existing `.NNN` suffix is
/// stripped and the lowest free `.001`, `.002`, ... suffix is appended.
pub fn unique_name(requested: &str, is_taken: impl Fn(&str) -> bool) -> String {
    if !is_taken(requested) {
        return requested.to_string();
    }
    let stem = split_suffix(requested).0;
    let mut n: u64 = 1;
    loop {
        let candidate = format!("{stem}.{n:03}");
        if !is_taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Split `name` into its stem and numeric `.NNN` suffix, if it has one
fn split_suffix(name: &str) -> (&str, Option<u32>) {
    if let Some((stem, digits)) = name.rsplit_once('.') {
        if digits.len() >= 3 && digits.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = digits.parse() {
                return (stem, Some(n));
            }
        }
    }
    (name, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::collections::{ObjectKey, SlotMap};

    #[test]
    fn test_free_name_is_kept() {
        assert_eq!(unique_name("alpha", |_| false), "alpha");
    }

    #[test]
    fn test_taken_name_gets_suffix() {
        let taken = ["Object", "Object.001"];
        assert_eq!(unique_name("Object", |n| taken.contains(&n)), "Object.002");
    }

    #[test]
    fn test_suffix_grows_past_three_digits() {
        let name = unique_name("Lamp", |n| {
            n == "Lamp" || split_suffix(n).1.is_some_and(|i| (1..=999).contains(&i))
        });
        assert_eq!(name, "Lamp.1000");
    }

    #[test]
    fn test_suffixed_request_reuses_stem() {
        let taken = ["Object.001"];
        assert_eq!(unique_name("Object.001", |n| taken.contains(&n)), "Object.002");
        assert_eq!(split_suffix("light.12"), ("light.12", None));
        assert_eq!(split_suffix("light.012"), ("light", Some(12)));
    }

    #[test]
    fn test_claim_rename_release() {
        let mut keys: SlotMap<ObjectKey, ()> = SlotMap::with_key();
        let a = keys.insert(());
        let b = keys.insert(());
        let mut names = Namespace::new("Object");

        assert_eq!(names.claim("", a), "Object");
        assert_eq!(names.claim("", b), "Object.001");
        assert_eq!(names.rename(b, "Object.001", "Object"), "Object.002");
        assert_eq!(names.get("Object.002"), Some(b));
        assert!(!names.is_taken("Object.001"));

        names.release("Object", b);
        assert_eq!(names.get("Object"), Some(a));
        names.release("Object", a);
        assert_eq!(names.len(), 1);
    }
}
