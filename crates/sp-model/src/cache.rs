//! Memo of solved models keyed by `(ec, r_ratio)`.

use crate::snapshot::ModelSnapshot;
use std::collections::HashMap;
use std::sync::Arc;

/// Exact bit pattern of `(ec, r_ratio)`.
///
/// Two keys match only when both floats are bit-identical, so values that
/// differ in the last ulp after a root-finding round trip are distinct.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ModelKey {
    ec: u64,
    r_ratio: u64,
}

impl ModelKey {
    pub fn new(ec: f64, r_ratio: f64) -> Self {
        Self {
            ec: ec.to_bits(),
            r_ratio: r_ratio.to_bits(),
        }
    }

    pub fn ec(&self) -> f64 {
        f64::from_bits(self.ec)
    }

    pub fn r_ratio(&self) -> f64 {
        f64::from_bits(self.r_ratio)
    }
}

/// Unbounded cache of solved models. Entries are never replaced or evicted
/// except by `clear`, which the model calls when its EOS changes.
#[derive(Clone, Debug, Default)]
pub struct ResultCache {
    entries: HashMap<ModelKey, Arc<ModelSnapshot>>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, ec: f64, r_ratio: f64) -> Option<Arc<ModelSnapshot>> {
        self.entries.get(&ModelKey::new(ec, r_ratio)).cloned()
    }

    /// Store `snapshot` unless the key is already present; returns the stored entry.
    pub fn put(
        &mut self,
        ec: f64,
        r_ratio: f64,
        snapshot: Arc<ModelSnapshot>,
    ) -> Arc<ModelSnapshot> {
        self.entries
            .entry(ModelKey::new(ec, r_ratio))
            .or_insert(snapshot)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(ec: f64, r_ratio: f64, mass: f64) -> Arc<ModelSnapshot> {
        Arc::new(ModelSnapshot {
            mass,
            rest_mass: 1.1 * mass,
            r_ratio,
            radius: 12.0,
            omega: 0.0,
            omega_k: 1.0,
            angular_momentum: 0.0,
            kinetic_energy: 0.0,
            proper_mass: mass,
            ec,
        })
    }

    #[test]
    fn hit_returns_same_entry() {
        let mut cache = ResultCache::new();
        let stored = cache.put(1.0, 0.9, snapshot(1.0, 0.9, 1.4));
        let hit = cache.get(1.0, 0.9).unwrap();
        assert!(Arc::ptr_eq(&stored, &hit));
        assert!(cache.get(1.0, 0.8).is_none());
    }

    #[test]
    fn entries_are_never_replaced() {
        let mut cache = ResultCache::new();
        cache.put(1.0, 0.9, snapshot(1.0, 0.9, 1.4));
        let kept = cache.put(1.0, 0.9, snapshot(1.0, 0.9, 9.9));
        assert_eq!(kept.mass, 1.4);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn keys_compare_bitwise() {
        let mut cache = ResultCache::new();
        cache.put(0.1 + 0.2, 0.9, snapshot(0.3, 0.9, 1.0));
        assert!(cache.get(0.3, 0.9).is_none());
        assert!(cache.get(0.1 + 0.2, 0.9).is_some());
        assert_eq!(ModelKey::new(0.3, 0.9).r_ratio(), 0.9);
    }
}
