//! Set of Stream Deck keys currently showing the plugin
//!
//! Written by the event handler (`willAppear` / `willDisappear`) and read by
//! the sync loop on every tick. Mutations never wait on network I/O.

use std::collections::HashSet;
use std::sync::RwLock;

#[derive(Debug, Default)]
pub struct SurfaceRegistry {
    surfaces: RwLock<HashSet<String>>,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a visible surface. Returns false if it was already known.
    pub fn add(&self, surface: &str) -> bool {
        self.surfaces.write().unwrap().insert(surface.to_string())
    }

    /// Forgets a surface. Returns false if it was not registered.
    pub fn remove(&self, surface: &str) -> bool {
        self.surfaces.write().unwrap().remove(surface)
    }

    pub fn contains(&self, surface: &str) -> bool {
        self.surfaces.read().unwrap().contains(surface)
    }

    /// Snapshot of the current members, in no particular order
    pub fn members(&self) -> Vec<String> {
        self.surfaces.read().unwrap().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.surfaces.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.read().unwrap().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_add_is_idempotent() {
        let registry = SurfaceRegistry::new();
        assert!(registry.add("S1"));
        assert!(!registry.add("S1"));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("S1"));
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let registry = SurfaceRegistry::new();
        assert!(!registry.remove("S1"));
        assert!(registry.is_empty());

        registry.add("S1");
        assert!(registry.remove("S1"));
        assert!(!registry.remove("S1"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_members_snapshot() {
        let registry = SurfaceRegistry::new();
        registry.add("S2");
        registry.add("S1");
        let mut members = registry.members();
        members.sort();
        assert_eq!(members, vec!["S1".to_string(), "S2".to_string()]);

        // The snapshot is detached from later mutations.
        registry.remove("S1");
        assert_eq!(members.len(), 2);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_interleaved_mutations() {
        let registry = SurfaceRegistry::new();
        registry.add("A");
        registry.add("B");
        registry.remove("A");
        registry.add("C");
        registry.add("A");
        registry.remove("B");

        let mut members = registry.members();
        members.sort();
        assert_eq!(members, vec!["A".to_string(), "C".to_string()]);
    }

    #[test]
    fn test_concurrent_writers() {
        let registry = Arc::new(SurfaceRegistry::new());
        let threads: Vec<_> = (0..8)
            .map(|t| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        let id = format!("{t}-{i}");
                        registry.add(&id);
                        if i % 2 == 0 {
                            registry.remove(&id);
                        }
                    }
                })
            })
            .collect();
        for thread in threads {
            thread.join().unwrap();
        }
        assert_eq!(registry.len(), 8 * 50);
    }
}
