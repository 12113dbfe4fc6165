use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use log::debug;
use mesh_graph::MeshGraph;

use crate::error::{GenerationError, GenerationResult};
use crate::mesh::MeshLoader;

pub const DEFAULT_CACHE_CAPACITY: usize = 8;

// Loaded meshes keyed by their source (usually a URL), evicting the least
// recently used entry once `capacity` is reached. The cache owns the entries,
// requests only ever hold an `Arc` to them.
#[derive(Debug)]
pub struct MeshCache {
    capacity: usize,
    entries: HashMap<String, Arc<MeshGraph>>,
    // Front is the least recently used key
    recency: VecDeque<String>,
}

impl Default for MeshCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl MeshCache {
    // A capacity of zero disables caching, every lookup goes to the loader
    pub fn new(capacity: usize) -> Self {
        MeshCache {
            capacity,
            entries: HashMap::new(),
            recency: VecDeque::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&mut self, key: &str) -> Option<Arc<MeshGraph>> {
        let mesh = self.entries.get(key).cloned()?;
        self.touch(key);
        Some(mesh)
    }

    pub fn insert(&mut self, key: impl Into<String>, mesh: MeshGraph) -> Arc<MeshGraph> {
        let key = key.into();
        let mesh = Arc::new(mesh);

        if self.capacity == 0 {
            return mesh;
        }

        if self.entries.insert(key.clone(), mesh.clone()).is_some() {
            self.touch(&key);
            return mesh;
        }

        self.recency.push_back(key);
        while self.entries.len() > self.capacity {
            let Some(evicted) = self.recency.pop_front() else {
                break;
            };
            debug!("evicting cached mesh {evicted}");
            self.entries.remove(&evicted);
        }

        mesh
    }

    pub fn get_or_load<L: MeshLoader + ?Sized>(
        &mut self,
        key: &str,
        loader: &L,
    ) -> GenerationResult<Arc<MeshGraph>> {
        if let Some(mesh) = self.get(key) {
            return Ok(mesh);
        }

        let mesh = loader.load(key).map_err(|e| GenerationError::Load {
            key: key.to_string(),
            message: e.to_string(),
        })?;

        Ok(self.insert(key, mesh))
    }

    pub fn remove(&mut self, key: &str) -> Option<Arc<MeshGraph>> {
        self.recency.retain(|k| k != key);
        self.entries.remove(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.recency.clear();
    }

    fn touch(&mut self, key: &str) {
        if let Some(i) = self.recency.iter().position(|k| k == key) {
            if let Some(k) = self.recency.remove(i) {
                self.recency.push_back(k);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use mesh_graph::MeshGraph;

    use super::MeshCache;
    use crate::error::GenerationError;
    use crate::mesh::LoadError;

    #[test]
    fn evicts_least_recently_used() {
        let mut cache = MeshCache::new(2);
        cache.insert("a", MeshGraph::new());
        cache.insert("b", MeshGraph::new());

        // a is now more recent than b
        assert!(cache.get("a").is_some());

        cache.insert("c", MeshGraph::new());

        assert_eq!(cache.len(), 2);
        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
        assert!(cache.contains("c"));
    }

    #[test]
    fn loads_once_then_hits() {
        let loads = Cell::new(0);
        let loader = |_: &str| -> Result<MeshGraph, LoadError> {
            loads.set(loads.get() + 1);
            Ok(MeshGraph::new())
        };

        let mut cache = MeshCache::new(4);
        let first = cache.get_or_load("model.glb", &loader).unwrap();
        let second = cache.get_or_load("model.glb", &loader).unwrap();

        assert_eq!(loads.get(), 1);
        assert!(std::sync::Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn loader_failures_are_reported_with_the_key() {
        let loader = |_: &str| -> Result<MeshGraph, LoadError> { Err("404".into()) };

        let mut cache = MeshCache::default();
        let err = cache.get_or_load("missing.glb", &loader).unwrap_err();

        assert_eq!(
            err,
            GenerationError::Load {
                key: "missing.glb".to_string(),
                message: "404".to_string()
            }
        );
        assert!(cache.is_empty());
    }

    #[test]
    fn zero_capacity_never_stores() {
        let mut cache = MeshCache::new(0);
        cache.insert("a", MeshGraph::new());

        assert!(cache.is_empty());
    }
}
