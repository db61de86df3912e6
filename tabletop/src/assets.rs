use std::collections::HashMap;

use crate::error::Result;
use crate::scene::{Scene, TextureHandle};

/// Caches texture handles by key for the lifetime of a session.
///
/// The engine owns one of these and passes the scene in on every load, so no
/// texture state lives in globals.
#[derive(Debug, Default)]
pub struct TextureCache {
    textures: HashMap<String, TextureHandle>,
}

impl TextureCache {
    /// Create a new cache with no entries.
    pub fn new() -> Self {
        Self {
            textures: HashMap::new(),
        }
    }

    /// Return the cached handle for `key`, loading it through `scene` on a miss.
    pub fn get_or_load(&mut self, scene: &mut dyn Scene, key: &str) -> Result<TextureHandle> {
        if let Some(handle) = self.textures.get(key) {
            return Ok(*handle);
        }

        let handle = scene.load_texture(key)?;
        log::debug!("loaded texture `{key}`");
        self.textures.insert(key.to_string(), handle);
        Ok(handle)
    }

    /// Get a cached texture handle by key, if it exists.
    pub fn get(&self, key: &str) -> Option<TextureHandle> {
        self.textures.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.textures.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Forget one key; the next `get_or_load` loads it again.
    pub fn unload(&mut self, key: &str) {
        self.textures.remove(key);
    }

    pub fn clear(&mut self) {
        self.textures.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneGraph;

    #[test]
    fn test_loads_each_key_once() {
        let mut scene = SceneGraph::new();
        let mut cache = TextureCache::new();

        let first = cache.get_or_load(&mut scene, "back.jpg").unwrap();
        let again = cache.get_or_load(&mut scene, "back.jpg").unwrap();
        let other = cache.get_or_load(&mut scene, "front.jpg").unwrap();

        assert_eq!(first, again);
        assert_ne!(first, other);
        assert_eq!(scene.texture_count(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_unload_forces_reload() {
        let mut scene = SceneGraph::new();
        let mut cache = TextureCache::new();

        cache.get_or_load(&mut scene, "table.jpg").unwrap();
        cache.unload("table.jpg");
        assert!(!cache.contains("table.jpg"));

        cache.get_or_load(&mut scene, "table.jpg").unwrap();
        assert_eq!(scene.texture_count(), 2);
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let mut scene = SceneGraph::new();
        let mut cache = TextureCache::new();

        assert!(cache.get_or_load(&mut scene, " ").is_err());
        assert!(cache.is_empty());
    }
}
