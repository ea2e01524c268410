use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use parking_lot::RwLock;
use rand::Rng;

use crate::compose;
use crate::preset::PresetKind;
use crate::types::Scene;

pub type CacheKey = (PresetKind, usize);

/// Generated scenes keyed by `(preset, num_points)`.
///
/// Nothing is evicted automatically; callers decide when an entry is stale.
#[derive(Debug, Default)]
pub struct SceneCache {
    scenes: RwLock<HashMap<CacheKey, Arc<Scene>>>,
}

impl SceneCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, preset: PresetKind, num_points: usize) -> Option<Arc<Scene>> {
        self.scenes.read().get(&(preset, num_points)).cloned()
    }

    /// Return the cached scene or generate and store one.
    ///
    /// Generation runs without holding the lock. If two callers race on the
    /// same key the first stored scene wins and both get it.
    pub fn get_or_generate<R: Rng + ?Sized>(
        &self,
        preset: PresetKind,
        num_points: usize,
        rng: &mut R,
    ) -> Arc<Scene> {
        if let Some(scene) = self.get(preset, num_points) {
            debug!("cache hit {preset}/{num_points}");
            return scene;
        }

        let scene = Arc::new(compose::generate(preset, num_points, rng));
        self.scenes
            .write()
            .entry((preset, num_points))
            .or_insert(scene)
            .clone()
    }

    pub fn evict(&self, preset: PresetKind, num_points: usize) -> Option<Arc<Scene>> {
        self.scenes.write().remove(&(preset, num_points))
    }

    pub fn retain<F>(&self, mut keep: F)
    where
        F: FnMut(PresetKind, usize, &Scene) -> bool,
    {
        self.scenes.write().retain(|&(p, n), s| keep(p, n, s));
    }

    pub fn clear(&self) {
        self.scenes.write().clear();
    }

    pub fn len(&self) -> usize {
        self.scenes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
