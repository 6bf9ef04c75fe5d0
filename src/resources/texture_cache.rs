//! Path-keyed texture cache.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::backend::GraphicsBackend;
use crate::TextureConfig;

use super::texture::{load_texture, GpuTexture, TextureError};

/// Loads each texture file at most once.
///
/// File names are resolved against [`TextureConfig::root_dir`]. Failed loads
/// are returned to the caller and not remembered, so a later call retries.
#[derive(Debug, Default)]
pub struct TextureCache {
    config: TextureConfig,
    textures: HashMap<PathBuf, GpuTexture>,
}

impl TextureCache {
    pub fn new(config: TextureConfig) -> Self {
        Self {
            config,
            textures: HashMap::new(),
        }
    }

    pub fn config(&self) -> &TextureConfig {
        &self.config
    }

    /// Get a texture, loading it on first use.
    pub fn get<B: GraphicsBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        file_name: impl AsRef<Path>,
    ) -> Result<&GpuTexture, TextureError> {
        let path = self.config.root_dir.join(file_name);

        match self.textures.entry(path) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let texture = load_texture(backend, entry.key(), &self.config)?;
                log::debug!("cached texture {}", entry.key().display());
                Ok(entry.insert(texture))
            }
        }
    }

    pub fn contains(&self, file_name: impl AsRef<Path>) -> bool {
        self.textures.contains_key(&self.config.root_dir.join(file_name))
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Destroy every cached texture.
    pub fn release_all<B: GraphicsBackend + ?Sized>(&mut self, backend: &mut B) {
        let count = self.textures.len();
        for (_, texture) in self.textures.drain() {
            texture.release(backend);
        }
        log::debug!("released {} cached textures", count);
    }
}
