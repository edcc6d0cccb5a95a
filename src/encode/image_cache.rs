use std::collections::HashMap;
use std::sync::{Arc, Weak};

use crate::core::texture::{EncodedTexture, Image, SharedTexture};

/// Maps source images, by identity, to the texture already encoded for them
/// during the current pass.
///
/// The cache only holds weak references: it never keeps a texture alive. A
/// fresh cache is created for every encode pass and dropped at its end.
#[derive(Debug, Default)]
pub struct ImageCache {
    entries: HashMap<*const Image, Weak<EncodedTexture>>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: HashMap::with_capacity(capacity) }
    }

    /// Returns the texture encoded for `image`, if its owner is still alive.
    pub fn lookup(&self, image: &Arc<Image>) -> Option<SharedTexture> {
        self.entries.get(&Arc::as_ptr(image)).and_then(Weak::upgrade)
    }

    pub fn register(&mut self, image: &Arc<Image>, texture: &SharedTexture) {
        self.entries.insert(Arc::as_ptr(image), Arc::downgrade(texture));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
