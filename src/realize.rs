//! The owner-thread side of encoding: turning staged pixel buffers into
//! backend texture objects, and releasing them again.
//!
//! Everything in here must run on the single thread that owns the GPU
//! resources. Phase-1 output is plain data and can be moved to that thread.

use std::sync::Arc;

use crate::core::texture::{EncodedTexture, SharedTexture, TextureDescriptor, TextureResourceId};

#[remain::sorted]
#[derive(Debug, thiserror::Error)]
pub enum Err {
    #[error("Backend is out of texture memory")]
    OutOfMemory,
    #[error("Backend rejected the texture: {0}")]
    Rejected(String),
}

/// The host engine's texture factory.
pub trait TextureBackend {
    /// Creates a texture object from tightly packed pixel bytes.
    fn create_texture(&mut self, descriptor: &TextureDescriptor, pixels: &[u8]) -> Result<TextureResourceId, Err>;

    /// Destroys a texture object created by [`TextureBackend::create_texture`].
    fn destroy_texture(&mut self, resource: TextureResourceId);
}

/// Encoded output that can be realized and torn down on the owner thread.
pub trait Realize {
    /// Realizes every pending texture. Returns false if any realization failed;
    /// a failure does not stop the remaining realizations.
    fn realize<B: TextureBackend + ?Sized>(&mut self, backend: &mut B) -> bool;

    /// Releases every texture resource this value owns.
    fn destroy<B: TextureBackend + ?Sized>(&mut self, backend: &mut B);
}

/// Realizes one texture from its staged pixels. A texture that is already
/// realized counts as a success.
pub(crate) fn realize_texture<B: TextureBackend + ?Sized>(texture: &EncodedTexture, backend: &mut B) -> bool {
    if texture.is_realized() {
        return true;
    }

    let Some(pixels) = texture.take_staged() else {
        tracing::error!("Texture has neither staged pixels nor a realized resource; cannot realize it.");
        return false;
    };

    match backend.create_texture(texture.get_descriptor(), &pixels) {
        Ok(resource) => {
            texture.set_resource(resource);
            true
        }
        Err(err) => {
            tracing::error!("Failed to realize a {}x{} texture: {}", texture.get_width(), texture.get_height(), err);
            // Keep the pixels so the caller can retry.
            texture.restore_staged(pixels);
            false
        }
    }
}

/// Realizes `texture` unless it is already in `realized`, then records it.
pub(crate) fn realize_unique<B: TextureBackend + ?Sized>(
    realized: &mut Vec<SharedTexture>,
    texture: &SharedTexture,
    backend: &mut B,
) -> bool {
    if realized.iter().any(|t| Arc::ptr_eq(t, texture)) {
        return true;
    }
    let success = realize_texture(texture, backend);
    realized.push(Arc::clone(texture));
    success
}

/// Releases the backend resource of a texture this caller owns outright.
pub(crate) fn release_texture<B: TextureBackend + ?Sized>(texture: &EncodedTexture, backend: &mut B) {
    if let Some(resource) = texture.take_resource() {
        backend.destroy_texture(resource);
    }
}

/// Drops one owner of a shared texture. The resource is released only when
/// this was the last owner.
pub(crate) fn release_shared<B: TextureBackend + ?Sized>(texture: SharedTexture, backend: &mut B) {
    if let Some(texture) = Arc::into_inner(texture) {
        release_texture(&texture, backend);
    }
}

#[cfg(test)]
pub(crate) mod test_utils {
    use super::*;

    /// Backend that hands out sequential ids and records every call.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingBackend {
        pub created: Vec<(TextureDescriptor, Vec<u8>)>,
        pub destroyed: Vec<TextureResourceId>,
        /// Number of upcoming `create_texture` calls that fail.
        pub fail_next: usize,
        next_id: u64,
    }

    impl RecordingBackend {
        /// A backend whose next `count` creations fail.
        pub(crate) fn failing(count: usize) -> Self {
            Self { fail_next: count, ..Self::default() }
        }
    }

    impl TextureBackend for RecordingBackend {
        fn create_texture(&mut self, descriptor: &TextureDescriptor, pixels: &[u8]) -> Result<TextureResourceId, Err> {
            if self.fail_next > 0 {
                self.fail_next -= 1;
                return Err(Err::OutOfMemory);
            }
            self.created.push((*descriptor, pixels.to_vec()));
            self.next_id += 1;
            Ok(TextureResourceId(self.next_id))
        }

        fn destroy_texture(&mut self, resource: TextureResourceId) {
            self.destroyed.push(resource);
        }
    }
}
