use crate::core::structural_metadata::PropertyTexture;
use crate::core::texture::SharedTexture;
use crate::description::PropertyTextureDescription;
use crate::encode::image_cache::ImageCache;
use crate::realize::{self, TextureBackend};

#[derive(Clone, Debug)]
pub struct EncodedPropertyTextureProperty {
    pub name: String,
    pub texture: Option<SharedTexture>,
    pub channels: Vec<i64>,
    pub texture_coordinate_set_index: i64,
}

#[derive(Clone, Debug, Default)]
pub struct EncodedPropertyTexture {
    pub name: String,
    pub properties: Vec<EncodedPropertyTextureProperty>,
}

/// Encodes a property texture.
///
/// Property texture pixels are not encoded yet, so this only yields the named
/// shell with no properties. `cache` is shared across the whole model so that
/// properties reading one image will share one texture.
pub fn encode_property_texture_any_thread(
    cache: &mut ImageCache,
    description: &PropertyTextureDescription,
    name: &str,
    texture: &PropertyTexture,
) -> EncodedPropertyTexture {
    let _span = tracing::trace_span!("encode_property_texture").entered();
    tracing::debug!(
        "Property texture {} ({} properties, {} described, {} cached images): pixel encoding not supported",
        name,
        texture.properties().len(),
        description.properties.len(),
        cache.len()
    );

    EncodedPropertyTexture { name: name.to_owned(), properties: Vec::new() }
}

/// Realizes the property textures. `realized` is shared by every property
/// texture of the model, so a texture is realized at most once.
pub fn encode_property_texture_owner_thread<B: TextureBackend + ?Sized>(
    realized: &mut Vec<SharedTexture>,
    encoded: &mut EncodedPropertyTexture,
    backend: &mut B,
) -> bool {
    let mut success = true;
    for property in &encoded.properties {
        if let Some(texture) = &property.texture {
            success &= realize::realize_unique(realized, texture, backend);
        }
    }
    success
}

pub fn destroy_encoded_property_texture<B: TextureBackend + ?Sized>(
    encoded: &mut EncodedPropertyTexture,
    backend: &mut B,
) {
    for property in &mut encoded.properties {
        if let Some(texture) = property.texture.take() {
            realize::release_shared(texture, backend);
        }
    }
}
