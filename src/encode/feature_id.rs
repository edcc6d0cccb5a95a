use std::sync::Arc;

use crate::core::features::{
    FeatureIdAttribute, FeatureIdAttributeStatus, FeatureIdSetKind, FeatureIdTexture, FeatureIdTextureStatus,
    PrimitiveFeatures,
};
use crate::core::texture::{EncodedTexture, PixelFormat, SharedTexture};
use crate::description::PrimitiveFeaturesDescription;
use crate::encode::image_cache::ImageCache;
use crate::encode::naming::{name_for_feature_id_set, safe_identifier};
use crate::realize::{self, Realize, TextureBackend};

/// A feature ID texture ready for shader access. The texture is shared with
/// every other encoded set that reads the same source image.
#[derive(Clone, Debug)]
pub struct EncodedFeatureIdTexture {
    /// Channels holding the feature ID bytes, least significant first.
    pub channels: Vec<i64>,
    pub texture_coordinate_set_index: i64,
    pub texture: SharedTexture,
}

#[derive(Clone, Debug)]
pub struct EncodedFeatureIdSet {
    /// Binding name of the set.
    pub name: String,
    /// Position of the set among the primitive's feature ID sets.
    pub index: usize,
    /// Vertex attribute carrying the IDs, for attribute-backed sets.
    pub attribute: Option<i64>,
    pub texture: Option<EncodedFeatureIdTexture>,
    pub property_table_name: String,
    pub null_feature_id: Option<i64>,
}

impl EncodedFeatureIdSet {
    fn empty() -> Self {
        Self {
            name: String::new(),
            index: 0,
            attribute: None,
            texture: None,
            property_table_name: String::new(),
            null_feature_id: None,
        }
    }
}

/// Encoded feature ID sets of one primitive.
#[derive(Clone, Debug, Default)]
pub struct EncodedPrimitiveFeatures {
    pub feature_id_sets: Vec<EncodedFeatureIdSet>,
}

fn encode_feature_id_attribute(attribute: &FeatureIdAttribute) -> Option<EncodedFeatureIdSet> {
    if attribute.get_status() != FeatureIdAttributeStatus::Valid {
        tracing::warn!("Can't encode invalid feature ID attribute, skipped.");
        return None;
    }

    Some(EncodedFeatureIdSet { attribute: Some(attribute.get_attribute_index()), ..EncodedFeatureIdSet::empty() })
}

fn encode_feature_id_texture(texture: &FeatureIdTexture, cache: &mut ImageCache) -> Option<EncodedFeatureIdSet> {
    let image = match (texture.get_status(), texture.get_image()) {
        (FeatureIdTextureStatus::Valid, Some(image)) => image,
        _ => {
            tracing::warn!("Can't encode invalid feature ID texture, skipped.");
            return None;
        }
    };

    let _span = tracing::trace_span!("encode_feature_id_texture").entered();

    let shared = match cache.lookup(image) {
        Some(shared) => shared,
        None => {
            if image.get_channels() != 4 || image.get_bytes_per_channel() != 1 {
                tracing::warn!(
                    "Feature ID image has {} channels of {} bytes, expected 8-bit RGBA.",
                    image.get_channels(),
                    image.get_bytes_per_channel()
                );
            }
            // Feature ID images are always 8-bit RGBA for now.
            let encoded = match EncodedTexture::copy_of_image(image, PixelFormat::R8G8B8A8Uint) {
                Ok(encoded) => encoded,
                Err(err) => {
                    tracing::error!("Error encoding a feature ID texture: {}", err);
                    return None;
                }
            };
            let shared = Arc::new(encoded);
            cache.register(image, &shared);
            shared
        }
    };

    Some(EncodedFeatureIdSet {
        texture: Some(EncodedFeatureIdTexture {
            channels: texture.get_channels().to_vec(),
            texture_coordinate_set_index: texture.get_tex_coord_set_index(),
            texture: shared,
        }),
        ..EncodedFeatureIdSet::empty()
    })
}

/// Encodes the feature ID sets of a primitive that the description asks for.
/// Safe to call from any thread; no backend texture is created here.
pub fn encode_primitive_features_any_thread(
    description: &PrimitiveFeaturesDescription,
    features: &PrimitiveFeatures,
) -> EncodedPrimitiveFeatures {
    let _span = tracing::debug_span!("encode_primitive_features").entered();

    let sets = features.feature_id_sets();
    let mut result = EncodedPrimitiveFeatures { feature_id_sets: Vec::with_capacity(description.feature_id_sets.len()) };
    let mut cache = ImageCache::with_capacity(description.feature_id_sets.len());
    let mut texture_counter = 0;

    for (index, set) in sets.iter().enumerate() {
        let name = name_for_feature_id_set(set, &mut texture_counter);
        let Some(set_description) = description.feature_id_sets.iter().find(|d| d.name == name) else {
            // Not requested.
            continue;
        };

        let encoded = match set.get_kind() {
            FeatureIdSetKind::Attribute(attribute) => encode_feature_id_attribute(attribute),
            FeatureIdSetKind::Texture(texture) => encode_feature_id_texture(texture, &mut cache),
            FeatureIdSetKind::Implicit => Some(EncodedFeatureIdSet::empty()),
            FeatureIdSetKind::None => None,
        };
        let Some(mut encoded) = encoded else {
            continue;
        };

        encoded.name = safe_identifier(&name);
        encoded.index = index;
        encoded.property_table_name = set_description.property_table_name.clone();
        encoded.null_feature_id = set.get_null_feature_id();
        result.feature_id_sets.push(encoded);
    }

    tracing::debug!(
        "Encoded {} of {} feature ID sets ({} distinct images)",
        result.feature_id_sets.len(),
        sets.len(),
        cache.len()
    );
    result
}

/// Realizes the feature ID textures on the owner thread. Each distinct
/// texture is realized once even when several sets share it.
pub fn encode_primitive_features_owner_thread<B: TextureBackend + ?Sized>(
    encoded: &mut EncodedPrimitiveFeatures,
    backend: &mut B,
) -> bool {
    let mut success = true;
    let mut realized = Vec::with_capacity(encoded.feature_id_sets.len());

    for set in &encoded.feature_id_sets {
        if let Some(texture) = &set.texture {
            success &= realize::realize_unique(&mut realized, &texture.texture, backend);
        }
    }

    success
}

/// Releases the textures of the encoded sets. A texture shared with sets of
/// other primitives survives until its last owner is destroyed.
pub fn destroy_encoded_primitive_features<B: TextureBackend + ?Sized>(
    encoded: &mut EncodedPrimitiveFeatures,
    backend: &mut B,
) {
    for set in &mut encoded.feature_id_sets {
        if let Some(texture) = set.texture.take() {
            realize::release_shared(texture.texture, backend);
        }
    }
}

impl Realize for EncodedPrimitiveFeatures {
    fn realize<B: TextureBackend + ?Sized>(&mut self, backend: &mut B) -> bool {
        encode_primitive_features_owner_thread(self, backend)
    }

    fn destroy<B: TextureBackend + ?Sized>(&mut self, backend: &mut B) {
        destroy_encoded_primitive_features(self, backend)
    }
}
