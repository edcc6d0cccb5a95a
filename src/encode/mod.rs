//! Two-phase encoding of feature IDs and metadata.
//!
//! Phase one (`*_any_thread`) resolves names, validates the live data against
//! the description and stages texture pixels. It never touches the backend
//! and can run on any thread. Phase two (`*_owner_thread`) realizes the
//! staged textures and must run on the thread that owns the backend. The
//! `destroy_*` functions release what phase two created.

pub mod naming;
pub mod pixel_format;
pub mod image_cache;
pub mod feature_id;
pub mod property_table;
pub mod property_texture;
pub mod metadata;
pub(crate) mod conversion;

pub use feature_id::{
    destroy_encoded_primitive_features, encode_primitive_features_any_thread, encode_primitive_features_owner_thread,
    EncodedFeatureIdSet, EncodedFeatureIdTexture, EncodedPrimitiveFeatures,
};
pub use image_cache::ImageCache;
pub use metadata::{
    destroy_encoded_model_metadata, destroy_encoded_primitive_metadata, encode_model_metadata_any_thread,
    encode_model_metadata_owner_thread, encode_primitive_metadata_any_thread, encode_primitive_metadata_owner_thread,
    EncodedModelMetadata, EncodedPrimitiveMetadata,
};
pub use property_table::{
    destroy_encoded_property_table, encode_property_table_any_thread, encode_property_table_owner_thread,
    EncodedPropertyTable, EncodedPropertyTableProperty,
};
pub use property_texture::{
    destroy_encoded_property_texture, encode_property_texture_any_thread, encode_property_texture_owner_thread,
    EncodedPropertyTexture, EncodedPropertyTextureProperty,
};

use crate::core::features::PrimitiveFeatures;
use crate::core::structural_metadata::{ModelMetadata, PrimitiveMetadata};
use crate::description::FeaturesMetadataDescription;
use crate::realize::{Realize, TextureBackend};

/// Everything encoded for one primitive: its feature ID sets, the metadata of
/// its model and the property textures it uses.
#[derive(Debug, Default)]
pub struct EncodedFeaturesMetadata {
    pub primitive_features: EncodedPrimitiveFeatures,
    pub model_metadata: EncodedModelMetadata,
    pub primitive_metadata: EncodedPrimitiveMetadata,
}

/// Runs phase one for a primitive and its model.
pub fn encode_any_thread(
    description: &FeaturesMetadataDescription,
    features: &PrimitiveFeatures,
    primitive_metadata: &PrimitiveMetadata,
    model_metadata: &ModelMetadata,
) -> EncodedFeaturesMetadata {
    EncodedFeaturesMetadata {
        primitive_features: encode_primitive_features_any_thread(&description.primitive_features, features),
        model_metadata: encode_model_metadata_any_thread(&description.model_metadata, model_metadata),
        primitive_metadata: encode_primitive_metadata_any_thread(
            &description.primitive_metadata,
            primitive_metadata,
            model_metadata,
        ),
    }
}

impl Realize for EncodedFeaturesMetadata {
    fn realize<B: TextureBackend + ?Sized>(&mut self, backend: &mut B) -> bool {
        // No short-circuit: every part gets its chance to realize.
        let features = self.primitive_features.realize(backend);
        let model = self.model_metadata.realize(backend);
        let primitive = self.primitive_metadata.realize(backend);
        features && model && primitive
    }

    fn destroy<B: TextureBackend + ?Sized>(&mut self, backend: &mut B) {
        self.primitive_features.destroy(backend);
        self.model_metadata.destroy(backend);
        self.primitive_metadata.destroy(backend);
    }
}
