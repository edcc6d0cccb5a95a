use crate::core::structural_metadata::{ModelMetadata, PrimitiveMetadata};
use crate::description::{ModelMetadataDescription, PrimitiveMetadataDescription};
use crate::encode::image_cache::ImageCache;
use crate::encode::naming::{name_for_property_table, name_for_property_texture};
use crate::encode::property_table::{
    destroy_encoded_property_table, encode_property_table_any_thread, encode_property_table_owner_thread,
    EncodedPropertyTable,
};
use crate::encode::property_texture::{
    destroy_encoded_property_texture, encode_property_texture_any_thread, encode_property_texture_owner_thread,
    EncodedPropertyTexture,
};
use crate::realize::{Realize, TextureBackend};

/// Encoded property tables and property textures of a model.
#[derive(Debug, Default)]
pub struct EncodedModelMetadata {
    pub property_tables: Vec<EncodedPropertyTable>,
    pub property_textures: Vec<EncodedPropertyTexture>,
}

/// Names of the model's property textures a primitive uses.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EncodedPrimitiveMetadata {
    pub property_texture_names: Vec<String>,
}

/// Encodes the property tables and property textures of `metadata` that the
/// description names. Anything else is dropped. Safe to call from any thread.
pub fn encode_model_metadata_any_thread(
    description: &ModelMetadataDescription,
    metadata: &ModelMetadata,
) -> EncodedModelMetadata {
    let _span = tracing::debug_span!("encode_model_metadata").entered();

    let mut result = EncodedModelMetadata::default();

    for table in metadata.property_tables() {
        let name = name_for_property_table(table);
        let Some(table_description) = description.property_tables.iter().find(|d| d.name == name) else {
            continue;
        };
        let mut encoded = encode_property_table_any_thread(table_description, table);
        encoded.name = name;
        result.property_tables.push(encoded);
    }

    let mut cache = ImageCache::new();
    for texture in metadata.property_textures() {
        let name = name_for_property_texture(texture);
        let Some(texture_description) = description.property_textures.iter().find(|d| d.name == name) else {
            continue;
        };
        result
            .property_textures
            .push(encode_property_texture_any_thread(&mut cache, texture_description, &name, texture));
    }

    tracing::debug!(
        "Encoded {} of {} property tables and {} of {} property textures",
        result.property_tables.len(),
        metadata.num_property_tables(),
        result.property_textures.len(),
        metadata.num_property_textures()
    );
    result
}

/// Realizes every texture of the encoded model metadata. All tables and
/// textures are attempted even after a failure.
pub fn encode_model_metadata_owner_thread<B: TextureBackend + ?Sized>(
    encoded: &mut EncodedModelMetadata,
    backend: &mut B,
) -> bool {
    let mut success = true;

    for table in &mut encoded.property_tables {
        success &= encode_property_table_owner_thread(table, backend);
    }

    let mut realized = Vec::new();
    for texture in &mut encoded.property_textures {
        success &= encode_property_texture_owner_thread(&mut realized, texture, backend);
    }

    success
}

pub fn destroy_encoded_model_metadata<B: TextureBackend + ?Sized>(encoded: &mut EncodedModelMetadata, backend: &mut B) {
    for table in &mut encoded.property_tables {
        destroy_encoded_property_table(table, backend);
    }
    for texture in &mut encoded.property_textures {
        destroy_encoded_property_texture(texture, backend);
    }
}

/// Records which of the primitive's property textures the description asks
/// for, in description order.
pub fn encode_primitive_metadata_any_thread(
    description: &PrimitiveMetadataDescription,
    primitive_metadata: &PrimitiveMetadata,
    model: &ModelMetadata,
) -> EncodedPrimitiveMetadata {
    let used = primitive_metadata
        .property_texture_indices()
        .iter()
        .filter_map(|&index| model.get_property_texture(index))
        .map(name_for_property_texture)
        .collect::<Vec<_>>();

    let property_texture_names = description
        .property_texture_names
        .iter()
        .filter(|name| used.contains(name))
        .cloned()
        .collect();

    EncodedPrimitiveMetadata { property_texture_names }
}

/// Primitive metadata owns no textures; there is nothing to realize.
pub fn encode_primitive_metadata_owner_thread<B: TextureBackend + ?Sized>(
    _encoded: &mut EncodedPrimitiveMetadata,
    _backend: &mut B,
) -> bool {
    true
}

pub fn destroy_encoded_primitive_metadata<B: TextureBackend + ?Sized>(
    _encoded: &mut EncodedPrimitiveMetadata,
    _backend: &mut B,
) {
}

impl Realize for EncodedModelMetadata {
    fn realize<B: TextureBackend + ?Sized>(&mut self, backend: &mut B) -> bool {
        encode_model_metadata_owner_thread(self, backend)
    }

    fn destroy<B: TextureBackend + ?Sized>(&mut self, backend: &mut B) {
        destroy_encoded_model_metadata(self, backend)
    }
}

impl Realize for EncodedPrimitiveMetadata {
    fn realize<B: TextureBackend + ?Sized>(&mut self, backend: &mut B) -> bool {
        encode_primitive_metadata_owner_thread(self, backend)
    }

    fn destroy<B: TextureBackend + ?Sized>(&mut self, backend: &mut B) {
        destroy_encoded_primitive_metadata(self, backend)
    }
}
