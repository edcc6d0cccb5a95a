//! The declarative description of which feature ID sets and metadata
//! properties should be encoded, and how.
//!
//! A description is produced ahead of time (usually authored as JSON) and is
//! never mutated by the encoders. Only live data whose name matches an entry
//! here is encoded.

use std::io::Read;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::core::value::{MetadataComponentType, MetadataType, MetadataValueType};

#[remain::sorted]
#[derive(Debug, thiserror::Error)]
pub enum Err {
    #[error("Failed to read the description: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid description JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum FeatureIdSetType {
    #[default]
    None,
    Attribute,
    Texture,
    Implicit,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct FeatureIdSetDescription {
    /// Label of the set, or its generated name (see [`crate::encode::naming`]).
    pub name: String,
    /// Expected kind of the set. Informational; matching is by name only.
    #[serde(rename = "type")]
    pub ty: FeatureIdSetType,
    /// Name of the property table the feature IDs index into.
    pub property_table_name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PrimitiveFeaturesDescription {
    pub feature_id_sets: Vec<FeatureIdSetDescription>,
}

/// Type the values are encoded as on the GPU.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum EncodedMetadataType {
    #[default]
    None,
    Scalar,
    Vec2,
    Vec3,
    Vec4,
}

impl EncodedMetadataType {
    #[inline]
    pub fn num_components(self) -> usize {
        match self {
            EncodedMetadataType::None => 0,
            EncodedMetadataType::Scalar => 1,
            EncodedMetadataType::Vec2 => 2,
            EncodedMetadataType::Vec3 => 3,
            EncodedMetadataType::Vec4 => 4,
        }
    }

    #[inline]
    pub fn is_vecn(self) -> bool {
        matches!(self, EncodedMetadataType::Vec2 | EncodedMetadataType::Vec3 | EncodedMetadataType::Vec4)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum EncodedMetadataComponentType {
    #[default]
    None,
    Uint8,
    Float,
}

/// How live values are turned into texel values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum EncodedMetadataConversion {
    /// Do not encode the property.
    #[default]
    None,
    /// Cast the value to the encoded type where possible.
    Coerce,
    /// Parse a color string into an RGB(A) vector.
    ParseColorFromString,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct MetadataEncodingDetails {
    #[serde(rename = "type")]
    pub ty: EncodedMetadataType,
    pub component_type: EncodedMetadataComponentType,
    pub conversion: EncodedMetadataConversion,
}

impl MetadataEncodingDetails {
    pub fn new(
        ty: EncodedMetadataType,
        component_type: EncodedMetadataComponentType,
        conversion: EncodedMetadataConversion,
    ) -> Self {
        Self { ty, component_type, conversion }
    }
}

/// What the property is expected to look like in the live data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct MetadataPropertyDetails {
    #[serde(rename = "type")]
    pub ty: MetadataType,
    pub component_type: MetadataComponentType,
    pub is_array: bool,
    /// Fixed array length, 0 for variable-length arrays.
    pub array_size: u64,
    pub is_normalized: bool,
    pub has_offset: bool,
    pub has_scale: bool,
    pub has_no_data_value: bool,
    pub has_default_value: bool,
}

impl MetadataPropertyDetails {
    pub fn new(ty: MetadataType, component_type: MetadataComponentType, is_array: bool) -> Self {
        Self { ty, component_type, is_array, ..Self::default() }
    }

    pub fn get_value_type(&self) -> MetadataValueType {
        MetadataValueType::new(self.ty, self.component_type, self.is_array)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertyTablePropertyDescription {
    pub name: String,
    pub property_details: MetadataPropertyDetails,
    pub encoding_details: MetadataEncodingDetails,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertyTableDescription {
    pub name: String,
    pub properties: Vec<PropertyTablePropertyDescription>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertyTexturePropertyDescription {
    pub name: String,
    pub property_details: MetadataPropertyDetails,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertyTextureDescription {
    pub name: String,
    pub properties: Vec<PropertyTexturePropertyDescription>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelMetadataDescription {
    pub property_tables: Vec<PropertyTableDescription>,
    pub property_textures: Vec<PropertyTextureDescription>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PrimitiveMetadataDescription {
    pub property_texture_names: Vec<String>,
}

/// Top-level description covering primitive features, model metadata and
/// primitive metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct FeaturesMetadataDescription {
    pub primitive_features: PrimitiveFeaturesDescription,
    pub model_metadata: ModelMetadataDescription,
    pub primitive_metadata: PrimitiveMetadataDescription,
}

impl FeaturesMetadataDescription {
    pub fn from_json_str(json: &str) -> Result<Self, Err> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Err> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Reads a description from a JSON file.
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self, Err> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }
}

/// JSON schema of [`FeaturesMetadataDescription`], for tools authoring descriptions.
pub fn description_json_schema() -> schemars::schema::RootSchema {
    schemars::schema_for!(FeaturesMetadataDescription)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESCRIPTION: &str = r#"{
        "primitiveFeatures": {
            "featureIdSets": [
                { "name": "_FEATURE_ID_0", "type": "Attribute", "propertyTableName": "houses" }
            ]
        },
        "modelMetadata": {
            "propertyTables": [{
                "name": "houses",
                "properties": [{
                    "name": "height",
                    "propertyDetails": { "type": "Scalar", "componentType": "Uint8", "hasOffset": true },
                    "encodingDetails": { "type": "Scalar", "componentType": "Uint8", "conversion": "Coerce" }
                }]
            }]
        }
    }"#;

    #[test]
    fn parse_description() {
        let desc = FeaturesMetadataDescription::from_json_str(DESCRIPTION).unwrap();
        let set = &desc.primitive_features.feature_id_sets[0];
        assert_eq!(set.name, "_FEATURE_ID_0");
        assert_eq!(set.ty, FeatureIdSetType::Attribute);
        assert_eq!(set.property_table_name, "houses");

        let prop = &desc.model_metadata.property_tables[0].properties[0];
        assert_eq!(prop.name, "height");
        assert!(prop.property_details.has_offset);
        assert!(!prop.property_details.has_scale);
        assert_eq!(prop.encoding_details.conversion, EncodedMetadataConversion::Coerce);
        assert_eq!(
            prop.property_details.get_value_type(),
            MetadataValueType::new(MetadataType::Scalar, MetadataComponentType::Uint8, false)
        );
        assert!(desc.model_metadata.property_textures.is_empty());
        assert!(desc.primitive_metadata.property_texture_names.is_empty());
    }

    #[test]
    fn reader_and_invalid_json() {
        let desc = FeaturesMetadataDescription::from_reader(DESCRIPTION.as_bytes()).unwrap();
        assert_eq!(desc.model_metadata.property_tables.len(), 1);
        assert!(matches!(
            FeaturesMetadataDescription::from_json_str("{ not json"),
            Err(Err::JsonError(_))
        ));
        assert!(matches!(
            FeaturesMetadataDescription::load("does/not/exist.json"),
            Err(Err::IoError(_))
        ));
    }

    #[test]
    fn schema_names_top_level_fields() {
        let schema = serde_json::to_value(description_json_schema()).unwrap();
        let props = &schema["properties"];
        assert!(props.get("primitiveFeatures").is_some());
        assert!(props.get("modelMetadata").is_some());
    }

    #[test]
    fn encoded_type_components() {
        assert_eq!(EncodedMetadataType::None.num_components(), 0);
        assert_eq!(EncodedMetadataType::Vec3.num_components(), 3);
        assert!(EncodedMetadataType::Vec2.is_vecn());
        assert!(!EncodedMetadataType::Scalar.is_vecn());
    }
}
