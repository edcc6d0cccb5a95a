use std::sync::Arc;

use indexmap::IndexMap;

use crate::core::texture::Image;
use crate::core::value::{MetadataValue, MetadataValueType};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PropertyTablePropertyStatus {
    Valid,
    /// The property is absent from the table but its class defines a default.
    EmptyPropertyWithDefault,
    ErrorInvalidProperty,
    ErrorInvalidPropertyData,
}

/// A column of a property table, decoded into one raw value per row.
#[derive(Clone, Debug)]
pub struct PropertyTableProperty {
    status: PropertyTablePropertyStatus,
    value_type: MetadataValueType,
    normalized: bool,
    values: Vec<MetadataValue>,
    offset: MetadataValue,
    scale: MetadataValue,
    no_data: MetadataValue,
    default_value: MetadataValue,
}

impl PropertyTableProperty {
    pub fn new(value_type: MetadataValueType, values: Vec<MetadataValue>) -> Self {
        Self {
            status: PropertyTablePropertyStatus::Valid,
            value_type,
            normalized: false,
            values,
            offset: MetadataValue::Empty,
            scale: MetadataValue::Empty,
            no_data: MetadataValue::Empty,
            default_value: MetadataValue::Empty,
        }
    }

    pub fn set_status(&mut self, status: PropertyTablePropertyStatus) { self.status = status; }
    pub fn get_status(&self) -> PropertyTablePropertyStatus { self.status }

    pub fn get_value_type(&self) -> MetadataValueType { self.value_type }

    pub fn set_normalized(&mut self, normalized: bool) { self.normalized = normalized; }
    pub fn is_normalized(&self) -> bool { self.normalized }

    pub fn set_offset(&mut self, offset: MetadataValue) { self.offset = offset; }
    pub fn get_offset(&self) -> &MetadataValue { &self.offset }

    pub fn set_scale(&mut self, scale: MetadataValue) { self.scale = scale; }
    pub fn get_scale(&self) -> &MetadataValue { &self.scale }

    pub fn set_no_data_value(&mut self, no_data: MetadataValue) { self.no_data = no_data; }
    pub fn get_no_data_value(&self) -> &MetadataValue { &self.no_data }

    pub fn set_default_value(&mut self, default_value: MetadataValue) { self.default_value = default_value; }
    pub fn get_default_value(&self) -> &MetadataValue { &self.default_value }

    /// Raw value of `row` (before offset/scale), or `Empty` past the end.
    pub fn get_raw_value(&self, row: usize) -> &MetadataValue {
        const EMPTY: &MetadataValue = &MetadataValue::Empty;
        self.values.get(row).unwrap_or(EMPTY)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A property table: named columns sharing one row count. Properties keep the
/// order in which they were declared.
#[derive(Clone, Debug, Default)]
pub struct PropertyTable {
    name: String,
    class_name: String,
    count: u64,
    properties: IndexMap<String, PropertyTableProperty>,
}

impl PropertyTable {
    pub fn new(name: &str, class_name: &str, count: u64) -> Self {
        Self {
            name: name.to_owned(),
            class_name: class_name.to_owned(),
            count,
            properties: IndexMap::new(),
        }
    }

    pub fn get_name(&self) -> &str { &self.name }
    pub fn get_class_name(&self) -> &str { &self.class_name }
    pub fn get_count(&self) -> u64 { self.count }

    pub fn add_property(&mut self, name: &str, property: PropertyTableProperty) {
        self.properties.insert(name.to_owned(), property);
    }

    pub fn get_property(&self, name: &str) -> Option<&PropertyTableProperty> {
        self.properties.get(name)
    }

    pub fn properties(&self) -> &IndexMap<String, PropertyTableProperty> {
        &self.properties
    }
}

/// A property stored in image channels.
#[derive(Clone, Debug)]
pub struct PropertyTextureProperty {
    image: Option<Arc<Image>>,
    channels: Vec<i64>,
    tex_coord_set_index: i64,
    value_type: MetadataValueType,
    normalized: bool,
}

impl PropertyTextureProperty {
    pub fn new(image: Arc<Image>, channels: Vec<i64>, tex_coord_set_index: i64, value_type: MetadataValueType) -> Self {
        Self { image: Some(image), channels, tex_coord_set_index, value_type, normalized: false }
    }

    pub fn set_normalized(&mut self, normalized: bool) { self.normalized = normalized; }
    pub fn is_normalized(&self) -> bool { self.normalized }
    pub fn get_image(&self) -> Option<&Arc<Image>> { self.image.as_ref() }
    pub fn get_channels(&self) -> &[i64] { &self.channels }
    pub fn get_tex_coord_set_index(&self) -> i64 { self.tex_coord_set_index }
    pub fn get_value_type(&self) -> MetadataValueType { self.value_type }
}

#[derive(Clone, Debug, Default)]
pub struct PropertyTexture {
    name: String,
    class_name: String,
    properties: IndexMap<String, PropertyTextureProperty>,
}

impl PropertyTexture {
    pub fn new(name: &str, class_name: &str) -> Self {
        Self { name: name.to_owned(), class_name: class_name.to_owned(), properties: IndexMap::new() }
    }

    pub fn get_name(&self) -> &str { &self.name }
    pub fn get_class_name(&self) -> &str { &self.class_name }

    pub fn add_property(&mut self, name: &str, property: PropertyTextureProperty) {
        self.properties.insert(name.to_owned(), property);
    }

    pub fn properties(&self) -> &IndexMap<String, PropertyTextureProperty> {
        &self.properties
    }
}

/// Model-level structural metadata (EXT_structural_metadata on the root).
#[derive(Clone, Debug, Default)]
pub struct ModelMetadata {
    property_tables: Vec<PropertyTable>,
    property_textures: Vec<PropertyTexture>,
}

impl ModelMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a property table and returns its index
    pub fn add_property_table(&mut self, property_table: PropertyTable) -> usize {
        self.property_tables.push(property_table);
        self.property_tables.len() - 1
    }

    pub fn num_property_tables(&self) -> usize {
        self.property_tables.len()
    }

    /// Returns None if the index is out of bounds
    pub fn get_property_table(&self, index: usize) -> Option<&PropertyTable> {
        self.property_tables.get(index)
    }

    pub fn property_tables(&self) -> &[PropertyTable] {
        &self.property_tables
    }

    /// Adds a property texture and returns its index
    pub fn add_property_texture(&mut self, property_texture: PropertyTexture) -> usize {
        self.property_textures.push(property_texture);
        self.property_textures.len() - 1
    }

    pub fn num_property_textures(&self) -> usize {
        self.property_textures.len()
    }

    pub fn get_property_texture(&self, index: usize) -> Option<&PropertyTexture> {
        self.property_textures.get(index)
    }

    pub fn property_textures(&self) -> &[PropertyTexture] {
        &self.property_textures
    }

    pub fn is_empty(&self) -> bool {
        self.property_tables.is_empty() && self.property_textures.is_empty()
    }
}

/// Primitive-level structural metadata: indices into the model's property textures.
#[derive(Clone, Debug, Default)]
pub struct PrimitiveMetadata {
    property_texture_indices: Vec<usize>,
}

impl PrimitiveMetadata {
    pub fn new(property_texture_indices: Vec<usize>) -> Self {
        Self { property_texture_indices }
    }

    pub fn property_texture_indices(&self) -> &[usize] {
        &self.property_texture_indices
    }
}
