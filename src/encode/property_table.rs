use crate::core::structural_metadata::{PropertyTable, PropertyTableProperty, PropertyTablePropertyStatus};
use crate::core::texture::EncodedTexture;
use crate::core::value::{MetadataComponentType, MetadataValue};
use crate::description::{
    EncodedMetadataComponentType, EncodedMetadataConversion, EncodedMetadataType, PropertyTableDescription,
    PropertyTablePropertyDescription,
};
use crate::encode::conversion::{self, MetadataConverter, MetadataConverterImpl};
use crate::encode::naming::safe_identifier;
use crate::encode::pixel_format::{pixel_format_for, EncodedPixelFormat};
use crate::realize::{self, Realize, TextureBackend};

/// One property table column baked into a square texture, one texel per row.
#[derive(Debug)]
pub struct EncodedPropertyTableProperty {
    pub name: String,
    pub ty: EncodedMetadataType,
    /// `None` when the live property is invalid; the descriptor is still
    /// emitted so the binding exists.
    pub texture: Option<EncodedTexture>,
    pub offset: Option<MetadataValue>,
    pub scale: Option<MetadataValue>,
    pub no_data: Option<MetadataValue>,
    pub default_value: Option<MetadataValue>,
}

#[derive(Debug, Default)]
pub struct EncodedPropertyTable {
    pub name: String,
    pub properties: Vec<EncodedPropertyTableProperty>,
}

/// Side length of the smallest square holding `row_count` texels.
#[inline]
pub fn texture_dimension(row_count: u64) -> u64 {
    let d = row_count.isqrt();
    if d * d < row_count {
        d + 1
    } else {
        d
    }
}

/// Checks the description against the live property. Returns false when the
/// property must not be encoded.
fn validate(description: &PropertyTablePropertyDescription, property: &PropertyTableProperty) -> bool {
    let details = &description.property_details;
    let encoding = &description.encoding_details;

    if encoding.ty == EncodedMetadataType::None {
        tracing::warn!("Property {} has no encoded type, skipped.", description.name);
        return false;
    }
    if encoding.component_type == EncodedMetadataComponentType::None {
        tracing::warn!("Property {} has no encoded component type, skipped.", description.name);
        return false;
    }

    if details.get_value_type() != property.get_value_type() {
        tracing::warn!(
            "Value type of property {} differs from its description ({:?} vs {:?}), encoding anyway.",
            description.name,
            property.get_value_type(),
            details.get_value_type()
        );
    }

    if details.is_normalized != property.is_normalized() {
        tracing::warn!("Normalization of property {} differs from its description, skipped.", description.name);
        return false;
    }

    if details.is_normalized && property.get_value_type().component_type != MetadataComponentType::Uint8 {
        tracing::warn!("Only normalized Uint8 properties are supported, property {} skipped.", description.name);
        return false;
    }

    true
}

fn write_rows(
    texture: &EncodedTexture,
    format: EncodedPixelFormat,
    converter: &MetadataConverter,
    description: &PropertyTablePropertyDescription,
    property: &PropertyTableProperty,
    row_count: usize,
) {
    texture.with_staged_mut(|pixels| {
        for (row, texel) in pixels.chunks_exact_mut(format.pixel_size).take(row_count).enumerate() {
            let components = converter.convert(&description.encoding_details, property.get_raw_value(row));
            conversion::write_texel(texel, format.format, components);
        }
    });
}

fn encode_property(
    description: &PropertyTablePropertyDescription,
    property: &PropertyTableProperty,
    row_count: u64,
) -> Option<EncodedPropertyTableProperty> {
    let converter = MetadataConverter::new(description.encoding_details.conversion)?;

    if !validate(description, property) {
        return None;
    }

    if !converter.can_encode(description) {
        tracing::warn!(
            "Can't use conversion {} on property {}, skipped.",
            converter.display_name(),
            description.name
        );
        return None;
    }

    let Some(format) = pixel_format_for(&description.encoding_details) else {
        tracing::warn!("No pixel format fits property {}, skipped.", description.name);
        return None;
    };

    // Invalid properties keep their binding but get no texture.
    let texture = if property.get_status() == PropertyTablePropertyStatus::Valid {
        let dimension = u32::try_from(texture_dimension(row_count)).unwrap_or(u32::MAX);
        let texture = match EncodedTexture::allocate(dimension, dimension, format.format) {
            Ok(texture) => texture,
            Err(err) => {
                tracing::error!("Error allocating the texture of property {}: {}", description.name, err);
                return None;
            }
        };
        write_rows(&texture, format, &converter, description, property, row_count as usize);
        Some(texture)
    } else {
        None
    };

    let details = &description.property_details;
    Some(EncodedPropertyTableProperty {
        name: safe_identifier(&description.name),
        ty: description.encoding_details.ty,
        texture,
        offset: details.has_offset.then(|| property.get_offset().clone()),
        scale: details.has_scale.then(|| property.get_scale().clone()),
        no_data: details.has_no_data_value.then(|| property.get_no_data_value().clone()),
        default_value: details.has_default_value.then(|| property.get_default_value().clone()),
    })
}

/// Bakes the described properties of `table` into textures. Properties are
/// visited in the table's order; any property without a description, or
/// with conversion `None`, is left out. Safe to call from any thread.
pub fn encode_property_table_any_thread(
    description: &PropertyTableDescription,
    table: &PropertyTable,
) -> EncodedPropertyTable {
    let _span = tracing::debug_span!("encode_property_table").entered();

    let mut result = EncodedPropertyTable {
        name: description.name.clone(),
        properties: Vec::with_capacity(description.properties.len()),
    };

    for (name, property) in table.properties() {
        let Some(property_description) = description.properties.iter().find(|d| &d.name == name) else {
            continue;
        };
        if property_description.encoding_details.conversion == EncodedMetadataConversion::None {
            continue;
        }

        if let Some(encoded) = encode_property(property_description, property, table.get_count()) {
            result.properties.push(encoded);
        }
    }

    tracing::debug!(
        "Encoded {} of {} properties of table {}",
        result.properties.len(),
        table.properties().len(),
        description.name
    );
    result
}

/// Realizes the textures of every encoded property. Returns false if any of
/// them failed.
pub fn encode_property_table_owner_thread<B: TextureBackend + ?Sized>(
    encoded: &mut EncodedPropertyTable,
    backend: &mut B,
) -> bool {
    let mut success = true;
    for property in &encoded.properties {
        if let Some(texture) = &property.texture {
            success &= realize::realize_texture(texture, backend);
        }
    }
    success
}

pub fn destroy_encoded_property_table<B: TextureBackend + ?Sized>(encoded: &mut EncodedPropertyTable, backend: &mut B) {
    for property in &mut encoded.properties {
        if let Some(texture) = property.texture.take() {
            realize::release_texture(&texture, backend);
        }
    }
}

impl Realize for EncodedPropertyTable {
    fn realize<B: TextureBackend + ?Sized>(&mut self, backend: &mut B) -> bool {
        encode_property_table_owner_thread(self, backend)
    }

    fn destroy<B: TextureBackend + ?Sized>(&mut self, backend: &mut B) {
        destroy_encoded_property_table(self, backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::texture::PixelFormat;
    use crate::core::value::{MetadataType, MetadataValueType};
    use crate::description::{MetadataEncodingDetails, MetadataPropertyDetails};
    use crate::realize::test_utils::RecordingBackend;

    fn uint8_scalar() -> MetadataValueType {
        MetadataValueType::new(MetadataType::Scalar, MetadataComponentType::Uint8, false)
    }

    fn describe(name: &str, details: MetadataPropertyDetails, encoding: MetadataEncodingDetails) -> PropertyTableDescription {
        PropertyTableDescription {
            name: "houses".to_string(),
            properties: vec![PropertyTablePropertyDescription {
                name: name.to_string(),
                property_details: details,
                encoding_details: encoding,
            }],
        }
    }

    fn coerce_to(ty: EncodedMetadataType, component_type: EncodedMetadataComponentType) -> MetadataEncodingDetails {
        MetadataEncodingDetails::new(ty, component_type, EncodedMetadataConversion::Coerce)
    }

    fn height_table(rows: u64) -> PropertyTable {
        let mut table = PropertyTable::new("houses", "building", rows);
        let values = (0..rows).map(|v| MetadataValue::UInt(v * 10)).collect();
        table.add_property("height", PropertyTableProperty::new(uint8_scalar(), values));
        table
    }

    #[test]
    fn square_dimension_is_tight() {
        for n in 1..5000u64 {
            let d = texture_dimension(n);
            assert!(d * d >= n, "{n} rows do not fit in {d}x{d}");
            assert!((d - 1) * (d - 1) < n, "{d}x{d} is not the smallest square for {n} rows");
        }
    }

    #[test]
    fn square_dimension() {
        assert_eq!(texture_dimension(0), 0);
        assert_eq!(texture_dimension(1), 1);
        assert_eq!(texture_dimension(4), 2);
        assert_eq!(texture_dimension(5), 3);
        assert_eq!(texture_dimension(10), 4);
        assert_eq!(texture_dimension(u64::MAX), 1 << 32);
    }

    #[test]
    fn height_rows_become_texels() {
        let desc = describe(
            "height",
            MetadataPropertyDetails::new(MetadataType::Scalar, MetadataComponentType::Uint8, false),
            coerce_to(EncodedMetadataType::Scalar, EncodedMetadataComponentType::Uint8),
        );
        let mut encoded = encode_property_table_any_thread(&desc, &height_table(10));
        assert_eq!(encoded.properties.len(), 1);

        let property = &encoded.properties[0];
        assert_eq!(property.name, "height");
        assert_eq!(property.ty, EncodedMetadataType::Scalar);
        assert!(property.offset.is_none());
        let texture = property.texture.as_ref().unwrap();
        assert_eq!((texture.get_width(), texture.get_height()), (4, 4));
        assert_eq!(texture.get_format(), PixelFormat::R8Uint);
        let pixels = texture.staged_pixels().unwrap();
        assert_eq!(pixels.len(), 16);
        assert_eq!(&pixels[..10], &[0, 10, 20, 30, 40, 50, 60, 70, 80, 90]);
        assert!(pixels[10..].iter().all(|&p| p == 0));

        let mut backend = RecordingBackend::default();
        assert!(encode_property_table_owner_thread(&mut encoded, &mut backend));
        assert_eq!(backend.created.len(), 1);
        destroy_encoded_property_table(&mut encoded, &mut backend);
        assert_eq!(backend.destroyed.len(), 1);
    }

    #[test]
    fn normalized_non_uint8_is_skipped() {
        let value_type = MetadataValueType::new(MetadataType::Scalar, MetadataComponentType::Uint16, false);
        let mut table = PropertyTable::new("houses", "building", 2);
        let mut property = PropertyTableProperty::new(value_type, vec![MetadataValue::UInt(1), MetadataValue::UInt(2)]);
        property.set_normalized(true);
        table.add_property("level", property);

        let details = MetadataPropertyDetails {
            is_normalized: true,
            ..MetadataPropertyDetails::new(MetadataType::Scalar, MetadataComponentType::Uint16, false)
        };
        let desc = describe("level", details, coerce_to(EncodedMetadataType::Scalar, EncodedMetadataComponentType::Float));
        assert!(encode_property_table_any_thread(&desc, &table).properties.is_empty());
    }

    #[test]
    fn normalization_mismatch_is_skipped() {
        let details = MetadataPropertyDetails {
            is_normalized: true,
            ..MetadataPropertyDetails::new(MetadataType::Scalar, MetadataComponentType::Uint8, false)
        };
        let desc = describe("height", details, coerce_to(EncodedMetadataType::Scalar, EncodedMetadataComponentType::Uint8));
        assert!(encode_property_table_any_thread(&desc, &height_table(3)).properties.is_empty());
    }

    #[test]
    fn type_mismatch_still_encodes() {
        let desc = describe(
            "height",
            MetadataPropertyDetails::new(MetadataType::Scalar, MetadataComponentType::Int32, false),
            coerce_to(EncodedMetadataType::Scalar, EncodedMetadataComponentType::Float),
        );
        let encoded = encode_property_table_any_thread(&desc, &height_table(2));
        let pixels = encoded.properties[0].texture.as_ref().unwrap().staged_pixels().unwrap();
        assert_eq!(pixels.len(), 16);
        assert_eq!(&pixels[4..8], &10.0f32.to_ne_bytes());
    }

    #[test]
    fn unencodable_descriptions_are_skipped() {
        let details = MetadataPropertyDetails::new(MetadataType::Scalar, MetadataComponentType::Uint8, false);
        let table = height_table(2);

        let none = describe("height", details, MetadataEncodingDetails::default());
        assert!(encode_property_table_any_thread(&none, &table).properties.is_empty());

        let no_type = describe("height", details, coerce_to(EncodedMetadataType::None, EncodedMetadataComponentType::Uint8));
        assert!(encode_property_table_any_thread(&no_type, &table).properties.is_empty());

        let no_component = describe("height", details, coerce_to(EncodedMetadataType::Scalar, EncodedMetadataComponentType::None));
        assert!(encode_property_table_any_thread(&no_component, &table).properties.is_empty());

        let color = describe(
            "height",
            details,
            MetadataEncodingDetails::new(
                EncodedMetadataType::Vec4,
                EncodedMetadataComponentType::Uint8,
                EncodedMetadataConversion::ParseColorFromString,
            ),
        );
        assert!(encode_property_table_any_thread(&color, &table).properties.is_empty());

        let unnamed = describe("width", details, coerce_to(EncodedMetadataType::Scalar, EncodedMetadataComponentType::Uint8));
        assert!(encode_property_table_any_thread(&unnamed, &table).properties.is_empty());
    }

    #[test]
    fn flagged_values_are_attached() {
        let mut table = PropertyTable::new("houses", "building", 1);
        let mut property = PropertyTableProperty::new(uint8_scalar(), vec![MetadataValue::UInt(3)]);
        property.set_offset(MetadataValue::Float(1.5));
        property.set_scale(MetadataValue::Float(2.0));
        property.set_no_data_value(MetadataValue::UInt(255));
        table.add_property("height", property);

        let details = MetadataPropertyDetails {
            has_offset: true,
            has_no_data_value: true,
            ..MetadataPropertyDetails::new(MetadataType::Scalar, MetadataComponentType::Uint8, false)
        };
        let desc = describe("height", details, coerce_to(EncodedMetadataType::Scalar, EncodedMetadataComponentType::Uint8));
        let encoded = encode_property_table_any_thread(&desc, &table);
        let property = &encoded.properties[0];
        assert_eq!(property.offset, Some(MetadataValue::Float(1.5)));
        assert_eq!(property.scale, None);
        assert_eq!(property.no_data, Some(MetadataValue::UInt(255)));
        assert_eq!(property.default_value, None);
    }

    #[test]
    fn invalid_property_keeps_textureless_descriptor() {
        let mut table = PropertyTable::new("houses", "building", 2);
        let mut property = PropertyTableProperty::new(uint8_scalar(), Vec::new());
        property.set_status(PropertyTablePropertyStatus::ErrorInvalidPropertyData);
        table.add_property("roof color", property);

        let desc = describe(
            "roof color",
            MetadataPropertyDetails::new(MetadataType::Scalar, MetadataComponentType::Uint8, false),
            coerce_to(EncodedMetadataType::Scalar, EncodedMetadataComponentType::Uint8),
        );
        let mut encoded = encode_property_table_any_thread(&desc, &table);
        assert_eq!(encoded.properties.len(), 1);
        assert_eq!(encoded.properties[0].name, "roof_color");
        assert!(encoded.properties[0].texture.is_none());

        let mut backend = RecordingBackend::default();
        assert!(encode_property_table_owner_thread(&mut encoded, &mut backend));
        assert!(backend.created.is_empty());
    }

    #[test]
    fn invalid_property_in_empty_table_keeps_descriptor() {
        let mut table = PropertyTable::new("houses", "building", 0);
        let mut property = PropertyTableProperty::new(uint8_scalar(), Vec::new());
        property.set_status(PropertyTablePropertyStatus::ErrorInvalidPropertyData);
        table.add_property("height", property);

        let desc = describe(
            "height",
            MetadataPropertyDetails::new(MetadataType::Scalar, MetadataComponentType::Uint8, false),
            coerce_to(EncodedMetadataType::Scalar, EncodedMetadataComponentType::Uint8),
        );
        let encoded = encode_property_table_any_thread(&desc, &table);
        assert_eq!(encoded.properties.len(), 1);
        assert_eq!(encoded.properties[0].name, "height");
        assert!(encoded.properties[0].texture.is_none());
    }

    #[test]
    fn empty_table_is_skipped_with_error() {
        let desc = describe(
            "height",
            MetadataPropertyDetails::new(MetadataType::Scalar, MetadataComponentType::Uint8, false),
            coerce_to(EncodedMetadataType::Scalar, EncodedMetadataComponentType::Uint8),
        );
        assert!(encode_property_table_any_thread(&desc, &height_table(0)).properties.is_empty());
    }

    #[test]
    fn live_order_is_kept() {
        let mut table = PropertyTable::new("houses", "building", 1);
        table.add_property("b", PropertyTableProperty::new(uint8_scalar(), vec![MetadataValue::UInt(1)]));
        table.add_property("a", PropertyTableProperty::new(uint8_scalar(), vec![MetadataValue::UInt(2)]));

        let details = MetadataPropertyDetails::new(MetadataType::Scalar, MetadataComponentType::Uint8, false);
        let encoding = coerce_to(EncodedMetadataType::Scalar, EncodedMetadataComponentType::Uint8);
        let desc = PropertyTableDescription {
            name: "houses".to_string(),
            properties: ["a", "b"]
                .iter()
                .map(|n| PropertyTablePropertyDescription {
                    name: n.to_string(),
                    property_details: details,
                    encoding_details: encoding,
                })
                .collect(),
        };

        let encoded = encode_property_table_any_thread(&desc, &table);
        let names = encoded.properties.iter().map(|p| p.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, ["b", "a"]);
    }
}
