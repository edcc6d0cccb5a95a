pub(crate) mod coerce;
pub(crate) mod parse_color;

use crate::core::texture::PixelFormat;
use crate::core::value::MetadataValue;
use crate::description::{EncodedMetadataConversion, MetadataEncodingDetails, PropertyTablePropertyDescription};

#[enum_dispatch::enum_dispatch(MetadataConverterImpl)]
#[derive(Clone, Copy, Debug)]
pub(crate) enum MetadataConverter {
    Coerce(coerce::Coerce),
    ParseColorFromString(parse_color::ParseColorFromString),
}

impl MetadataConverter {
    /// The converter for `conversion`, or `None` when nothing is to be encoded.
    pub(crate) fn new(conversion: EncodedMetadataConversion) -> Option<Self> {
        match conversion {
            EncodedMetadataConversion::None => None,
            EncodedMetadataConversion::Coerce => Some(MetadataConverter::Coerce(coerce::Coerce)),
            EncodedMetadataConversion::ParseColorFromString => {
                Some(MetadataConverter::ParseColorFromString(parse_color::ParseColorFromString))
            }
        }
    }

    pub(crate) fn display_name(&self) -> &'static str {
        match self {
            MetadataConverter::Coerce(_) => "Coerce",
            MetadataConverter::ParseColorFromString(_) => "Parse Color From String",
        }
    }
}

#[enum_dispatch::enum_dispatch]
pub(crate) trait MetadataConverterImpl {
    /// Whether this converter can produce the encoded type from the described property.
    fn can_encode(&self, description: &PropertyTablePropertyDescription) -> bool;

    /// Converts one value into up to four logical components (x, y, z, w).
    /// Unused components are zero.
    fn convert(&self, encoding: &MetadataEncodingDetails, value: &MetadataValue) -> [f64; 4];
}

/// Casts to a byte, mapping values outside `0..=255` (and NaN) to zero.
#[inline]
pub(crate) fn to_u8(value: f64) -> u8 {
    if (0.0..=255.0).contains(&value) {
        value as u8
    } else {
        0
    }
}

/// Writes logical components into one texel of `format`. Float vectors are
/// stored in ABGR order.
pub(crate) fn write_texel(texel: &mut [u8], format: PixelFormat, components: [f64; 4]) {
    debug_assert_eq!(texel.len(), format.bytes_per_pixel());
    match format {
        PixelFormat::R8Uint => texel[0] = to_u8(components[0]),
        PixelFormat::R8G8B8A8Uint => {
            for (dst, c) in texel.iter_mut().zip(components) {
                *dst = to_u8(c);
            }
        }
        PixelFormat::R32Float => texel.copy_from_slice(bytemuck::bytes_of(&(components[0] as f32))),
        PixelFormat::A32B32G32R32Float => {
            let abgr = [
                components[3] as f32,
                components[2] as f32,
                components[1] as f32,
                components[0] as f32,
            ];
            texel.copy_from_slice(bytemuck::cast_slice(&abgr));
        }
    }
}
