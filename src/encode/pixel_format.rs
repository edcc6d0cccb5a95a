use crate::core::texture::PixelFormat;
use crate::description::{EncodedMetadataComponentType, EncodedMetadataType, MetadataEncodingDetails};

/// A GPU pixel format together with the number of bytes one texel takes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct EncodedPixelFormat {
    pub format: PixelFormat,
    pub pixel_size: usize,
}

/// Picks the pixel format for an encoded component type and type.
///
/// Vectors always use a four-channel format, whatever their arity. Float
/// vectors use an ABGR format, so texel writers must reverse the component
/// order. Returns `None` when no format fits; callers skip the property.
pub fn select_pixel_format(
    component_type: EncodedMetadataComponentType,
    ty: EncodedMetadataType,
) -> Option<EncodedPixelFormat> {
    let format = match (component_type, ty) {
        (EncodedMetadataComponentType::Uint8, EncodedMetadataType::Scalar) => PixelFormat::R8Uint,
        (EncodedMetadataComponentType::Uint8, EncodedMetadataType::Vec2)
        | (EncodedMetadataComponentType::Uint8, EncodedMetadataType::Vec3)
        | (EncodedMetadataComponentType::Uint8, EncodedMetadataType::Vec4) => PixelFormat::R8G8B8A8Uint,
        (EncodedMetadataComponentType::Float, EncodedMetadataType::Scalar) => PixelFormat::R32Float,
        (EncodedMetadataComponentType::Float, EncodedMetadataType::Vec2)
        | (EncodedMetadataComponentType::Float, EncodedMetadataType::Vec3)
        | (EncodedMetadataComponentType::Float, EncodedMetadataType::Vec4) => PixelFormat::A32B32G32R32Float,
        (_, EncodedMetadataType::None) | (EncodedMetadataComponentType::None, _) => return None,
    };
    Some(EncodedPixelFormat { format, pixel_size: format.bytes_per_pixel() })
}

#[inline]
pub(crate) fn pixel_format_for(encoding: &MetadataEncodingDetails) -> Option<EncodedPixelFormat> {
    select_pixel_format(encoding.component_type, encoding.ty)
}
