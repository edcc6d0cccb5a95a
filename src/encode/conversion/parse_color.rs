use super::MetadataConverterImpl;
use crate::core::value::{MetadataType, MetadataValue};
use crate::description::{
    EncodedMetadataComponentType, EncodedMetadataType, MetadataEncodingDetails, PropertyTablePropertyDescription,
};

/// Parses CSS-like color strings into an RGB or RGBA vector.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ParseColorFromString;

impl MetadataConverterImpl for ParseColorFromString {
    fn can_encode(&self, description: &PropertyTablePropertyDescription) -> bool {
        let details = &description.property_details;
        details.ty == MetadataType::String
            && !details.is_array
            && matches!(description.encoding_details.ty, EncodedMetadataType::Vec3 | EncodedMetadataType::Vec4)
    }

    fn convert(&self, encoding: &MetadataEncodingDetails, value: &MetadataValue) -> [f64; 4] {
        let Some(rgba) = value.as_str().and_then(parse_color) else {
            return [0.0; 4];
        };

        // Float textures hold colors in 0..=1.
        let divisor = match encoding.component_type {
            EncodedMetadataComponentType::Float => 255.0,
            _ => 1.0,
        };
        let mut out = rgba.map(|c| c as f64 / divisor);
        if encoding.ty != EncodedMetadataType::Vec4 {
            out[3] = 0.0;
        }
        out
    }
}

/// Parses `#RGB`, `#RRGGBB`, `#RRGGBBAA`, `rgb(r, g, b)` and `rgba(r, g, b, a)`.
/// Alpha in the functional form is a fraction in `0..=1`. A missing alpha is
/// opaque.
pub(crate) fn parse_color(s: &str) -> Option<[u8; 4]> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }

    let lower = s.to_ascii_lowercase();
    if let Some(args) = lower.strip_prefix("rgba(").and_then(|r| r.strip_suffix(')')) {
        let parts = args.split(',').map(str::trim).collect::<Vec<_>>();
        let [r, g, b, a] = parts.as_slice() else {
            return None;
        };
        let alpha = a.parse::<f64>().ok().filter(|a| (0.0..=1.0).contains(a))?;
        return Some([parse_channel(r)?, parse_channel(g)?, parse_channel(b)?, (alpha * 255.0).round() as u8]);
    }
    if let Some(args) = lower.strip_prefix("rgb(").and_then(|r| r.strip_suffix(')')) {
        let parts = args.split(',').map(str::trim).collect::<Vec<_>>();
        let [r, g, b] = parts.as_slice() else {
            return None;
        };
        return Some([parse_channel(r)?, parse_channel(g)?, parse_channel(b)?, 255]);
    }
    None
}

fn parse_channel(s: &str) -> Option<u8> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<u8>().ok()
}

fn parse_hex(hex: &str) -> Option<[u8; 4]> {
    // `from_str_radix` alone would accept a sign.
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => {
            let mut out = [255; 4];
            for (dst, c) in out.iter_mut().zip(hex.chars()) {
                let nibble = c.to_digit(16)? as u8;
                *dst = nibble * 17;
            }
            Some(out)
        }
        6 => Some([byte(0)?, byte(2)?, byte(4)?, 255]),
        8 => Some([byte(0)?, byte(2)?, byte(4)?, byte(6)?]),
        _ => None,
    }
}
