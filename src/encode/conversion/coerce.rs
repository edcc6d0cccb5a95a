use super::MetadataConverterImpl;
use crate::core::value::{MetadataComponentType, MetadataType, MetadataValue};
use crate::description::{MetadataEncodingDetails, PropertyTablePropertyDescription};

/// Casts values to the encoded type.
///
/// Scalars and booleans are broadcast to every component of a vector.
/// Vectors are truncated or zero-padded to the encoded arity. Strings are
/// parsed as a number or a list of numbers and become zero when that fails.
/// Fixed-length arrays put one element in each channel.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Coerce;

impl MetadataConverterImpl for Coerce {
    fn can_encode(&self, description: &PropertyTablePropertyDescription) -> bool {
        let details = &description.property_details;

        if details.is_array {
            return details.array_size > 0
                && (details.ty == MetadataType::Boolean
                    || (details.ty == MetadataType::Scalar && details.component_type != MetadataComponentType::None));
        }

        match details.ty {
            MetadataType::Boolean | MetadataType::String => true,
            _ if details.component_type == MetadataComponentType::None => false,
            MetadataType::Scalar => true,
            // Vectors can change arity but cannot become scalars.
            ty if ty.is_vecn() => description.encoding_details.ty.is_vecn(),
            _ => false,
        }
    }

    fn convert(&self, encoding: &MetadataEncodingDetails, value: &MetadataValue) -> [f64; 4] {
        let n = encoding.ty.num_components().min(4);
        let mut out = [0.0; 4];

        match value {
            MetadataValue::Boolean(_) | MetadataValue::Int(_) | MetadataValue::UInt(_) | MetadataValue::Float(_) => {
                let x = value.as_f64().unwrap_or(0.0);
                out[..n].fill(x);
            }
            MetadataValue::String(s) => match parse_numbers(s).as_deref() {
                Some([x]) => out[..n].fill(*x),
                Some(values) => copy_prefix(&mut out[..n], values),
                None => {}
            },
            MetadataValue::Vector(components) => copy_prefix(&mut out[..n], components),
            MetadataValue::Array(items) => {
                for (dst, item) in out[..n].iter_mut().zip(items) {
                    *dst = item.as_f64().unwrap_or(0.0);
                }
            }
            MetadataValue::Empty | MetadataValue::Matrix(_) => {}
        }
        out
    }
}

fn copy_prefix(dst: &mut [f64], src: &[f64]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d = *s;
    }
}

/// Parses `"1.5"`, `"1, 2, 3"` or `"(1 2)"`. Any unparsable token fails the
/// whole string.
fn parse_numbers(s: &str) -> Option<Vec<f64>> {
    let values = s
        .split(|c: char| c == ',' || c == '(' || c == ')' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| token.parse::<f64>().ok())
        .collect::<Option<Vec<_>>>()?;
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}
