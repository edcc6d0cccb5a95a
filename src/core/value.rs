use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The type of a metadata property, as declared by its class in the schema.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum MetadataType {
    #[default]
    Invalid,
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
    Boolean,
    Enum,
    String,
}

impl MetadataType {
    /// Number of components of a single element, 0 for types without components.
    #[inline]
    pub fn num_components(self) -> usize {
        match self {
            MetadataType::Scalar | MetadataType::Boolean | MetadataType::Enum => 1,
            MetadataType::Vec2 => 2,
            MetadataType::Vec3 => 3,
            MetadataType::Vec4 | MetadataType::Mat2 => 4,
            MetadataType::Mat3 => 9,
            MetadataType::Mat4 => 16,
            MetadataType::Invalid | MetadataType::String => 0,
        }
    }

    #[inline]
    pub fn is_vecn(self) -> bool {
        matches!(self, MetadataType::Vec2 | MetadataType::Vec3 | MetadataType::Vec4)
    }

    #[inline]
    pub fn is_matn(self) -> bool {
        matches!(self, MetadataType::Mat2 | MetadataType::Mat3 | MetadataType::Mat4)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum MetadataComponentType {
    #[default]
    None,
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Int64,
    Uint64,
    Float32,
    Float64,
}

/// Full value type of a property: element type, component type and arrayness.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct MetadataValueType {
    #[serde(rename = "type")]
    pub ty: MetadataType,
    pub component_type: MetadataComponentType,
    pub is_array: bool,
}

impl MetadataValueType {
    pub fn new(ty: MetadataType, component_type: MetadataComponentType, is_array: bool) -> Self {
        Self { ty, component_type, is_array }
    }
}

/// A single decoded metadata value. Numeric vectors and matrices keep their
/// components in logical order (x, y, z, w / column-major).
#[derive(Clone, Debug, Default, PartialEq)]
pub enum MetadataValue {
    #[default]
    Empty,
    Boolean(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Vector(Vec<f64>),
    Matrix(Vec<f64>),
    String(String),
    Array(Vec<MetadataValue>),
}

impl MetadataValue {
    /// Interprets the value as a single number. Booleans map to 0/1 and strings
    /// are parsed; everything else yields `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetadataValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            MetadataValue::Int(v) => Some(*v as f64),
            MetadataValue::UInt(v) => Some(*v as f64),
            MetadataValue::Float(v) => Some(*v),
            MetadataValue::String(s) => s.trim().parse::<f64>().ok(),
            MetadataValue::Empty
            | MetadataValue::Vector(_)
            | MetadataValue::Matrix(_)
            | MetadataValue::Array(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, MetadataValue::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_counts() {
        assert_eq!(MetadataType::Scalar.num_components(), 1);
        assert_eq!(MetadataType::Vec3.num_components(), 3);
        assert_eq!(MetadataType::Mat3.num_components(), 9);
        assert_eq!(MetadataType::String.num_components(), 0);
        assert!(MetadataType::Vec2.is_vecn());
        assert!(!MetadataType::Mat2.is_vecn());
        assert!(MetadataType::Mat4.is_matn());
    }

    #[test]
    fn numeric_interpretation() {
        assert_eq!(MetadataValue::Boolean(true).as_f64(), Some(1.0));
        assert_eq!(MetadataValue::Int(-3).as_f64(), Some(-3.0));
        assert_eq!(MetadataValue::String(" 2.5 ".to_string()).as_f64(), Some(2.5));
        assert_eq!(MetadataValue::String("abc".to_string()).as_f64(), None);
        assert_eq!(MetadataValue::Vector(vec![1.0, 2.0]).as_f64(), None);
        assert!(MetadataValue::Empty.is_empty());
    }

    #[test]
    fn value_type_from_json() {
        let ty: MetadataValueType = serde_json::from_str(
            r#"{ "type": "Vec3", "componentType": "Float32" }"#
        ).unwrap();
        assert_eq!(ty, MetadataValueType::new(MetadataType::Vec3, MetadataComponentType::Float32, false));
    }
}
