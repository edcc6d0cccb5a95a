//! Deterministic names for encoded items. These names are the keys a shader
//! or material uses to bind the encoded data.

use crate::core::features::{FeatureIdAttributeStatus, FeatureIdSet, FeatureIdSetKind};
use crate::core::structural_metadata::{PropertyTable, PropertyTexture};

pub const FEATURE_ID_ATTRIBUTE_PREFIX: &str = "_FEATURE_ID_";
pub const FEATURE_ID_TEXTURE_PREFIX: &str = "_FEATURE_ID_TEXTURE_";
pub const IMPLICIT_FEATURE_ID_NAME: &str = "_IMPLICIT_FEATURE_ID";
pub const MATERIAL_PROPERTY_TABLE_PREFIX: &str = "PTABLE_";

/// Returns the name a feature ID set is matched against.
///
/// The label wins when present. Otherwise attributes are named after their
/// attribute index, textures after `texture_counter` (which is then
/// incremented), and implicit sets get a fixed name. Sets that fit none of
/// these get an empty name and will not match any description.
pub fn name_for_feature_id_set(set: &FeatureIdSet, texture_counter: &mut usize) -> String {
    if !set.get_label().is_empty() {
        return set.get_label().to_owned();
    }

    match set.get_kind() {
        FeatureIdSetKind::Attribute(attribute)
            if attribute.get_status() == FeatureIdAttributeStatus::Valid =>
        {
            format!("{}{}", FEATURE_ID_ATTRIBUTE_PREFIX, attribute.get_attribute_index())
        }
        FeatureIdSetKind::Texture(_) => {
            let name = format!("{}{}", FEATURE_ID_TEXTURE_PREFIX, texture_counter);
            *texture_counter += 1;
            name
        }
        FeatureIdSetKind::Implicit => IMPLICIT_FEATURE_ID_NAME.to_owned(),
        FeatureIdSetKind::Attribute(_) | FeatureIdSetKind::None => String::new(),
    }
}

/// The table's name, or its class name when it has none.
pub fn name_for_property_table(table: &PropertyTable) -> String {
    if table.get_name().is_empty() {
        table.get_class_name().to_owned()
    } else {
        table.get_name().to_owned()
    }
}

pub fn name_for_property_texture(texture: &PropertyTexture) -> String {
    if texture.get_name().is_empty() {
        texture.get_class_name().to_owned()
    } else {
        texture.get_name().to_owned()
    }
}

#[inline]
fn is_identifier_head(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

#[inline]
fn is_identifier_tail(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Turns `raw` into a valid shader identifier.
///
/// Empty (or whitespace-only) names become `"_"`. A `_` is prepended when the
/// first character cannot start an identifier, and every remaining character
/// that cannot appear in one is replaced by `_`. Clashes created by the
/// replacement are not resolved.
pub fn safe_identifier(raw: &str) -> String {
    if raw.trim().is_empty() {
        return "_".to_owned();
    }

    let mut chars = raw.chars();
    let Some(head) = chars.next() else {
        return "_".to_owned();
    };
    let mut safe = String::with_capacity(raw.len() + 1);
    if is_identifier_head(head) {
        safe.push(head);
    } else {
        safe.push('_');
        safe.push(if is_identifier_tail(head) { head } else { '_' });
    }
    safe.extend(chars.map(|c| if is_identifier_tail(c) { c } else { '_' }));
    safe
}

/// Binding key of a property table property, e.g. `PTABLE_houses_roofColor`.
pub fn material_property_name(property_table_name: &str, property_name: &str) -> String {
    format!("{}{}_{}", MATERIAL_PROPERTY_TABLE_PREFIX, property_table_name, property_name)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::features::{FeatureIdAttribute, FeatureIdTexture, FeatureIdTextureStatus};
    use crate::core::texture::Image;

    fn texture_set() -> FeatureIdSet {
        let img = Arc::new(Image::from_rgba8(1, 1, vec![0; 4]));
        FeatureIdSet::new(FeatureIdSetKind::Texture(FeatureIdTexture::new(img, vec![0], 0)), 1)
    }

    #[test]
    fn label_wins() {
        let mut set = texture_set();
        set.set_label("my_label");
        let mut counter = 0;
        assert_eq!(name_for_feature_id_set(&set, &mut counter), "my_label");
        assert_eq!(counter, 0);
    }

    #[test]
    fn generated_names() {
        let mut counter = 0;
        let attribute = FeatureIdSet::new(
            FeatureIdSetKind::Attribute(FeatureIdAttribute::new(3, FeatureIdAttributeStatus::Valid)),
            1,
        );
        assert_eq!(name_for_feature_id_set(&attribute, &mut counter), "_FEATURE_ID_3");

        let invalid_attribute = FeatureIdSet::new(
            FeatureIdSetKind::Attribute(FeatureIdAttribute::new(3, FeatureIdAttributeStatus::ErrorInvalidAccessor)),
            1,
        );
        assert_eq!(name_for_feature_id_set(&invalid_attribute, &mut counter), "");

        assert_eq!(name_for_feature_id_set(&texture_set(), &mut counter), "_FEATURE_ID_TEXTURE_0");
        assert_eq!(name_for_feature_id_set(&texture_set(), &mut counter), "_FEATURE_ID_TEXTURE_1");
        assert_eq!(counter, 2);

        // Invalid textures still consume a counter slot.
        let invalid_texture = FeatureIdSet::new(
            FeatureIdSetKind::Texture(FeatureIdTexture::invalid(FeatureIdTextureStatus::ErrorInvalidTexture)),
            1,
        );
        assert_eq!(name_for_feature_id_set(&invalid_texture, &mut counter), "_FEATURE_ID_TEXTURE_2");

        let implicit = FeatureIdSet::new(FeatureIdSetKind::Implicit, 1);
        assert_eq!(name_for_feature_id_set(&implicit, &mut counter), IMPLICIT_FEATURE_ID_NAME);

        let none = FeatureIdSet::new(FeatureIdSetKind::None, 0);
        assert_eq!(name_for_feature_id_set(&none, &mut counter), "");
        assert_eq!(counter, 3);
    }

    #[test]
    fn property_table_name_falls_back_to_class() {
        assert_eq!(name_for_property_table(&PropertyTable::new("houses", "House", 1)), "houses");
        assert_eq!(name_for_property_table(&PropertyTable::new("", "House", 1)), "House");
        assert_eq!(name_for_property_texture(&PropertyTexture::new("", "Soil")), "Soil");
    }

    #[test]
    fn safe_identifier_empty_and_whitespace() {
        assert_eq!(safe_identifier(""), "_");
        assert_eq!(safe_identifier(" "), "_");
        assert_eq!(safe_identifier("\t  \n"), "_");
    }

    #[test]
    fn safe_identifier_leading_digit() {
        assert_eq!(safe_identifier("1abc"), "_1abc");
        assert_eq!(safe_identifier("9_lives"), "_9_lives");
        assert_eq!(safe_identifier("0"), "_0");
    }

    #[test]
    fn safe_identifier_replaces_tail() {
        assert_eq!(safe_identifier("roof color"), "roof_color");
        assert_eq!(safe_identifier("a-b.c"), "a_b_c");
        assert_eq!(safe_identifier("-x"), "__x");
        assert_eq!(safe_identifier("höhe"), "h_he");
        assert_eq!(safe_identifier("already_safe_9"), "already_safe_9");
    }

    #[test]
    fn material_name() {
        assert_eq!(material_property_name("houses", "roofColor"), "PTABLE_houses_roofColor");
    }
}
