use std::sync::Arc;

use crate::core::texture::Image;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FeatureIdAttributeStatus {
    Valid,
    ErrorInvalidAttribute,
    ErrorInvalidAccessor,
}

/// Feature IDs stored in a vertex attribute (`_FEATURE_ID_n`).
#[derive(Clone, Debug)]
pub struct FeatureIdAttribute {
    attribute_index: i64,
    status: FeatureIdAttributeStatus,
}

impl FeatureIdAttribute {
    pub fn new(attribute_index: i64, status: FeatureIdAttributeStatus) -> Self {
        Self { attribute_index, status }
    }

    pub fn get_attribute_index(&self) -> i64 { self.attribute_index }
    pub fn get_status(&self) -> FeatureIdAttributeStatus { self.status }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FeatureIdTextureStatus {
    Valid,
    ErrorInvalidTexture,
    ErrorInvalidTextureAccess,
}

/// Feature IDs stored in the channels of an image.
#[derive(Clone, Debug)]
pub struct FeatureIdTexture {
    image: Option<Arc<Image>>,
    channels: Vec<i64>,
    tex_coord_set_index: i64,
    status: FeatureIdTextureStatus,
}

impl FeatureIdTexture {
    pub fn new(image: Arc<Image>, channels: Vec<i64>, tex_coord_set_index: i64) -> Self {
        Self {
            image: Some(image),
            channels,
            tex_coord_set_index,
            status: FeatureIdTextureStatus::Valid,
        }
    }

    /// A texture whose image or sampler could not be resolved.
    pub fn invalid(status: FeatureIdTextureStatus) -> Self {
        Self { image: None, channels: Vec::new(), tex_coord_set_index: -1, status }
    }

    pub fn get_image(&self) -> Option<&Arc<Image>> { self.image.as_ref() }
    pub fn get_channels(&self) -> &[i64] { &self.channels }
    pub fn get_tex_coord_set_index(&self) -> i64 { self.tex_coord_set_index }

    /// A texture without an image is never valid, whatever status it was given.
    pub fn get_status(&self) -> FeatureIdTextureStatus {
        match self.image {
            Some(_) => self.status,
            None if self.status == FeatureIdTextureStatus::Valid => FeatureIdTextureStatus::ErrorInvalidTexture,
            None => self.status,
        }
    }
}

/// Where the feature IDs of a set come from.
#[derive(Clone, Debug)]
pub enum FeatureIdSetKind {
    Attribute(FeatureIdAttribute),
    Texture(FeatureIdTexture),
    /// Feature ID equals the vertex index.
    Implicit,
    /// The set could not be constructed from the source model.
    None,
}

#[derive(Clone, Debug)]
pub struct FeatureIdSet {
    kind: FeatureIdSetKind,
    label: String,
    feature_count: i64,
    null_feature_id: Option<i64>,
    property_table_index: Option<usize>,
}

impl FeatureIdSet {
    pub fn new(kind: FeatureIdSetKind, feature_count: i64) -> Self {
        Self {
            kind,
            label: String::new(),
            feature_count,
            null_feature_id: None,
            property_table_index: None,
        }
    }

    pub fn set_label(&mut self, label: &str) {
        self.label = label.to_owned();
    }

    pub fn get_label(&self) -> &str {
        &self.label
    }

    pub fn get_kind(&self) -> &FeatureIdSetKind {
        &self.kind
    }

    pub fn get_feature_count(&self) -> i64 {
        self.feature_count
    }

    pub fn set_null_feature_id(&mut self, id: i64) {
        self.null_feature_id = Some(id);
    }

    pub fn get_null_feature_id(&self) -> Option<i64> {
        self.null_feature_id
    }

    pub fn set_property_table_index(&mut self, index: usize) {
        self.property_table_index = Some(index);
    }

    pub fn get_property_table_index(&self) -> Option<usize> {
        self.property_table_index
    }
}

/// The feature ID sets of one mesh primitive, in declaration order.
#[derive(Clone, Debug, Default)]
pub struct PrimitiveFeatures {
    feature_id_sets: Vec<FeatureIdSet>,
}

impl PrimitiveFeatures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a feature ID set and returns its index.
    pub fn add_feature_id_set(&mut self, set: FeatureIdSet) -> usize {
        self.feature_id_sets.push(set);
        self.feature_id_sets.len() - 1
    }

    pub fn feature_id_sets(&self) -> &[FeatureIdSet] {
        &self.feature_id_sets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texture_without_image_is_invalid() {
        let tex = FeatureIdTexture::invalid(FeatureIdTextureStatus::Valid);
        assert_eq!(tex.get_status(), FeatureIdTextureStatus::ErrorInvalidTexture);

        let img = Arc::new(Image::from_rgba8(1, 1, vec![0; 4]));
        let tex = FeatureIdTexture::new(img, vec![0], 0);
        assert_eq!(tex.get_status(), FeatureIdTextureStatus::Valid);
    }

    #[test]
    fn set_accessors() {
        let mut set = FeatureIdSet::new(FeatureIdSetKind::Implicit, 10);
        assert_eq!(set.get_null_feature_id(), None);
        set.set_label("buildings");
        set.set_null_feature_id(0);
        set.set_property_table_index(2);
        assert_eq!(set.get_label(), "buildings");
        assert_eq!(set.get_null_feature_id(), Some(0));
        assert_eq!(set.get_property_table_index(), Some(2));
        assert_eq!(set.get_feature_count(), 10);

        let mut features = PrimitiveFeatures::new();
        assert_eq!(features.add_feature_id_set(set.clone()), 0);
        assert_eq!(features.add_feature_id_set(set), 1);
        assert_eq!(features.feature_id_sets().len(), 2);
    }
}
