// lib.rs

/// Contains the live feature ID and structural metadata objects, source
/// images and encoded texture handles.
pub mod core;

/// Defines the description of what to encode, loadable from JSON.
pub mod description;

/// Defines the two-phase encoders.
pub mod encode;

/// Contains the owner-thread side: the texture backend interface and
/// texture realization.
pub mod realize;

/// Moves encoded output from worker threads to the owner thread.
pub mod driver;

/// Contains the most commonly used traits, types, and functions.
pub mod prelude {
    pub use crate::core::features::{
        FeatureIdAttribute, FeatureIdAttributeStatus, FeatureIdSet, FeatureIdSetKind, FeatureIdTexture,
        FeatureIdTextureStatus, PrimitiveFeatures,
    };
    pub use crate::core::structural_metadata::{
        ModelMetadata, PrimitiveMetadata, PropertyTable, PropertyTableProperty, PropertyTablePropertyStatus,
        PropertyTexture, PropertyTextureProperty,
    };
    pub use crate::core::texture::{
        EncodedTexture, Image, PixelFormat, SharedTexture, TextureDescriptor, TextureResourceId,
    };
    pub use crate::core::value::{MetadataComponentType, MetadataType, MetadataValue, MetadataValueType};
    pub use crate::description::FeaturesMetadataDescription;
    pub use crate::driver::{owner_thread_channel, JobSender, OwnerThreadQueue, RealizedJob};
    pub use crate::encode::{self, encode_any_thread, EncodedFeaturesMetadata};
    pub use crate::realize::{Realize, TextureBackend};
}
