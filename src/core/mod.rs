/// Decoded metadata values and their declared types.
pub mod value;

/// Feature ID sets of a mesh primitive (EXT_mesh_features).
pub mod features;

/// Property tables and property textures (EXT_structural_metadata).
pub mod structural_metadata;

/// Source images, pixel formats and encoded texture handles.
pub mod texture;
