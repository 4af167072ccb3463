pub mod feature;
pub mod join;
pub mod normalize;
pub mod source;

pub use feature::{BoundaryIndex, Feature, FeatureCollection, Geometry, Position, NAME_KEYS};
pub use join::{
    feature_fills, join_rows, FeatureFill, FillStyle, Joined, Palette, DEFAULT_MATCHED_COLOR,
    MUTED_COLOR,
};
pub use normalize::normalize_name;
pub use source::{
    source_for, source_with_settings, BoundarySource, FileBoundarySource, GeoError,
    HttpBoundarySource, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT, MAX_RETRIES_LIMIT,
};
