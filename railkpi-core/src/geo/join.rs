//! Join tabular rows to boundary features by normalized region name.
//!
//! Two views of the same join:
//! - [`join_rows`] is row-centric: every row is kept, unmatched rows carry no
//!   feature and are styled muted.
//! - [`feature_fills`] is feature-centric: every feature gets a fill, muted
//!   when no row names it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

use super::feature::{BoundaryIndex, FeatureCollection};
use super::normalize::normalize_name;

/// Fill colour for features and rows with no counterpart.
pub const MUTED_COLOR: &str = "#2f2f2f";

/// Fill colour for matched features the palette does not name.
pub const DEFAULT_MATCHED_COLOR: &str = "#3BA55D";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillStyle {
    Matched,
    Muted,
}

/// A row with its join result.
#[derive(Debug, Clone, PartialEq)]
pub struct Joined<R> {
    pub geo_id: String,
    pub row: R,
    /// Index into the collection's features, `None` when unmatched.
    pub feature: Option<usize>,
    pub style: FillStyle,
}

impl<R> Joined<R> {
    pub fn is_matched(&self) -> bool {
        self.feature.is_some()
    }
}

/// Region colours keyed by normalized identifier.
///
/// Matched regions without an entry get [`DEFAULT_MATCHED_COLOR`]; unmatched
/// ones get [`MUTED_COLOR`].
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: HashMap<String, String>,
}

impl Default for Palette {
    /// The three focus provinces of the leading-indicator map.
    fn default() -> Self {
        Self::new()
            .with("Sumatera Utara", "#90EE90")
            .with("Jawa Barat", "#E5FF00")
            .with("Jawa Tengah", "#FF4C4C")
    }
}

impl Palette {
    /// An empty palette: every matched region gets the default matched colour.
    pub fn new() -> Self {
        Self {
            colors: HashMap::new(),
        }
    }

    /// Add a colour for a region; the name is normalized.
    pub fn with(mut self, region: &str, color: impl Into<String>) -> Self {
        self.colors.insert(normalize_name(region), color.into());
        self
    }

    /// Colour for an identifier; muted when unmatched.
    pub fn fill(&self, geo_id: &str, style: FillStyle) -> &str {
        match style {
            FillStyle::Muted => MUTED_COLOR,
            FillStyle::Matched => self
                .colors
                .get(geo_id)
                .map_or(DEFAULT_MATCHED_COLOR, String::as_str),
        }
    }
}

/// Attach each row to the feature its region name normalizes to.
pub fn join_rows<R, F>(rows: impl IntoIterator<Item = R>, region_of: F, index: &BoundaryIndex) -> Vec<Joined<R>>
where
    F: Fn(&R) -> &str,
{
    let joined: Vec<Joined<R>> = rows
        .into_iter()
        .map(|row| {
            let geo_id = normalize_name(region_of(&row));
            let feature = index.lookup_id(&geo_id);
            let style = if feature.is_some() {
                FillStyle::Matched
            } else {
                FillStyle::Muted
            };
            Joined {
                geo_id,
                row,
                feature,
                style,
            }
        })
        .collect();

    let unmatched = joined.iter().filter(|j| !j.is_matched()).count();
    if unmatched > 0 {
        warn!(unmatched, total = joined.len(), "rows without a matching boundary feature");
    }
    joined
}

/// Fill for one boundary feature.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFill<'r, R> {
    pub feature: usize,
    pub geo_id: String,
    pub name: String,
    /// Rows naming this feature, in input order.
    pub rows: Vec<&'r R>,
    pub style: FillStyle,
    pub color: String,
}

/// Left join of features to rows, one fill per feature.
pub fn feature_fills<'r, R, F>(
    collection: &FeatureCollection,
    rows: &'r [R],
    region_of: F,
    palette: &Palette,
) -> Vec<FeatureFill<'r, R>>
where
    F: Fn(&R) -> &str,
{
    let mut by_id: HashMap<String, Vec<&'r R>> = HashMap::new();
    for row in rows {
        by_id.entry(normalize_name(region_of(row))).or_default().push(row);
    }

    collection
        .features
        .iter()
        .enumerate()
        .map(|(i, feature)| {
            let geo_id = feature.identifier();
            let rows = if geo_id.is_empty() {
                Vec::new()
            } else {
                by_id.get(&geo_id).cloned().unwrap_or_default()
            };
            let style = if rows.is_empty() {
                FillStyle::Muted
            } else {
                FillStyle::Matched
            };
            FeatureFill {
                feature: i,
                color: palette.fill(&geo_id, style).to_string(),
                name: feature.display_name(),
                geo_id,
                rows,
                style,
            }
        })
        .collect()
}
