//! Delivery URL parsing
//!
//! Media assets live in an external store that serves them through delivery
//! URLs shaped like:
//!
//! ```text
//! <base>/upload/[<transformations>/][v<digits>/]<folder>/<name>.<ext>
//! ```
//!
//! Only `<folder>/<name>` is stable. Transformation and version segments are
//! delivery noise and may differ between two URLs that point at the same
//! asset, so they are stripped before the identifier is used as a delete key.
//!
//! # Example
//!
//! ```
//! use orb_common::asset::AssetResolver;
//!
//! let resolver = AssetResolver::default();
//! let id = resolver
//!     .resolve("https://res.cloudinary.com/demo/image/upload/f_auto,q_auto/v123/menus/pizza.png")
//!     .map(|id| id.to_string());
//! assert_eq!(id.as_deref(), Some("menus/pizza"));
//!
//! // URLs that are not served by the store are simply not applicable.
//! assert!(resolver.resolve("https://example.com/pizza.png").is_none());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker every delivery URL of the store contains.
pub const DEFAULT_STORE_MARKER: &str = "cloudinary.com";

/// Boundary between the delivery base and the asset path.
pub const UPLOAD_BOUNDARY: &str = "/upload/";

/// Transformation applied by [`AssetResolver::optimize`].
pub const OPTIMIZE_TRANSFORMATION: &str = "f_auto,q_auto";

/// Parameter keys that may open a transformation component (`w_300`, `c_fill`, ...).
const TRANSFORMATION_KEYS: &[&str] = &[
    "a", "ac", "af", "ar", "b", "bo", "br", "c", "co", "cs", "d", "dl", "dn", "dpr", "du", "e",
    "eo", "f", "fl", "fn", "fps", "g", "h", "if", "ki", "l", "o", "p", "pg", "q", "r", "so", "sp",
    "t", "u", "vc", "vs", "w", "x", "y", "z",
];

/// Stable, extension-free key of an asset inside the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AssetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Recovers asset identifiers from delivery URLs.
///
/// The resolver is pure and cheap to clone; it only carries the marker used
/// to recognise URLs that belong to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResolver {
    marker: String,
}

impl Default for AssetResolver {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_MARKER)
    }
}

impl AssetResolver {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    /// Resolve a delivery URL to its asset identifier.
    ///
    /// Returns `None` for anything that is not a well-formed delivery URL of
    /// the store: a missing marker, a missing or repeated `/upload/`
    /// boundary, or an empty asset path. None of these are errors.
    pub fn resolve(&self, url: &str) -> Option<AssetId> {
        if self.marker.is_empty() || !url.contains(self.marker.as_str()) {
            return None;
        }

        let tail = split_at_boundary(url)?.1;
        let tail = tail.split(['?', '#']).next().unwrap_or_default();
        if tail.is_empty() {
            return None;
        }

        let segments: Vec<&str> = tail.split('/').collect();
        let last = segments.len() - 1;

        // The last segment is the file itself and is never stripped. A version
        // marker ends the delivery prefix, whatever precedes it (transformations,
        // signatures). Without one only recognisable transformations go.
        let start = match segments[..last].iter().position(|s| is_version_segment(s)) {
            Some(idx) => idx + 1,
            None => segments[..last]
                .iter()
                .take_while(|s| is_transformation_segment(s))
                .count(),
        };

        // A bare version with no file behind it leaves nothing to address.
        let start = if is_version_segment(segments[start]) { start + 1 } else { start };

        let remaining = &segments[start..];
        let (file, folders) = remaining.split_last()?;
        let stem = match file.rfind('.') {
            Some(idx) => &file[..idx],
            None => file,
        };

        let mut id = folders.join("/");
        if !id.is_empty() {
            id.push('/');
        }
        id.push_str(stem);

        if id.is_empty() || id.ends_with('/') {
            return None;
        }

        Some(AssetId(id))
    }

    /// Insert the automatic format/quality transformation (and an optional
    /// width) right after the `/upload/` boundary.
    ///
    /// URLs that do not belong to the store, or that cannot be split cleanly
    /// at the boundary, are returned unchanged.
    pub fn optimize(&self, url: &str, width: Option<u32>) -> String {
        if self.marker.is_empty() || !url.contains(self.marker.as_str()) {
            return url.to_string();
        }

        let Some((base, tail)) = split_at_boundary(url) else {
            return url.to_string();
        };

        let mut transformation = OPTIMIZE_TRANSFORMATION.to_string();
        if let Some(width) = width {
            transformation.push_str(&format!(",w_{}", width));
        }

        format!("{}{}{}/{}", base, UPLOAD_BOUNDARY, transformation, tail)
    }
}

/// Resolve with the default store marker.
pub fn resolve_asset_id(url: &str) -> Option<AssetId> {
    AssetResolver::default().resolve(url)
}

/// Optimize with the default store marker.
pub fn optimized_url(url: &str, width: Option<u32>) -> String {
    AssetResolver::default().optimize(url, width)
}

/// Split into exactly two parts at the upload boundary.
fn split_at_boundary(url: &str) -> Option<(&str, &str)> {
    let mut parts = url.split(UPLOAD_BOUNDARY);
    let base = parts.next()?;
    let tail = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some((base, tail))
}

/// `v` followed by one or more ASCII digits and nothing else.
fn is_version_segment(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Every comma-separated component is `<key>_<value>` with a known key, or a
/// user variable (`$name_value`).
fn is_transformation_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment.split(',').all(|component| {
            let Some((key, value)) = component.split_once('_') else {
                return false;
            };
            if value.is_empty() {
                return false;
            }
            key.starts_with('$') || TRANSFORMATION_KEYS.contains(&key)
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const BASE: &str = "https://res.cloudinary.com/orbfood/image/upload";

    fn id(url: &str) -> Option<String> {
        resolve_asset_id(url).map(AssetId::into_inner)
    }

    #[test]
    fn test_resolve_plain_folder_path() {
        assert_eq!(id(&format!("{}/folder/name.jpg", BASE)).as_deref(), Some("folder/name"));
    }

    #[test]
    fn test_resolve_strips_transformation_and_version() {
        let with_noise = format!("{}/f_auto,q_auto/v123/folder/name.png", BASE);
        let without = format!("{}/folder/name.png", BASE);
        assert_eq!(id(&with_noise).as_deref(), Some("folder/name"));
        assert_eq!(id(&with_noise), id(&without));
    }

    #[test]
    fn test_resolve_chained_transformations() {
        let url = format!("{}/c_fill,w_300,h_200/e_sepia/v99/orbfood/menus/soup.webp", BASE);
        assert_eq!(id(&url).as_deref(), Some("orbfood/menus/soup"));
    }

    #[test]
    fn test_resolve_signed_url() {
        let url = format!("{}/s--Ai4Znfl3--/v1/folder/name.jpg", BASE);
        assert_eq!(id(&url).as_deref(), Some("folder/name"));

        let url = format!("{}/s--Ai4Znfl3--/c_fill,w_300/v1712/orbfood/menus/soup.png", BASE);
        assert_eq!(id(&url).as_deref(), Some("orbfood/menus/soup"));
    }

    #[test]
    fn test_resolve_unknown_prefix_before_version() {
        let url = format!("{}/t_thumbnail_custom,xx_unknown/v3/shops/logo.png", BASE);
        assert_eq!(id(&url).as_deref(), Some("shops/logo"));
    }

    #[test]
    fn test_resolve_version_only() {
        let url = format!("{}/v1700000000/orbfood/shops/logo.png", BASE);
        assert_eq!(id(&url).as_deref(), Some("orbfood/shops/logo"));
    }

    #[test]
    fn test_resolve_single_segment_is_kept() {
        assert_eq!(id(&format!("{}/sample.jpg", BASE)).as_deref(), Some("sample"));
        // A file name that happens to look like a transformation is still the file.
        assert_eq!(id(&format!("{}/w_300.jpg", BASE)).as_deref(), Some("w_300"));
    }

    #[test]
    fn test_resolve_extension_uses_last_dot() {
        assert_eq!(id(&format!("{}/v1/a.b/name.jpg", BASE)).as_deref(), Some("a.b/name"));
        assert_eq!(id(&format!("{}/v1/name.tar.gz", BASE)).as_deref(), Some("name.tar"));
    }

    #[test]
    fn test_resolve_without_extension() {
        assert_eq!(id(&format!("{}/v2/folder/name", BASE)).as_deref(), Some("folder/name"));
    }

    #[test]
    fn test_resolve_ignores_query_string() {
        let url = format!("{}/v2/folder/name.jpg?_a=BAMAK+", BASE);
        assert_eq!(id(&url).as_deref(), Some("folder/name"));
    }

    #[test]
    fn test_resolve_without_marker() {
        assert_eq!(id("https://images.example.com/upload/v1/folder/name.jpg"), None);
        assert_eq!(id(""), None);
    }

    #[test]
    fn test_resolve_malformed_boundary() {
        assert_eq!(id("https://res.cloudinary.com/orbfood/image/folder/name.jpg"), None);
        assert_eq!(id(&format!("{}/", BASE)), None);
        assert_eq!(id(&format!("{}/v12", BASE)), None);
        assert_eq!(id(&format!("{}/a/upload/b.jpg", BASE)), None);
    }

    #[test]
    fn test_resolve_custom_marker() {
        let resolver = AssetResolver::new("https://x/");
        let resolved = resolver.resolve("https://x/upload/v10/b/ban2.png");
        assert_eq!(resolved.unwrap().as_str(), "b/ban2");
    }

    #[test]
    fn test_version_segment_detection() {
        assert!(is_version_segment("v1"));
        assert!(is_version_segment("v1700000000"));
        assert!(!is_version_segment("v"));
        assert!(!is_version_segment("v1a"));
        assert!(!is_version_segment("version"));
    }

    #[test]
    fn test_transformation_segment_detection() {
        assert!(is_transformation_segment("f_auto,q_auto"));
        assert!(is_transformation_segment("c_fill,w_300"));
        assert!(is_transformation_segment("$width_200"));
        assert!(!is_transformation_segment("orbfood"));
        assert!(!is_transformation_segment("my_folder"));
        assert!(!is_transformation_segment("w_"));
    }

    #[test]
    fn test_optimize_inserts_transformation() {
        let url = format!("{}/v1/menus/pizza.png", BASE);
        assert_eq!(
            optimized_url(&url, None),
            format!("{}/f_auto,q_auto/v1/menus/pizza.png", BASE)
        );
        assert_eq!(
            optimized_url(&url, Some(480)),
            format!("{}/f_auto,q_auto,w_480/v1/menus/pizza.png", BASE)
        );
    }

    #[test]
    fn test_optimize_leaves_foreign_urls() {
        let foreign = "https://example.com/upload/pizza.png";
        assert_eq!(optimized_url(foreign, Some(100)), foreign);

        let unsplittable = "https://res.cloudinary.com/orbfood/image/pizza.png";
        assert_eq!(optimized_url(unsplittable, None), unsplittable);
    }

    #[test]
    fn test_optimized_url_resolves_to_same_id() {
        let url = format!("{}/v1/menus/pizza.png", BASE);
        assert_eq!(id(&optimized_url(&url, Some(320))), id(&url));
    }

    #[test]
    fn test_asset_id_serializes_as_string() {
        let asset = resolve_asset_id(&format!("{}/v1/a/b.png", BASE)).unwrap();
        assert_eq!(serde_json::to_string(&asset).unwrap(), "\"a/b\"");
    }

    proptest! {
        #[test]
        fn prop_no_marker_never_resolves(url in "[a-z0-9:/._,-]{0,80}") {
            prop_assume!(!url.contains(DEFAULT_STORE_MARKER));
            prop_assert!(resolve_asset_id(&url).is_none());
        }

        #[test]
        fn prop_resolve_never_panics(tail in "\\PC{0,60}") {
            let _ = resolve_asset_id(&format!("{}/{}", BASE, tail));
        }

        #[test]
        fn prop_noise_does_not_change_id(
            folder in "[a-z]{3,8}",
            name in "[a-z0-9]{1,12}",
            version in 1u64..10_000_000_000,
            width in 1u32..4000,
        ) {
            let plain = format!("{}/{}/{}.jpg", BASE, folder, name);
            let noisy = format!("{}/c_scale,w_{}/v{}/{}/{}.jpg", BASE, width, version, folder, name);
            prop_assert_eq!(resolve_asset_id(&plain), resolve_asset_id(&noisy));
        }
    }
}
