//! Partition naming: `{product}-v{N}-{purpose}`.

use serde::{Deserialize, Serialize};

/// What a partition stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    Static,
    Dynamic,
    Images,
    Api,
}

impl Purpose {
    pub const ALL: [Purpose; 4] = [Purpose::Static, Purpose::Dynamic, Purpose::Images, Purpose::Api];

    pub fn as_str(self) -> &'static str {
        match self {
            Purpose::Static => "static",
            Purpose::Dynamic => "dynamic",
            Purpose::Images => "images",
            Purpose::Api => "api",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == s)
    }
}

/// Fully qualified partition name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartitionName {
    pub product: String,
    pub version: u32,
    pub purpose: Purpose,
}

impl PartitionName {
    pub fn new(product: &str, version: u32, purpose: Purpose) -> Self {
        Self { product: product.to_string(), version, purpose }
    }

    /// Parse a partition name.
    ///
    /// Returns `None` for names that do not follow the scheme, which keeps
    /// partitions owned by other applications out of every sweep.
    pub fn parse(name: &str) -> Option<Self> {
        let (rest, purpose) = name.rsplit_once('-')?;
        let purpose = Purpose::parse(purpose)?;
        let (product, version) = rest.rsplit_once("-v")?;
        if product.is_empty() || version.is_empty() || !version.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let version = version.parse().ok()?;
        Some(Self { product: product.to_string(), version, purpose })
    }
}

impl std::fmt::Display for PartitionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-v{}-{}", self.product, self.version, self.purpose.as_str())
    }
}

/// Whether `name` follows the naming scheme and belongs to `product`.
///
/// A name only starting with the product (`wayfarer-admin-v1-static`,
/// `wayfarer-tiles`) is not ours.
pub fn is_owned(name: &str, product: &str) -> bool {
    PartitionName::parse(name).is_some_and(|p| p.product == product)
}

/// Whether `name` is one of `product`'s partitions for `version`.
pub fn is_current(name: &str, product: &str, version: u32) -> bool {
    PartitionName::parse(name).is_some_and(|p| p.product == product && p.version == version)
}

/// Whether `name` belongs to `product` but to a version other than `version`.
pub fn is_stale(name: &str, product: &str, version: u32) -> bool {
    PartitionName::parse(name).is_some_and(|p| p.product == product && p.version != version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let name = PartitionName::new("wayfarer", 2, Purpose::Images);
        assert_eq!(name.to_string(), "wayfarer-v2-images");
    }

    #[test]
    fn test_parse_valid() {
        let name = PartitionName::parse("wayfarer-v12-api").unwrap();
        assert_eq!(name.product, "wayfarer");
        assert_eq!(name.version, 12);
        assert_eq!(name.purpose, Purpose::Api);
    }

    #[test]
    fn test_parse_product_with_dash() {
        let name = PartitionName::parse("travel-site-v1-static").unwrap();
        assert_eq!(name.product, "travel-site");
        assert_eq!(name.version, 1);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(PartitionName::parse("wayfarer-v1-thumbnails").is_none());
        assert!(PartitionName::parse("wayfarer-1-api").is_none());
        assert!(PartitionName::parse("wayfarer-vx-api").is_none());
        assert!(PartitionName::parse("static").is_none());
    }

    #[test]
    fn test_is_stale() {
        assert!(is_stale("wayfarer-v1-static", "wayfarer", 2));
        assert!(!is_stale("wayfarer-v2-static", "wayfarer", 2));
        assert!(!is_stale("other-v1-static", "wayfarer", 2));
    }

    #[test]
    fn test_is_stale_version_prefix_boundary() {
        assert!(is_stale("wayfarer-v10-api", "wayfarer", 1));
        assert!(is_stale("wayfarer-v1-api", "wayfarer", 10));
    }

    #[test]
    fn test_foreign_names_never_stale() {
        assert!(!is_stale("wayfarer-admin-v1-static", "wayfarer", 2));
        assert!(!is_stale("wayfarer-tiles", "wayfarer", 2));
        assert!(!is_stale("wayfarer-v1-thumbnails", "wayfarer", 2));
        assert!(!is_owned("wayfarer-admin-v2-static", "wayfarer"));
        assert!(is_owned("wayfarer-admin-v2-static", "wayfarer-admin"));
    }

    #[test]
    fn test_is_current() {
        assert!(is_current("wayfarer-v2-images", "wayfarer", 2));
        assert!(!is_current("wayfarer-v20-images", "wayfarer", 2));
        assert!(!is_current("wayfarer-admin-v2-images", "wayfarer", 2));
    }
}
