//! Request classification.
//!
//! Maps an intercepted request to the category that picks its cache
//! strategy. Checks run in a fixed order and the first match wins:
//! image, api, static-asset, then dynamic-page as the fallback. A path under
//! the API prefix that ends in an image extension is therefore an image.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::cache::Purpose;
use crate::config::RouteConfig;

static IMAGE_EXTENSIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(jpg|jpeg|png|gif|webp|avif|svg|ico)$").expect("invalid regex"));

static STATIC_EXTENSIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(js|css|woff|woff2|ttf|eot)$").expect("invalid regex"));

/// Request category, one per cache strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Image,
    Api,
    StaticAsset,
    DynamicPage,
}

impl Category {
    /// Partition purpose that stores responses of this category.
    pub fn purpose(self) -> Purpose {
        match self {
            Category::Image => Purpose::Images,
            Category::Api => Purpose::Api,
            Category::StaticAsset => Purpose::Static,
            Category::DynamicPage => Purpose::Dynamic,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Image => "image",
            Category::Api => "api",
            Category::StaticAsset => "static-asset",
            Category::DynamicPage => "dynamic-page",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// URL-pattern classifier built from the route configuration.
#[derive(Debug, Clone)]
pub struct Classifier {
    api_prefixes: Vec<String>,
    api_markers: Vec<String>,
    static_prefixes: Vec<String>,
}

impl Classifier {
    pub fn new(routes: &RouteConfig) -> Self {
        Self {
            api_prefixes: routes.api_prefixes.clone(),
            api_markers: routes.api_markers.clone(),
            static_prefixes: routes.static_prefixes.clone(),
        }
    }

    /// Classify a URL. Pure; never touches the network or the cache.
    pub fn classify(&self, url: &Url) -> Category {
        let path = url.path();

        if IMAGE_EXTENSIONS.is_match(path) {
            return Category::Image;
        }

        if self.api_prefixes.iter().any(|p| path.starts_with(p.as_str()))
            || self.api_markers.iter().any(|m| url.as_str().contains(m.as_str()))
        {
            return Category::Api;
        }

        if self.static_prefixes.iter().any(|p| path.starts_with(p.as_str())) || STATIC_EXTENSIONS.is_match(path) {
            return Category::StaticAsset;
        }

        Category::DynamicPage
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&RouteConfig::default())
    }
}
