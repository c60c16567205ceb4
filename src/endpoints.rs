//! Endpoint layout of the content-distribution API.
//!
//! [`ApiEndpoints`] owns the base URLs and builds every request URL the
//! exporter issues, so the rest of the crate never concatenates paths by hand.

use url::Url;

use crate::resolver::FileFormat;

/// Default authenticated service base.
pub const DEFAULT_API_BASE_URL: &str = "https://services.packtpub.com/";

/// Default static-content base (summaries, tables of contents, authors).
pub const DEFAULT_STATIC_BASE_URL: &str = "https://static.packt-cdn.com/";

/// Default web reader base used for "read online" links in summaries.
pub const DEFAULT_WEBREADER_BASE_URL: &str = "https://subscription.packtpub.com";

/// Default store base used for product links in summaries.
pub const DEFAULT_SHOP_BASE_URL: &str = "https://www.packtpub.com/product";

/// Default catalog sort order.
pub const DEFAULT_ORDER: &str = "createdAt:DESC";

const AUTH_PATH: &str = "auth-v1/users/tokens";
const PRODUCTS_PATH: &str = "entitlements-v1/users/me/products";

/// Error returned when a base URL cannot be parsed.
#[derive(Debug, thiserror::Error)]
#[error("invalid base URL '{input}': {source}")]
pub struct EndpointError {
    input: String,
    #[source]
    source: url::ParseError,
}

/// Base URLs plus URL builders for every endpoint used by the exporter.
#[derive(Debug, Clone)]
pub struct ApiEndpoints {
    api_base: Url,
    static_base: Url,
    webreader_base: String,
    shop_base: String,
}

impl Default for ApiEndpoints {
    #[allow(clippy::expect_used)]
    fn default() -> Self {
        Self {
            api_base: Url::parse(DEFAULT_API_BASE_URL).expect("static service base URL is valid"),
            static_base: Url::parse(DEFAULT_STATIC_BASE_URL)
                .expect("static content base URL is valid"),
            webreader_base: DEFAULT_WEBREADER_BASE_URL.to_string(),
            shop_base: DEFAULT_SHOP_BASE_URL.to_string(),
        }
    }
}

impl ApiEndpoints {
    /// Creates endpoints from explicit service and static base URLs.
    ///
    /// A trailing slash is added when missing so relative joins keep the
    /// base path.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError`] when either base is not a valid absolute URL.
    pub fn new(api_base: &str, static_base: &str) -> Result<Self, EndpointError> {
        Ok(Self {
            api_base: parse_base(api_base)?,
            static_base: parse_base(static_base)?,
            ..Self::default()
        })
    }

    /// Token exchange endpoint (POST).
    #[must_use]
    pub fn auth_url(&self) -> String {
        join(&self.api_base, AUTH_PATH)
    }

    /// One listing page with `sort`, `offset` and `limit` substituted.
    #[must_use]
    pub fn products_url(&self, offset: usize, limit: usize, order: &str) -> String {
        let mut url = self
            .api_base
            .join(PRODUCTS_PATH)
            .unwrap_or_else(|_| self.api_base.clone());
        url.query_pairs_mut()
            .append_pair("sort", order)
            .append_pair("offset", &offset.to_string())
            .append_pair("limit", &limit.to_string());
        url.to_string()
    }

    /// Format-discovery endpoint for one item.
    #[must_use]
    pub fn types_url(&self, item_id: &str) -> String {
        join(
            &self.api_base,
            &format!("products-v1/products/{}/types", encode(item_id)),
        )
    }

    /// Download-resolution endpoint for one item and format.
    #[must_use]
    pub fn file_url(&self, item_id: &str, format: FileFormat) -> String {
        join(
            &self.api_base,
            &format!(
                "products-v1/products/{}/files/{}",
                encode(item_id),
                format.as_str()
            ),
        )
    }

    /// Rating endpoint (authenticated service).
    #[must_use]
    pub fn reviews_url(&self, item_id: &str) -> String {
        join(&self.api_base, &format!("feefo-v1/rating/{}", encode(item_id)))
    }

    /// Product summary record (static content).
    #[must_use]
    pub fn summary_url(&self, item_id: &str) -> String {
        join(
            &self.static_base,
            &format!("products/{}/summary", encode(item_id)),
        )
    }

    /// Table of contents (static content).
    #[must_use]
    pub fn toc_url(&self, item_id: &str) -> String {
        join(&self.static_base, &format!("products/{}/toc", encode(item_id)))
    }

    /// Author record (static content).
    #[must_use]
    pub fn author_url(&self, author_id: &str) -> String {
        join(&self.static_base, &format!("authors/{}", encode(author_id)))
    }

    /// Public store page for an item.
    #[must_use]
    pub fn shop_link(&self, item_id: &str) -> String {
        format!("{}/{}", self.shop_base, encode(item_id))
    }

    /// Web reader page for an item.
    #[must_use]
    pub fn reader_link(&self, item_id: &str) -> String {
        format!("{}/book/{}", self.webreader_base, encode(item_id))
    }
}

fn parse_base(input: &str) -> Result<Url, EndpointError> {
    let normalized = if input.ends_with('/') {
        input.to_string()
    } else {
        format!("{input}/")
    };
    Url::parse(&normalized).map_err(|source| EndpointError {
        input: input.to_string(),
        source,
    })
}

fn join(base: &Url, path: &str) -> String {
    base.join(path)
        .map_or_else(|_| format!("{base}{path}"), |url| url.to_string())
}

fn encode(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoints_use_service_base() {
        let endpoints = ApiEndpoints::default();
        assert_eq!(
            endpoints.auth_url(),
            "https://services.packtpub.com/auth-v1/users/tokens"
        );
        assert_eq!(
            endpoints.summary_url("9781"),
            "https://static.packt-cdn.com/products/9781/summary"
        );
    }

    #[test]
    fn test_products_url_substitutes_query() {
        let endpoints = ApiEndpoints::default();
        let url = endpoints.products_url(50, 25, "createdAt:DESC");
        assert!(url.starts_with("https://services.packtpub.com/entitlements-v1/users/me/products?"));
        assert!(url.contains("sort=createdAt%3ADESC"), "{url}");
        assert!(url.contains("offset=50"), "{url}");
        assert!(url.contains("limit=25"), "{url}");
    }

    #[test]
    fn test_new_adds_trailing_slash_to_base_with_path() {
        let endpoints = ApiEndpoints::new("http://127.0.0.1:9000/api", "http://127.0.0.1:9000/static").unwrap();
        assert_eq!(
            endpoints.types_url("42"),
            "http://127.0.0.1:9000/api/products-v1/products/42/types"
        );
        assert_eq!(
            endpoints.toc_url("42"),
            "http://127.0.0.1:9000/static/products/42/toc"
        );
    }

    #[test]
    fn test_item_ids_are_path_encoded() {
        let endpoints = ApiEndpoints::default();
        let url = endpoints.file_url("a/b c", FileFormat::Pdf);
        assert!(url.ends_with("products/a%2Fb%20c/files/pdf"), "{url}");
    }

    #[test]
    fn test_new_rejects_relative_base() {
        let err = ApiEndpoints::new("not a url", DEFAULT_STATIC_BASE_URL).unwrap_err();
        assert!(err.to_string().contains("not a url"));
    }
}
