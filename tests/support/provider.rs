//! Mock provider mounted on a wiremock server.
//!
//! The service API lives at the server root and static content under
//! `/static/`; direct download URLs point at `/cdn/`.

use exporter_core::{ApiEndpoints, FileFormat};
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "tok";

pub struct Provider {
    pub server: MockServer,
}

impl Provider {
    pub fn new(server: MockServer) -> Self {
        Self { server }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn static_uri(&self) -> String {
        format!("{}/static/", self.server.uri())
    }

    pub fn endpoints(&self) -> ApiEndpoints {
        ApiEndpoints::new(&self.uri(), &self.static_uri()).unwrap()
    }

    pub fn cdn_url(&self, item_id: &str, format: FileFormat) -> String {
        format!("{}/cdn/{item_id}.{}", self.uri(), format.as_str())
    }

    /// Login accepting any credentials and issuing [`TOKEN`].
    pub async fn mount_login(&self) {
        Mock::given(method("POST"))
            .and(path("/auth-v1/users/tokens"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": {"access": TOKEN}})),
            )
            .mount(&self.server)
            .await;
    }

    /// One listing page answered for `offset`.
    pub async fn mount_page(&self, offset: usize, count: usize, records: &[(&str, &str)]) {
        let data: Vec<Value> = records
            .iter()
            .map(|(id, name)| json!({"productId": id, "productName": name}))
            .collect();
        Mock::given(method("GET"))
            .and(path("/entitlements-v1/users/me/products"))
            .and(query_param("offset", offset.to_string()))
            .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": count,
                "data": data,
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mount_types(&self, item_id: &str, types: &[&str]) {
        Mock::given(method("GET"))
            .and(path(format!("/products-v1/products/{item_id}/types")))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": [{"fileTypes": types}]})),
            )
            .mount(&self.server)
            .await;
    }

    /// Resolution endpoint plus the file it points to, each expected
    /// `expected` times.
    pub async fn mount_file(&self, item_id: &str, format: FileFormat, body: &[u8], expected: u64) {
        Mock::given(method("GET"))
            .and(path(format!(
                "/products-v1/products/{item_id}/files/{}",
                format.as_str()
            )))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": self.cdn_url(item_id, format)})),
            )
            .expect(expected)
            .mount(&self.server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/cdn/{item_id}.{}", format.as_str())))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
            .expect(expected)
            .mount(&self.server)
            .await;
    }

    pub async fn mount_summary(&self, item_id: &str, summary: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/static/products/{item_id}/summary")))
            .respond_with(ResponseTemplate::new(200).set_body_json(summary))
            .mount(&self.server)
            .await;
    }

    pub async fn mount_toc_failure(&self, item_id: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/static/products/{item_id}/toc")))
            .respond_with(ResponseTemplate::new(500))
            .mount(&self.server)
            .await;
    }
}
