//! Request descriptor type
//!
//! A fully-formed description of one HTTP request, immutable once built.

use std::collections::HashMap;

/// HTTP method for a request descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET request
    Get,
    /// POST request
    Post,
}

/// Description of a single HTTP request against a platform API
///
/// Built once via the `with_*` methods and then treated as immutable by the
/// transport layer.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// HTTP method
    pub method: HttpMethod,
    /// Absolute URL, without query parameters
    pub url: String,
    /// Query parameters in the order they should appear on the wire
    pub params: Vec<(String, String)>,
    /// Optional JSON request body
    pub body: Option<serde_json::Value>,
    /// Request headers
    pub headers: HashMap<String, String>,
}

impl RequestDescriptor {
    /// Create a GET descriptor for an absolute URL
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            params: Vec::new(),
            body: None,
            headers: HashMap::new(),
        }
    }

    /// Create a POST descriptor for an absolute URL
    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            params: Vec::new(),
            body: None,
            headers: HashMap::new(),
        }
    }

    /// Set query parameters
    pub fn with_params(mut self, params: Vec<(String, String)>) -> Self {
        self.params = params;
        self
    }

    /// Set the JSON body
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Set request headers
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// Add a single header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_descriptor() {
        let desc = RequestDescriptor::get("https://api.bilibili.com/x/web-interface/nav")
            .with_params(vec![("wts".to_string(), "1700000000".to_string())])
            .with_header("Cookie", "SESSDATA=abc");

        assert_eq!(desc.method, HttpMethod::Get);
        assert_eq!(desc.params.len(), 1);
        assert_eq!(desc.headers.get("Cookie").unwrap(), "SESSDATA=abc");
        assert!(desc.body.is_none());
    }

    #[test]
    fn test_post_descriptor_with_body() {
        let body = serde_json::json!({"operationName": "commentListQuery"});
        let desc = RequestDescriptor::post("https://www.kuaishou.com/graphql")
            .with_body(body.clone());

        assert_eq!(desc.method, HttpMethod::Post);
        assert_eq!(desc.body.unwrap(), body);
    }
}
