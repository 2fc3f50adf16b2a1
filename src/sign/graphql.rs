//! GraphQL template resolution
//!
//! The template-signer platform attaches a named, registry-resolved query
//! body instead of a cryptographic signature. The registry itself is an
//! opaque key→template lookup supplied by the caller; this module only
//! resolves names and assembles the wire body.

use crate::{Error, Result};
use serde_json::{Value, json};
use std::collections::HashMap;

/// Registry of raw GraphQL query templates by operation key
#[derive(Debug, Clone, Default)]
pub struct GraphqlTemplates {
    templates: HashMap<String, String>,
}

impl GraphqlTemplates {
    /// Create a registry from an externally supplied template map
    pub fn new(templates: HashMap<String, String>) -> Self {
        Self { templates }
    }

    /// Look up a raw template by key
    pub fn get(&self, key: &str) -> Result<&str> {
        self.templates
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| Error::signing(format!("unknown operation template: {}", key)))
    }

    /// Assemble the POST body for one operation
    ///
    /// The wire format is `{operationName, variables, query}` with the query
    /// resolved from the registry.
    pub fn render(
        &self,
        operation_name: &str,
        template_key: &str,
        variables: Value,
    ) -> Result<Value> {
        let query = self.get(template_key)?;
        Ok(json!({
            "operationName": operation_name,
            "variables": variables,
            "query": query,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> GraphqlTemplates {
        let mut templates = HashMap::new();
        templates.insert(
            "comment_list".to_string(),
            "query commentListQuery($photoId: String) { ... }".to_string(),
        );
        GraphqlTemplates::new(templates)
    }

    #[test]
    fn test_render_body() {
        let body = registry()
            .render(
                "commentListQuery",
                "comment_list",
                json!({"photoId": "3x123", "pcursor": ""}),
            )
            .unwrap();

        assert_eq!(body["operationName"], "commentListQuery");
        assert_eq!(body["variables"]["photoId"], "3x123");
        assert!(body["query"].as_str().unwrap().contains("commentListQuery"));
    }

    #[test]
    fn test_unknown_template_is_signing_error() {
        let err = registry()
            .render("x", "does_not_exist", json!({}))
            .unwrap_err();
        assert!(matches!(err, Error::Signing(_)));
        assert!(err.to_string().contains("does_not_exist"));
    }
}
