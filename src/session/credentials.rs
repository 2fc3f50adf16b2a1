//! Session credential state
//!
//! The header and cookie mappings sent with every platform request. Mutated
//! only by the session refresh operation.

use std::collections::HashMap;

/// One cookie as harvested from the external session provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestedCookie {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
}

impl HarvestedCookie {
    /// Create a cookie from name and value
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Current header and cookie state for one platform session
#[derive(Debug, Clone, Default)]
pub struct SessionCredentials {
    /// Request headers, including the assembled Cookie header
    pub headers: HashMap<String, String>,
    /// Cookies by name, kept alongside the header form for lookups
    pub cookies: HashMap<String, String>,
}

impl SessionCredentials {
    /// Create credentials with an initial header set
    pub fn new(headers: HashMap<String, String>) -> Self {
        Self {
            headers,
            cookies: HashMap::new(),
        }
    }

    /// Replace the Cookie header and cookie mapping from a harvested set
    ///
    /// Both representations are replaced together; callers serialize this
    /// behind a write lock so readers see either the old or the new set.
    pub fn apply_cookies(&mut self, cookies: &[HarvestedCookie]) {
        self.headers
            .insert("Cookie".to_string(), format_cookie_header(cookies));
        self.cookies = cookies
            .iter()
            .map(|c| (c.name.clone(), c.value.clone()))
            .collect();
    }
}

/// Render a harvested cookie set as a Cookie header value
pub fn format_cookie_header(cookies: &[HarvestedCookie]) -> String {
    cookies
        .iter()
        .map(|c| format!("{}={}", c.name, c.value))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cookie_header() {
        let cookies = vec![
            HarvestedCookie::new("SESSDATA", "abc123"),
            HarvestedCookie::new("bili_jct", "def456"),
        ];
        assert_eq!(
            format_cookie_header(&cookies),
            "SESSDATA=abc123; bili_jct=def456"
        );
    }

    #[test]
    fn test_apply_cookies_replaces_both_forms() {
        let mut creds = SessionCredentials::default();
        creds.apply_cookies(&[HarvestedCookie::new("SESSDATA", "old")]);
        creds.apply_cookies(&[HarvestedCookie::new("SESSDATA", "new")]);

        assert_eq!(creds.headers.get("Cookie").unwrap(), "SESSDATA=new");
        assert_eq!(creds.cookies.get("SESSDATA").unwrap(), "new");
        assert_eq!(creds.cookies.len(), 1);
    }
}
