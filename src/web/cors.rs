//! CORS (Cross-Origin Resource Sharing) configuration
//!
//! The frontend is served from a different origin than the API, so the API
//! answers cross-origin requests. Any origin is allowed unless a list of
//! origins is configured.

use axum::http::{request, HeaderName, HeaderValue, Method};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// CORS configuration
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Allowed origins (None = allow all)
    pub allowed_origins: Option<Vec<String>>,
    /// Allowed HTTP methods
    pub allowed_methods: Vec<String>,
    /// Allowed request headers
    pub allowed_headers: Vec<String>,
    /// Headers to expose in responses
    pub expose_headers: Vec<String>,
    /// Preflight cache duration in seconds
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: None, // Allow all origins
            allowed_methods: vec![
                "GET".to_string(),
                "POST".to_string(),
                "OPTIONS".to_string(),
            ],
            allowed_headers: vec!["Content-Type".to_string()],
            // Lets browser clients read the download name
            expose_headers: vec!["Content-Disposition".to_string()],
            max_age_secs: 86400, // 24 hours
        }
    }
}

impl CorsConfig {
    /// Restrict to the given origins
    pub fn strict(origins: Vec<String>) -> Self {
        Self {
            allowed_origins: Some(origins),
            max_age_secs: 3600,
            ..Default::default()
        }
    }

    /// Check if a specific origin is allowed
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        match &self.allowed_origins {
            None => true,
            Some(origins) => origins.iter().any(|o| o == origin || o == "*"),
        }
    }

    /// Convert to tower-http CorsLayer
    pub fn into_layer(self) -> CorsLayer {
        let origin = match &self.allowed_origins {
            Some(origins) if !origins.iter().any(|o| o == "*") => {
                let config = self.clone();
                AllowOrigin::predicate(move |origin: &HeaderValue, _: &request::Parts| {
                    origin
                        .to_str()
                        .is_ok_and(|origin| config.is_origin_allowed(origin))
                })
            }
            _ => AllowOrigin::from(Any),
        };

        let methods: Vec<Method> = self
            .allowed_methods
            .iter()
            .filter_map(|m| m.parse().ok())
            .collect();
        let headers: Vec<HeaderName> = self
            .allowed_headers
            .iter()
            .filter_map(|h| h.parse().ok())
            .collect();
        let exposed: Vec<HeaderName> = self
            .expose_headers
            .iter()
            .filter_map(|h| h.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(methods)
            .allow_headers(headers)
            .expose_headers(exposed)
            .max_age(Duration::from_secs(self.max_age_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_config_default() {
        let config = CorsConfig::default();
        assert!(config.allowed_origins.is_none());
        assert!(config.allowed_methods.contains(&"GET".to_string()));
        assert!(config.allowed_methods.contains(&"POST".to_string()));
        assert!(config.allowed_headers.contains(&"Content-Type".to_string()));
        assert!(config
            .expose_headers
            .contains(&"Content-Disposition".to_string()));
        assert_eq!(config.max_age_secs, 86400);
    }

    #[test]
    fn test_cors_config_strict() {
        let config = CorsConfig::strict(vec!["https://example.com".to_string()]);
        assert_eq!(
            config.allowed_origins.as_ref().unwrap()[0],
            "https://example.com"
        );
        assert_eq!(config.max_age_secs, 3600);
    }

    #[test]
    fn test_cors_is_origin_allowed() {
        let config = CorsConfig::default();
        assert!(config.is_origin_allowed("http://localhost:5500"));

        let config = CorsConfig::strict(vec![
            "https://example.com".to_string(),
            "https://app.example.com".to_string(),
        ]);
        assert!(config.is_origin_allowed("https://example.com"));
        assert!(config.is_origin_allowed("https://app.example.com"));
        assert!(!config.is_origin_allowed("https://other.com"));

        let config = CorsConfig::strict(vec!["*".to_string()]);
        assert!(config.is_origin_allowed("https://other.com"));
    }

    #[test]
    fn test_cors_into_layer() {
        let _layer = CorsConfig::default().into_layer();
        let _layer = CorsConfig::strict(vec!["https://example.com".to_string()]).into_layer();
        let _layer = CorsConfig::strict(vec!["*".to_string()]).into_layer();
    }
}
