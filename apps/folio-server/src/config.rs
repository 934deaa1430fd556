//! Application configuration loaded from environment variables.

use std::env;

#[cfg(feature = "postgres")]
use folio_infra::database::DatabaseConfig;
use folio_infra::auth::{DEFAULT_ISSUER, JwtConfig};

/// Public-facing site settings used by feeds, the sitemap and robots.txt.
///
/// `url` (`SITE_URL`) is the origin readers browse, not this API. The HTML
/// frontend there renders `/post/{slug}/` and `/category/{slug}/` and
/// proxies `/feed/`, `/sitemap.xml` and `/robots.txt` through to this server.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Absolute base URL of the public frontend, without a trailing slash.
    pub url: String,
    pub title: String,
    pub description: String,
}

impl SiteConfig {
    pub fn new(url: &str, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            title: title.into(),
            description: description.into(),
        }
    }

    /// Absolute URL for a site-relative `path`.
    pub fn absolute(&self, path: &str) -> String {
        format!("{}/{}", self.url, path.trim_start_matches('/'))
    }

    /// Frontend page for a post.
    pub fn post_url(&self, slug: &str) -> String {
        self.absolute(&format!("post/{slug}/"))
    }

    /// Frontend page for a category.
    pub fn category_url(&self, slug: &str) -> String {
        self.absolute(&format!("category/{slug}/"))
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self::new(
            "http://localhost:8080",
            "Folio - Latest Posts",
            "New posts from Folio",
        )
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    #[cfg(feature = "postgres")]
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
    pub site: SiteConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        #[cfg(feature = "postgres")]
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: parse_var("DB_MAX_CONNECTIONS").unwrap_or(100),
            min_connections: parse_var("DB_MIN_CONNECTIONS").unwrap_or(10),
        });

        let jwt = JwtConfig {
            secret: env::var("JWT_SECRET").unwrap_or_else(|_| JwtConfig::default().secret),
            expiration_hours: parse_var("JWT_EXPIRATION_HOURS").unwrap_or(24),
            issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| DEFAULT_ISSUER.to_string()),
        };

        let defaults = SiteConfig::default();
        let site = SiteConfig::new(
            &env::var("SITE_URL").unwrap_or(defaults.url),
            env::var("SITE_TITLE").unwrap_or(defaults.title),
            env::var("SITE_DESCRIPTION").unwrap_or(defaults.description),
        );

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT").unwrap_or(8080),
            #[cfg(feature = "postgres")]
            database,
            jwt,
            site,
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}
