use secrecy::SecretString;
use serde::Deserialize;

/// Application configuration for trackly server.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    #[serde(default)]
    pub server: ServerConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let cfg: Config = serde_yaml::from_str(&content)?;
        Ok(cfg)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub name: String,
    #[serde(default = "default_environment")]
    pub environment: String,
}

impl AppConfig {
    /// production では Cookie に Secure 属性を付与する。
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn default_environment() -> String {
    "dev".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

/// AuthConfig はトークン署名の設定を表す。
/// 2 つのシークレットは必須で、欠落は起動エラーになる。
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub access_token_secret: SecretString,
    pub refresh_token_secret: SecretString,
    #[serde(default = "default_access_ttl_secs")]
    pub access_token_ttl_secs: i64,
    #[serde(default = "default_refresh_ttl_secs")]
    pub refresh_token_ttl_secs: i64,
}

fn default_access_ttl_secs() -> i64 {
    900
}

fn default_refresh_ttl_secs() -> i64 {
    604_800
}

/// CorsConfig は許可するフロントエンドオリジンを表す。
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origin: default_allowed_origin(),
        }
    }
}

fn default_allowed_origin() -> String {
    "http://localhost:3000".to_string()
}

/// DatabaseConfig は PostgreSQL 接続の設定を表す。
/// 未設定の場合はインメモリの資格情報ストアにフォールバックする。
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config() {
        let yaml = r#"
app:
  name: trackly-server
auth:
  access_token_secret: "a-secret"
  refresh_token_secret: "r-secret"
"#;
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.auth.access_token_ttl_secs, 900);
        assert_eq!(cfg.auth.refresh_token_ttl_secs, 604_800);
        assert_eq!(cfg.cors.allowed_origin, "http://localhost:3000");
        assert!(cfg.database.is_none());
        assert!(!cfg.app.is_production());
    }

    #[test]
    fn test_production_flag() {
        let yaml = r#"
app:
  name: trackly-server
  environment: production
auth:
  access_token_secret: "a-secret"
  refresh_token_secret: "r-secret"
"#;
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(cfg.app.is_production());
    }

    #[test]
    fn test_secret_is_redacted_in_debug() {
        let yaml = r#"
app:
  name: trackly-server
auth:
  access_token_secret: "super-secret-value"
  refresh_token_secret: "r-secret"
"#;
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        let debug = format!("{:?}", cfg.auth);
        assert!(!debug.contains("super-secret-value"));
    }

    #[test]
    fn test_database_config_deserialization() {
        let yaml = r#"
url: "postgres://localhost:5432/trackly"
max_connections: 5
"#;
        let cfg: DatabaseConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.max_connections, 5);
    }
}
