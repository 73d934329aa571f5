use clap::Parser;
use once_cell::sync::Lazy;

pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const DEFAULT_JWT_EXPIRES_IN: i64 = 3600i64;

pub static APP_CONFIG: Lazy<Config> = Lazy::new(Config::parse);

#[derive(Debug, Parser, Clone)]
pub struct Config {
    #[clap(long, env, default_value_t = 8080)]
    pub port: u16,

    #[clap(long, env, default_value_t = true, action = clap::ArgAction::Set)]
    pub swagger_enabled: bool,

    #[clap(long, env, default_value = "info")]
    pub log_level: String,

    #[clap(long, env)]
    pub database_url: String,

    /// Role assumed with `SET LOCAL ROLE` inside user-scoped transactions
    #[clap(long, env)]
    pub db_session_role: Option<String>,

    #[clap(long, env, default_value_t = false, action = clap::ArgAction::Set)]
    pub run_migrations: bool,

    #[clap(long, env)]
    pub jwt_secret: String,

    /// Session lifetime in seconds
    #[clap(long, env, default_value_t = DEFAULT_JWT_EXPIRES_IN)]
    pub jwt_expires_in: i64,

    #[clap(long, env, default_value = "redis://127.0.0.1:6379")]
    pub redis_url: String,

    #[clap(long, env)]
    pub admin_email: Option<String>,

    #[clap(long, env)]
    pub admin_password: Option<String>,

    #[clap(long, env, default_value = "./storage")]
    pub storage_root: String,

    #[clap(long, env, value_delimiter = ',', default_value = "avatars,documents")]
    pub storage_buckets: Vec<String>,

    /// Buckets whose objects are served without a token
    #[clap(long, env, value_delimiter = ',', default_value = "avatars")]
    pub storage_public_buckets: Vec<String>,

    #[clap(long, env, default_value = "http://localhost:8080")]
    pub storage_public_base_url: String,

    #[clap(long, env, default_value_t = 10 * 1024 * 1024)]
    pub max_upload_bytes: usize,

    #[clap(long, env, default_value = "*")]
    pub cors_allowed_origins: String,

    #[clap(long, env, default_value = "local")]
    pub app_env: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_defaults_with_required_values() {
        let config = Config::try_parse_from([
            "school_admin_api",
            "--database-url",
            "postgres://localhost/school",
            "--jwt-secret",
            "secret",
        ])
        .expect("config should parse");

        assert_eq!(config.port, 8080);
        assert!(config.swagger_enabled);
        assert!(!config.run_migrations);
        assert_eq!(config.jwt_expires_in, DEFAULT_JWT_EXPIRES_IN);
        assert_eq!(config.storage_buckets, vec!["avatars", "documents"]);
        assert_eq!(config.storage_public_buckets, vec!["avatars"]);
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert!(config.db_session_role.is_none());
    }

    #[test]
    fn splits_bucket_lists_and_reads_booleans() {
        let config = Config::try_parse_from([
            "school_admin_api",
            "--database-url",
            "postgres://localhost/school",
            "--jwt-secret",
            "secret",
            "--storage-buckets",
            "avatars,reports,homework",
            "--swagger-enabled",
            "false",
            "--db-session-role",
            "school_app",
        ])
        .expect("config should parse");

        assert_eq!(config.storage_buckets, vec!["avatars", "reports", "homework"]);
        assert!(!config.swagger_enabled);
        assert_eq!(config.db_session_role.as_deref(), Some("school_app"));
    }
}
