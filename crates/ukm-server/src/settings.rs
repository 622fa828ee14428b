//! Server configuration.
//!
//! Sources, lowest precedence first: built-in defaults, an optional JSON
//! file, then `UKM__`-prefixed environment variables with `__` between
//! nesting levels (`UKM__DB__URL`, `UKM__AUTH__MIN_PASSWORD_LENGTH`).

use serde::Deserialize;
use ukm_auth::AuthConfig;
use ukm_db::DbConfig;
use ukm_provisioning::RegistrationCatalog;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub db: DbConfig,
    pub auth: AuthConfig,
    /// Faculty/department options on the registration form.
    pub registration: RegistrationCatalog,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            db: DbConfig::default(),
            auth: AuthConfig::default(),
            registration: RegistrationCatalog::default(),
            log_filter: "ukm=info".into(),
        }
    }
}

impl ServerConfig {
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(
                config::File::with_name(path)
                    .format(config::FileFormat::Json)
                    .required(true),
            );
        }

        builder = builder.add_source(
            config::Environment::with_prefix("UKM")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}
