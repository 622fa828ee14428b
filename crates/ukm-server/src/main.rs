//! UKM Server — application entry point.
//!
//! Loads configuration, connects the document store, wires the
//! provisioning and registration services, then runs until interrupted.

mod error;
mod settings;

use clap::Parser;
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use tracing::info;
use tracing_subscriber::EnvFilter;
use ukm_auth::SurrealIdentityProvider;
use ukm_core::repository::OrganizationRepository;
use ukm_db::DbManager;
use ukm_db::repository::{SurrealMemberAccountRepository, SurrealOrganizationRepository};
use ukm_provisioning::{ProvisioningService, RegistrationService};

use error::{ServerError, ServerResult};
use settings::ServerConfig;

#[derive(Parser)]
#[command(name = "ukm-server")]
#[command(about = "UKM student organization service", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, env = "UKM_CONFIG")]
    config: Option<String>,
}

type Organizations = SurrealOrganizationRepository<Any>;
type Members = SurrealMemberAccountRepository<Any>;
type Identity = SurrealIdentityProvider<Any>;

/// Workflow services sharing one connection.
struct Services {
    provisioning: ProvisioningService<Organizations, Members, Identity>,
    registration: RegistrationService<Organizations, Members, Identity>,
}

impl Services {
    fn new(db: Surreal<Any>, config: &ServerConfig) -> Self {
        let organizations = SurrealOrganizationRepository::new(db.clone());
        let members = SurrealMemberAccountRepository::new(db.clone());
        let identity = SurrealIdentityProvider::with_config(db, &config.auth);

        Self {
            provisioning: ProvisioningService::new(
                organizations.clone(),
                members.clone(),
                identity.clone(),
                config.auth.clone(),
            ),
            registration: RegistrationService::with_catalog(
                organizations,
                members,
                identity,
                config.registration.clone(),
            ),
        }
    }
}

#[tokio::main]
async fn main() -> ServerResult<()> {
    let cli = Cli::parse();

    let config = ServerConfig::load(cli.config.as_deref())
        .map_err(|e| ServerError::Config(e.to_string()))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .map_err(|e| ServerError::Config(format!("invalid log filter: {e}")))?;
    tracing_subscriber::fmt().with_env_filter(filter).json().init();

    info!("Starting UKM server...");

    let db = DbManager::connect(&config.db).await?;
    let Services {
        provisioning,
        registration,
    } = Services::new(db.client(), &config);

    let form = registration
        .load_form()
        .await
        .map_err(|e| ServerError::Startup(e.to_string()))?;
    let organizations = provisioning
        .organizations()
        .list()
        .await
        .map_err(|e| ServerError::Startup(e.to_string()))?;
    info!(
        organizations = organizations.len(),
        faculties = form.catalog.faculties.len(),
        min_password_length = config.auth.min_password_length,
        "Services ready"
    );

    tokio::signal::ctrl_c().await?;

    info!("UKM server stopped.");
    Ok(())
}
