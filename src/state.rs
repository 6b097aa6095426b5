use std::sync::Arc;

use crate::clients::github::GitHubProvider;
use crate::clients::google::GoogleProvider;
use crate::clients::mailer::{LogMailer, Mailer, SendGridMailer};
use crate::clients::oauth::OAuthProvider;
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AcronymService, AuthService, PasswordResetService, ProfilePictureStore, SeaOrmAcronymService,
    SeaOrmAuthService, SeaOrmPasswordResetService, SeaOrmUserService, UserService,
};

/// Build a shared HTTP client for the mail and OAuth clients so they share
/// one connection pool.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent(concat!("til/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

/// External collaborators: the mail transport and the OAuth providers.
/// `None` providers are not mounted.
#[derive(Clone)]
pub struct Integrations {
    pub mailer: Arc<dyn Mailer>,

    pub google: Option<Arc<dyn OAuthProvider>>,

    pub github: Option<Arc<dyn OAuthProvider>>,
}

impl Integrations {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http_client = build_shared_http_client(30)?;

        let mailer: Arc<dyn Mailer> = if config.email.sendgrid_api_key.is_empty() {
            Arc::new(LogMailer)
        } else {
            Arc::new(SendGridMailer::new(http_client.clone(), &config.email))
        };

        let google = config.oauth.google.is_configured().then(|| {
            Arc::new(GoogleProvider::new(
                http_client.clone(),
                config.oauth.google.clone(),
            )) as Arc<dyn OAuthProvider>
        });

        let github = config.oauth.github.is_configured().then(|| {
            Arc::new(GitHubProvider::new(
                http_client.clone(),
                config.oauth.github.clone(),
            )) as Arc<dyn OAuthProvider>
        });

        Ok(Self {
            mailer,
            google,
            github,
        })
    }
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub acronym_service: Arc<dyn AcronymService>,

    pub user_service: Arc<dyn UserService>,

    pub password_reset: Arc<dyn PasswordResetService>,

    pub profile_pictures: Arc<ProfilePictureStore>,

    pub integrations: Integrations,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let integrations = Integrations::from_config(&config)?;
        Self::with_integrations(config, integrations).await
    }

    pub async fn with_integrations(
        config: Config,
        integrations: Integrations,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let security = config.security.clone();

        let auth_service = Arc::new(SeaOrmAuthService::new(store.clone(), security.clone()))
            as Arc<dyn AuthService + Send + Sync + 'static>;

        let acronym_service = Arc::new(SeaOrmAcronymService::new(store.clone()))
            as Arc<dyn AcronymService + Send + Sync + 'static>;

        let user_service = Arc::new(SeaOrmUserService::new(store.clone(), security.clone()))
            as Arc<dyn UserService + Send + Sync + 'static>;

        let password_reset = Arc::new(SeaOrmPasswordResetService::new(
            store.clone(),
            integrations.mailer.clone(),
            security,
            &config.server.public_url,
        )) as Arc<dyn PasswordResetService + Send + Sync + 'static>;

        let profile_pictures = Arc::new(ProfilePictureStore::new(
            store.clone(),
            config.storage.profile_pictures_path.clone(),
        ));

        Ok(Self {
            config: Arc::new(config),
            store,
            auth_service,
            acronym_service,
            user_service,
            password_reset,
            profile_pictures,
            integrations,
        })
    }
}
