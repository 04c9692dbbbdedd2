//! Command implementations.

pub mod config;
pub mod events;
pub mod role;
pub mod user;

pub use config::run_config;
pub use events::run_events;
pub use role::run_role;
pub use user::run_user;

use std::sync::Arc;

use kc_admin_client::{AdminClient, ClientConfig, CredentialManager};
use tracing::debug;

use crate::output::prompt_password;
use crate::session::KeycloakSession;
use crate::cli::GlobalArgs;
use crate::{CliConfig, CliError, CliResult};

/// A logged-in admin client for the target realm.
pub struct AdminContext {
    /// Settings the client was built from.
    pub config: ClientConfig,
    /// Authenticated admin client.
    pub client: AdminClient,
}

impl AdminContext {
    /// Logs in and builds a client for the realm selected by flags or config.
    pub async fn connect(cli: &GlobalArgs, config: &CliConfig) -> CliResult<Self> {
        let realm = config.effective_realm(cli.realm.as_deref())?;
        let client_config = config.client_config(cli.server.as_deref(), &realm);
        client_config.validate()?;

        let auth = config.auth_or_default();
        let username = cli
            .username
            .clone()
            .or_else(|| auth.username.clone())
            .ok_or_else(|| {
                CliError::InvalidArgument(
                    "username is required (--username or auth.username)".into(),
                )
            })?;
        let password = match &cli.login_password {
            Some(password) => password.clone(),
            None => prompt_password(&format!("Password for {username}: "))?,
        };

        let session =
            KeycloakSession::login(&client_config.server_url, auth, &username, &password)
                .await?;
        debug!(?session, "session established");

        let credentials = Arc::new(CredentialManager::new(
            Arc::new(session),
            client_config.refresh_margin(),
        ));
        let client = AdminClient::new(&client_config, credentials)?;
        Ok(Self {
            config: client_config,
            client,
        })
    }
}
