pub mod types;
pub mod error;
pub mod config;
pub mod claims;
pub mod users;
pub mod admin;
pub mod callable;
pub mod memory;

use aws_sdk_cognitoidentityprovider::Client as CognitoClient;
use aws_sdk_dynamodb::Client as DynamoClient;
use claims::{CognitoIdentityStore, IdentityStore};
use config::Config;
use std::sync::Arc;
use users::{DocumentStore, DynamoUserStore};

/// Shared application state, built once per cold start
pub struct AppState {
    pub identity: Arc<dyn IdentityStore>,
    pub documents: Arc<dyn DocumentStore>,
    pub config: Config,
}

impl AppState {
    pub fn new(
        identity: Arc<dyn IdentityStore>,
        documents: Arc<dyn DocumentStore>,
        config: Config,
    ) -> Arc<Self> {
        Arc::new(Self {
            identity,
            documents,
            config,
        })
    }

    /// Connect to Cognito and DynamoDB using the ambient AWS configuration
    pub async fn from_config(config: Config) -> Arc<Self> {
        let aws_config = aws_config::load_from_env().await;

        let identity = CognitoIdentityStore::new(
            CognitoClient::new(&aws_config),
            config.user_pool_id.clone(),
            config.claims_attribute.clone(),
        );
        let documents = DynamoUserStore::new(DynamoClient::new(&aws_config), config.table_name.clone());

        tracing::info!(
            "Clients ready (pool: {}, table: {})",
            config.user_pool_id,
            config.table_name
        );

        Self::new(Arc::new(identity), Arc::new(documents), config)
    }
}
