use async_trait::async_trait;
use aws_sdk_cognitoidentityprovider::types::AttributeType;
use aws_sdk_cognitoidentityprovider::Client as CognitoClient;

use crate::error::StoreError;
use crate::types::{CustomClaims, UserRecord};

/// Identity store holding each user's custom claims
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn get_user(&self, uid: &str) -> Result<UserRecord, StoreError>;

    /// Replace the whole claims map of `uid`
    async fn set_custom_user_claims(&self, uid: &str, claims: &CustomClaims) -> Result<(), StoreError>;
}

/// Cognito user pool backed claims.
///
/// Claims live as a JSON object in a single custom attribute, since Cognito
/// attributes are flat strings.
pub struct CognitoIdentityStore {
    client: CognitoClient,
    user_pool_id: String,
    claims_attribute: String,
}

impl CognitoIdentityStore {
    pub fn new(
        client: CognitoClient,
        user_pool_id: impl Into<String>,
        claims_attribute: impl Into<String>,
    ) -> Self {
        Self {
            client,
            user_pool_id: user_pool_id.into(),
            claims_attribute: claims_attribute.into(),
        }
    }
}

#[async_trait]
impl IdentityStore for CognitoIdentityStore {
    async fn get_user(&self, uid: &str) -> Result<UserRecord, StoreError> {
        let output = self
            .client
            .admin_get_user()
            .user_pool_id(&self.user_pool_id)
            .username(uid)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error()
                    .is_some_and(|se| se.is_user_not_found_exception())
                {
                    StoreError::UserNotFound(uid.to_string())
                } else {
                    StoreError::Identity(Box::new(e))
                }
            })?;

        let raw = output
            .user_attributes()
            .iter()
            .find(|attr| attr.name() == self.claims_attribute)
            .and_then(|attr| attr.value());

        let claims = parse_claims(uid, raw)?;
        tracing::debug!("Loaded claims for {}: admin={:?}", uid, claims.admin);

        Ok(UserRecord {
            uid: uid.to_string(),
            claims,
        })
    }

    async fn set_custom_user_claims(&self, uid: &str, claims: &CustomClaims) -> Result<(), StoreError> {
        let value = serde_json::to_string(claims).map_err(|e| StoreError::Identity(Box::new(e)))?;

        let attribute = AttributeType::builder()
            .name(&self.claims_attribute)
            .value(value)
            .build()
            .map_err(|e| StoreError::Identity(Box::new(e)))?;

        self.client
            .admin_update_user_attributes()
            .user_pool_id(&self.user_pool_id)
            .username(uid)
            .user_attributes(attribute)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error()
                    .is_some_and(|se| se.is_user_not_found_exception())
                {
                    StoreError::UserNotFound(uid.to_string())
                } else {
                    StoreError::Identity(Box::new(e))
                }
            })?;

        tracing::info!("Claims attribute {} updated for {}", self.claims_attribute, uid);
        Ok(())
    }
}

/// Decode the stored claims attribute; absent or blank means no claims
fn parse_claims(uid: &str, raw: Option<&str>) -> Result<CustomClaims, StoreError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(CustomClaims::default()),
        Some(json) => serde_json::from_str(json).map_err(|source| StoreError::MalformedClaims {
            uid: uid.to_string(),
            source,
        }),
    }
}
