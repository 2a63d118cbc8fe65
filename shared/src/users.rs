use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;

use crate::error::StoreError;
use crate::types::ProfileUpdate;

/// Document store holding one profile item per user
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Partial update of an existing profile; a missing profile is an error
    async fn update_profile(&self, uid: &str, update: &ProfileUpdate) -> Result<(), StoreError>;
}

pub fn user_key(uid: &str) -> String {
    format!("USER#{}", uid)
}

/// Profiles in the single DynamoDB table, PK = SK = USER#uid
pub struct DynamoUserStore {
    client: DynamoClient,
    table_name: String,
}

impl DynamoUserStore {
    pub fn new(client: DynamoClient, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }
}

#[async_trait]
impl DocumentStore for DynamoUserStore {
    async fn update_profile(&self, uid: &str, update: &ProfileUpdate) -> Result<(), StoreError> {
        let pk = user_key(uid);

        // Both fields go in one SET so the role never disagrees with isAdmin
        self.client
            .update_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S(pk.clone()))
            .key("SK", AttributeValue::S(pk))
            .update_expression("SET isAdmin = :isAdmin, #role = :role")
            .condition_expression("attribute_exists(PK)")
            .expression_attribute_names("#role", "role")
            .expression_attribute_values(":isAdmin", AttributeValue::Bool(update.is_admin()))
            .expression_attribute_values(":role", AttributeValue::S(update.role().as_str().to_string()))
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error()
                    .is_some_and(|se| se.is_conditional_check_failed_exception())
                {
                    StoreError::ProfileNotFound(uid.to_string())
                } else {
                    StoreError::Document(Box::new(e))
                }
            })?;

        tracing::info!("Profile {} updated: role={}", uid, update.role().as_str());
        Ok(())
    }
}
