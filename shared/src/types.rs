use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::CallableError;

/// Longest uid the identity pool accepts
pub const MAX_UID_LEN: usize = 128;

// ========== CLAIMS ==========
/// Custom claims attached to a user's identity.
///
/// Only a JSON boolean counts as an `admin` value: a string `"true"`, a number
/// or `null` all decode to `None`. Any other claims are carried through
/// untouched so a rewrite of `admin` does not drop them.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct CustomClaims {
    #[serde(
        default,
        deserialize_with = "strict_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub admin: Option<bool>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl CustomClaims {
    pub fn is_admin(&self) -> bool {
        self.admin == Some(true)
    }
}

fn strict_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(flag) => Some(flag),
        _ => None,
    })
}

/// A user as seen by the identity store
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub uid: String,
    pub claims: CustomClaims,
}

// ========== USER PROFILE ==========
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn from_admin_flag(is_admin: bool) -> Self {
        if is_admin {
            Role::Admin
        } else {
            Role::User
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

/// Fields written to the user's profile document.
///
/// Built only from the admin flag, so `role` is `admin` exactly when
/// `is_admin` is set.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    is_admin: bool,
    role: Role,
}

impl ProfileUpdate {
    pub fn from_admin_flag(is_admin: bool) -> Self {
        Self {
            is_admin,
            role: Role::from_admin_flag(is_admin),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

// ========== CALLABLE ==========
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    pub uid: String,
}

/// Identity of whoever invoked the callable; `auth` is `None` for anonymous calls
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerContext {
    pub auth: Option<AuthContext>,
}

impl CallerContext {
    pub fn anonymous() -> Self {
        Self { auth: None }
    }

    pub fn authenticated(uid: impl Into<String>) -> Self {
        Self {
            auth: Some(AuthContext { uid: uid.into() }),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SetAdminClaimRequest {
    pub uid: String,
    pub is_admin: bool,
}

impl SetAdminClaimRequest {
    /// Decode and validate the `data` payload of a callable invocation
    pub fn from_payload(data: Value) -> Result<Self, CallableError> {
        if !data.is_object() {
            return Err(CallableError::InvalidArgument(
                "Request data must be an object with uid and isAdmin".to_string(),
            ));
        }

        let request: SetAdminClaimRequest = serde_json::from_value(data)
            .map_err(|e| CallableError::InvalidArgument(format!("Invalid request data: {}", e)))?;

        if request.uid.trim().is_empty() {
            return Err(CallableError::InvalidArgument(
                "uid must be a non-empty string".to_string(),
            ));
        }
        if request.uid.chars().count() > MAX_UID_LEN {
            return Err(CallableError::InvalidArgument(format!(
                "uid must be at most {} characters",
                MAX_UID_LEN
            )));
        }

        Ok(request)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SetAdminClaimResponse {
    pub success: bool,
    pub message: String,
}

impl SetAdminClaimResponse {
    pub fn for_request(request: &SetAdminClaimRequest) -> Self {
        let verb = if request.is_admin { "granted" } else { "revoked" };
        Self {
            success: true,
            message: format!("Admin claim {} for user {}", verb, request.uid),
        }
    }
}
