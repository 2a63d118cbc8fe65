use serde_json::Value;
use std::future::Future;
use std::time::Duration;

use crate::error::{CallableError, StoreError};
use crate::types::{
    CallerContext, ProfileUpdate, SetAdminClaimRequest, SetAdminClaimResponse,
};
use crate::AppState;

/// Grant or revoke the admin claim of a user.
///
/// Guards run first and in order: the caller must be authenticated, then
/// must hold `admin: true`. Only then is the payload looked at, including a
/// body the transport already failed to decode, and the two writes issued,
/// claims before profile. The writes are not transactional; if the profile
/// write fails the new claim stays in place.
pub async fn set_admin_claim(
    state: &AppState,
    caller: &CallerContext,
    data: Result<Value, CallableError>,
) -> Result<SetAdminClaimResponse, CallableError> {
    let caller_uid = authenticate(caller)?;
    authorize(state, caller_uid).await?;

    let request = data.and_then(SetAdminClaimRequest::from_payload).map_err(|e| {
        tracing::warn!("Rejected payload from {}: {}", caller_uid, e);
        e
    })?;

    tracing::info!(
        "Admin {} setting admin={} for user {}",
        caller_uid,
        request.is_admin,
        request.uid
    );

    if let Err(e) = apply(state, &request).await {
        tracing::error!("Failed to set admin claim for {}: {}", request.uid, e);
        return Err(CallableError::Internal);
    }

    let response = SetAdminClaimResponse::for_request(&request);
    tracing::info!("{}", response.message);
    Ok(response)
}

fn authenticate(caller: &CallerContext) -> Result<&str, CallableError> {
    caller
        .auth
        .as_ref()
        .map(|auth| auth.uid.as_str())
        .filter(|uid| !uid.is_empty())
        .ok_or_else(|| {
            tracing::warn!("Rejected unauthenticated setAdminClaim call");
            CallableError::Unauthenticated
        })
}

async fn authorize(state: &AppState, caller_uid: &str) -> Result<(), CallableError> {
    let record = bounded(
        state.config.store_timeout,
        state.identity.get_user(caller_uid),
    )
    .await
    .map_err(|e| {
        tracing::error!("Failed to load caller {}: {}", caller_uid, e);
        CallableError::Internal
    })?;

    if !record.claims.is_admin() {
        tracing::warn!("User {} is not an admin", caller_uid);
        return Err(CallableError::PermissionDenied);
    }

    Ok(())
}

async fn apply(state: &AppState, request: &SetAdminClaimRequest) -> Result<(), StoreError> {
    let limit = state.config.store_timeout;

    let mut claims = bounded(limit, state.identity.get_user(&request.uid))
        .await?
        .claims;
    claims.admin = Some(request.is_admin);
    bounded(
        limit,
        state.identity.set_custom_user_claims(&request.uid, &claims),
    )
    .await?;

    let update = ProfileUpdate::from_admin_flag(request.is_admin);
    bounded(limit, state.documents.update_profile(&request.uid, &update)).await?;

    Ok(())
}

async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| StoreError::Timeout(limit))?
}
