use lambda_http::{
    http::{Method, StatusCode},
    Body, Error, Request, Response,
};
use quiz_quest_shared::{admin, callable, AppState};
use std::sync::Arc;

/// Main Lambda handler - routes the setAdminClaim callable
pub(crate) async fn function_handler(
    event: Request,
    state: Arc<AppState>,
) -> Result<Response<Body>, Error> {
    let method = event.method();
    let path = event.uri().path();
    tracing::info!("Admin claim Lambda invoked - Method: {} Path: {}", method, path);

    // Handle CORS preflight
    if method == Method::OPTIONS {
        return Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", "POST,OPTIONS")
            .header("Access-Control-Allow-Headers", "Content-Type,Authorization")
            .body(Body::Empty)
            .map_err(Box::new)?);
    }

    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match (method, parts.as_slice()) {
        (&Method::POST, ["setAdminClaim"]) => set_admin_claim(&event, &state).await,
        (_, ["setAdminClaim"]) => method_not_allowed(),
        _ => not_found(),
    }
}

async fn set_admin_claim(event: &Request, state: &AppState) -> Result<Response<Body>, Error> {
    let caller = callable::caller_context(event, state.config.allow_user_id_header);
    // A bad body is only reported once the caller has passed the guards
    let data = callable::parse_data(event.body());

    match admin::set_admin_claim(state, &caller, data).await {
        Ok(response) => callable::result_response(&response),
        Err(e) => callable::error_response(&e),
    }
}

fn method_not_allowed() -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(
            serde_json::json!({"error": "Method not allowed"})
                .to_string()
                .into(),
        )
        .map_err(Box::new)?)
}

fn not_found() -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::json!({"error": "Not found"}).to_string().into())
        .map_err(Box::new)?)
}
