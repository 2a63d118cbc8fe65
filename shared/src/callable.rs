use lambda_http::{http::StatusCode, Body, Error, Request, RequestExt, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CallableError;
use crate::types::CallerContext;

/// Request body of a callable: `{"data": ...}`
#[derive(Deserialize)]
struct CallableRequest {
    data: Value,
}

#[derive(Serialize)]
struct CallableResult<'a, T> {
    result: &'a T,
}

#[derive(Serialize)]
struct CallableErrorBody<'a> {
    status: &'static str,
    code: &'static str,
    message: &'a str,
}

#[derive(Serialize)]
struct CallableErrorResponse<'a> {
    error: CallableErrorBody<'a>,
}

/// Pull the `data` payload out of the request body.
///
/// A body that is not JSON or has no `data` field is an `InvalidArgument`.
/// Callers hand the result on unchecked so the auth guards still run first.
pub fn parse_data(body: &Body) -> Result<Value, CallableError> {
    let body_str = match body {
        Body::Text(text) => text.as_str(),
        Body::Binary(bytes) => std::str::from_utf8(bytes).map_err(|_| {
            CallableError::InvalidArgument("Request body must be UTF-8 JSON".to_string())
        })?,
        Body::Empty => "",
    };

    let request: CallableRequest = serde_json::from_str(body_str).map_err(|e| {
        tracing::warn!("Failed to parse request body: {}", e);
        CallableError::InvalidArgument(format!("Invalid request body: {}", e))
    })?;

    Ok(request.data)
}

/// Work out who is calling.
///
/// The caller is the `sub` of the JWT checked by the API Gateway authorizer.
/// With `allow_user_id_header` an `X-User-Id` header takes precedence, for
/// local runs where no authorizer sits in front of the function.
pub fn caller_context(event: &Request, allow_user_id_header: bool) -> CallerContext {
    let from_header = if allow_user_id_header {
        event
            .headers()
            .get("X-User-Id")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
    } else {
        None
    };

    let uid = from_header.or_else(|| {
        event
            .request_context_ref()
            .and_then(|ctx| ctx.authorizer())
            .and_then(|auth| auth.jwt.as_ref())
            .and_then(|jwt| jwt.claims.get("sub"))
            .map(|s| s.to_string())
    });

    match uid {
        Some(uid) if !uid.is_empty() => CallerContext::authenticated(uid),
        _ => CallerContext::anonymous(),
    }
}

pub fn result_response<T: Serialize>(result: &T) -> Result<Response<Body>, Error> {
    let body = CallableResult { result };
    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::to_string(&body)?.into())
        .map_err(Box::new)?)
}

pub fn error_response(err: &CallableError) -> Result<Response<Body>, Error> {
    let message = err.to_string();
    let body = CallableErrorResponse {
        error: CallableErrorBody {
            status: err.status(),
            code: err.code(),
            message: &message,
        },
    };
    Ok(Response::builder()
        .status(err.http_status())
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::to_string(&body)?.into())
        .map_err(Box::new)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_data() {
        let body = Body::Text(r#"{"data":{"uid":"u1","isAdmin":true}}"#.to_string());
        assert_eq!(parse_data(&body).unwrap(), json!({"uid": "u1", "isAdmin": true}));

        let body = Body::Binary(br#"{"data":{"uid":"u1","isAdmin":false}}"#.to_vec());
        assert_eq!(parse_data(&body).unwrap(), json!({"uid": "u1", "isAdmin": false}));

        // An explicit null is still an envelope; the payload check rejects it later
        assert_eq!(parse_data(&Body::Text(r#"{"data":null}"#.to_string())).unwrap(), Value::Null);
    }

    #[test]
    fn test_parse_data_rejects_bad_json() {
        for body in [
            Body::Empty,
            Body::Text("not json".to_string()),
            Body::Text(r#"{"uid":"u1","isAdmin":true}"#.to_string()),
            Body::Binary(vec![0xff, 0xfe]),
        ] {
            assert!(matches!(parse_data(&body), Err(CallableError::InvalidArgument(_))));
        }
    }

    #[test]
    fn test_caller_from_header_only_when_allowed() {
        let event = lambda_http::http::Request::builder()
            .header("X-User-Id", "dev-admin")
            .body(Body::Empty)
            .unwrap();

        assert_eq!(caller_context(&event, true), CallerContext::authenticated("dev-admin"));
        assert_eq!(caller_context(&event, false), CallerContext::anonymous());
    }

    #[test]
    fn test_no_authorizer_is_anonymous() {
        assert_eq!(caller_context(&Request::default(), false), CallerContext::anonymous());
    }

    #[test]
    fn test_error_response_shape() {
        let response = error_response(&CallableError::PermissionDenied).unwrap();
        assert_eq!(response.status(), 403);

        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(
            body,
            json!({"error": {
                "status": "PERMISSION_DENIED",
                "code": "permission-denied",
                "message": "Must be admin to set admin claims"
            }})
        );
    }

    #[test]
    fn test_result_response_shape() {
        let response = result_response(&json!({"success": true})).unwrap();
        assert_eq!(response.status(), 200);

        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body, json!({"result": {"success": true}}));
    }
}
