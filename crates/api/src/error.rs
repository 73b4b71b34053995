//! Mapping of request failures to HTTP responses.

use axum::{
    Json,
    extract::rejection::{BytesRejection, JsonRejection, QueryRejection},
    http::{StatusCode, header::WWW_AUTHENTICATE},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;
use vatrec_core::vat::VatError;
use vatrec_shared::{ApiKeyError, AppError};

/// An [`AppError`] rendered as `{error, message}`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = match &self.0 {
            AppError::Internal(detail) => {
                error!(error = %detail, "Request failed");
                "An error occurred".to_string()
            }
            AppError::Unauthorized(m) | AppError::Validation(m) | AppError::PayloadTooLarge(m) => {
                m.clone()
            }
        };

        let body = Json(json!({
            "error": self.0.error_code().to_ascii_lowercase(),
            "message": message
        }));

        if matches!(self.0, AppError::Unauthorized(_)) {
            (status, [(WWW_AUTHENTICATE, "ApiKey")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<ApiKeyError> for ApiError {
    fn from(err: ApiKeyError) -> Self {
        Self(AppError::Unauthorized(err.to_string()))
    }
}

impl From<VatError> for ApiError {
    fn from(err: VatError) -> Self {
        Self(AppError::Validation(err.to_string()))
    }
}

/// Body and query rejections: oversized bodies are 413, the rest 400.
fn rejection(status: StatusCode, text: String) -> ApiError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError(AppError::PayloadTooLarge(text))
    } else {
        ApiError(AppError::Validation(text))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(r: JsonRejection) -> Self {
        rejection(r.status(), r.body_text())
    }
}

impl From<BytesRejection> for ApiError {
    fn from(r: BytesRejection) -> Self {
        rejection(r.status(), r.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(r: QueryRejection) -> Self {
        rejection(r.status(), r.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use rstest::rstest;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = ApiError(err).into_response();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[rstest]
    #[case(AppError::Validation("bad".into()), 400, "validation_error", "bad")]
    #[case(AppError::PayloadTooLarge("big".into()), 413, "payload_too_large", "big")]
    #[case(AppError::Unauthorized("who".into()), 401, "unauthorized", "who")]
    #[case(AppError::Internal("db down".into()), 500, "internal_error", "An error occurred")]
    #[tokio::test]
    async fn test_error_envelope(
        #[case] err: AppError,
        #[case] status: u16,
        #[case] code: &str,
        #[case] message: &str,
    ) {
        let (actual_status, body) = render(err).await;
        assert_eq!(actual_status.as_u16(), status);
        assert_eq!(body["error"], code);
        assert_eq!(body["message"], message);
    }

    #[test]
    fn test_only_unauthorized_sets_challenge() {
        let response = ApiError(AppError::Unauthorized("x".into())).into_response();
        assert_eq!(response.headers()[WWW_AUTHENTICATE], "ApiKey");

        let response = ApiError(AppError::Validation("x".into())).into_response();
        assert!(response.headers().get(WWW_AUTHENTICATE).is_none());
    }

    #[test]
    fn test_vat_error_is_bad_request() {
        let ApiError(err) = ApiError::from(VatError::NotAList);
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_oversized_body_is_payload_too_large() {
        let ApiError(err) = rejection(StatusCode::PAYLOAD_TOO_LARGE, "length limit exceeded".into());
        assert!(matches!(err, AppError::PayloadTooLarge(_)));

        let ApiError(err) = rejection(StatusCode::UNSUPPORTED_MEDIA_TYPE, "no content type".into());
        assert!(matches!(err, AppError::Validation(_)));
    }
}
