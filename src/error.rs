//! API Error Taxonomy
//! Mission: Turn every failure into one of six caller-facing outcomes

use crate::store::StoreError;
use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Duplicate(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unauthenticated(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Duplicate(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(msg) => ApiError::Validation(msg),
            StoreError::Duplicate { .. } => ApiError::Duplicate(err.to_string()),
            StoreError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            other => ApiError::Internal(anyhow::Error::new(other)),
        }
    }
}

const JSON_DATA_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let message = match &rejection {
            JsonRejection::JsonDataError(_) => {
                let text = rejection.body_text();
                let detail = text.strip_prefix(JSON_DATA_PREFIX).unwrap_or(&text);
                format!("Invalid request body: {detail}")
            }
            JsonRejection::JsonSyntaxError(_) => "Request body is not valid JSON".to_string(),
            JsonRejection::MissingJsonContentType(_) => {
                "Request body must be JSON (Content-Type: application/json)".to_string()
            }
            _ => rejection.body_text(),
        };
        ApiError::Validation(message)
    }
}

/// `axum::Json` whose rejections answer with the standard error body
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(JsonBody(value))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Internal(err) => {
                tracing::error!("Internal error: {:#}", err);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "success": false,
            "message": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_mapping() {
        let dup: ApiError = StoreError::Duplicate { field: "caseNumber" }.into();
        assert_eq!(dup.status(), StatusCode::BAD_REQUEST);
        assert_eq!(dup.to_string(), "caseNumber already exists");

        let missing: ApiError = StoreError::NotFound { entity: "Judge" }.into();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let db: ApiError = StoreError::Sqlite(rusqlite::Error::InvalidQuery).into();
        assert!(matches!(db, ApiError::Internal(_)));
    }

    #[tokio::test]
    async fn test_internal_detail_is_hidden() {
        let err = ApiError::Internal(anyhow::anyhow!("disk I/O error at /var/db"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Internal server error");
    }

    #[derive(Debug, serde::Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Filing {
        #[allow(dead_code)]
        case_number: Option<String>,
    }

    async fn extract(body: &'static str, content_type: &str) -> Result<Filing, ApiError> {
        let req = axum::http::Request::builder()
            .method("POST")
            .header(axum::http::header::CONTENT_TYPE, content_type)
            .body(axum::body::Body::from(body))
            .unwrap();
        JsonBody::<Filing>::from_request(req, &()).await.map(|JsonBody(v)| v)
    }

    #[tokio::test]
    async fn test_json_rejections_become_validation_errors() {
        match extract(r#"{"caseNumber": 5}"#, "application/json").await {
            Err(ApiError::Validation(msg)) => {
                assert!(msg.starts_with("Invalid request body: "), "{msg}");
                assert!(msg.contains("caseNumber"), "{msg}");
            }
            other => panic!("expected validation error, got {other:?}"),
        }

        let err = extract("{not json", "application/json").await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Request body is not valid JSON");

        let err = extract(r#"{"caseNumber":"C-1"}"#, "text/plain").await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        assert!(extract(r#"{"caseNumber":"C-1"}"#, "application/json").await.is_ok());
    }
}
