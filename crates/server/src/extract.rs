//! Request body extraction.
//!
//! POST routes accept the same fields either as JSON or as a url-encoded
//! form. [`FormOrJson`] picks the decoder from the `Content-Type` header and
//! turns every rejection into a 400 [`AppError::BadRequest`].

use axum::{
    Form, Json,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Body decoded from `application/json` or `application/x-www-form-urlencoded`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormOrJson<T>(pub T);

fn is_json(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| {
            let mime = mime.trim();
            mime.eq_ignore_ascii_case("application/json")
                || mime.to_ascii_lowercase().ends_with("+json")
        })
}

impl<T, S> FromRequest<S> for FormOrJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_json(&req) {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            Ok(Self(value))
        } else {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            Ok(Self(value))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Payload {
        name: String,
        price: f64,
    }

    async fn extract(content_type: &str, body: &str) -> Result<Payload, AppError> {
        let req = Request::builder()
            .method("POST")
            .uri("/")
            .header(CONTENT_TYPE, content_type)
            .body(Body::from(body.to_owned()))
            .unwrap();
        FormOrJson::<Payload>::from_request(req, &())
            .await
            .map(|FormOrJson(p)| p)
    }

    #[tokio::test]
    async fn test_json_body() {
        let payload = extract("application/json", r#"{"name":"lamp","price":2.5}"#)
            .await
            .unwrap();
        assert_eq!(payload.name, "lamp");
        assert!((payload.price - 2.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_form_body() {
        let payload = extract("application/x-www-form-urlencoded", "name=desk+lamp&price=100")
            .await
            .unwrap();
        assert_eq!(payload.name, "desk lamp");
        assert!((payload.price - 100.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_json_with_charset() {
        let payload = extract(
            "application/json; charset=utf-8",
            r#"{"name":"a","price":1}"#,
        )
        .await
        .unwrap();
        assert_eq!(payload.name, "a");
    }

    #[tokio::test]
    async fn test_missing_field_is_bad_request() {
        let err = extract("application/json", r#"{"name":"lamp"}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_malformed_form_is_bad_request() {
        let err = extract("application/x-www-form-urlencoded", "name=lamp&price=cheap")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
