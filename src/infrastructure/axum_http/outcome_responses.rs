use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::domain::value_objects::outcomes::{OutcomeKind, SubscriptionOutcome};

#[derive(Debug, Serialize)]
pub struct OutcomeResponse {
    pub code: u16,
    pub message: String,
}

pub fn status_code(kind: OutcomeKind) -> StatusCode {
    match kind {
        OutcomeKind::Success => StatusCode::OK,
        OutcomeKind::BadInput => StatusCode::BAD_REQUEST,
        OutcomeKind::Conflict => StatusCode::CONFLICT,
        OutcomeKind::NotFound => StatusCode::NOT_FOUND,
        OutcomeKind::InternalFailure => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for SubscriptionOutcome {
    fn into_response(self) -> Response {
        let status = status_code(self.kind);
        let message = match self.kind {
            // Storage errors are logged by the use case, not echoed to the caller.
            OutcomeKind::InternalFailure => "Internal server error".to_string(),
            _ => self.message,
        };

        let body = Json(OutcomeResponse {
            code: status.as_u16(),
            message,
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_maps_to_its_status() {
        assert_eq!(status_code(OutcomeKind::Success), StatusCode::OK);
        assert_eq!(status_code(OutcomeKind::BadInput), StatusCode::BAD_REQUEST);
        assert_eq!(status_code(OutcomeKind::Conflict), StatusCode::CONFLICT);
        assert_eq!(status_code(OutcomeKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status_code(OutcomeKind::InternalFailure),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn internal_failures_do_not_leak_storage_detail() {
        let response =
            SubscriptionOutcome::new(OutcomeKind::InternalFailure, "password authentication failed")
                .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(
            serde_json::from_slice::<serde_json::Value>(&body).unwrap(),
            serde_json::json!({"code": 500, "message": "Internal server error"})
        );
    }

    #[tokio::test]
    async fn caller_errors_keep_their_message() {
        let response = SubscriptionOutcome::new(OutcomeKind::NotFound, "subscription 7 not found")
            .into_response();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(
            serde_json::from_slice::<serde_json::Value>(&body).unwrap(),
            serde_json::json!({"code": 404, "message": "subscription 7 not found"})
        );
    }
}
