use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::{
    application::usercases::subscriptions::SubscriptionUseCase,
    domain::{
        repositories::subscriptions::SubscriptionRepository,
        value_objects::outcomes::{SubscriptionOperation, SubscriptionOutcome},
    },
};

pub fn routes<T>(subscriptions_usecase: Arc<SubscriptionUseCase<T>>) -> Router
where
    T: SubscriptionRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/", post(create::<T>))
        .route("/update", post(update::<T>))
        .route("/cancel", post(cancel::<T>))
        .route("/payment-succeeded", post(payment_succeeded::<T>))
        .route("/payment-failed", post(payment_failed::<T>))
        .route("/webhook", post(webhook::<T>))
        .route("/:subscription_id", get(get_subscription::<T>))
        .with_state(subscriptions_usecase)
}

pub async fn create<T>(
    State(subscriptions_usecase): State<Arc<SubscriptionUseCase<T>>>,
    body: Bytes,
) -> Response
where
    T: SubscriptionRepository + Send + Sync,
{
    subscriptions_usecase
        .handle_payload(SubscriptionOperation::Create, &body)
        .await
        .into_response()
}

pub async fn update<T>(
    State(subscriptions_usecase): State<Arc<SubscriptionUseCase<T>>>,
    body: Bytes,
) -> Response
where
    T: SubscriptionRepository + Send + Sync,
{
    subscriptions_usecase
        .handle_payload(SubscriptionOperation::Update, &body)
        .await
        .into_response()
}

pub async fn cancel<T>(
    State(subscriptions_usecase): State<Arc<SubscriptionUseCase<T>>>,
    body: Bytes,
) -> Response
where
    T: SubscriptionRepository + Send + Sync,
{
    subscriptions_usecase
        .handle_payload(SubscriptionOperation::Cancel, &body)
        .await
        .into_response()
}

pub async fn payment_succeeded<T>(
    State(subscriptions_usecase): State<Arc<SubscriptionUseCase<T>>>,
    body: Bytes,
) -> Response
where
    T: SubscriptionRepository + Send + Sync,
{
    subscriptions_usecase
        .handle_payload(SubscriptionOperation::PaymentSucceeded, &body)
        .await
        .into_response()
}

pub async fn payment_failed<T>(
    State(subscriptions_usecase): State<Arc<SubscriptionUseCase<T>>>,
    body: Bytes,
) -> Response
where
    T: SubscriptionRepository + Send + Sync,
{
    subscriptions_usecase
        .handle_payload(SubscriptionOperation::PaymentFailed, &body)
        .await
        .into_response()
}

pub async fn webhook<T>(
    State(subscriptions_usecase): State<Arc<SubscriptionUseCase<T>>>,
    body: Bytes,
) -> Response
where
    T: SubscriptionRepository + Send + Sync,
{
    subscriptions_usecase.handle_alert(&body).await.into_response()
}

pub async fn get_subscription<T>(
    State(subscriptions_usecase): State<Arc<SubscriptionUseCase<T>>>,
    Path(subscription_id): Path<String>,
) -> Response
where
    T: SubscriptionRepository + Send + Sync,
{
    match subscriptions_usecase.get_subscription(&subscription_id).await {
        Ok(subscription) => (StatusCode::OK, Json(subscription)).into_response(),
        Err(err) => SubscriptionOutcome::new(err.kind(), err.to_string()).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::in_memory::subscriptions::SubscriptionInMemory;
    use axum::{body::Body, http::Request};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn app() -> Router {
        let usecase = SubscriptionUseCase::new(Arc::new(SubscriptionInMemory::new()));
        routes(Arc::new(usecase))
    }

    fn post_json(uri: &str, payload: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&payload).unwrap()))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn create_then_duplicate_create_conflicts() {
        let app = app();
        let payload = json!({"subscription_id": "42", "plan_id": 3});

        let first = app
            .clone()
            .oneshot(post_json("/", payload.clone()))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(
            body_json(first).await,
            json!({"code": 200, "message": "Subscription created successfully."})
        );

        let second = app.oneshot(post_json("/", payload)).await.unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn webhook_routes_alerts_and_record_reads_back() {
        let app = app();

        let created = app
            .clone()
            .oneshot(post_json(
                "/webhook",
                json!({
                    "alert_name": "subscription_created",
                    "subscription_id": "42",
                    "subscription_plan_id": "3",
                    "next_bill_date": "2024-02-01"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::OK);

        let failed = app
            .clone()
            .oneshot(post_json(
                "/webhook",
                json!({"alert_name": "subscription_payment_failed", "subscription_id": "42"}),
            ))
            .await
            .unwrap();
        assert_eq!(failed.status(), StatusCode::OK);

        let read = app
            .oneshot(
                Request::builder()
                    .uri("/42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(read.status(), StatusCode::OK);

        let body = body_json(read).await;
        assert_eq!(body["status"], "past_due");
        assert_eq!(body["next_bill_date"], "0001-01-01");
    }

    #[tokio::test]
    async fn malformed_and_unknown_requests_map_to_client_errors() {
        let app = app();

        let malformed = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/update")
                    .body(Body::from("subscription_id=42"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);

        let missing = app
            .oneshot(post_json(
                "/payment-failed",
                json!({"subscription_id": "404"}),
            ))
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }
}
