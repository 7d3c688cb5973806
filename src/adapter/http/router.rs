use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use super::handlers;
use super::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/book", post(handlers::book))
        .with_state(state)
}

/// Serve until ctrl-c.
pub async fn serve(bind: SocketAddr, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!("HTTP server listening on {}", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("HTTP server shutting down");
        })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::BookingService;
    use crate::domain::error::{BookingError, Result};
    use crate::domain::model::TargetDate;
    use crate::domain::scope::Scope;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tower::ServiceExt;

    #[derive(Default)]
    struct StubBooking {
        fail_with_location: Option<String>,
        booked: Mutex<Vec<TargetDate>>,
    }

    #[async_trait]
    impl BookingService for StubBooking {
        async fn book(&self, _scope: &Scope, date: TargetDate) -> Result<()> {
            self.booked.lock().unwrap().push(date);
            match &self.fail_with_location {
                Some(name) => Err(BookingError::LocationNotFound(name.clone())),
                None => Ok(()),
            }
        }
    }

    /// Runs until its scope is cancelled, then records that it wound down.
    #[derive(Default)]
    struct HangingBooking {
        finished: AtomicBool,
    }

    #[async_trait]
    impl BookingService for HangingBooking {
        async fn book(&self, scope: &Scope, _date: TargetDate) -> Result<()> {
            let err = scope.done().await;
            self.finished.store(true, Ordering::SeqCst);
            Err(err)
        }
    }

    fn app(stub: Arc<StubBooking>) -> Router {
        build_router(Arc::new(AppState::new(stub)))
    }

    async fn send(app: Router, method: &str, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_books_valid_date() {
        let stub = Arc::new(StubBooking::default());
        let (status, body) = send(app(stub.clone()), "POST", "/api/book?date=Feb%2018,%202025").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Booking successful for date: Feb 18, 2025");
        assert_eq!(
            *stub.booked.lock().unwrap(),
            vec![TargetDate::from_ymd(2025, 2, 18).unwrap()]
        );
    }

    #[tokio::test]
    async fn test_rejects_wrong_method() {
        let stub = Arc::new(StubBooking::default());
        let (status, _) = send(app(stub.clone()), "GET", "/api/book?date=Feb%2018,%202025").await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert!(stub.booked.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_date() {
        let stub = Arc::new(StubBooking::default());
        let (status, body) = send(app(stub.clone()), "POST", "/api/book").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["kind"], "missing_date");
        assert!(stub.booked.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_date() {
        let stub = Arc::new(StubBooking::default());
        let (status, body) = send(app(stub.clone()), "POST", "/api/book?date=2025-02-18").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["kind"], "invalid_date");
        assert!(stub.booked.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_booking_failure_is_reported() {
        let stub = Arc::new(StubBooking {
            fail_with_location: Some("Downtown Hub".into()),
            ..Default::default()
        });
        let (status, body) = send(app(stub), "POST", "/api/book?date=Feb%2018,%202025").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["kind"], "location_not_found");
        assert!(json["message"].as_str().unwrap().contains("Downtown Hub"));
    }

    #[tokio::test]
    async fn test_disconnect_cancels_booking_and_lets_it_finish() {
        let hanging = Arc::new(HangingBooking::default());
        let router = build_router(Arc::new(AppState::new(hanging.clone())));
        let request = Request::builder()
            .method("POST")
            .uri("/api/book?date=Feb%2018,%202025")
            .body(Body::empty())
            .unwrap();

        let response = tokio::time::timeout(Duration::from_millis(50), router.oneshot(request)).await;
        assert!(response.is_err(), "booking should still be running");

        for _ in 0..100 {
            if hanging.finished.load(Ordering::SeqCst) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(hanging.finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(app(Arc::new(StubBooking::default())), "GET", "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }
}
