use std::sync::Arc;

use axum::extract::{Query, State};
use serde::Deserialize;

use super::error::ApiError;
use super::state::AppState;
use crate::domain::model::TargetDate;
use crate::domain::scope::Scope;

#[derive(Debug, Deserialize)]
pub struct BookQuery {
    date: Option<String>,
}

pub async fn book(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BookQuery>,
) -> Result<String, ApiError> {
    let raw = query
        .date
        .filter(|date| !date.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("missing_date", "Missing 'date' query parameter"))?;
    let date = TargetDate::parse(&raw)?;

    tracing::info!(date = %date, "Received booking request");

    // A dropped request (client gone) cancels the booking and its probes. The booking
    // itself runs on its own task and always finishes, closing its session.
    let scope = Scope::root();
    let _cancel_on_disconnect = scope.cancel_on_drop();

    let booking = {
        let state = state.clone();
        let scope = scope.clone();
        tokio::spawn(async move {
            let _serialized = state.booking_lock.lock().await;
            state.booking.book(&scope, date).await
        })
    };
    booking
        .await
        .map_err(|e| ApiError::internal(format!("booking task failed: {e}")))??;

    Ok(format!("Booking successful for date: {}", raw))
}

pub async fn health() -> &'static str {
    "OK"
}
