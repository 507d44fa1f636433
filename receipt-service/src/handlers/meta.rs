use crate::dtos::ReceiptIdResponse;
use crate::startup::AppState;
use axum::{extract::State, Json};
use receipt_form::{generate_receipt_id, Currency};

pub async fn new_receipt_id() -> Json<ReceiptIdResponse> {
    Json(ReceiptIdResponse {
        receipt_id: generate_receipt_id(),
    })
}

pub async fn list_currencies(State(state): State<AppState>) -> Json<Vec<Currency>> {
    Json(state.currencies.as_ref().clone())
}
