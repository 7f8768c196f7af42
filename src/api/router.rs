use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, approve_loan, list_loans, list_pending_loans, reject_loan, renew_loan,
    request_loan, return_loan,
};

/// Creates the API router with all borrowing endpoints
///
/// Command endpoints:
/// - POST /loans - Request a loan (caller is the borrower)
/// - POST /loans/:id/approve - Approve a request (admin)
/// - POST /loans/:id/reject - Reject a request (admin)
/// - POST /loans/:id/renew - Renew a loan (borrower)
/// - POST /loans/:id/return - Record a return (admin)
///
/// Query endpoints:
/// - GET /loans - Own loans, or all loans for admins
/// - GET /loans/pending - Requests waiting for approval (admin)
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        .route("/loans", get(list_loans).post(request_loan))
        .route("/loans/pending", get(list_pending_loans))
        .route("/loans/:id/approve", post(approve_loan))
        .route("/loans/:id/reject", post(reject_loan))
        .route("/loans/:id/renew", post(renew_loan))
        .route("/loans/:id/return", post(return_loan))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
