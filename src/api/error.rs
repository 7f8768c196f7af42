use crate::application::loan::LoanApplicationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};

use super::types::ErrorResponse;

/// 未認証時の誘導先
pub const LOGIN_PATH: &str = "/account/login";

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
/// 未認証はエラー本文ではなくログイン画面へのリダイレクトになる。
#[derive(Debug)]
pub enum ApiError {
    Unauthenticated,
    Forbidden,
    BadRequest(String),
    Application(LoanApplicationError),
}

impl From<LoanApplicationError> for ApiError {
    fn from(err: LoanApplicationError) -> Self {
        ApiError::Application(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::Unauthenticated => return Redirect::to(LOGIN_PATH).into_response(),
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "You are not allowed to perform this operation".to_string(),
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Application(err) => application_error_parts(err),
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}

fn application_error_parts(err: LoanApplicationError) -> (StatusCode, &'static str, String) {
    match err {
        // 404 Not Found - リクエストされたリソースが存在しない
        LoanApplicationError::LoanNotFound => (
            StatusCode::NOT_FOUND,
            "LOAN_NOT_FOUND",
            "Loan not found".to_string(),
        ),
        LoanApplicationError::BookNotFound => (
            StatusCode::NOT_FOUND,
            "BOOK_NOT_FOUND",
            "Book not found".to_string(),
        ),

        // 403 Forbidden - 他人の貸出の延長など
        LoanApplicationError::AccessDenied => (
            StatusCode::FORBIDDEN,
            "ACCESS_DENIED",
            "This loan does not belong to you".to_string(),
        ),

        // 422 Unprocessable Entity - ビジネスルール違反
        LoanApplicationError::IneligibleBorrower => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "INELIGIBLE_BORROWER",
            "A valid library card is required to borrow books".to_string(),
        ),
        LoanApplicationError::InvalidQuantity => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "INVALID_QUANTITY",
            "Quantity must be at least 1".to_string(),
        ),

        // 500 Internal Server Error - システム障害
        // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
        LoanApplicationError::RepositoryError(e) => {
            tracing::error!("Loan repository error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "REPOSITORY_ERROR",
                "Failed to access loan records".to_string(),
            )
        }
        LoanApplicationError::CatalogServiceError(e) => {
            tracing::error!("Catalog service error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CATALOG_SERVICE_ERROR",
                "Catalog service error".to_string(),
            )
        }
        LoanApplicationError::MembershipServiceError(e) => {
            tracing::error!("Membership service error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "MEMBERSHIP_SERVICE_ERROR",
                "Membership service error".to_string(),
            )
        }
    }
}
