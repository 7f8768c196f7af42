use crate::application::access::{Operation, list_scope};
use crate::application::loan::{
    ServiceDependencies, approve_loan as execute_approve_loan, list_for_scope, list_pending,
    reject_loan as execute_reject_loan, renew_loan as execute_renew_loan,
    request_loan as execute_request_loan, return_loan as execute_return_loan,
};
use crate::domain::{
    commands::{ApproveLoan, RejectLoan, RenewLoan, RequestLoan, ReturnLoan},
    value_objects::{BookId, LoanId},
};
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::Redirect,
};
use std::sync::Arc;
use uuid::Uuid;

use super::{
    auth::Caller,
    error::ApiError,
    types::{
        ListLoansQuery, LoanRequestedResponse, LoanResponse, RenewalResponse, RequestLoanBody,
        format_date, parse_status_filter,
    },
};

/// 画面遷移系の操作が成功した後の誘導先
pub const LOANS_PATH: &str = "/loans";

pub const LOAN_REQUESTED_MESSAGE: &str =
    "Borrow request submitted. Waiting for librarian approval.";

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

/// パスの貸出IDを取り出す
///
/// 抽出の失敗は認可の後で400にする。未ログインの呼び出しは常にログインへ誘導される。
fn loan_id_from(path: Result<Path<Uuid>, PathRejection>) -> Result<LoanId, ApiError> {
    let Path(loan_id) = path.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    Ok(LoanId::from_uuid(loan_id))
}

// ============================================================================
// Command handlers (POST)
// ============================================================================

/// POST /loans - 貸出を申請
///
/// 借り手は常に呼び出し元本人。
///
/// 強制されるビジネスルール:
/// - 有効な利用者カードを持っていること
/// - 書籍が存在すること
pub async fn request_loan(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    payload: Result<Json<RequestLoanBody>, JsonRejection>,
) -> Result<(StatusCode, Json<LoanRequestedResponse>), ApiError> {
    let identity = caller.authorize(Operation::RequestLoan)?;
    let Json(req) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let cmd = RequestLoan {
        borrower_id: identity.user_id,
        book_id: BookId::from_uuid(req.book_id),
        quantity: req.quantity.unwrap_or(1),
        requested_at: chrono::Utc::now(),
    };

    let loan = execute_request_loan(&state.service_deps, cmd).await?;

    let response = LoanRequestedResponse {
        success: true,
        message: LOAN_REQUESTED_MESSAGE.to_string(),
        loan_id: loan.loan_id.value(),
        due_date: format_date(loan.due_date),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /loans/:id/approve - 貸出申請を承認（管理者）
///
/// 申請中でなければ何もせずに一覧へ戻る。
pub async fn approve_loan(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Redirect, ApiError> {
    let identity = caller.authorize(Operation::Approve)?;
    let loan_id = loan_id_from(path)?;

    let cmd = ApproveLoan {
        loan_id,
        approver_id: identity.user_id,
    };
    execute_approve_loan(&state.service_deps, cmd).await?;

    Ok(Redirect::to(LOANS_PATH))
}

/// POST /loans/:id/reject - 貸出申請を却下（管理者）
pub async fn reject_loan(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Redirect, ApiError> {
    caller.authorize(Operation::Reject)?;
    let loan_id = loan_id_from(path)?;

    let cmd = RejectLoan { loan_id };
    execute_reject_loan(&state.service_deps, cmd).await?;

    Ok(Redirect::to(LOANS_PATH))
}

/// POST /loans/:id/renew - 貸出を延長（借り手本人）
///
/// 延長できない場合も200で `success: false` を返す。
pub async fn renew_loan(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<RenewalResponse>, ApiError> {
    // 所有者の確認は記録を読み込んだ後にアプリケーション層で行う
    let identity = caller.authenticated()?;
    let loan_id = loan_id_from(path)?;

    let cmd = RenewLoan {
        loan_id,
        requested_by: identity,
        requested_at: chrono::Utc::now(),
    };
    let outcome = execute_renew_loan(&state.service_deps, cmd).await?;

    Ok(Json(RenewalResponse::from(outcome)))
}

/// POST /loans/:id/return - 返却を記録（管理者）
///
/// 延滞料は返却時に計算される。
pub async fn return_loan(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Redirect, ApiError> {
    caller.authorize(Operation::Return)?;
    let loan_id = loan_id_from(path)?;

    let cmd = ReturnLoan {
        loan_id,
        returned_at: chrono::Utc::now(),
    };
    execute_return_loan(&state.service_deps, cmd).await?;

    Ok(Redirect::to(LOANS_PATH))
}

// ============================================================================
// Query handlers (GET)
// ============================================================================

/// GET /loans - 貸出一覧
///
/// 会員は自分の貸出のみ、管理者は全件。
/// 管理者は `status` クエリパラメータで絞り込める。
pub async fn list_loans(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    query: Result<Query<ListLoansQuery>, QueryRejection>,
) -> Result<Json<Vec<LoanResponse>>, ApiError> {
    let identity = caller.authorize(Operation::ListLoans)?;
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let status = query
        .status
        .as_deref()
        .map(parse_status_filter)
        .transpose()
        .map_err(ApiError::BadRequest)?;

    let loans = list_for_scope(&state.service_deps, list_scope(&identity), status).await?;

    Ok(Json(loans.into_iter().map(LoanResponse::from).collect()))
}

/// GET /loans/pending - 承認待ち一覧（管理者）
pub async fn list_pending_loans(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<Json<Vec<LoanResponse>>, ApiError> {
    caller.authorize(Operation::ListPending)?;

    let loans = list_pending(&state.service_deps).await?;

    Ok(Json(loans.into_iter().map(LoanResponse::from).collect()))
}
