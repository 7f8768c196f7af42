mod common;

use chrono::{Duration, Months};
use common::{TestContext, at, loan_record};
use rust_decimal::Decimal;
use rusty_library_borrowing::application::access::ListScope;
use rusty_library_borrowing::application::loan::{
    LoanApplicationError, RENEWAL_SUCCESS_MESSAGE, approve_loan, list_all, list_for_scope,
    list_own, list_pending, reject_loan, renew_loan, request_loan, return_loan,
};
use rusty_library_borrowing::domain::commands::*;
use rusty_library_borrowing::domain::loan::Transition;
use rusty_library_borrowing::domain::value_objects::*;
use rusty_library_borrowing::domain::{
    Identity, MembershipCard, RENEWAL_REJECTED_ACTION, RenewalRejection,
};

// ============================================================================
// 貸出申請
// ============================================================================

#[tokio::test]
async fn test_request_loan_creates_processing_record() {
    let ctx = TestContext::new();
    let borrower_id = ctx.member_with_card();
    let book_id = ctx.catalog.add_book_titled("Dune");
    let now = at(2024, 1, 1);

    let loan = request_loan(
        &ctx.deps,
        RequestLoan {
            borrower_id,
            book_id,
            quantity: 1,
            requested_at: now,
        },
    )
    .await
    .unwrap();

    assert_eq!(loan.status, LoanStatus::Processing);
    assert_eq!(loan.loaned_at, now);
    assert_eq!(loan.due_date, at(2024, 1, 15));
    assert_eq!(loan.approved_by, None);
    assert_eq!(loan.line_items.len(), 1);
    assert_eq!(loan.line_items[0].book_id, book_id);

    // 保存されていること
    assert_eq!(ctx.stored(loan.loan_id).await, loan);
}

#[tokio::test]
async fn test_request_loan_fails_when_only_card_expired() {
    // 2024-01-01に失効したカードで2024-02-01に申請
    let ctx = TestContext::new();
    let borrower_id = ctx.member_with_card_until(at(2024, 1, 1));
    let book_id = ctx.catalog.add_book_titled("Dune");

    let result = request_loan(
        &ctx.deps,
        RequestLoan {
            borrower_id,
            book_id,
            quantity: 1,
            requested_at: at(2024, 2, 1),
        },
    )
    .await;

    assert!(matches!(result, Err(LoanApplicationError::IneligibleBorrower)));
    assert!(list_all(&ctx.deps, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_request_loan_fails_without_any_card() {
    let ctx = TestContext::new();
    let book_id = ctx.catalog.add_book_titled("Dune");

    let result = request_loan(
        &ctx.deps,
        RequestLoan {
            borrower_id: UserId::new(),
            book_id,
            quantity: 1,
            requested_at: at(2024, 1, 1),
        },
    )
    .await;

    assert!(matches!(result, Err(LoanApplicationError::IneligibleBorrower)));
}

#[tokio::test]
async fn test_request_loan_ignores_suspended_card() {
    let ctx = TestContext::new();
    let borrower_id = UserId::new();
    ctx.memberships.add_card(MembershipCard {
        card_id: CardId::new(),
        user_id: borrower_id,
        issued_at: at(2023, 1, 1),
        expires_at: at(2099, 1, 1),
        status: Some(CardStatus::Suspended),
    });
    let book_id = ctx.catalog.add_book_titled("Dune");

    let result = request_loan(
        &ctx.deps,
        RequestLoan {
            borrower_id,
            book_id,
            quantity: 1,
            requested_at: at(2024, 1, 1),
        },
    )
    .await;

    assert!(matches!(result, Err(LoanApplicationError::IneligibleBorrower)));
}

#[tokio::test]
async fn test_request_loan_accepts_when_a_newer_card_is_valid() {
    let ctx = TestContext::new();
    let borrower_id = ctx.member_with_card_until(at(2023, 6, 1));
    ctx.memberships.add_card(MembershipCard {
        card_id: CardId::new(),
        user_id: borrower_id,
        issued_at: at(2023, 6, 1),
        expires_at: at(2024, 6, 1),
        status: Some(CardStatus::Active),
    });
    let book_id = ctx.catalog.add_book_titled("Dune");

    let result = request_loan(
        &ctx.deps,
        RequestLoan {
            borrower_id,
            book_id,
            quantity: 1,
            requested_at: at(2024, 1, 1),
        },
    )
    .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_request_loan_fails_for_unknown_book() {
    let ctx = TestContext::new();
    let borrower_id = ctx.member_with_card();

    let result = request_loan(
        &ctx.deps,
        RequestLoan {
            borrower_id,
            book_id: BookId::new(),
            quantity: 1,
            requested_at: at(2024, 1, 1),
        },
    )
    .await;

    assert!(matches!(result, Err(LoanApplicationError::BookNotFound)));
}

#[tokio::test]
async fn test_request_loan_rejects_zero_quantity() {
    let ctx = TestContext::new();
    let borrower_id = ctx.member_with_card();
    let book_id = ctx.catalog.add_book_titled("Dune");

    let result = request_loan(
        &ctx.deps,
        RequestLoan {
            borrower_id,
            book_id,
            quantity: 0,
            requested_at: at(2024, 1, 1),
        },
    )
    .await;

    assert!(matches!(result, Err(LoanApplicationError::InvalidQuantity)));
}

// ============================================================================
// 承認・却下
// ============================================================================

#[tokio::test]
async fn test_approve_processing_loan() {
    let ctx = TestContext::new();
    let loan = loan_record(
        UserId::new(),
        BookId::new(),
        LoanStatus::Processing,
        at(2024, 1, 1),
        at(2024, 1, 15),
    );
    ctx.seed_loan(&loan).await;
    let approver_id = UserId::new();

    let transition = approve_loan(
        &ctx.deps,
        ApproveLoan {
            loan_id: loan.loan_id,
            approver_id,
        },
    )
    .await
    .unwrap();

    assert!(transition.is_applied());
    let stored = ctx.stored(loan.loan_id).await;
    assert_eq!(stored.status, LoanStatus::Borrowing);
    assert_eq!(stored.approved_by, Some(approver_id));
    assert_eq!(stored.due_date, loan.due_date);
}

#[tokio::test]
async fn test_reject_then_approve_is_a_no_op() {
    let ctx = TestContext::new();
    let loan = loan_record(
        UserId::new(),
        BookId::new(),
        LoanStatus::Processing,
        at(2024, 1, 1),
        at(2024, 1, 15),
    );
    ctx.seed_loan(&loan).await;

    let rejected = reject_loan(
        &ctx.deps,
        RejectLoan {
            loan_id: loan.loan_id,
        },
    )
    .await
    .unwrap();
    assert!(rejected.is_applied());
    assert_eq!(ctx.stored(loan.loan_id).await.status, LoanStatus::Rejected);

    let approved = approve_loan(
        &ctx.deps,
        ApproveLoan {
            loan_id: loan.loan_id,
            approver_id: UserId::new(),
        },
    )
    .await
    .unwrap();

    assert_eq!(
        approved,
        Transition::Skipped {
            current: LoanStatus::Rejected
        }
    );
    let stored = ctx.stored(loan.loan_id).await;
    assert_eq!(stored.status, LoanStatus::Rejected);
    assert_eq!(stored.approved_by, None);
}

#[tokio::test]
async fn test_double_approval_keeps_first_approver() {
    let ctx = TestContext::new();
    let loan = loan_record(
        UserId::new(),
        BookId::new(),
        LoanStatus::Processing,
        at(2024, 1, 1),
        at(2024, 1, 15),
    );
    ctx.seed_loan(&loan).await;
    let first = UserId::new();

    approve_loan(
        &ctx.deps,
        ApproveLoan {
            loan_id: loan.loan_id,
            approver_id: first,
        },
    )
    .await
    .unwrap();
    let second = approve_loan(
        &ctx.deps,
        ApproveLoan {
            loan_id: loan.loan_id,
            approver_id: UserId::new(),
        },
    )
    .await
    .unwrap();

    assert!(!second.is_applied());
    assert_eq!(ctx.stored(loan.loan_id).await.approved_by, Some(first));
}

#[tokio::test]
async fn test_reject_borrowing_loan_is_skipped() {
    let ctx = TestContext::new();
    let loan = loan_record(
        UserId::new(),
        BookId::new(),
        LoanStatus::Borrowing,
        at(2024, 1, 1),
        at(2024, 1, 15),
    );
    ctx.seed_loan(&loan).await;

    let transition = reject_loan(
        &ctx.deps,
        RejectLoan {
            loan_id: loan.loan_id,
        },
    )
    .await
    .unwrap();

    assert!(!transition.is_applied());
    assert_eq!(ctx.stored(loan.loan_id).await, loan);
}

#[tokio::test]
async fn test_transitions_fail_for_unknown_loan() {
    let ctx = TestContext::new();
    let loan_id = LoanId::new();

    let approve = approve_loan(
        &ctx.deps,
        ApproveLoan {
            loan_id,
            approver_id: UserId::new(),
        },
    )
    .await;
    let reject = reject_loan(&ctx.deps, RejectLoan { loan_id }).await;
    let returned = return_loan(
        &ctx.deps,
        ReturnLoan {
            loan_id,
            returned_at: at(2024, 1, 1),
        },
    )
    .await;

    assert!(matches!(approve, Err(LoanApplicationError::LoanNotFound)));
    assert!(matches!(reject, Err(LoanApplicationError::LoanNotFound)));
    assert!(matches!(returned, Err(LoanApplicationError::LoanNotFound)));
}

// ============================================================================
// 延長
// ============================================================================

#[tokio::test]
async fn test_renew_extends_due_date_by_seven_days() {
    let ctx = TestContext::new();
    let borrower_id = UserId::new();
    let loan = loan_record(
        borrower_id,
        BookId::new(),
        LoanStatus::Borrowing,
        at(2024, 1, 1),
        at(2024, 1, 15),
    );
    ctx.seed_loan(&loan).await;

    let outcome = renew_loan(
        &ctx.deps,
        RenewLoan {
            loan_id: loan.loan_id,
            requested_by: Identity::member(borrower_id),
            requested_at: at(2024, 1, 10),
        },
    )
    .await
    .unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.message, RENEWAL_SUCCESS_MESSAGE);
    assert_eq!(outcome.new_due_date, Some(at(2024, 1, 22)));
    assert_eq!(ctx.stored(loan.loan_id).await.due_date, at(2024, 1, 22));
    assert!(ctx.audit.entries().is_empty());
}

#[tokio::test]
async fn test_renew_at_cap_is_rejected_and_audited() {
    // 貸出日2024-01-01、返却期限2024-07-01（6ヶ月）
    let ctx = TestContext::new();
    let borrower_id = UserId::new();
    let loan = loan_record(
        borrower_id,
        BookId::new(),
        LoanStatus::Borrowing,
        at(2024, 1, 1),
        at(2024, 7, 1),
    );
    ctx.seed_loan(&loan).await;

    let outcome = renew_loan(
        &ctx.deps,
        RenewLoan {
            loan_id: loan.loan_id,
            requested_by: Identity::member(borrower_id),
            requested_at: at(2024, 6, 20),
        },
    )
    .await
    .unwrap();

    assert!(!outcome.success);
    assert_eq!(
        outcome.message,
        RenewalRejection::RenewalCapReached.message()
    );
    assert_eq!(outcome.new_due_date, None);
    assert_eq!(ctx.stored(loan.loan_id).await.due_date, at(2024, 7, 1));

    let entries = ctx.audit.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].user_id, borrower_id);
    assert_eq!(entries[0].loan_id, loan.loan_id);
    assert_eq!(entries[0].action, RENEWAL_REJECTED_ACTION);
    assert_eq!(entries[0].recorded_at, at(2024, 6, 20));
}

#[tokio::test]
async fn test_renew_returned_loan_is_rejected() {
    let ctx = TestContext::new();
    let borrower_id = UserId::new();
    let loan = loan_record(
        borrower_id,
        BookId::new(),
        LoanStatus::Returned,
        at(2024, 1, 1),
        at(2024, 1, 15),
    );
    ctx.seed_loan(&loan).await;

    let outcome = renew_loan(
        &ctx.deps,
        RenewLoan {
            loan_id: loan.loan_id,
            requested_by: Identity::member(borrower_id),
            requested_at: at(2024, 1, 20),
        },
    )
    .await
    .unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.message, RenewalRejection::AlreadyReturned.message());
    assert_eq!(ctx.stored(loan.loan_id).await, loan);
}

#[tokio::test]
async fn test_renew_processing_loan_is_rejected() {
    let ctx = TestContext::new();
    let borrower_id = UserId::new();
    let loan = loan_record(
        borrower_id,
        BookId::new(),
        LoanStatus::Processing,
        at(2024, 1, 1),
        at(2024, 1, 15),
    );
    ctx.seed_loan(&loan).await;

    let outcome = renew_loan(
        &ctx.deps,
        RenewLoan {
            loan_id: loan.loan_id,
            requested_by: Identity::member(borrower_id),
            requested_at: at(2024, 1, 2),
        },
    )
    .await
    .unwrap();

    assert!(!outcome.success);
    assert_eq!(ctx.audit.entries().len(), 1);
}

#[tokio::test]
async fn test_renew_rejection_survives_audit_log_failure() {
    let ctx = TestContext::new();
    ctx.audit.fail_writes();
    let borrower_id = UserId::new();
    let loan = loan_record(
        borrower_id,
        BookId::new(),
        LoanStatus::Borrowing,
        at(2024, 1, 1),
        at(2024, 7, 1),
    );
    ctx.seed_loan(&loan).await;

    let outcome = renew_loan(
        &ctx.deps,
        RenewLoan {
            loan_id: loan.loan_id,
            requested_by: Identity::member(borrower_id),
            requested_at: at(2024, 6, 20),
        },
    )
    .await
    .unwrap();

    assert!(!outcome.success);
    assert!(ctx.audit.entries().is_empty());
}

#[tokio::test]
async fn test_renew_by_another_user_is_denied() {
    let ctx = TestContext::new();
    let loan = loan_record(
        UserId::new(),
        BookId::new(),
        LoanStatus::Borrowing,
        at(2024, 1, 1),
        at(2024, 1, 15),
    );
    ctx.seed_loan(&loan).await;

    for requested_by in [Identity::member(UserId::new()), Identity::admin(UserId::new())] {
        let result = renew_loan(
            &ctx.deps,
            RenewLoan {
                loan_id: loan.loan_id,
                requested_by,
                requested_at: at(2024, 1, 10),
            },
        )
        .await;

        assert!(matches!(result, Err(LoanApplicationError::AccessDenied)));
    }
    assert_eq!(ctx.stored(loan.loan_id).await.due_date, at(2024, 1, 15));
}

#[tokio::test]
async fn test_repeated_renewals_never_pass_the_cap() {
    let ctx = TestContext::new();
    let borrower_id = UserId::new();
    let loaned_at = at(2024, 1, 1);
    let cap = loaned_at.checked_add_months(Months::new(6)).unwrap();
    let loan = loan_record(
        borrower_id,
        BookId::new(),
        LoanStatus::Borrowing,
        loaned_at,
        at(2024, 1, 15),
    );
    ctx.seed_loan(&loan).await;

    let mut previous = loan.due_date;
    let mut successes = 0;
    for _ in 0..40 {
        let outcome = renew_loan(
            &ctx.deps,
            RenewLoan {
                loan_id: loan.loan_id,
                requested_by: Identity::member(borrower_id),
                requested_at: loaned_at,
            },
        )
        .await
        .unwrap();

        let current = ctx.stored(loan.loan_id).await.due_date;
        assert!(current >= previous);
        assert!(current <= cap);
        if outcome.success {
            successes += 1;
        }
        previous = current;
    }

    // 01-15 から7日ずつ延長すると24回目でちょうど 07-01 に達する
    assert_eq!(successes, 24);
    assert_eq!(previous, cap);
}

// ============================================================================
// 返却
// ============================================================================

#[tokio::test]
async fn test_return_five_days_late_charges_fine() {
    let ctx = TestContext::new();
    let loan = loan_record(
        UserId::new(),
        BookId::new(),
        LoanStatus::Borrowing,
        at(2023, 12, 27),
        at(2024, 1, 10),
    );
    ctx.seed_loan(&loan).await;

    let returned = return_loan(
        &ctx.deps,
        ReturnLoan {
            loan_id: loan.loan_id,
            returned_at: at(2024, 1, 15),
        },
    )
    .await
    .unwrap();

    assert_eq!(returned.status, LoanStatus::Returned);
    assert_eq!(returned.returned_at, Some(at(2024, 1, 15)));
    assert_eq!(returned.fine_amount, Decimal::from(25000));
    assert_eq!(ctx.stored(loan.loan_id).await, returned);
}

#[tokio::test]
async fn test_return_on_time_has_no_fine() {
    let ctx = TestContext::new();
    let loan = loan_record(
        UserId::new(),
        BookId::new(),
        LoanStatus::Borrowing,
        at(2024, 1, 1),
        at(2024, 1, 15),
    );
    ctx.seed_loan(&loan).await;

    let returned = return_loan(
        &ctx.deps,
        ReturnLoan {
            loan_id: loan.loan_id,
            // 23時間の遅れは1日未満
            returned_at: at(2024, 1, 15) + Duration::hours(23),
        },
    )
    .await
    .unwrap();

    assert_eq!(returned.fine_amount, Decimal::ZERO);
}

#[tokio::test]
async fn test_returning_twice_recomputes_fine() {
    let ctx = TestContext::new();
    let loan = loan_record(
        UserId::new(),
        BookId::new(),
        LoanStatus::Borrowing,
        at(2024, 1, 1),
        at(2024, 1, 15),
    );
    ctx.seed_loan(&loan).await;

    return_loan(
        &ctx.deps,
        ReturnLoan {
            loan_id: loan.loan_id,
            returned_at: at(2024, 1, 16),
        },
    )
    .await
    .unwrap();
    let second = return_loan(
        &ctx.deps,
        ReturnLoan {
            loan_id: loan.loan_id,
            returned_at: at(2024, 1, 18),
        },
    )
    .await
    .unwrap();

    assert_eq!(second.returned_at, Some(at(2024, 1, 18)));
    assert_eq!(second.fine_amount, Decimal::from(15000));
}

/// 返却は状態を問わず記録される（承認前・却下済みでも）
#[tokio::test]
async fn test_return_from_processing_or_rejected_is_recorded() {
    for status in [LoanStatus::Processing, LoanStatus::Rejected] {
        let ctx = TestContext::new();
        let loan = loan_record(
            UserId::new(),
            BookId::new(),
            status,
            at(2023, 12, 27),
            at(2024, 1, 10),
        );
        ctx.seed_loan(&loan).await;

        let returned = return_loan(
            &ctx.deps,
            ReturnLoan {
                loan_id: loan.loan_id,
                returned_at: at(2024, 1, 15),
            },
        )
        .await
        .unwrap();

        assert_eq!(returned.status, LoanStatus::Returned);
        assert_eq!(returned.returned_at, Some(at(2024, 1, 15)));
        assert_eq!(returned.fine_amount, Decimal::from(25000));
        // 承認者は付かない
        assert_eq!(returned.approved_by, None);
        assert_eq!(ctx.stored(loan.loan_id).await, returned);
    }
}

// ============================================================================
// 一覧
// ============================================================================

#[tokio::test]
async fn test_list_own_returns_only_borrowers_loans_newest_first() {
    let ctx = TestContext::new();
    let borrower_id = UserId::new();
    let book_id = ctx.catalog.add_book_titled("Dune");

    let older = loan_record(
        borrower_id,
        book_id,
        LoanStatus::Returned,
        at(2024, 1, 1),
        at(2024, 1, 15),
    );
    let newer = loan_record(
        borrower_id,
        book_id,
        LoanStatus::Processing,
        at(2024, 3, 1),
        at(2024, 3, 15),
    );
    let someone_else = loan_record(
        UserId::new(),
        book_id,
        LoanStatus::Borrowing,
        at(2024, 2, 1),
        at(2024, 2, 15),
    );
    for loan in [&older, &newer, &someone_else] {
        ctx.seed_loan(loan).await;
    }

    let loans = list_own(&ctx.deps, borrower_id).await.unwrap();

    let ids: Vec<LoanId> = loans.iter().map(|d| d.loan.loan_id).collect();
    assert_eq!(ids, vec![newer.loan_id, older.loan_id]);
    assert_eq!(
        loans[0].items[0].book.as_ref().map(|b| b.title.as_str()),
        Some("Dune")
    );
}

#[tokio::test]
async fn test_list_all_and_pending() {
    let ctx = TestContext::new();
    let book_id = ctx.catalog.add_book_titled("Dune");
    let pending = loan_record(
        UserId::new(),
        book_id,
        LoanStatus::Processing,
        at(2024, 1, 2),
        at(2024, 1, 16),
    );
    let borrowing = loan_record(
        UserId::new(),
        book_id,
        LoanStatus::Borrowing,
        at(2024, 1, 3),
        at(2024, 1, 17),
    );
    ctx.seed_loan(&pending).await;
    ctx.seed_loan(&borrowing).await;

    let all = list_all(&ctx.deps, None).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].loan.loan_id, borrowing.loan_id);

    let pending_list = list_pending(&ctx.deps).await.unwrap();
    assert_eq!(pending_list.len(), 1);
    assert_eq!(pending_list[0].loan.loan_id, pending.loan_id);

    let filtered = list_all(&ctx.deps, Some(LoanStatus::Borrowing))
        .await
        .unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].loan.loan_id, borrowing.loan_id);
}

#[tokio::test]
async fn test_list_for_own_scope_ignores_status_filter() {
    let ctx = TestContext::new();
    let borrower_id = UserId::new();
    let loan = loan_record(
        borrower_id,
        BookId::new(),
        LoanStatus::Borrowing,
        at(2024, 1, 1),
        at(2024, 1, 15),
    );
    ctx.seed_loan(&loan).await;

    let loans = list_for_scope(
        &ctx.deps,
        ListScope::Own(borrower_id),
        Some(LoanStatus::Processing),
    )
    .await
    .unwrap();

    assert_eq!(loans.len(), 1);
}

#[tokio::test]
async fn test_list_reports_missing_books_as_none() {
    let ctx = TestContext::new();
    let borrower_id = UserId::new();
    let loan = loan_record(
        borrower_id,
        BookId::new(),
        LoanStatus::Borrowing,
        at(2024, 1, 1),
        at(2024, 1, 15),
    );
    ctx.seed_loan(&loan).await;

    let loans = list_own(&ctx.deps, borrower_id).await.unwrap();

    assert_eq!(loans[0].items.len(), 1);
    assert_eq!(loans[0].items[0].book, None);
}

// ============================================================================
// 全体フロー
// ============================================================================

#[tokio::test]
async fn test_full_lifecycle_keeps_invariants() {
    let ctx = TestContext::new();
    let borrower_id = ctx.member_with_card();
    let book_id = ctx.catalog.add_book_titled("Dune");

    let loan = request_loan(
        &ctx.deps,
        RequestLoan {
            borrower_id,
            book_id,
            quantity: 2,
            requested_at: at(2024, 1, 1),
        },
    )
    .await
    .unwrap();
    assert_eq!(
        loan.returned_at.is_some(),
        loan.status == LoanStatus::Returned
    );

    approve_loan(
        &ctx.deps,
        ApproveLoan {
            loan_id: loan.loan_id,
            approver_id: UserId::new(),
        },
    )
    .await
    .unwrap();

    let outcome = renew_loan(
        &ctx.deps,
        RenewLoan {
            loan_id: loan.loan_id,
            requested_by: Identity::member(borrower_id),
            requested_at: at(2024, 1, 14),
        },
    )
    .await
    .unwrap();
    assert!(outcome.success);

    let renewed = ctx.stored(loan.loan_id).await;
    assert_eq!(renewed.status, LoanStatus::Borrowing);
    assert_eq!(renewed.returned_at, None);
    assert_eq!(renewed.fine_amount, Decimal::ZERO);

    let returned = return_loan(
        &ctx.deps,
        ReturnLoan {
            loan_id: loan.loan_id,
            returned_at: at(2024, 1, 25),
        },
    )
    .await
    .unwrap();

    // 返却期限 01-22 から3日遅れ
    assert_eq!(returned.fine_amount, Decimal::from(15000));
    assert!(returned.returned_at.is_some());
    assert_eq!(returned.line_items[0].quantity, 2);
}
