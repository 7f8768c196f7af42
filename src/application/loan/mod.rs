mod errors;
mod loan_queries;
mod loan_service;

pub use errors::{LoanApplicationError, Result};
pub use loan_queries::{
    LineItemDetails, LoanDetails, list_all, list_for_scope, list_own, list_pending,
};
pub use loan_service::{
    RENEWAL_SUCCESS_MESSAGE, RenewalOutcome, ServiceDependencies, approve_loan, reject_loan,
    renew_loan, request_loan, return_loan,
};
