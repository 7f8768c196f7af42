pub mod audit_log;
pub mod catalog_service;
pub mod loan_repository;
pub mod membership_service;

// パブリックに型を再エクスポート
pub use audit_log::AuditLog as PostgresAuditLog;
pub use catalog_service::CatalogService as PostgresCatalogService;
pub use loan_repository::LoanRepository as PostgresLoanRepository;
pub use membership_service::MembershipService as PostgresMembershipService;
