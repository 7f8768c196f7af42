pub mod audit_log;
pub mod catalog_service;
pub mod loan_repository;
pub mod membership_service;

pub use audit_log::AuditLog;
pub use catalog_service::CatalogService;
pub use loan_repository::LoanRepository;
pub use membership_service::MembershipService;
