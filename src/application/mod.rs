pub mod access;
pub mod loan;
