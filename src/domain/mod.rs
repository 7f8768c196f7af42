pub mod audit;
pub mod book;
pub mod commands;
pub mod eligibility;
pub mod errors;
pub mod identity;
pub mod loan;
pub mod membership;
pub mod value_objects;

pub use audit::*;
pub use book::*;
pub use errors::*;
pub use identity::*;
pub use membership::*;
pub use value_objects::*;
