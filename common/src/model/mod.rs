pub mod approval;
pub mod field;
pub mod form;
pub mod submission;
pub mod user;
