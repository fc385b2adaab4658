//! Repository layer.
//!
//! Repositories are zero-sized structs providing async methods that take a
//! pool or connection as the first argument.

pub mod college_repo;
pub mod insert_row;

pub use college_repo::{CollegeRepo, TableCount};
pub use insert_row::InsertRow;
