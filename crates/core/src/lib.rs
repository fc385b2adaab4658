//! Domain types and pure logic for the college-management tooling.
//!
//! Nothing in this crate touches the database. It owns the table catalog,
//! the row types shared by the generators and the loader, and the seeded
//! dataset generators themselves.

pub mod catalog;
pub mod error;
pub mod generate;
pub mod records;
pub mod types;
