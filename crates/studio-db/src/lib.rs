//! Studio database layer: Postgres repositories and transaction helpers.

pub mod db;

pub use db::*;
