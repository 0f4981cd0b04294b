#![allow(unused_imports)]
pub mod test_db;

pub use test_db::*;
