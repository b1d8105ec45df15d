#![allow(dead_code)]

pub mod factories;
pub mod failing_exporter;
pub mod fake_atproto;
pub mod helpers;
pub mod test_db;
