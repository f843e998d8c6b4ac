//! Integration tests

mod cli_test;
mod helpers;
mod sync_test;
