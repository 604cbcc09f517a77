//! Integration tests for Warden.

mod helpers;
mod permission_test;
mod postgres_test;
mod telemetry_test;
mod token_test;
