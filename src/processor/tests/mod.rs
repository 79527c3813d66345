//! Integration tests for the processor module
//!
//! Tests the complete batch pipeline against temporary `laps_data/raw`
//! directory structures.

pub mod error_handling;
