//! Service layer for grade store use-cases.
//!
//! # Responsibility
//! - Expose the operations consumed by the bridge and CLI.
//! - Stay storage-agnostic by depending on repository traits only.

pub mod grade_service;
