//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate ordering functions and repository calls per use case.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod task_order_service;
