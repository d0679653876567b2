//! Flutter-facing bindings for TidyTask core.

pub mod api;
