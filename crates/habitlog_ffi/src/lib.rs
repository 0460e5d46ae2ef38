//! Flutter-facing bridge over `habitlog_core`.

pub mod api;
