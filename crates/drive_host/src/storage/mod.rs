//! Durable local key/value storage contracts.

pub mod prefs;
