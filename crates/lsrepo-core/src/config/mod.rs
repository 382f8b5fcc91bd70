//! Configuration management.
//!
//! The main configuration ([`settings::MainConfiguration`]) is read from a
//! YAML (or TOML) file and handed to whoever needs it; there is no global
//! instance.

pub mod settings;
