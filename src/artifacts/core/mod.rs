//! Shared utilities

pub mod lockfile;
