//! Command implementations
//!
//! Each plumbing command is an `impl Repository` block that writes its output to the
//! repository's writer, so the binary only has to parse arguments and dispatch.

pub mod plumbing;
