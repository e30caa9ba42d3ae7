//! Composition root.
//!
//! - [`ShellBuilder`] collects the host services and wires the state objects
//! - [`Shell`] owns the state objects and their bridge subscriptions

mod builder;
mod shell;

pub use builder::ShellBuilder;
pub use shell::Shell;
