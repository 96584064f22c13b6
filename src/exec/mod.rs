// src/exec/mod.rs

//! Check execution layer.
//!
//! The scheduler only ever sees a [`Check`]: something with an `execute`
//! operation that reports success or failure. Concrete kinds:
//!
//! - [`check`] defines the trait, its context, and [`FnCheck`] for checks
//!   written as closures (embedding, tests).
//! - [`command`] runs a shell command or an argv vector with
//!   `std::process::Command`, the production check kind.
//! - [`stamped`] wraps another check so it runs at most once per stamp
//!   window, for expensive setup such as tool installation.

pub mod check;
pub mod command;
pub mod stamped;

pub use check::{Check, CheckContext, FnCheck};
pub use command::{CommandCheck, Invocation, format_cmd_for_printing};
pub use stamped::StampedCheck;
