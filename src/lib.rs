//! Turns an indented text outline of a directory tree into empty folders and files.
//!
//! The pipeline is: outline text → [`outline::parse`] → [`outline::Tree`] →
//! [`plan::compile`] → [`plan::Plan`] → [`executor::apply`] → [`report::Report`].
//! Parsing and compiling are pure; only the executor touches the filesystem.
pub mod api;
pub mod config;
pub mod errors;
pub mod executor;
pub mod names;
pub mod outline;
pub mod plan;
pub mod preview;
pub mod prompt;
pub mod report;
pub mod utils;

pub use api::{plan_outline, run, Request, ScaffoldError, SpecSource};
pub use config::Config;
pub use names::NamePolicy;
pub use outline::{parse, parse_str, NodeKind, ParseError, ParseOptions, Tree};
pub use plan::{compile, Action, Op, Plan, Skipped};
