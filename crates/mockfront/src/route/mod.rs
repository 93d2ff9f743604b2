//! Route matching and response selection.
//!
//! - `types`: `RouteKey`, `RuleRecord` and the grouped `RouteTable`
//! - `compile`: raw rules -> `RouteTable`, run once at startup
//! - `matcher`: strict parameter equality and first-match selection
//! - `delay`: simulated latency ranges
//! - `dispatcher`: per-request lookup -> match -> delay -> result
//! - `analysis`: startup warnings for rules that can never be selected
//!
//! The table is immutable once compiled. Request handling only reads it, so
//! a `Dispatcher` can be shared across tasks behind an `Arc` without locks.

mod analysis;
mod compile;
mod delay;
mod dispatcher;
mod matcher;
mod types;

pub use analysis::{analyze, log_warnings, RuleWarning, WarningKind};
pub use compile::{canonical_body, compile, CompileError, DEFAULT_METHOD};
pub use delay::{simulated_delay, DelayRange};
pub use dispatcher::{Dispatcher, MatchResult, NotMatchedReason};
pub use matcher::{params_equal, select};
pub use types::{RouteKey, RouteTable, RuleRecord};
