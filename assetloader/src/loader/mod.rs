//! Selection and loading.
//!
//! Decides, candidate by candidate, which items of the content pool to
//! materialize, and loads them in two ordered passes with per-item failure
//! isolation.
//!
//! # Overview
//!
//! - **Session**: creates the session context and hands out tasks
//! - **LoadTask**: the resumable state machine running the phases
//! - **Selection**: the load/skip decision for one candidate ([`Decision`])
//! - **LoadContext**: registry, checksum cache, report and counters shared
//!   by the task and the cross-reference resolver
//!
//! # Passes
//!
//! ```text
//! pass 1: props, trees, trailers     (referenced by the items of pass 2)
//! pass 2: buildings, vehicles, other (style members forced in)
//! ```
//!
//! A candidate is loaded when it is enabled and enabled items are loaded,
//! or when the saved world uses it and used items are loaded. Failures are
//! recorded in the diagnostic report; the pass goes on.

mod context;
mod decision;
mod session;
mod task;

pub use context::{InstantiateMode, LoadContext};
pub use decision::{Decision, Selection};
pub use session::{Session, SessionBuilder};
pub use task::{LoadSummary, LoadTask, Step};
