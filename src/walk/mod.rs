//! Repository tree walking
//!
//! [`Walker`] turns a call-per-directory contents API into a depth-first walk
//! with the same visitor semantics as a local filesystem walker:
//!
//! - siblings are visited in lexical name order, or the reverse of it
//! - every resolution failure is offered to the visitor, which decides
//!   whether to go on, prune or abort through [`WalkControl`]
//! - a [`PathFilter`] can prune children before any call is spent on them

mod config;
mod control;
mod filter;
mod utils;
mod walker;

pub use config::{REF_ENV, TOKEN_ENV, WalkOptions};
pub use control::WalkControl;
pub use filter::{GlobFilter, PathFilter};
pub use utils::{join_path, normalize_path};
pub use walker::{Walker, walk};
