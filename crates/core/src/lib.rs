//! Reactor Core Library
//!
//! This is the core library for the Reactor multi-module build tool. It turns a list
//! of requested goals and lifecycle phases into task segments and drives every module
//! of the reactor through them in dependency order.
//!
//! ## Architecture
//!
//! The core library is organized into several modules:
//!
//! - [`reactor`] - High-level interface for planning and running builds
//! - [`segment_calculator`] - Splits goals and phases into task segments
//! - [`task`] - Goal, lifecycle and segment types
//! - [`builder`] - Single- and multi-threaded builder strategies
//! - [`build_list`] - Dependency-ordered modules, queried per task segment
//! - [`status`] - Shared halt flag and fail-at-end blacklist
//! - [`results`] - Per-module outcomes and build results
//! - [`graph`] - Module dependency graph and build order
//! - [`plugin`] - Plugin registry and goal resolution
//! - [`lifecycle`] - Lifecycles, phases and goal bindings
//! - [`execution_plan`] - Goal executions for a task segment
//! - [`execution`] - Running goals against a module
//! - [`configs`] - Configuration parsing for the reactor and its plugins
//! - [`types`] - Common error types and type aliases
//!
//! ## Usage
//!
//! ```rust,no_run
//! use reactor_core::reactor::Reactor;
//! use reactor_core::session::ExecutionRequest;
//!
//! # async fn example() -> reactor_core::types::ReactorResult<()> {
//! let reactor = Reactor::load(".")?;
//! let result = reactor.build(ExecutionRequest::with_goals(["install"])).await?;
//! assert!(result.is_success());
//! # Ok(())
//! # }
//! ```

pub mod build_list;
pub mod builder;
pub mod colors;
pub mod configs;
pub mod execution;
pub mod execution_plan;
pub mod graph;
pub mod lifecycle;
pub mod module;
pub mod plugin;
pub mod reactor;
pub mod results;
pub mod segment_calculator;
pub mod session;
pub mod status;
pub mod task;
pub mod types;

// Re-export the main types for easier usage
pub use reactor::Reactor;
pub use types::{ReactorError, ReactorResult};
