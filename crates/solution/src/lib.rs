//! Solution enumeration and project dependency graphs for dotnetversion.
//!
//! This crate sits on top of [`dotnetversion_projects`]: it lists the projects
//! of a Visual Studio solution, reads each of them into a
//! [`ProjectMap`](dotnetversion_projects::ProjectMap), and assembles the
//! records into a [`ProjectGraph`] keyed by project name.
//!
//! # Example
//!
//! ```rust,ignore
//! use dotnetversion_solution::{FailurePolicy, ProjectGraph, Solution, SolutionLoader};
//! use dotnetversion_projects::ReaderOptions;
//! use std::path::Path;
//!
//! let solution = Solution::load(Path::new("Acme.sln"))?;
//! let report = SolutionLoader::new(ReaderOptions::default(), FailurePolicy::Skip)
//!     .load(&solution)?;
//!
//! let graph = ProjectGraph::build(report.projects)?;
//! for project in graph.topological_order()? {
//!     println!("{project}");
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod error;
pub mod graph;
pub mod loader;
pub mod sln;

pub use error::{Error, Result};
pub use graph::{ProjectGraph, UnresolvedReference};
pub use loader::{FailurePolicy, LoadReport, ProjectFailure, SolutionLoader};
pub use sln::Solution;
