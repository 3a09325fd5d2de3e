//! Reading every project of a solution.

use crate::error::Result;
use crate::sln::Solution;
use dotnetversion_projects::{ProjectEntry, ProjectMap, ProjectReader, ReaderOptions};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// What to do when one project of a solution cannot be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailurePolicy {
    /// Stop and return the first failure in solution order.
    #[default]
    Abort,
    /// Record the failure and keep the remaining projects.
    Skip,
}

/// A project that could not be read under [`FailurePolicy::Skip`].
#[derive(Debug)]
pub struct ProjectFailure {
    /// The solution entry that failed.
    pub entry: ProjectEntry,
    /// Why it failed.
    pub error: dotnetversion_projects::Error,
}

/// Outcome of loading a solution.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Successfully read projects, in solution order.
    pub projects: Vec<ProjectMap>,
    /// Projects that were skipped, in solution order.
    pub failures: Vec<ProjectFailure>,
}

impl LoadReport {
    /// Returns `true` when every project was read.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Reads all projects of a solution, in parallel.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolutionLoader {
    reader: ProjectReader,
    policy: FailurePolicy,
}

impl SolutionLoader {
    /// Creates a loader.
    #[must_use]
    pub fn new(options: ReaderOptions, policy: FailurePolicy) -> Self {
        Self {
            reader: ProjectReader::new(options),
            policy,
        }
    }

    /// The failure policy in effect.
    #[must_use]
    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Reads every project declared by `solution`.
    ///
    /// Projects are read concurrently; the report keeps solution order.
    ///
    /// # Errors
    ///
    /// Under [`FailurePolicy::Abort`], returns the first project error in
    /// solution order. Under [`FailurePolicy::Skip`] this never fails.
    pub fn load(&self, solution: &Solution) -> Result<LoadReport> {
        let results: Vec<_> = solution
            .projects()
            .par_iter()
            .map(|entry| self.reader.read(entry))
            .collect();

        let mut report = LoadReport::default();
        for (entry, result) in solution.projects().iter().zip(results) {
            match result {
                Ok(project) => report.projects.push(project),
                Err(error) if self.policy == FailurePolicy::Skip => {
                    tracing::warn!(
                        project = %entry.name,
                        path = %entry.path.display(),
                        error = %error,
                        "Skipping project that could not be read"
                    );
                    report.failures.push(ProjectFailure {
                        entry: entry.clone(),
                        error,
                    });
                }
                Err(error) => return Err(error.into()),
            }
        }

        tracing::debug!(
            solution = %solution.path().display(),
            read = report.projects.len(),
            skipped = report.failures.len(),
            "Loaded solution projects"
        );

        Ok(report)
    }
}
