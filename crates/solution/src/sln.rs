//! Enumeration of the projects listed in a Visual Studio `.sln` file.
//!
//! Only the parts of the format needed to locate projects are read: the
//! header line and the `Project(...) = ...` declarations. Global sections,
//! configurations and nested-project mappings are ignored.

use crate::error::{Error, Result};
use dotnetversion_projects::ProjectEntry;
use regex::Regex;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

const HEADER: &str = "Microsoft Visual Studio Solution File, Format Version";

/// Project type GUID of solution folders, which are not project files.
pub const SOLUTION_FOLDER_TYPE: &str = "2150E333-8FDC-42A3-9474-1A3956D46DE8";

#[allow(clippy::expect_used)]
static PROJECT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^Project\("\{?(?P<kind>[^"}]*)\}?"\)\s*=\s*"(?P<name>[^"]*)"\s*,\s*"(?P<path>[^"]*)"\s*,\s*"(?P<id>[^"]*)"\s*$"#,
    )
    .expect("project line pattern is valid")
});

/// The projects declared by one solution file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    path: PathBuf,
    projects: Vec<ProjectEntry>,
}

impl Solution {
    /// Reads and parses a solution file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SolutionNotFound`] if the file does not exist,
    /// [`Error::Io`] if it cannot be read, and [`Error::InvalidSolution`] if
    /// its content is not a solution.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                Error::SolutionNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                Error::Io {
                    source,
                    path: Some(path.to_path_buf()),
                    operation: "reading solution file".to_string(),
                }
            }
        })?;

        Self::parse(path, &content)
    }

    /// Parses solution content; `path` locates the solution so that project
    /// paths can be made absolute.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSolution`] if the header is missing or a
    /// project declaration is malformed, and [`Error::Io`] if a relative
    /// `path` cannot be made absolute.
    ///
    /// # Example
    ///
    /// ```
    /// use dotnetversion_solution::Solution;
    /// use std::path::Path;
    ///
    /// let sln = r#"
    /// Microsoft Visual Studio Solution File, Format Version 12.00
    /// Project("{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}") = "App", "src\App\App.csproj", "{9A19103F-16F7-4668-BE54-9A1E7A4F7556}"
    /// EndProject
    /// "#;
    ///
    /// let solution = Solution::parse(Path::new("/repo/Acme.sln"), sln).unwrap();
    /// assert_eq!(solution.projects().len(), 1);
    /// assert_eq!(solution.projects()[0].name, "App");
    /// ```
    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        let path = std::path::absolute(path).map_err(|source| Error::Io {
            source,
            path: Some(path.to_path_buf()),
            operation: "resolving solution path".to_string(),
        })?;
        let path = path.as_path();

        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let invalid = |line: Option<usize>, message: String| Error::InvalidSolution {
            path: path.to_path_buf(),
            line,
            message,
        };

        let mut lines = content
            .lines()
            .enumerate()
            .map(|(index, line)| (index + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty());

        match lines.next() {
            Some((_, line)) if line.starts_with(HEADER) => {}
            Some((number, _)) => {
                return Err(invalid(
                    Some(number),
                    "missing solution file header".to_string(),
                ));
            }
            None => return Err(invalid(None, "solution file is empty".to_string())),
        }

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        let mut projects = Vec::new();

        for (number, line) in lines {
            if !line.starts_with("Project(") {
                continue;
            }

            let captures = PROJECT_LINE.captures(line).ok_or_else(|| {
                invalid(Some(number), "malformed project declaration".to_string())
            })?;

            let kind = &captures["kind"];
            let name = &captures["name"];
            if kind.eq_ignore_ascii_case(SOLUTION_FOLDER_TYPE) {
                tracing::trace!(folder = name, "Skipping solution folder");
                continue;
            }

            let relative = captures["path"].replace('\\', std::path::MAIN_SEPARATOR_STR);
            projects.push(ProjectEntry::new(
                normalize(&base.join(relative)),
                name,
                &captures["id"],
            ));
        }

        tracing::debug!(
            solution = %path.display(),
            projects = projects.len(),
            "Enumerated solution projects"
        );

        Ok(Self {
            path: path.to_path_buf(),
            projects,
        })
    }

    /// Absolute path of the solution file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Declared projects, in solution order.
    #[must_use]
    pub fn projects(&self) -> &[ProjectEntry] {
        &self.projects
    }
}

/// Resolves `.` and `..` components without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normalized.push(component),
            },
            other => normalized.push(other),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOLUTION: &str = r#"
Microsoft Visual Studio Solution File, Format Version 12.00
# Visual Studio Version 17
VisualStudioVersion = 17.5.33424.131
MinimumVisualStudioVersion = 10.0.40219.1
Project("{2150E333-8FDC-42A3-9474-1A3956D46DE8}") = "src", "src", "{0C1E0D3A-6E9E-4C3B-A0A5-5E1C5E6B7A01}"
EndProject
Project("{9A19103F-16F7-4668-BE54-9A1E7A4F7556}") = "Acme.Core", "src\Acme.Core\Acme.Core.csproj", "{1B2C3D4E-5F60-4718-8293-A4B5C6D7E8F9}"
EndProject
Project("{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}") = "Acme.App", "src\Acme.App\..\Acme.App\Acme.App.csproj", "{2C3D4E5F-6071-4829-93A4-B5C6D7E8F90A}"
	ProjectSection(ProjectDependencies) = postProject
		{1B2C3D4E-5F60-4718-8293-A4B5C6D7E8F9} = {1B2C3D4E-5F60-4718-8293-A4B5C6D7E8F9}
	EndProjectSection
EndProject
Global
	GlobalSection(SolutionConfigurationPlatforms) = preSolution
		Debug|Any CPU = Debug|Any CPU
	EndGlobalSection
EndGlobal
"#;

    #[test]
    fn test_parse_projects_in_order() {
        let solution = Solution::parse(Path::new("/repo/Acme.sln"), SOLUTION).unwrap();

        let names: Vec<&str> = solution.projects().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Acme.Core", "Acme.App"]);
        assert_eq!(solution.path(), Path::new("/repo/Acme.sln"));
    }

    #[test]
    fn test_parse_resolves_absolute_paths() {
        let solution = Solution::parse(Path::new("/repo/Acme.sln"), SOLUTION).unwrap();

        assert_eq!(
            solution.projects()[0].path,
            PathBuf::from("/repo/src/Acme.Core/Acme.Core.csproj")
        );
        assert_eq!(
            solution.projects()[1].path,
            PathBuf::from("/repo/src/Acme.App/Acme.App.csproj")
        );
    }

    #[test]
    fn test_parse_keeps_declared_identifier() {
        let solution = Solution::parse(Path::new("/repo/Acme.sln"), SOLUTION).unwrap();
        assert_eq!(
            solution.projects()[0].id,
            "{1B2C3D4E-5F60-4718-8293-A4B5C6D7E8F9}"
        );
    }

    #[test]
    fn test_parse_skips_solution_folders() {
        let solution = Solution::parse(Path::new("/repo/Acme.sln"), SOLUTION).unwrap();
        assert!(solution.projects().iter().all(|p| p.name != "src"));
    }

    #[test]
    fn test_parse_tolerates_byte_order_mark() {
        let content = format!("\u{feff}{}", SOLUTION.trim_start());
        let solution = Solution::parse(Path::new("/repo/Acme.sln"), &content).unwrap();
        assert_eq!(solution.projects().len(), 2);
    }

    #[test]
    fn test_parse_missing_header() {
        let err = Solution::parse(
            Path::new("/repo/Acme.sln"),
            "\n<Project Sdk=\"Microsoft.NET.Sdk\" />\n",
        )
        .unwrap_err();

        assert!(matches!(err, Error::InvalidSolution { line: Some(2), .. }));
    }

    #[test]
    fn test_parse_empty_file() {
        let err = Solution::parse(Path::new("/repo/Acme.sln"), "  \n").unwrap_err();
        assert!(matches!(err, Error::InvalidSolution { line: None, .. }));
    }

    #[test]
    fn test_parse_malformed_project_line() {
        let content = "Microsoft Visual Studio Solution File, Format Version 12.00\n\
                       Project(\"{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}\") = \"Broken\"\n\
                       EndProject\n";

        let err = Solution::parse(Path::new("/repo/Acme.sln"), content).unwrap_err();
        assert!(matches!(err, Error::InvalidSolution { line: Some(2), .. }));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(
            normalize(Path::new("/repo/./src/../lib/A.csproj")),
            PathBuf::from("/repo/lib/A.csproj")
        );
        assert_eq!(normalize(Path::new("../A.csproj")), PathBuf::from("../A.csproj"));
        assert_eq!(
            normalize(Path::new("../../B/B.csproj")),
            PathBuf::from("../../B/B.csproj")
        );
        assert_eq!(normalize(Path::new("a/../../b")), PathBuf::from("../b"));
        assert_eq!(normalize(Path::new("/../a")), PathBuf::from("/a"));
    }

    #[test]
    fn test_parse_relative_solution_path() {
        let content = "Microsoft Visual Studio Solution File, Format Version 12.00\n\
                       Project(\"{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}\") = \"B\", \"..\\B\\B.csproj\", \"{1B2C3D4E-5F60-4718-8293-A4B5C6D7E8F9}\"\n\
                       EndProject\n";

        let solution = Solution::parse(Path::new("../Acme.sln"), content).unwrap();

        let cwd = std::env::current_dir().unwrap();
        let expected = cwd
            .parent()
            .and_then(Path::parent)
            .unwrap()
            .join("B")
            .join("B.csproj");
        assert!(solution.path().is_absolute());
        assert!(solution.projects()[0].path.is_absolute());
        assert_eq!(solution.projects()[0].path, expected);
    }
}
