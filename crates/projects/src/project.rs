//! The project record and the reader that builds it.

use crate::config::ReaderOptions;
use crate::error::{Error, Result};
use crate::manifest::{ProjectManifest, reference_name};
use crate::version::{Version, resolve_version};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A project as listed by a solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectEntry {
    /// Absolute path to the project definition file.
    pub path: PathBuf,
    /// Project name as declared in the solution.
    pub name: String,
    /// Declared project GUID, in any of its usual textual forms.
    pub id: String,
}

impl ProjectEntry {
    /// Creates a new entry.
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            id: id.into(),
        }
    }
}

/// An external package dependency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageReference {
    /// Package id.
    pub name: String,
    /// Declared version, or `"0.0.0.0"` when the reference has none.
    pub version: String,
}

/// Identity, version and outbound references of one project.
///
/// A `ProjectMap` always carries a resolved version, falling back to
/// [`Version::NOT_VERSIONED`]. It is only produced by reading a project file;
/// re-reading after a change yields a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMap {
    file: PathBuf,
    name: String,
    id: Uuid,
    version: Version,
    uses_version_prefix: bool,
    project_references: Vec<String>,
    package_references: Vec<PackageReference>,
}

impl ProjectMap {
    /// Reads the project described by `entry` with default options.
    ///
    /// # Errors
    ///
    /// See [`ProjectReader::read`].
    pub fn create(entry: &ProjectEntry) -> Result<Self> {
        ProjectReader::default().read(entry)
    }

    /// Absolute path to the project definition file.
    #[must_use]
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Project name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Project GUID.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Resolved project version.
    #[must_use]
    pub fn version(&self) -> Version {
        self.version
    }

    /// Whether the version came from a `VersionPrefix` declaration.
    #[must_use]
    pub fn uses_version_prefix(&self) -> bool {
        self.uses_version_prefix
    }

    /// Names of referenced projects, in declaration order.
    #[must_use]
    pub fn project_references(&self) -> &[String] {
        &self.project_references
    }

    /// Package references, in declaration order.
    #[must_use]
    pub fn package_references(&self) -> &[PackageReference] {
        &self.package_references
    }

    /// Whether the project declares a version at all.
    #[must_use]
    pub fn is_versioned(&self) -> bool {
        self.version.is_versioned()
    }
}

impl fmt::Display for ProjectMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | {} | {}",
            self.id,
            self.name,
            self.version,
            self.project_references.len()
        )
    }
}

/// Reads project definitions into [`ProjectMap`] records.
///
/// The reader holds no state between calls and may be shared across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectReader {
    options: ReaderOptions,
}

impl ProjectReader {
    /// Creates a reader with the given options.
    #[must_use]
    pub fn new(options: ReaderOptions) -> Self {
        Self { options }
    }

    /// The options this reader was created with.
    #[must_use]
    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// Reads and normalizes the project described by `entry`.
    ///
    /// The declared identifier is validated before the file is opened.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidProjectId`] if `entry.id` is not a GUID
    /// - [`Error::ProjectNotFound`] or [`Error::Io`] if the file cannot be read
    /// - [`Error::MalformedProject`] if the file is not well-formed XML
    /// - [`Error::MissingAttribute`] if a reference lacks `Include`
    /// - [`Error::InvalidVersion`] if the selected version text is malformed
    pub fn read(&self, entry: &ProjectEntry) -> Result<ProjectMap> {
        let id = parse_project_id(entry)?;

        tracing::debug!(
            project = %entry.name,
            path = %entry.path.display(),
            "Reading project definition"
        );

        let content = read_project_file(&entry.path)?;
        let manifest = ProjectManifest::parse(&content, &self.options)
            .map_err(|e| e.with_path(&entry.path))?;

        self.build(entry, id, manifest)
    }

    /// Normalizes already-parsed declarations into a record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidProjectId`] or [`Error::InvalidVersion`] as
    /// [`read`](Self::read) does.
    pub fn from_manifest(&self, entry: &ProjectEntry, manifest: ProjectManifest) -> Result<ProjectMap> {
        let id = parse_project_id(entry)?;
        self.build(entry, id, manifest)
    }

    #[allow(clippy::unused_self)]
    fn build(&self, entry: &ProjectEntry, id: Uuid, manifest: ProjectManifest) -> Result<ProjectMap> {
        let resolved = resolve_version(
            manifest.version_prefix.as_deref(),
            manifest.version.as_deref(),
        )?;

        let project_references = manifest
            .project_references
            .iter()
            .map(|include| reference_name(include).to_string())
            .collect();

        let package_references = manifest
            .package_references
            .into_iter()
            .map(|package| PackageReference {
                name: package.include,
                version: package
                    .version
                    .unwrap_or_else(|| Version::NOT_VERSIONED.to_string()),
            })
            .collect();

        Ok(ProjectMap {
            file: entry.path.clone(),
            name: entry.name.clone(),
            id,
            version: resolved.version,
            uses_version_prefix: resolved.uses_prefix,
            project_references,
            package_references,
        })
    }
}

fn parse_project_id(entry: &ProjectEntry) -> Result<Uuid> {
    Uuid::parse_str(entry.id.trim()).map_err(|source| Error::InvalidProjectId {
        project: entry.name.clone(),
        value: entry.id.clone(),
        source,
    })
}

fn read_project_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            Error::ProjectNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Error::Io {
                source,
                path: Some(path.to_path_buf()),
                operation: "reading project file".to_string(),
            }
        }
    })?;

    decode_project_text(bytes).map_err(|source| Error::Io {
        source,
        path: Some(path.to_path_buf()),
        operation: "decoding project file".to_string(),
    })
}

/// Decodes project text by its byte order mark. Text without a UTF-16 mark
/// must be UTF-8; a UTF-8 mark is left for the manifest parser to skip.
fn decode_project_text(bytes: Vec<u8>) -> io::Result<String> {
    if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        return decode_utf16(rest, u16::from_le_bytes);
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        return decode_utf16(rest, u16::from_be_bytes);
    }
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> io::Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "UTF-16 text has an odd number of bytes",
        ));
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
