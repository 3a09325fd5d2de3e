//! Options controlling how project definitions are read.

use serde::{Deserialize, Serialize};

/// How element names are matched against XML namespaces.
///
/// SDK-style project files carry no namespace, while legacy project files
/// declare `xmlns="http://schemas.microsoft.com/developer/msbuild/2003"` on the
/// root `<Project>` element, which places every unprefixed element in that
/// namespace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NamespaceHandling {
    /// Match elements in the same namespace as the document's root element.
    ///
    /// Reads both SDK-style and legacy namespaced project files.
    #[default]
    DocumentDefault,

    /// Match only elements that are in no namespace at all.
    ///
    /// A document declaring a default namespace then yields no references and
    /// no version declarations.
    Unqualified,
}

/// Options for [`ProjectReader`](crate::ProjectReader).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReaderOptions {
    /// Namespace matching strategy for element lookups.
    pub namespace_handling: NamespaceHandling,
}

impl ReaderOptions {
    /// Returns options that only match un-namespaced elements.
    #[must_use]
    pub fn unqualified() -> Self {
        Self {
            namespace_handling: NamespaceHandling::Unqualified,
        }
    }
}
