//! Extraction of version and reference declarations from project XML.
//!
//! The document is walked as an event stream. Only the element paths below are
//! matched, each rooted at the document element:
//!
//! - `/Project/ItemGroup/ProjectReference`
//! - `/Project/ItemGroup/PackageReference`
//! - `/Project/PropertyGroup/VersionPrefix` (first occurrence only)
//! - `/Project/PropertyGroup/Version` (first occurrence only)
//!
//! Elements nested any deeper, such as item groups inside `<Choose>` blocks,
//! are not considered.

use crate::config::{NamespaceHandling, ReaderOptions};
use crate::error::{Error, Result};
use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;

const PROJECT: &[u8] = b"Project";
const ITEM_GROUP: &[u8] = b"ItemGroup";
const PROPERTY_GROUP: &[u8] = b"PropertyGroup";
const PROJECT_REFERENCE: &str = "ProjectReference";
const PACKAGE_REFERENCE: &str = "PackageReference";
const VERSION_PREFIX: &[u8] = b"VersionPrefix";
const VERSION: &[u8] = b"Version";
const INCLUDE: &str = "Include";
const VERSION_ATTRIBUTE: &str = "Version";

/// A package reference exactly as declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPackageReference {
    /// The `Include` attribute: the package id.
    pub include: String,
    /// The `Version` attribute, if present.
    pub version: Option<String>,
}

/// The raw declarations found in one project definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectManifest {
    /// Text of the first `VersionPrefix` property, if any.
    pub version_prefix: Option<String>,
    /// Text of the first `Version` property, if any.
    pub version: Option<String>,
    /// `Include` paths of project references, in document order.
    pub project_references: Vec<String>,
    /// Package references, in document order.
    pub package_references: Vec<RawPackageReference>,
}

impl ProjectManifest {
    /// Parses project XML.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedProject`] if the content is not a well-formed
    /// document, and [`Error::MissingAttribute`] if a matched reference element
    /// has no `Include` attribute.
    ///
    /// # Example
    ///
    /// ```
    /// use dotnetversion_projects::{ProjectManifest, ReaderOptions};
    ///
    /// let xml = r#"<Project Sdk="Microsoft.NET.Sdk">
    ///   <PropertyGroup><VersionPrefix>2.1.0</VersionPrefix></PropertyGroup>
    ///   <ItemGroup><ProjectReference Include="..\Shared\Util.csproj" /></ItemGroup>
    /// </Project>"#;
    ///
    /// let manifest = ProjectManifest::parse(xml, &ReaderOptions::default()).unwrap();
    /// assert_eq!(manifest.version_prefix.as_deref(), Some("2.1.0"));
    /// assert_eq!(manifest.project_references, vec![r"..\Shared\Util.csproj"]);
    /// ```
    pub fn parse(xml: &str, options: &ReaderOptions) -> Result<Self> {
        let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
        let mut reader = NsReader::from_str(xml);
        let mut walker = Walker::new(options.namespace_handling);

        loop {
            let (namespace, event) = reader.read_resolved_event().map_err(malformed)?;
            let namespace = ElementNamespace::from(namespace);

            match event {
                Event::Start(element) => walker.open(&namespace, &element)?,
                Event::Empty(element) => {
                    walker.open(&namespace, &element)?;
                    walker.close()?;
                }
                Event::End(_) => walker.close()?,
                Event::Text(text) => walker.text(&text.unescape().map_err(malformed)?)?,
                Event::CData(data) => walker.text(&String::from_utf8_lossy(&data))?,
                Event::Eof => break,
                _ => {}
            }
        }

        walker.finish()
    }
}

/// Reduces a project reference path to the referenced project's name.
///
/// Directory components are stripped using either separator, then the final
/// extension is removed.
///
/// ```
/// use dotnetversion_projects::reference_name;
///
/// assert_eq!(reference_name("../Libs/Acme.Core.csproj"), "Acme.Core");
/// assert_eq!(reference_name(r"..\Shared\Util.csproj"), "Util");
/// ```
#[must_use]
pub fn reference_name(include: &str) -> &str {
    let file_name = include
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(include);

    file_name
        .rsplit_once('.')
        .map_or(file_name, |(stem, _)| stem)
}

fn malformed(error: impl std::fmt::Display) -> Error {
    Error::MalformedProject {
        path: None,
        message: error.to_string(),
    }
}

/// Namespace of an element, detached from the reader's borrow.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ElementNamespace {
    None,
    Bound(Vec<u8>),
    UndeclaredPrefix,
}

impl From<ResolveResult<'_>> for ElementNamespace {
    fn from(result: ResolveResult<'_>) -> Self {
        match result {
            ResolveResult::Unbound => Self::None,
            ResolveResult::Bound(namespace) => Self::Bound(namespace.as_ref().to_vec()),
            ResolveResult::Unknown(_) => Self::UndeclaredPrefix,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Property {
    VersionPrefix,
    Version,
}

/// What an open element is, relative to the matched paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node {
    Project,
    ItemGroup,
    PropertyGroup,
    Property(Property),
    Other,
}

struct Walker {
    handling: NamespaceHandling,
    stack: Vec<Node>,
    root_seen: bool,
    root_namespace: Option<ElementNamespace>,
    capture: Option<(Property, String)>,
    manifest: ProjectManifest,
}

impl Walker {
    fn new(handling: NamespaceHandling) -> Self {
        Self {
            handling,
            stack: Vec::new(),
            root_seen: false,
            root_namespace: None,
            capture: None,
            manifest: ProjectManifest::default(),
        }
    }

    fn open(&mut self, namespace: &ElementNamespace, element: &BytesStart<'_>) -> Result<()> {
        let local = element.local_name();
        let local = local.as_ref();

        let node = match self.stack.last().copied() {
            None => self.open_root(namespace, local)?,
            Some(Node::Project) if self.in_scope(namespace) => match local {
                ITEM_GROUP => Node::ItemGroup,
                PROPERTY_GROUP => Node::PropertyGroup,
                _ => Node::Other,
            },
            Some(Node::ItemGroup) if self.in_scope(namespace) => {
                self.record_reference(local, element)?;
                Node::Other
            }
            Some(Node::PropertyGroup) if self.in_scope(namespace) => {
                self.open_property(local)
            }
            _ => Node::Other,
        };

        self.stack.push(node);
        Ok(())
    }

    fn open_root(&mut self, namespace: &ElementNamespace, local: &[u8]) -> Result<Node> {
        if self.root_seen {
            return Err(malformed("document has more than one root element"));
        }
        self.root_seen = true;

        let accepted = match self.handling {
            NamespaceHandling::DocumentDefault => {
                *namespace != ElementNamespace::UndeclaredPrefix
            }
            NamespaceHandling::Unqualified => *namespace == ElementNamespace::None,
        };

        if local == PROJECT && accepted {
            self.root_namespace = Some(namespace.clone());
            Ok(Node::Project)
        } else {
            tracing::debug!(
                root = %String::from_utf8_lossy(local),
                "Document root is not a matching <Project> element"
            );
            Ok(Node::Other)
        }
    }

    fn in_scope(&self, namespace: &ElementNamespace) -> bool {
        match self.handling {
            NamespaceHandling::DocumentDefault => self.root_namespace.as_ref() == Some(namespace),
            NamespaceHandling::Unqualified => *namespace == ElementNamespace::None,
        }
    }

    fn open_property(&mut self, local: &[u8]) -> Node {
        let property = match local {
            VERSION_PREFIX => Property::VersionPrefix,
            VERSION => Property::Version,
            _ => return Node::Other,
        };

        let already_declared = match property {
            Property::VersionPrefix => self.manifest.version_prefix.is_some(),
            Property::Version => self.manifest.version.is_some(),
        };
        if already_declared || self.capture.is_some() {
            return Node::Other;
        }

        self.capture = Some((property, String::new()));
        Node::Property(property)
    }

    fn record_reference(&mut self, local: &[u8], element: &BytesStart<'_>) -> Result<()> {
        let kind = if local == PROJECT_REFERENCE.as_bytes() {
            PROJECT_REFERENCE
        } else if local == PACKAGE_REFERENCE.as_bytes() {
            PACKAGE_REFERENCE
        } else {
            return Ok(());
        };

        let include = attribute(element, INCLUDE)?.ok_or_else(|| Error::MissingAttribute {
            path: None,
            element: kind.to_string(),
            attribute: INCLUDE.to_string(),
        })?;

        tracing::trace!(kind, include = %include, "Matched reference");

        if kind == PROJECT_REFERENCE {
            self.manifest.project_references.push(include);
        } else {
            let version = attribute(element, VERSION_ATTRIBUTE)?;
            self.manifest
                .package_references
                .push(RawPackageReference { include, version });
        }
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<()> {
        if self.stack.is_empty() {
            if text.trim().is_empty() {
                return Ok(());
            }
            return Err(malformed("text found outside the root element"));
        }

        if let Some((_, value)) = self.capture.as_mut() {
            value.push_str(text);
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let node = self
            .stack
            .pop()
            .ok_or_else(|| malformed("closing tag without a matching opening tag"))?;

        if let Node::Property(property) = node {
            if let Some((captured, value)) = self.capture.take() {
                debug_assert_eq!(captured, property);
                match property {
                    Property::VersionPrefix => self.manifest.version_prefix = Some(value),
                    Property::Version => self.manifest.version = Some(value),
                }
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<ProjectManifest> {
        if !self.stack.is_empty() {
            return Err(malformed("unexpected end of document, an element is not closed"));
        }
        if !self.root_seen {
            return Err(malformed("root element is missing"));
        }
        Ok(self.manifest)
    }
}

fn attribute(element: &BytesStart<'_>, name: &str) -> Result<Option<String>> {
    element
        .try_get_attribute(name)
        .map_err(malformed)?
        .map(|attr| {
            attr.unescape_value()
                .map(std::borrow::Cow::into_owned)
                .map_err(malformed)
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn parse(xml: &str) -> Result<ProjectManifest> {
        ProjectManifest::parse(xml, &ReaderOptions::default())
    }

    const SDK_PROJECT: &str = r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <TargetFramework>net8.0</TargetFramework>
    <VersionPrefix>2.1.0</VersionPrefix>
    <Version>9.9.9</Version>
  </PropertyGroup>
  <ItemGroup>
    <ProjectReference Include="..\Shared\Util.csproj" />
    <ProjectReference Include="../Libs/Acme.Core.csproj"></ProjectReference>
  </ItemGroup>
  <ItemGroup>
    <PackageReference Include="Newtonsoft.Json" />
    <PackageReference Include="Serilog" Version="3.1.1" />
  </ItemGroup>
</Project>"#;

    #[test]
    fn test_parse_sdk_project() {
        let manifest = parse(SDK_PROJECT).unwrap();

        assert_eq!(manifest.version_prefix.as_deref(), Some("2.1.0"));
        assert_eq!(manifest.version.as_deref(), Some("9.9.9"));
        assert_eq!(
            manifest.project_references,
            vec![r"..\Shared\Util.csproj", "../Libs/Acme.Core.csproj"]
        );
        assert_eq!(
            manifest.package_references,
            vec![
                RawPackageReference {
                    include: "Newtonsoft.Json".to_string(),
                    version: None,
                },
                RawPackageReference {
                    include: "Serilog".to_string(),
                    version: Some("3.1.1".to_string()),
                },
            ]
        );
    }

    #[test]
    fn test_parse_without_declarations() {
        let manifest = parse(r#"<Project Sdk="Microsoft.NET.Sdk"></Project>"#).unwrap();
        assert_eq!(manifest, ProjectManifest::default());
    }

    #[test]
    fn test_first_property_occurrence_wins() {
        let manifest = parse(
            "<Project>\
               <PropertyGroup><Version>1.0</Version></PropertyGroup>\
               <PropertyGroup><Version>2.0</Version><VersionPrefix/></PropertyGroup>\
               <PropertyGroup><VersionPrefix>3.0</VersionPrefix></PropertyGroup>\
             </Project>",
        )
        .unwrap();

        assert_eq!(manifest.version.as_deref(), Some("1.0"));
        assert_eq!(manifest.version_prefix.as_deref(), Some(""));
    }

    #[test]
    fn test_property_value_concatenates_descendant_text() {
        let manifest = parse(
            "<Project><PropertyGroup>\
               <Version>1.<!-- minor -->2<![CDATA[.3]]>&#46;4</Version>\
             </PropertyGroup></Project>",
        )
        .unwrap();

        assert_eq!(manifest.version.as_deref(), Some("1.2.3.4"));
    }

    #[test]
    fn test_deeper_elements_are_ignored() {
        let manifest = parse(
            r#"<Project>
  <Choose>
    <When Condition="true">
      <ItemGroup><ProjectReference Include="Hidden.csproj" /></ItemGroup>
      <PropertyGroup><Version>5.0</Version></PropertyGroup>
    </When>
  </Choose>
  <ItemGroup>
    <Nested><PackageReference Include="Hidden.Package" /></Nested>
  </ItemGroup>
  <PropertyGroup><Nested><Version>6.0</Version></Nested></PropertyGroup>
</Project>"#,
        )
        .unwrap();

        assert_eq!(manifest, ProjectManifest::default());
    }

    #[test]
    fn test_non_project_root_yields_empty_manifest() {
        let manifest = parse(
            r#"<Solution><ItemGroup><ProjectReference Include="A.csproj"/></ItemGroup></Solution>"#,
        )
        .unwrap();
        assert_eq!(manifest, ProjectManifest::default());
    }

    #[test]
    fn test_missing_include_on_project_reference() {
        let err = parse("<Project><ItemGroup><ProjectReference /></ItemGroup></Project>").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::MissingAttribute);
        assert!(err.to_string().contains("<ProjectReference>"));
        assert!(err.to_string().contains("'Include'"));
    }

    #[test]
    fn test_missing_include_on_package_reference() {
        let err = parse(
            r#"<Project><ItemGroup><PackageReference Update="Serilog" Version="3.0" /></ItemGroup></Project>"#,
        )
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::MissingAttribute);
        assert!(err.to_string().contains("<PackageReference>"));
    }

    #[test]
    fn test_attribute_entities_are_unescaped() {
        let manifest = parse(
            r#"<Project><ItemGroup><ProjectReference Include="R&amp;D\Lab.csproj" /></ItemGroup></Project>"#,
        )
        .unwrap();
        assert_eq!(manifest.project_references, vec![r"R&D\Lab.csproj"]);
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        let xml = "\u{feff}<?xml version=\"1.0\" encoding=\"utf-8\"?>\
                   <Project><PropertyGroup><Version>1.2</Version></PropertyGroup></Project>";
        let manifest = parse(xml).unwrap();
        assert_eq!(manifest.version.as_deref(), Some("1.2"));
    }

    #[test]
    fn test_malformed_documents() {
        let cases = [
            "",
            "   ",
            "<Project>",
            "<Project><ItemGroup></Project>",
            "<Project></Project><Project></Project>",
            "<Project></Project>trailing",
            "not xml at all",
        ];

        for xml in cases {
            let err = parse(xml).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Parse, "expected parse error for {xml:?}");
        }
    }

    const LEGACY_PROJECT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Project ToolsVersion="15.0" xmlns="http://schemas.microsoft.com/developer/msbuild/2003">
  <PropertyGroup>
    <Version>1.4.0</Version>
  </PropertyGroup>
  <ItemGroup>
    <ProjectReference Include="..\Core\Core.csproj" />
    <PackageReference Include="NUnit" Version="3.14.0" />
  </ItemGroup>
</Project>"#;

    #[test]
    fn test_default_namespace_is_resolved() {
        let manifest = parse(LEGACY_PROJECT).unwrap();

        assert_eq!(manifest.version.as_deref(), Some("1.4.0"));
        assert_eq!(manifest.project_references, vec![r"..\Core\Core.csproj"]);
        assert_eq!(manifest.package_references.len(), 1);
    }

    #[test]
    fn test_unqualified_handling_ignores_namespaced_documents() {
        let manifest = ProjectManifest::parse(LEGACY_PROJECT, &ReaderOptions::unqualified()).unwrap();
        assert_eq!(manifest, ProjectManifest::default());
    }

    #[test]
    fn test_unqualified_handling_reads_plain_documents() {
        let manifest = ProjectManifest::parse(SDK_PROJECT, &ReaderOptions::unqualified()).unwrap();
        assert_eq!(manifest.project_references.len(), 2);
        assert_eq!(manifest.version_prefix.as_deref(), Some("2.1.0"));
    }

    #[test]
    fn test_foreign_namespace_children_are_ignored() {
        let manifest = parse(
            r#"<Project xmlns:x="urn:other">
  <x:ItemGroup><ProjectReference Include="A.csproj" /></x:ItemGroup>
  <ItemGroup><x:ProjectReference Include="B.csproj" /><ProjectReference Include="C.csproj" /></ItemGroup>
</Project>"#,
        )
        .unwrap();

        assert_eq!(manifest.project_references, vec!["C.csproj"]);
    }

    #[test]
    fn test_reference_name() {
        assert_eq!(reference_name("../Libs/Acme.Core.csproj"), "Acme.Core");
        assert_eq!(reference_name(r"..\..\src\App\App.fsproj"), "App");
        assert_eq!(reference_name("Plain"), "Plain");
        assert_eq!(reference_name("dir/Many.Dots.In.Name.vbproj"), "Many.Dots.In.Name");
        assert_eq!(reference_name(".hidden"), "");
        assert_eq!(reference_name(""), "");
    }
}
