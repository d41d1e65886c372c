//! Declaration tree model and the flat summary records produced from it.

pub mod visitor;

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A declaration that owns nested member declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    /// Declared name (namespaces keep their dotted name).
    pub identifier: String,
    /// Member declarations in source order.
    pub members: Vec<Declaration>,
}

impl Container {
    /// Creates a container with the given members.
    pub fn new(identifier: impl Into<String>, members: Vec<Declaration>) -> Self {
        Self { identifier: identifier.into(), members }
    }
}

/// A node of a parsed declaration tree.
///
/// The set of kinds is closed; anything the parser cannot classify lands
/// in [`Declaration::Other`] so that it still produces a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    /// `namespace X { ... }` or a file-scoped namespace.
    Namespace(Container),
    /// Class declaration.
    Class(Container),
    /// Interface declaration.
    Interface(Container),
    /// Struct declaration.
    Struct(Container),
    /// Method with its full rendered source text.
    Method {
        /// Method name.
        identifier: String,
        /// The method's source, verbatim.
        source: String,
    },
    /// Property with its declared type.
    Property {
        /// Property name.
        identifier: String,
        /// Declared type text.
        declared_type: String,
    },
    /// One field declaration, possibly declaring several variables.
    Field {
        /// Type shared by every declared variable.
        declared_type: String,
        /// Variable names in declaration order.
        variables: Vec<String>,
    },
    /// A declaration kind outside the handled set.
    Other {
        /// Parser-specific kind name (e.g. `enum_declaration`).
        kind: String,
        /// Name, when the node has one.
        identifier: Option<String>,
    },
}

impl Declaration {
    /// The summary kind tag for this node.
    #[must_use]
    pub fn kind(&self) -> SummaryKind {
        match self {
            Declaration::Namespace(_) => SummaryKind::Namespace,
            Declaration::Class(_) => SummaryKind::Class,
            Declaration::Interface(_) => SummaryKind::Interface,
            Declaration::Struct(_) => SummaryKind::Struct,
            Declaration::Method { .. } => SummaryKind::Method,
            Declaration::Property { .. } => SummaryKind::Property,
            Declaration::Field { .. } => SummaryKind::Field,
            Declaration::Other { .. } => SummaryKind::Other,
        }
    }

    /// Returns the container payload for container kinds.
    #[must_use]
    pub fn as_container(&self) -> Option<&Container> {
        match self {
            Declaration::Namespace(c)
            | Declaration::Class(c)
            | Declaration::Interface(c)
            | Declaration::Struct(c) => Some(c),
            _ => None,
        }
    }
}

/// Kind tag carried by every [`MemberSummary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryKind {
    /// Namespace header.
    Namespace,
    /// Class header.
    Class,
    /// Interface header.
    Interface,
    /// Struct header.
    Struct,
    /// Method with a natural-language description.
    Method,
    /// Property line.
    Property,
    /// One line per declared field variable.
    Field,
    /// Placeholder for an unhandled declaration kind.
    Other,
    /// Placeholder standing in for a file that could not be summarized.
    Diagnostic,
}

impl SummaryKind {
    /// Label used as the line prefix.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SummaryKind::Namespace => "Namespace",
            SummaryKind::Class => "Class",
            SummaryKind::Interface => "Interface",
            SummaryKind::Struct => "Struct",
            SummaryKind::Method => "Method",
            SummaryKind::Property => "Property",
            SummaryKind::Field => "Field",
            SummaryKind::Other => "Other",
            SummaryKind::Diagnostic => "Error",
        }
    }
}

impl fmt::Display for SummaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One rendered summary line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSummary {
    /// What kind of declaration produced the line.
    pub kind: SummaryKind,
    /// Declared name (empty when the node has none).
    pub identifier: String,
    /// The rendered single-line text.
    pub text: String,
    /// Structural nesting depth; root-level namespace members stay at the
    /// namespace's depth.
    pub depth: usize,
}

impl MemberSummary {
    /// Builds a summary line, folding any embedded line breaks into spaces.
    pub fn new(
        kind: SummaryKind,
        identifier: impl Into<String>,
        text: &str,
        depth: usize,
    ) -> Self {
        Self { kind, identifier: identifier.into(), text: single_line(text), depth }
    }
}

/// The ordered summary of one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSummary {
    /// Stable file identity (path relative to the root folder).
    pub file: String,
    /// Members in traversal emission order.
    pub members: Vec<MemberSummary>,
}

impl FileSummary {
    /// Placeholder summary for a file that could not be summarized.
    #[must_use]
    pub fn diagnostic(file: &str, message: &str) -> Self {
        Self {
            file: file.to_string(),
            members: vec![MemberSummary::new(
                SummaryKind::Diagnostic,
                "",
                &format!("Error: {message}"),
                0,
            )],
        }
    }

    /// Returns `true` if this summary is a diagnostic placeholder.
    #[must_use]
    pub fn is_diagnostic(&self) -> bool {
        self.members.iter().any(|m| m.kind == SummaryKind::Diagnostic)
    }

    /// The member texts in order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.text.as_str())
    }

    /// Renders the summary as a text document: a file header then one line per member.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = format!("File: {}\n", self.file);
        for line in self.lines() {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

/// One discovered input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    /// Location on disk.
    pub path: PathBuf,
    /// Path relative to the root folder, `/`-separated; the cache key.
    pub key: String,
    /// Raw file text.
    pub text: String,
}

fn single_line(text: &str) -> String {
    if text.contains(['\n', '\r']) {
        text.split(['\n', '\r'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        text.to_string()
    }
}
