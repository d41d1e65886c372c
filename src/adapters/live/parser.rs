//! Live `DeclarationParser` backed by the tree-sitter C# grammar.

use std::path::Path;

use tree_sitter::{Node, Parser};

use crate::decl::{Container, Declaration};
use crate::error::DigestError;
use crate::ports::parser::DeclarationParser;

/// Parses C# source into declaration trees.
///
/// A fresh tree-sitter parser is created per file, so the adapter itself
/// holds no state and can be shared freely.
pub struct CSharpParser;

impl DeclarationParser for CSharpParser {
    fn parse(&self, path: &Path, text: &str) -> Result<Vec<Declaration>, DigestError> {
        let parse_error =
            |message: String| DigestError::Parse { path: path.display().to_string(), message };

        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_c_sharp::LANGUAGE.into())
            .map_err(|e| parse_error(format!("failed to load C# grammar: {e}")))?;

        let tree = parser
            .parse(text, None)
            .ok_or_else(|| parse_error("parser produced no tree".to_string()))?;
        let root = tree.root_node();
        if root.has_error() {
            return Err(parse_error(format!("syntax error {}", error_location(root))));
        }

        Ok(root_declarations(root, text.as_bytes()))
    }
}

/// Top-level declarations of a compilation unit.
///
/// Depending on the grammar version, a file-scoped namespace either owns its
/// members or is followed by them as siblings; both shapes end up nested.
fn root_declarations(root: Node<'_>, src: &[u8]) -> Vec<Declaration> {
    let children = named_children(root);
    let mut out = Vec::new();
    for (i, child) in children.iter().enumerate() {
        if child.kind() == "file_scoped_namespace_declaration" {
            let mut members = member_declarations(*child, src);
            members.extend(children[i + 1..].iter().filter_map(|n| declaration(*n, src)));
            out.push(Declaration::Namespace(Container::new(name_of(*child, src), members)));
            break;
        }
        out.extend(declaration(*child, src));
    }
    out
}

fn declaration(node: Node<'_>, src: &[u8]) -> Option<Declaration> {
    let decl = match node.kind() {
        "namespace_declaration" | "file_scoped_namespace_declaration" => {
            Declaration::Namespace(container(node, src))
        }
        "class_declaration" => Declaration::Class(container(node, src)),
        "interface_declaration" => Declaration::Interface(container(node, src)),
        "struct_declaration" => Declaration::Struct(container(node, src)),
        "method_declaration" => Declaration::Method {
            identifier: name_of(node, src),
            source: text_of(node, src).to_string(),
        },
        "property_declaration" => Declaration::Property {
            identifier: name_of(node, src),
            declared_type: field_text(node, "type", src),
        },
        "field_declaration" => field(node, src)?,
        kind if kind.ends_with("_declaration") => Declaration::Other {
            kind: kind.to_string(),
            identifier: node.child_by_field_name("name").map(|n| text_of(n, src).to_string()),
        },
        _ => return None,
    };
    Some(decl)
}

fn container(node: Node<'_>, src: &[u8]) -> Container {
    Container::new(name_of(node, src), member_declarations(node, src))
}

/// Declarations inside `node`'s body, or among its direct children when it
/// has no body.
fn member_declarations(node: Node<'_>, src: &[u8]) -> Vec<Declaration> {
    let scope = node.child_by_field_name("body").unwrap_or(node);
    named_children(scope)
        .into_iter()
        .filter_map(|child| declaration(child, src))
        .collect()
}

fn field(node: Node<'_>, src: &[u8]) -> Option<Declaration> {
    let variable_decl =
        named_children(node).into_iter().find(|n| n.kind() == "variable_declaration")?;
    let variables = named_children(variable_decl)
        .into_iter()
        .filter(|n| n.kind() == "variable_declarator")
        .filter_map(|d| {
            d.child_by_field_name("name")
                .or_else(|| named_children(d).into_iter().find(|n| n.kind() == "identifier"))
        })
        .map(|n| text_of(n, src).to_string())
        .collect();
    Some(Declaration::Field { declared_type: field_text(variable_decl, "type", src), variables })
}

fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

fn name_of(node: Node<'_>, src: &[u8]) -> String {
    field_text(node, "name", src)
}

fn field_text(node: Node<'_>, field: &str, src: &[u8]) -> String {
    node.child_by_field_name(field).map(|n| text_of(n, src).to_string()).unwrap_or_default()
}

fn text_of<'s>(node: Node<'_>, src: &'s [u8]) -> &'s str {
    node.utf8_text(src).unwrap_or_default()
}

/// `"at line L, column C"` for the first error or missing node.
fn error_location(root: Node<'_>) -> String {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            let pos = node.start_position();
            return format!("at line {}, column {}", pos.row + 1, pos.column + 1);
        }
        let mut children = named_children(node);
        children.reverse();
        stack.extend(children);
    }
    "in file".to_string()
}
