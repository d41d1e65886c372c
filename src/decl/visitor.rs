//! Flattens a declaration tree into ordered summary lines.

use std::future::Future;
use std::pin::Pin;

use tracing::warn;

use crate::config::SummaryErrorPolicy;
use crate::decl::{Container, Declaration, MemberSummary, SummaryKind};
use crate::error::DigestError;
use crate::summarize::Summarizer;

/// Description used for a method whose summary could not be obtained
/// under [`SummaryErrorPolicy::Placeholder`].
pub const UNAVAILABLE: &str = "(summary unavailable)";

type VisitFuture<'a> = Pin<Box<dyn Future<Output = Result<(), DigestError>> + 'a>>;

/// Walks declarations in pre-order, left to right, emitting one line per
/// container header and one or more lines per leaf.
pub struct DeclarationVisitor<'a> {
    summarizer: &'a Summarizer<'a>,
    policy: SummaryErrorPolicy,
}

impl<'a> DeclarationVisitor<'a> {
    /// Creates a visitor that asks `summarizer` for method descriptions.
    #[must_use]
    pub fn new(summarizer: &'a Summarizer<'a>, policy: SummaryErrorPolicy) -> Self {
        Self { summarizer, policy }
    }

    /// Flattens a file's root declaration list.
    ///
    /// Root-level namespaces emit their header, then their members are walked
    /// at the root depth instead of one level deeper.
    ///
    /// # Errors
    ///
    /// Returns a [`DigestError::Summarization`] unless the policy is
    /// [`SummaryErrorPolicy::Placeholder`].
    pub async fn visit_root(
        &self,
        roots: &[Declaration],
    ) -> Result<Vec<MemberSummary>, DigestError> {
        let mut out = Vec::new();
        for decl in roots {
            if let Declaration::Namespace(ns) = decl {
                out.push(header(SummaryKind::Namespace, ns, 0));
                for member in &ns.members {
                    self.visit_into(member, 0, &mut out).await?;
                }
            } else {
                self.visit_into(decl, 0, &mut out).await?;
            }
        }
        Ok(out)
    }

    /// Flattens one declaration and all of its descendants.
    ///
    /// # Errors
    ///
    /// See [`DeclarationVisitor::visit_root`].
    pub async fn visit(&self, decl: &Declaration) -> Result<Vec<MemberSummary>, DigestError> {
        let mut out = Vec::new();
        self.visit_into(decl, 0, &mut out).await?;
        Ok(out)
    }

    fn visit_into<'v>(
        &'v self,
        decl: &'v Declaration,
        depth: usize,
        out: &'v mut Vec<MemberSummary>,
    ) -> VisitFuture<'v> {
        Box::pin(async move {
            match decl {
                Declaration::Namespace(c)
                | Declaration::Class(c)
                | Declaration::Interface(c)
                | Declaration::Struct(c) => {
                    out.push(header(decl.kind(), c, depth));
                    for member in &c.members {
                        self.visit_into(member, depth + 1, out).await?;
                    }
                }
                Declaration::Method { identifier, source } => {
                    let description = self.describe(identifier, source).await?;
                    out.push(MemberSummary::new(
                        SummaryKind::Method,
                        identifier.as_str(),
                        &format!("Method: {identifier} - {description}"),
                        depth,
                    ));
                }
                Declaration::Property { identifier, declared_type } => {
                    out.push(MemberSummary::new(
                        SummaryKind::Property,
                        identifier.as_str(),
                        &format!("Property: {identifier} ({declared_type})"),
                        depth,
                    ));
                }
                Declaration::Field { declared_type, variables } => {
                    for variable in variables {
                        out.push(MemberSummary::new(
                            SummaryKind::Field,
                            variable.as_str(),
                            &format!("Field: {variable} ({declared_type})"),
                            depth,
                        ));
                    }
                }
                Declaration::Other { kind, identifier } => {
                    let text = match identifier {
                        Some(id) => format!("Other ({kind}): {id}"),
                        None => format!("Other ({kind})"),
                    };
                    out.push(MemberSummary::new(
                        SummaryKind::Other,
                        identifier.as_deref().unwrap_or_default(),
                        &text,
                        depth,
                    ));
                }
            }
            Ok(())
        })
    }

    async fn describe(&self, identifier: &str, source: &str) -> Result<String, DigestError> {
        match self.summarizer.describe(identifier, source).await {
            Ok(description) => Ok(description),
            Err(err) if self.policy == SummaryErrorPolicy::Placeholder => {
                warn!(method = identifier, error = %err, "using placeholder description");
                Ok(UNAVAILABLE.to_string())
            }
            Err(err) => Err(err),
        }
    }
}

fn header(kind: SummaryKind, container: &Container, depth: usize) -> MemberSummary {
    MemberSummary::new(
        kind,
        container.identifier.as_str(),
        &format!("{kind}: {}", container.identifier),
        depth,
    )
}
