//! Parser port turning raw source text into a declaration tree.

use std::path::Path;

use crate::decl::Declaration;
use crate::error::DigestError;

/// Produces the root declaration list of one source file.
pub trait DeclarationParser: Send + Sync {
    /// Parses `text` (read from `path`) into its top-level declarations,
    /// children in source order.
    ///
    /// # Errors
    ///
    /// Returns [`DigestError::Parse`] if the text is not a well-formed tree.
    fn parse(&self, path: &Path, text: &str) -> Result<Vec<Declaration>, DigestError>;
}
