//! Descriptor abstraction shared by both lint pipelines.
//!
//! The engine never sees a concrete descriptor type. Each pipeline wraps
//! its compiler output in a type implementing [`ProtoFile`], which exposes
//! a flat, pre-order list of [`Declaration`]s with their comments, spans,
//! and parent links.
//!
//! ```text
//! legacy::FileDescriptorProto ──► LegacyFile ─┐
//!                                             ├─► impl ProtoFile ─► Engine<F>
//! native::NativeFileBuilder   ──► NativeFile ─┘
//! ```

use crate::types::Location;
use std::collections::HashMap;
use std::path::PathBuf;

pub mod legacy;
pub mod native;

/// Errors raised while loading or resolving descriptors.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum DescriptorError {
    /// IO error reading a descriptor set.
    #[error("Failed to read descriptor set {path}: {source}")]
    #[diagnostic(code(aep_lint::descriptor::io))]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The descriptor set is not valid JSON for the expected shape.
    #[error("Failed to decode descriptor set: {0}")]
    #[diagnostic(code(aep_lint::descriptor::json))]
    Json(#[from] serde_json::Error),

    /// The descriptors are structurally unusable.
    #[error("Cannot resolve descriptors in {file}: {message}")]
    #[diagnostic(code(aep_lint::descriptor::resolution))]
    Resolution {
        /// File whose descriptors failed to resolve.
        file: String,
        /// What went wrong.
        message: String,
    },
}

/// Comments attached to a declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comments {
    /// Comment directly above the declaration.
    pub leading: Option<String>,
    /// Comment after the declaration on the same or next line.
    pub trailing: Option<String>,
    /// Comment blocks above the declaration separated from it by blank lines.
    pub leading_detached: Vec<String>,
}

impl Comments {
    /// Iterates over every comment block.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.leading_detached
            .iter()
            .map(String::as_str)
            .chain(self.leading.as_deref())
            .chain(self.trailing.as_deref())
    }

    /// Returns true if no comment is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.leading.is_none() && self.trailing.is_none() && self.leading_detached.is_empty()
    }

    /// Appends all comments of `other` as detached blocks.
    pub fn absorb(&mut self, other: Comments) {
        self.leading_detached.extend(other.leading_detached);
        self.leading_detached.extend(other.leading);
        self.leading_detached.extend(other.trailing);
    }
}

/// What kind of declaration a [`Declaration`] is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclarationKind {
    /// A message.
    Message,
    /// A message field.
    Field {
        /// Fully-qualified type name for message/enum fields.
        type_name: Option<String>,
    },
    /// An enum.
    Enum,
    /// An enum value.
    EnumValue,
    /// A service.
    Service,
    /// An RPC method.
    Method {
        /// Fully-qualified request type.
        input_type: String,
        /// Fully-qualified response type.
        output_type: String,
    },
}

/// One declaration in a file, independent of descriptor representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Fully-qualified name (e.g. `acme.library.v1.Library.GetBook`).
    pub full_name: String,
    /// Simple name (e.g. `GetBook`).
    pub name: String,
    /// Fully-qualified name of the enclosing declaration; `None` at file level.
    pub parent: Option<String>,
    /// Declaration kind.
    pub kind: DeclarationKind,
    /// Source span, when source info was retained.
    pub span: Option<Location>,
    /// Attached comments.
    pub comments: Comments,
}

impl Declaration {
    /// Returns true for RPC methods.
    #[must_use]
    pub fn is_method(&self) -> bool {
        matches!(self.kind, DeclarationKind::Method { .. })
    }

    /// Returns true for message fields.
    #[must_use]
    pub fn is_field(&self) -> bool {
        matches!(self.kind, DeclarationKind::Field { .. })
    }
}

/// Joins a package or parent name with a simple name.
#[must_use]
pub fn qualify(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{scope}.{name}")
    }
}

/// Returns the last dot-separated component of a (possibly leading-dot) type name.
#[must_use]
pub fn simple_name(type_name: &str) -> &str {
    type_name.rsplit('.').next().unwrap_or(type_name)
}

/// Read-only view of one compiled proto file.
///
/// Implementations must be immutable once built: the engine shares them
/// across worker threads for the duration of a run.
pub trait ProtoFile: Send + Sync {
    /// Path of the file as given to the compiler (e.g. `acme/v1/book.proto`).
    fn path(&self) -> &str;

    /// Proto package (may be empty).
    fn package(&self) -> &str;

    /// Whether the file was pulled in as a dependency rather than requested.
    fn is_import(&self) -> bool;

    /// Comments attached to the file itself (`syntax`/`package` statements).
    fn file_comments(&self) -> &Comments;

    /// All declarations in pre-order.
    fn declarations(&self) -> &[Declaration];

    /// Looks up a declaration by fully-qualified name.
    fn declaration(&self, full_name: &str) -> Option<&Declaration>;

    /// Iterates over declarations of one kind, e.g. all methods.
    fn methods(&self) -> Box<dyn Iterator<Item = &Declaration> + '_> {
        Box::new(self.declarations().iter().filter(|d| d.is_method()))
    }

    /// Iterates over all message fields.
    fn fields(&self) -> Box<dyn Iterator<Item = &Declaration> + '_> {
        Box::new(self.declarations().iter().filter(|d| d.is_field()))
    }
}

/// Pre-order declaration list with a name lookup.
///
/// Both descriptor representations store one of these after deriving
/// their declarations.
#[derive(Debug, Clone, Default)]
pub struct DeclarationIndex {
    declarations: Vec<Declaration>,
    by_name: HashMap<String, usize>,
}

impl DeclarationIndex {
    /// Builds an index, rejecting duplicate fully-qualified names.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::Resolution`] on the first duplicate name.
    pub fn new(file: &str, declarations: Vec<Declaration>) -> Result<Self, DescriptorError> {
        let mut by_name = HashMap::with_capacity(declarations.len());
        for (i, decl) in declarations.iter().enumerate() {
            if by_name.insert(decl.full_name.clone(), i).is_some() {
                return Err(DescriptorError::Resolution {
                    file: file.to_string(),
                    message: format!("duplicate declaration `{}`", decl.full_name),
                });
            }
        }
        Ok(Self {
            declarations,
            by_name,
        })
    }

    /// All declarations in pre-order.
    #[must_use]
    pub fn all(&self) -> &[Declaration] {
        &self.declarations
    }

    /// Looks up a declaration by fully-qualified name.
    #[must_use]
    pub fn get(&self, full_name: &str) -> Option<&Declaration> {
        self.by_name
            .get(full_name)
            .and_then(|&i| self.declarations.get(i))
    }
}
