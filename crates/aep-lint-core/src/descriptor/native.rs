//! Native descriptor representation.
//!
//! Declarations are arena nodes that point at their parent and carry their
//! own span and comments, the way a reflection-based compiler hands them
//! out. Files are assembled with [`NativeFileBuilder`] or converted from a
//! [`LegacyFile`].

use super::legacy::LegacyFile;
use super::{
    qualify, Comments, Declaration, DeclarationIndex, DeclarationKind, DescriptorError, ProtoFile,
};
use crate::types::Location;
use std::collections::HashMap;

/// Handle to a node inside a [`NativeFileBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Node {
    name: String,
    parent: Option<NodeId>,
    kind: DeclarationKind,
    span: Option<Location>,
    comments: Comments,
}

/// Incrementally assembles a [`NativeFile`].
#[derive(Debug, Clone, Default)]
pub struct NativeFileBuilder {
    path: String,
    package: String,
    is_import: bool,
    file_comments: Comments,
    nodes: Vec<Node>,
}

impl NativeFileBuilder {
    /// Starts a file at `path` in `package`.
    #[must_use]
    pub fn new(path: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            package: package.into(),
            ..Self::default()
        }
    }

    /// Marks the file as an import.
    #[must_use]
    pub fn import(mut self, is_import: bool) -> Self {
        self.is_import = is_import;
        self
    }

    /// Sets the file-level comments.
    #[must_use]
    pub fn file_comments(mut self, comments: Comments) -> Self {
        self.file_comments = comments;
        self
    }

    fn add(&mut self, parent: Option<NodeId>, name: &str, kind: DeclarationKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: name.to_string(),
            parent,
            kind,
            span: None,
            comments: Comments::default(),
        });
        id
    }

    /// Adds a message, top-level or nested in `parent`.
    pub fn message(&mut self, parent: Option<NodeId>, name: &str) -> NodeId {
        self.add(parent, name, DeclarationKind::Message)
    }

    /// Adds a field to `message`.
    pub fn field(&mut self, message: NodeId, name: &str, type_name: Option<&str>) -> NodeId {
        let kind = DeclarationKind::Field {
            type_name: type_name.map(String::from),
        };
        self.add(Some(message), name, kind)
    }

    /// Adds an enum, top-level or nested in `parent`.
    pub fn enum_type(&mut self, parent: Option<NodeId>, name: &str) -> NodeId {
        self.add(parent, name, DeclarationKind::Enum)
    }

    /// Adds a value to `enum_type`.
    pub fn enum_value(&mut self, enum_type: NodeId, name: &str) -> NodeId {
        self.add(Some(enum_type), name, DeclarationKind::EnumValue)
    }

    /// Adds a service.
    pub fn service(&mut self, name: &str) -> NodeId {
        self.add(None, name, DeclarationKind::Service)
    }

    /// Adds a method to `service`.
    pub fn method(
        &mut self,
        service: NodeId,
        name: &str,
        input_type: &str,
        output_type: &str,
    ) -> NodeId {
        let kind = DeclarationKind::Method {
            input_type: input_type.to_string(),
            output_type: output_type.to_string(),
        };
        self.add(Some(service), name, kind)
    }

    /// Sets the span of a node. Unknown ids are reported by [`Self::build`].
    pub fn set_span(&mut self, id: NodeId, span: Location) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.span = Some(span);
        }
    }

    /// Sets the comments of a node.
    pub fn set_comments(&mut self, id: NodeId, comments: Comments) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.comments = comments;
        }
    }

    fn resolution_error(&self, message: String) -> DescriptorError {
        DescriptorError::Resolution {
            file: self.path.clone(),
            message,
        }
    }

    fn check_parent(&self, node: &Node, index: usize) -> Result<(), DescriptorError> {
        let Some(parent) = node.parent else {
            return match node.kind {
                DeclarationKind::Message | DeclarationKind::Enum | DeclarationKind::Service => {
                    Ok(())
                }
                _ => Err(self.resolution_error(format!("`{}` needs a parent", node.name))),
            };
        };
        // Parents are always created before their children.
        let parent_node = self
            .nodes
            .get(parent.0)
            .filter(|_| parent.0 < index)
            .ok_or_else(|| self.resolution_error(format!("`{}` has no valid parent", node.name)))?;
        let allowed = matches!(
            (&parent_node.kind, &node.kind),
            (
                DeclarationKind::Message,
                DeclarationKind::Message | DeclarationKind::Field { .. } | DeclarationKind::Enum
            ) | (DeclarationKind::Enum, DeclarationKind::EnumValue)
                | (DeclarationKind::Service, DeclarationKind::Method { .. })
        );
        if allowed {
            Ok(())
        } else {
            Err(self.resolution_error(format!(
                "`{}` cannot be declared inside `{}`",
                node.name, parent_node.name
            )))
        }
    }

    /// Resolves names and validates the tree.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::Resolution`] for an empty path, an unnamed
    /// node, a node under an impossible parent, or a duplicate full name.
    pub fn build(self) -> Result<NativeFile, DescriptorError> {
        if self.path.is_empty() {
            return Err(self.resolution_error("file has no path".to_string()));
        }

        let mut full_names: Vec<String> = Vec::with_capacity(self.nodes.len());
        for (i, node) in self.nodes.iter().enumerate() {
            if node.name.is_empty() {
                return Err(self.resolution_error(format!("declaration #{i} has no name")));
            }
            self.check_parent(node, i)?;
            let parent_name = node.parent.and_then(|p| full_names.get(p.0)).cloned();
            // Enum values share the scope of their enum, not the enum itself.
            let scope = match (&node.kind, node.parent) {
                (DeclarationKind::EnumValue, Some(p)) => self
                    .nodes
                    .get(p.0)
                    .and_then(|e| e.parent)
                    .and_then(|gp| full_names.get(gp.0))
                    .cloned()
                    .unwrap_or_else(|| self.package.clone()),
                _ => parent_name.clone().unwrap_or_else(|| self.package.clone()),
            };
            full_names.push(qualify(&scope, &node.name));
        }

        let declarations = self
            .nodes
            .into_iter()
            .zip(&full_names)
            .map(|(node, full_name)| Declaration {
                full_name: full_name.clone(),
                parent: node.parent.and_then(|p| full_names.get(p.0)).cloned(),
                name: node.name,
                kind: node.kind,
                span: node.span,
                comments: node.comments,
            })
            .collect();

        let index = DeclarationIndex::new(&self.path, declarations)?;
        Ok(NativeFile {
            path: self.path,
            package: self.package,
            is_import: self.is_import,
            file_comments: self.file_comments,
            index,
        })
    }
}

/// A native file descriptor prepared for linting.
#[derive(Debug, Clone)]
pub struct NativeFile {
    path: String,
    package: String,
    is_import: bool,
    file_comments: Comments,
    index: DeclarationIndex,
}

impl NativeFile {
    /// Starts building a file.
    #[must_use]
    pub fn builder(path: impl Into<String>, package: impl Into<String>) -> NativeFileBuilder {
        NativeFileBuilder::new(path, package)
    }
}

impl TryFrom<&LegacyFile> for NativeFile {
    type Error = DescriptorError;

    fn try_from(legacy: &LegacyFile) -> Result<Self, Self::Error> {
        let mut builder = NativeFileBuilder::new(legacy.path(), legacy.package())
            .import(legacy.is_import())
            .file_comments(legacy.file_comments().clone());
        let mut ids: HashMap<&str, NodeId> = HashMap::new();

        for decl in legacy.declarations() {
            let parent = match decl.parent.as_deref() {
                Some(name) => Some(*ids.get(name).ok_or_else(|| DescriptorError::Resolution {
                    file: legacy.path().to_string(),
                    message: format!("`{}` refers to unknown parent `{name}`", decl.full_name),
                })?),
                None => None,
            };
            let id = builder.add(parent, &decl.name, decl.kind.clone());
            if let Some(span) = decl.span {
                builder.set_span(id, span);
            }
            builder.set_comments(id, decl.comments.clone());
            ids.insert(&decl.full_name, id);
        }

        builder.build()
    }
}

impl ProtoFile for NativeFile {
    fn path(&self) -> &str {
        &self.path
    }

    fn package(&self) -> &str {
        &self.package
    }

    fn is_import(&self) -> bool {
        self.is_import
    }

    fn file_comments(&self) -> &Comments {
        &self.file_comments
    }

    fn declarations(&self) -> &[Declaration] {
        self.index.all()
    }

    fn declaration(&self, full_name: &str) -> Option<&Declaration> {
        self.index.get(full_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::legacy::{
        DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FileDescriptorProto,
        MethodDescriptorProto, ServiceDescriptorProto, SourceCodeInfo, SourceLocation,
    };

    #[test]
    fn builds_full_names_from_parents() {
        let mut b = NativeFile::builder("library.proto", "acme.v1");
        let book = b.message(None, "Book");
        b.field(book, "title", None);
        let state = b.enum_type(Some(book), "State");
        b.enum_value(state, "ACTIVE");
        let svc = b.service("Library");
        b.method(svc, "GetBook", ".acme.v1.GetBookRequest", ".acme.v1.Book");
        let file = b.build().unwrap();

        let names: Vec<&str> = file
            .declarations()
            .iter()
            .map(|d| d.full_name.as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                "acme.v1.Book",
                "acme.v1.Book.title",
                "acme.v1.Book.State",
                "acme.v1.Book.ACTIVE",
                "acme.v1.Library",
                "acme.v1.Library.GetBook",
            ]
        );
        let value = file.declaration("acme.v1.Book.ACTIVE").unwrap();
        assert_eq!(value.parent.as_deref(), Some("acme.v1.Book.State"));
    }

    #[test]
    fn top_level_enum_values_use_package_scope() {
        let mut b = NativeFile::builder("state.proto", "acme.v1");
        let state = b.enum_type(None, "State");
        b.enum_value(state, "ACTIVE");
        let file = b.build().unwrap();
        assert!(file.declaration("acme.v1.ACTIVE").is_some());
    }

    #[test]
    fn rejects_method_outside_service() {
        let mut b = NativeFile::builder("bad.proto", "acme.v1");
        let book = b.message(None, "Book");
        b.method(book, "GetBook", ".a", ".b");
        let err = b.build().unwrap_err();
        assert!(err.to_string().contains("cannot be declared inside `Book`"));
    }

    #[test]
    fn rejects_unnamed_node() {
        let mut b = NativeFile::builder("bad.proto", "acme.v1");
        b.message(None, "");
        assert!(b.build().is_err());
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut b = NativeFile::builder("dup.proto", "acme.v1");
        b.message(None, "Book");
        b.message(None, "Book");
        assert!(b.build().is_err());
    }

    #[test]
    fn converts_from_legacy() {
        let proto = FileDescriptorProto {
            name: "acme/v1/library.proto".to_string(),
            package: "acme.v1".to_string(),
            message_type: vec![DescriptorProto {
                name: "Book".to_string(),
                enum_type: vec![EnumDescriptorProto {
                    name: "State".to_string(),
                    value: vec![EnumValueDescriptorProto {
                        name: "ACTIVE".to_string(),
                        number: 1,
                    }],
                }],
                ..Default::default()
            }],
            service: vec![ServiceDescriptorProto {
                name: "Library".to_string(),
                method: vec![MethodDescriptorProto {
                    name: "GetBook".to_string(),
                    input_type: ".acme.v1.GetBookRequest".to_string(),
                    output_type: ".acme.v1.Book".to_string(),
                }],
            }],
            source_code_info: Some(SourceCodeInfo {
                location: vec![SourceLocation {
                    path: vec![6, 0, 2, 0],
                    span: vec![9, 2, 40],
                    leading_comments: Some(" Gets a book.\n".to_string()),
                    ..Default::default()
                }],
            }),
            ..Default::default()
        };
        let legacy = LegacyFile::new(proto, true).unwrap();
        let native = NativeFile::try_from(&legacy).unwrap();

        assert_eq!(native.path(), "acme/v1/library.proto");
        assert!(native.is_import());
        assert_eq!(native.declarations(), legacy.declarations());
        let method = native.declaration("acme.v1.Library.GetBook").unwrap();
        assert_eq!(method.span, Some(Location::new(10, 3).with_end(10, 41)));
    }
}
