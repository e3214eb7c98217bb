//! Legacy descriptor representation: a mirror of `descriptor.proto`.
//!
//! Declarations are nested the way `FileDescriptorProto` nests them, and
//! source positions live apart from them in `SourceCodeInfo`, addressed by
//! numeric field paths. [`LegacyFile`] resolves those paths once and exposes
//! the result through [`ProtoFile`].
//!
//! Descriptor sets are read from their canonical JSON mapping (camelCase
//! field names), e.g. the output of `buf build -o set.json`.

use super::{
    qualify, Comments, Declaration, DeclarationIndex, DeclarationKind, DescriptorError, ProtoFile,
};
use crate::types::Location;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

// Field numbers from descriptor.proto used in source paths.
const FILE_PACKAGE: i32 = 2;
const FILE_MESSAGE_TYPE: i32 = 4;
const FILE_ENUM_TYPE: i32 = 5;
const FILE_SERVICE: i32 = 6;
const FILE_SYNTAX: i32 = 12;
const MESSAGE_FIELD: i32 = 2;
const MESSAGE_NESTED_TYPE: i32 = 3;
const MESSAGE_ENUM_TYPE: i32 = 4;
const ENUM_VALUE: i32 = 2;
const SERVICE_METHOD: i32 = 2;

/// A set of compiled files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileDescriptorSet {
    /// Files in dependency order.
    #[serde(default)]
    pub file: Vec<FileDescriptorProto>,
}

impl FileDescriptorSet {
    /// Reads a descriptor set from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded.
    pub fn from_file(path: &Path) -> Result<Self, DescriptorError> {
        let content = std::fs::read_to_string(path).map_err(|e| DescriptorError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Decodes a descriptor set from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::Json`] if the text does not decode.
    pub fn parse(content: &str) -> Result<Self, DescriptorError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Merges several sets, keeping the first file seen for each name.
    #[must_use]
    pub fn merge(sets: Vec<Self>) -> Self {
        let mut seen = HashSet::new();
        let file = sets
            .into_iter()
            .flat_map(|s| s.file)
            .filter(|f| seen.insert(f.name.clone()))
            .collect();
        Self { file }
    }
}

/// `google.protobuf.FileDescriptorProto`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptorProto {
    /// File path.
    pub name: String,
    /// Proto package.
    #[serde(default)]
    pub package: String,
    /// Imported file paths.
    #[serde(default)]
    pub dependency: Vec<String>,
    /// Top-level messages.
    #[serde(default)]
    pub message_type: Vec<DescriptorProto>,
    /// Top-level enums.
    #[serde(default)]
    pub enum_type: Vec<EnumDescriptorProto>,
    /// Services.
    #[serde(default)]
    pub service: Vec<ServiceDescriptorProto>,
    /// Source positions and comments.
    #[serde(default)]
    pub source_code_info: Option<SourceCodeInfo>,
    /// `proto2`, `proto3`, or `editions`.
    #[serde(default)]
    pub syntax: String,
}

/// `google.protobuf.DescriptorProto`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptorProto {
    /// Message name.
    pub name: String,
    /// Fields.
    #[serde(default)]
    pub field: Vec<FieldDescriptorProto>,
    /// Nested messages.
    #[serde(default)]
    pub nested_type: Vec<DescriptorProto>,
    /// Nested enums.
    #[serde(default)]
    pub enum_type: Vec<EnumDescriptorProto>,
}

/// `google.protobuf.FieldDescriptorProto`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptorProto {
    /// Field name.
    pub name: String,
    /// Field number.
    #[serde(default)]
    pub number: i32,
    /// Referenced message or enum type (fully-qualified, leading dot).
    #[serde(default)]
    pub type_name: Option<String>,
}

/// `google.protobuf.EnumDescriptorProto`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumDescriptorProto {
    /// Enum name.
    pub name: String,
    /// Values.
    #[serde(default)]
    pub value: Vec<EnumValueDescriptorProto>,
}

/// `google.protobuf.EnumValueDescriptorProto`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumValueDescriptorProto {
    /// Value name.
    pub name: String,
    /// Value number.
    #[serde(default)]
    pub number: i32,
}

/// `google.protobuf.ServiceDescriptorProto`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDescriptorProto {
    /// Service name.
    pub name: String,
    /// RPC methods.
    #[serde(default)]
    pub method: Vec<MethodDescriptorProto>,
}

/// `google.protobuf.MethodDescriptorProto`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodDescriptorProto {
    /// Method name.
    pub name: String,
    /// Request type (fully-qualified, leading dot).
    #[serde(default)]
    pub input_type: String,
    /// Response type (fully-qualified, leading dot).
    #[serde(default)]
    pub output_type: String,
}

/// `google.protobuf.SourceCodeInfo`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceCodeInfo {
    /// Locations, each addressed by a field path.
    #[serde(default)]
    pub location: Vec<SourceLocation>,
}

/// `google.protobuf.SourceCodeInfo.Location`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    /// Field-number path from the file root.
    #[serde(default)]
    pub path: Vec<i32>,
    /// 0-indexed span, 3 or 4 elements.
    #[serde(default)]
    pub span: Vec<i32>,
    /// Leading comment.
    #[serde(default)]
    pub leading_comments: Option<String>,
    /// Trailing comment.
    #[serde(default)]
    pub trailing_comments: Option<String>,
    /// Detached leading comments.
    #[serde(default)]
    pub leading_detached_comments: Vec<String>,
}

impl SourceLocation {
    fn comments(&self) -> Comments {
        Comments {
            leading: self.leading_comments.clone(),
            trailing: self.trailing_comments.clone(),
            leading_detached: self.leading_detached_comments.clone(),
        }
    }
}

/// A legacy file descriptor prepared for linting.
#[derive(Debug, Clone)]
pub struct LegacyFile {
    proto: FileDescriptorProto,
    is_import: bool,
    file_comments: Comments,
    index: DeclarationIndex,
}

impl LegacyFile {
    /// Resolves source info and derives the declaration view.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::Resolution`] if the file has no name or
    /// declares the same fully-qualified name twice.
    pub fn new(proto: FileDescriptorProto, is_import: bool) -> Result<Self, DescriptorError> {
        if proto.name.is_empty() {
            return Err(DescriptorError::Resolution {
                file: "<unnamed>".to_string(),
                message: "file descriptor has no name".to_string(),
            });
        }

        let mut walker = Walker::new(&proto);
        let mut file_comments = Comments::default();
        for path in [[FILE_SYNTAX], [FILE_PACKAGE]] {
            if let Some(loc) = walker.locations.get(path.as_slice()) {
                file_comments.absorb(loc.comments());
            }
        }
        walker.walk_file(&proto);
        let declarations = walker.out;

        let index = DeclarationIndex::new(&proto.name, declarations)?;
        Ok(Self {
            proto,
            is_import,
            file_comments,
            index,
        })
    }

    /// Returns the underlying proto.
    #[must_use]
    pub fn proto(&self) -> &FileDescriptorProto {
        &self.proto
    }
}

/// Pre-order traversal that pairs declarations with their source locations.
struct Walker<'a> {
    locations: HashMap<&'a [i32], &'a SourceLocation>,
    out: Vec<Declaration>,
}

impl<'a> Walker<'a> {
    fn new(proto: &'a FileDescriptorProto) -> Self {
        let locations = proto
            .source_code_info
            .iter()
            .flat_map(|info| &info.location)
            .map(|loc| (loc.path.as_slice(), loc))
            .collect();
        Self {
            locations,
            out: Vec::new(),
        }
    }

    fn push(
        &mut self,
        path: &[i32],
        scope: &str,
        parent: Option<&str>,
        name: &str,
        kind: DeclarationKind,
    ) -> String {
        let full_name = qualify(scope, name);
        let loc = self.locations.get(path);
        self.out.push(Declaration {
            full_name: full_name.clone(),
            name: name.to_string(),
            parent: parent.map(String::from),
            kind,
            span: loc.and_then(|l| Location::from_proto_span(&l.span)),
            comments: loc.map(|l| l.comments()).unwrap_or_default(),
        });
        full_name
    }

    fn walk_file(&mut self, proto: &FileDescriptorProto) {
        let package = proto.package.as_str();
        for (i, message) in proto.message_type.iter().enumerate() {
            self.walk_message(message, &[FILE_MESSAGE_TYPE, index(i)], package, None);
        }
        for (i, enum_type) in proto.enum_type.iter().enumerate() {
            self.walk_enum(enum_type, &[FILE_ENUM_TYPE, index(i)], package, None);
        }
        for (i, service) in proto.service.iter().enumerate() {
            let path = [FILE_SERVICE, index(i)];
            let service_name =
                self.push(&path, package, None, &service.name, DeclarationKind::Service);
            for (j, method) in service.method.iter().enumerate() {
                let kind = DeclarationKind::Method {
                    input_type: method.input_type.clone(),
                    output_type: method.output_type.clone(),
                };
                let method_path = [FILE_SERVICE, index(i), SERVICE_METHOD, index(j)];
                self.push(
                    &method_path,
                    &service_name,
                    Some(&service_name),
                    &method.name,
                    kind,
                );
            }
        }
    }

    fn walk_message(
        &mut self,
        message: &DescriptorProto,
        path: &[i32],
        scope: &str,
        parent: Option<&str>,
    ) {
        let name = self.push(path, scope, parent, &message.name, DeclarationKind::Message);
        for (i, field) in message.field.iter().enumerate() {
            let kind = DeclarationKind::Field {
                type_name: field.type_name.clone(),
            };
            self.push(
                &child(path, MESSAGE_FIELD, i),
                &name,
                Some(&name),
                &field.name,
                kind,
            );
        }
        for (i, nested) in message.nested_type.iter().enumerate() {
            self.walk_message(nested, &child(path, MESSAGE_NESTED_TYPE, i), &name, Some(&name));
        }
        for (i, enum_type) in message.enum_type.iter().enumerate() {
            self.walk_enum(enum_type, &child(path, MESSAGE_ENUM_TYPE, i), &name, Some(&name));
        }
    }

    fn walk_enum(
        &mut self,
        enum_type: &EnumDescriptorProto,
        path: &[i32],
        scope: &str,
        parent: Option<&str>,
    ) {
        let name = self.push(path, scope, parent, &enum_type.name, DeclarationKind::Enum);
        // Enum values are scoped to the enum's parent, not the enum itself.
        for (i, value) in enum_type.value.iter().enumerate() {
            self.push(
                &child(path, ENUM_VALUE, i),
                scope,
                Some(&name),
                &value.name,
                DeclarationKind::EnumValue,
            );
        }
    }
}

fn index(i: usize) -> i32 {
    i32::try_from(i).unwrap_or(i32::MAX)
}

fn child(path: &[i32], field: i32, i: usize) -> Vec<i32> {
    let mut out = Vec::with_capacity(path.len() + 2);
    out.extend_from_slice(path);
    out.push(field);
    out.push(index(i));
    out
}

impl ProtoFile for LegacyFile {
    fn path(&self) -> &str {
        &self.proto.name
    }

    fn package(&self) -> &str {
        &self.proto.package
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

    const LIBRARY_JSON: &str = r#"{
  "file": [{
    "name": "acme/library/v1/library.proto",
    "package": "acme.library.v1",
    "syntax": "proto3",
    "messageType": [
      {
        "name": "Book",
        "field": [{"name": "author_name", "number": 1}],
        "nestedType": [{"name": "Chapter"}],
        "enumType": [{"name": "State", "value": [{"name": "STATE_UNSPECIFIED"}]}]
      },
      {"name": "GetBookRequest"}
    ],
    "service": [{
      "name": "Library",
      "method": [{
        "name": "GetBook",
        "inputType": ".acme.library.v1.GetBookRequest",
        "outputType": ".acme.library.v1.Book"
      }]
    }],
    "sourceCodeInfo": {"location": [
      {"path": [12], "span": [0, 0, 18], "leadingDetachedComments": [" api-linter: core::0122=disabled\n"]},
      {"path": [4, 0], "span": [4, 0, 9, 1], "leadingComments": " A book.\n"},
      {"path": [4, 0, 2, 0], "span": [5, 2, 25]},
      {"path": [6, 0, 2, 0], "span": [12, 2, 60], "trailingComments": " trailing\n"}
    ]}
  }]
}"#;

    fn library() -> LegacyFile {
        let set = FileDescriptorSet::parse(LIBRARY_JSON).unwrap();
        LegacyFile::new(set.file.into_iter().next().unwrap(), false).unwrap()
    }

    #[test]
    fn derives_declarations_in_pre_order() {
        let file = library();
        let names: Vec<&str> = file
            .declarations()
            .iter()
            .map(|d| d.full_name.as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                "acme.library.v1.Book",
                "acme.library.v1.Book.author_name",
                "acme.library.v1.Book.Chapter",
                "acme.library.v1.Book.State",
                "acme.library.v1.Book.STATE_UNSPECIFIED",
                "acme.library.v1.GetBookRequest",
                "acme.library.v1.Library",
                "acme.library.v1.Library.GetBook",
            ]
        );
    }

    #[test]
    fn enum_value_parent_is_enum() {
        let file = library();
        let value = file
            .declaration("acme.library.v1.Book.STATE_UNSPECIFIED")
            .unwrap();
        assert_eq!(value.parent.as_deref(), Some("acme.library.v1.Book.State"));
    }

    #[test]
    fn resolves_spans_and_comments_by_path() {
        let file = library();
        let book = file.declaration("acme.library.v1.Book").unwrap();
        assert_eq!(book.span, Some(Location::new(5, 1).with_end(10, 2)));
        assert_eq!(book.comments.leading.as_deref(), Some(" A book.\n"));

        let method = file.declaration("acme.library.v1.Library.GetBook").unwrap();
        assert_eq!(method.span.map(|s| s.line), Some(13));
        assert_eq!(method.comments.trailing.as_deref(), Some(" trailing\n"));
        assert_eq!(method.parent.as_deref(), Some("acme.library.v1.Library"));

        let chapter = file.declaration("acme.library.v1.Book.Chapter").unwrap();
        assert!(chapter.span.is_none());
    }

    #[test]
    fn collects_file_level_comments() {
        let file = library();
        let comments: Vec<&str> = file.file_comments().iter().collect();
        assert_eq!(comments, vec![" api-linter: core::0122=disabled\n"]);
    }

    #[test]
    fn rejects_unnamed_file() {
        let err = LegacyFile::new(FileDescriptorProto::default(), false).unwrap_err();
        assert!(matches!(err, DescriptorError::Resolution { .. }));
    }

    #[test]
    fn rejects_duplicate_declarations() {
        let proto = FileDescriptorProto {
            name: "dup.proto".to_string(),
            message_type: vec![
                DescriptorProto {
                    name: "Book".to_string(),
                    ..Default::default()
                },
                DescriptorProto {
                    name: "Book".to_string(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        assert!(LegacyFile::new(proto, false).is_err());
    }

    #[test]
    fn merge_keeps_first_file_per_name() {
        let a = FileDescriptorSet {
            file: vec![FileDescriptorProto {
                name: "a.proto".to_string(),
                package: "first".to_string(),
                ..Default::default()
            }],
        };
        let b = FileDescriptorSet {
            file: vec![
                FileDescriptorProto {
                    name: "a.proto".to_string(),
                    package: "second".to_string(),
                    ..Default::default()
                },
                FileDescriptorProto {
                    name: "b.proto".to_string(),
                    ..Default::default()
                },
            ],
        };
        let merged = FileDescriptorSet::merge(vec![a, b]);
        assert_eq!(merged.file.len(), 2);
        assert_eq!(merged.file[0].package, "first");
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            FileDescriptorSet::parse("{\"file\": 3}"),
            Err(DescriptorError::Json(_))
        ));
    }
}
