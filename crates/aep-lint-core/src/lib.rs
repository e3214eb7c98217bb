//! # aep-lint-core
//!
//! Rule governance and execution for linting protobuf APIs against
//! API Enhancement Proposals.
//!
//! This crate provides:
//!
//! - [`RuleName`] and [`RuleNamePrefix`] for `category::group::name` addressing
//! - [`Rule`] trait and [`RuleRegistry`] for registering rules per pipeline
//! - [`ConfigSequence`] for deciding which rules run on which files
//! - [`SuppressionIndex`] for `api-linter:` comment directives
//! - [`Engine`] for running rules over [`ProtoFile`]s
//! - [`merge`] for combining the output of two pipelines
//!
//! ## Example
//!
//! ```ignore
//! use aep_lint_core::{ConfigSequence, Engine, RuleRegistry};
//!
//! let mut registry = RuleRegistry::new();
//! registry.register(MyRule)?;
//! let configs = ConfigSequence::with_defaults().with_file(path)?;
//!
//! let responses = Engine::new(&registry, &configs).run(&files)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod descriptor;
mod engine;
mod merge;
pub mod plugin;
mod registry;
mod rule;
mod rule_name;
pub mod suppression;
mod types;

pub use config::{ConfigError, ConfigLayer, ConfigLayerBuilder, ConfigSequence};
pub use descriptor::legacy::{FileDescriptorSet, LegacyFile};
pub use descriptor::native::{NativeFile, NativeFileBuilder};
pub use descriptor::{Comments, Declaration, DeclarationKind, DescriptorError, ProtoFile};
pub use engine::{Engine, EngineError, EngineOptions, Invocation};
pub use merge::{any_problems, merge, CombinedResult, Pipeline};
pub use plugin::{check_spec, check_specs, CheckIdCollision, CheckSpec};
pub use registry::{RegisteredRule, RegistryError, RuleRegistry};
pub use rule::{FnRule, Rule, RuleBox};
pub use rule_name::{longest_match, NameError, RuleName, RuleNamePrefix, RuleState, DOCS_BASE_URL};
pub use suppression::SuppressionIndex;
pub use types::{Location, Problem, ProblemKind, RawProblem, Response};
