//! # aep-lint
//!
//! Protocol buffer API linter for API Enhancement Proposals.
//!
//! This is the main facade crate that re-exports the core engine and the
//! built-in rules, and drives both descriptor pipelines.
//!
//! ## Configuration
//!
//! ```toml
//! # aep-lint.toml
//! [[configs]]
//! disabled_rules = ["core::0122"]
//!
//! [[configs]]
//! included_paths = ["legacy/**/*.proto"]
//! disabled_rules = ["core"]
//! ```
//!
//! ## Suppression Comments
//!
//! ```proto
//! // (-- api-linter: core::0131::request-message-name=disabled
//! //     aep.dev/not-precedent: Kept for compatibility. --)
//! rpc GetBook(BookQuery) returns (Book);
//! ```
//!
//! ## Programmatic Usage
//!
//! ```rust,ignore
//! use aep_lint::{ConfigSequence, DescriptorInputs, DualPipeline, FileDescriptorSet};
//!
//! let configs = ConfigSequence::with_defaults().with_file("aep-lint.toml".as_ref())?;
//! let pipeline = DualPipeline::with_builtin_rules(configs)?;
//! let set = FileDescriptorSet::from_file("set.json".as_ref())?;
//! let results = pipeline.run_inputs(&DescriptorInputs::from_set(set, &[])?)?;
//! ```

#![forbid(unsafe_code)]

mod pipeline;

// Re-export core types and traits
pub use aep_lint_core::*;

pub use pipeline::{DescriptorInputs, DualPipeline, RuleInfo};

/// Built-in rules.
pub mod rules {
    pub use aep_lint_rules::*;
}
