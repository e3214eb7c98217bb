//! Engine: runs registered rules over compiled proto files.

use crate::config::{ConfigError, ConfigSequence};
use crate::descriptor::{DescriptorError, ProtoFile};
use crate::registry::{RegisteredRule, RegistryError, RuleRegistry};
use crate::suppression::SuppressionIndex;
use crate::types::{Problem, RawProblem, Response};

use rayon::prelude::*;
use std::any::Any;
use std::cell::Cell;
use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Once;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that abort a run before any rule executes.
#[derive(Debug, Error, miette::Diagnostic)]
pub enum EngineError {
    /// Rule registration failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Registry(#[from] RegistryError),

    /// Configuration could not be loaded.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    /// Descriptors could not be resolved.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Descriptor(#[from] DescriptorError),

    /// Two input files share a path.
    #[error("File `{path}` was given more than once")]
    #[diagnostic(code(aep_lint::engine::duplicate_file))]
    DuplicateFile {
        /// The repeated path.
        path: String,
    },
}

/// Run options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Ignore `api-linter:` comment directives.
    pub ignore_comment_disables: bool,
    /// Let rule panics propagate instead of isolating them.
    pub debug: bool,
    /// Run files and rules on the rayon thread pool.
    pub parallel: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            ignore_comment_disables: false,
            debug: false,
            parallel: true,
        }
    }
}

/// Outcome of one rule invocation on one file.
#[derive(Debug)]
pub enum Invocation {
    /// The rule returned normally.
    Completed(Vec<RawProblem>),
    /// The rule panicked; holds the panic message.
    Defect(String),
}

impl Invocation {
    /// Runs `rule` on `file`, capturing panics unless `debug` is set.
    pub fn capture<F: ProtoFile>(rule: &RegisteredRule<F>, file: &F, debug: bool) -> Self {
        if debug {
            return Self::Completed(rule.rule().lint(file));
        }
        install_quiet_hook();
        ISOLATING.with(|flag| flag.set(true));
        let outcome = catch_unwind(AssertUnwindSafe(|| rule.rule().lint(file)));
        ISOLATING.with(|flag| flag.set(false));
        match outcome {
            Ok(problems) => Self::Completed(problems),
            Err(payload) => Self::Defect(panic_message(payload.as_ref())),
        }
    }
}

thread_local! {
    static ISOLATING: Cell<bool> = const { Cell::new(false) };
}

static QUIET_HOOK: Once = Once::new();

/// Wraps the panic hook once per process: panics inside an isolated rule are
/// not printed, any other panic reaches the previous hook.
fn install_quiet_hook() {
    QUIET_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            if !ISOLATING.with(Cell::get) {
                previous(info);
            }
        }));
    });
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Runs one pipeline's rules over its files.
///
/// The engine borrows the registry and configuration; both stay read-only
/// for the whole run, so files and rules can be processed in parallel.
/// Output order depends only on input order, never on scheduling.
pub struct Engine<'a, F> {
    registry: &'a RuleRegistry<F>,
    configs: &'a ConfigSequence,
    options: EngineOptions,
}

impl<'a, F: ProtoFile> Engine<'a, F> {
    /// Creates an engine with default options.
    #[must_use]
    pub fn new(registry: &'a RuleRegistry<F>, configs: &'a ConfigSequence) -> Self {
        Self {
            registry,
            configs,
            options: EngineOptions::default(),
        }
    }

    /// Replaces all options.
    #[must_use]
    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets whether comment directives are ignored.
    #[must_use]
    pub fn ignore_comment_disables(mut self, ignore: bool) -> Self {
        self.options.ignore_comment_disables = ignore;
        self
    }

    /// Sets debug mode (no panic isolation).
    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.options.debug = debug;
        self
    }

    /// Sets whether work is spread over the rayon pool.
    #[must_use]
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.options.parallel = parallel;
        self
    }

    /// Current options.
    #[must_use]
    pub fn options(&self) -> EngineOptions {
        self.options
    }

    /// Lints every non-import file and returns one response per file, in
    /// input order.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DuplicateFile`] if two non-import files share a
    /// path. Rule panics never produce an error; outside debug mode they
    /// become [`Problem::rule_defect`] entries.
    pub fn run(&self, files: &[F]) -> Result<Vec<Response>, EngineError> {
        let targets: Vec<&F> = files.iter().filter(|f| !f.is_import()).collect();

        let mut seen = HashSet::new();
        if let Some(dup) = targets.iter().find(|f| !seen.insert(f.path())) {
            return Err(EngineError::DuplicateFile {
                path: dup.path().to_string(),
            });
        }

        info!(
            "Linting {} file(s) with {} rule(s) ({} import(s) skipped)",
            targets.len(),
            self.registry.len(),
            files.len() - targets.len()
        );

        let responses: Vec<Response> = if self.options.parallel {
            targets.par_iter().map(|f| self.lint_file(f)).collect()
        } else {
            targets.iter().map(|f| self.lint_file(f)).collect()
        };

        info!(
            "Lint complete: {} problem(s) in {} file(s)",
            responses.iter().map(|r| r.problems.len()).sum::<usize>(),
            responses.len()
        );
        Ok(responses)
    }

    fn lint_file(&self, file: &F) -> Response {
        let path = file.path();
        let suppressions = if self.options.ignore_comment_disables {
            SuppressionIndex::bypassed()
        } else {
            SuppressionIndex::build(file)
        };

        let enabled: Vec<&RegisteredRule<F>> = self
            .registry
            .all()
            .iter()
            .filter(|rule| {
                let on = self.configs.is_enabled(path, rule.name());
                if !on {
                    debug!("Skipping disabled rule {} for {}", rule.name(), path);
                }
                on
            })
            .collect();

        let per_rule: Vec<Vec<Problem>> = if self.options.parallel {
            enabled
                .par_iter()
                .map(|rule| self.run_rule(rule, file, &suppressions))
                .collect()
        } else {
            enabled
                .iter()
                .map(|rule| self.run_rule(rule, file, &suppressions))
                .collect()
        };

        let mut problems: Vec<Problem> = per_rule.into_iter().flatten().collect();
        // Stable: equal positions keep rule order.
        problems.sort_by(Problem::position_cmp);

        Response {
            file_path: path.to_string(),
            problems,
        }
    }

    fn run_rule(
        &self,
        rule: &RegisteredRule<F>,
        file: &F,
        suppressions: &SuppressionIndex,
    ) -> Vec<Problem> {
        let raw = match Invocation::capture(rule, file, self.options.debug) {
            Invocation::Completed(raw) => raw,
            Invocation::Defect(detail) => {
                warn!("Rule {} panicked on {}: {}", rule.name(), file.path(), detail);
                return vec![Problem::rule_defect(rule.name(), &detail)];
            }
        };

        raw.into_iter()
            .filter_map(|problem| {
                let location = problem.location.or_else(|| {
                    file.declaration(&problem.descriptor)
                        .and_then(|decl| decl.span)
                });
                let descriptor = problem.descriptor.as_str();
                if suppressions.is_suppressed_at(descriptor, location.as_ref(), rule.name()) {
                    debug!(
                        "Suppressed {} on `{}` in {}",
                        rule.name(),
                        problem.descriptor,
                        file.path()
                    );
                    return None;
                }
                Some(Problem::attribute(problem, rule.name(), location))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLayer;
    use crate::descriptor::native::NativeFile;
    use crate::rule::{FnRule, Rule, RuleBox};
    use crate::types::{Location, ProblemKind};

    fn file(path: &str) -> NativeFile {
        let mut b = NativeFile::builder(path, "acme");
        let book = b.message(None, "Book");
        b.set_span(book, Location::new(7, 1));
        b.build().unwrap()
    }

    fn boxed(rule: impl Rule<NativeFile> + 'static) -> RuleBox<NativeFile> {
        Box::new(rule)
    }

    fn registry(rules: Vec<RuleBox<NativeFile>>) -> RuleRegistry<NativeFile> {
        let mut registry = RuleRegistry::new();
        registry.register_all(rules).unwrap();
        registry
    }

    #[test]
    fn falls_back_to_declaration_span() {
        let registry = registry(vec![boxed(FnRule::new(
            "core::0001::book",
            |_: &NativeFile| vec![RawProblem::new("acme.Book", "bad book")],
        ))]);
        let configs = ConfigSequence::with_defaults();
        let responses = Engine::new(&registry, &configs).run(&[file("a.proto")]).unwrap();
        assert_eq!(responses[0].problems[0].location, Some(Location::new(7, 1)));
    }

    #[test]
    fn explicit_location_wins() {
        let registry = registry(vec![boxed(FnRule::new(
            "core::0001::book",
            |_: &NativeFile| {
                vec![RawProblem::new("acme.Book", "bad book").with_location(Location::new(2, 4))]
            },
        ))]);
        let configs = ConfigSequence::with_defaults();
        let responses = Engine::new(&registry, &configs).run(&[file("a.proto")]).unwrap();
        assert_eq!(responses[0].problems[0].location, Some(Location::new(2, 4)));
    }

    #[test]
    fn skips_imports_and_rejects_duplicate_paths() {
        let registry = RuleRegistry::<NativeFile>::new();
        let configs = ConfigSequence::with_defaults();
        let engine = Engine::new(&registry, &configs);

        let import = NativeFile::builder("dep.proto", "dep")
            .import(true)
            .build()
            .unwrap();
        let responses = engine.run(&[import, file("a.proto")]).unwrap();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].file_path, "a.proto");

        let err = engine.run(&[file("a.proto"), file("a.proto")]).unwrap_err();
        assert!(matches!(err, EngineError::DuplicateFile { path } if path == "a.proto"));
    }

    #[test]
    fn disabled_rule_is_not_invoked() {
        let registry = registry(vec![boxed(FnRule::new(
            "core::0001::boom",
            |_: &NativeFile| -> Vec<RawProblem> { panic!("must not run") },
        ))]);
        let configs: ConfigSequence = [ConfigLayer::builder().disable("core").build().unwrap()]
            .into_iter()
            .collect();
        let responses = Engine::new(&registry, &configs)
            .debug(true)
            .run(&[file("a.proto")])
            .unwrap();
        assert!(responses[0].problems.is_empty());
    }

    #[test]
    fn panic_becomes_rule_defect() {
        let registry = registry(vec![
            boxed(FnRule::new("core::0001::boom", |_: &NativeFile| -> Vec<RawProblem> {
                panic!("index out of bounds")
            })),
            boxed(FnRule::new("core::0001::fine", |_: &NativeFile| {
                vec![RawProblem::new("acme.Book", "found")]
            })),
        ]);
        let configs = ConfigSequence::with_defaults();
        let responses = Engine::new(&registry, &configs)
            .parallel(false)
            .run(&[file("a.proto")])
            .unwrap();
        let problems = &responses[0].problems;
        assert_eq!(problems.len(), 2);
        // Positioned problem first, the location-less defect last.
        assert_eq!(problems[0].rule_id.to_string(), "core::0001::fine");
        assert_eq!(problems[1].kind, ProblemKind::RuleDefect);
        assert!(problems[1].message.contains("index out of bounds"));
        // The quiet hook only applies while a rule runs.
        assert!(!ISOLATING.with(Cell::get));
    }

    #[test]
    #[should_panic(expected = "debug boom")]
    fn debug_mode_propagates_panics() {
        let registry = registry(vec![boxed(FnRule::new(
            "core::0001::boom",
            |_: &NativeFile| -> Vec<RawProblem> { panic!("debug boom") },
        ))]);
        let configs = ConfigSequence::with_defaults();
        let _ = Engine::new(&registry, &configs)
            .debug(true)
            .parallel(false)
            .run(&[file("a.proto")]);
    }

    #[test]
    fn panic_message_handles_payload_types() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42_u8), "unknown panic");
    }

    #[test]
    fn options_round_trip_through_setters() {
        let registry = RuleRegistry::<NativeFile>::new();
        let configs = ConfigSequence::new();
        let engine = Engine::new(&registry, &configs)
            .ignore_comment_disables(true)
            .debug(true)
            .parallel(false);
        assert_eq!(
            engine.options(),
            EngineOptions {
                ignore_comment_disables: true,
                debug: true,
                parallel: false,
            }
        );
    }
}
