//! Dual-pipeline driver: lints the same files through the legacy and native
//! descriptor representations and merges the results.

use aep_lint_core::plugin::{check_spec, check_specs, CheckIdCollision};
use aep_lint_core::{
    merge, CombinedResult, ConfigSequence, DescriptorError, Engine, EngineError, EngineOptions,
    FileDescriptorSet, LegacyFile, NativeFile, Pipeline, RuleName, RuleRegistry,
};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::info;

/// Files of one run in both representations.
#[derive(Debug, Clone, Default)]
pub struct DescriptorInputs {
    /// Files for the legacy pipeline.
    pub legacy: Vec<LegacyFile>,
    /// The same files for the native pipeline.
    pub native: Vec<NativeFile>,
}

impl DescriptorInputs {
    /// Prepares every file of `set` for both pipelines.
    ///
    /// With an empty `targets` list every file is linted; otherwise only the
    /// named files are, and the rest are treated as imports.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::Resolution`] if a target is missing from
    /// the set or a file cannot be resolved.
    pub fn from_set(set: FileDescriptorSet, targets: &[String]) -> Result<Self, DescriptorError> {
        let present: HashSet<&str> = set.file.iter().map(|f| f.name.as_str()).collect();
        if let Some(missing) = targets.iter().find(|t| !present.contains(t.as_str())) {
            return Err(DescriptorError::Resolution {
                file: missing.clone(),
                message: "file is not in the descriptor set".to_string(),
            });
        }

        let wanted: HashSet<&str> = targets.iter().map(String::as_str).collect();
        let legacy = set
            .file
            .into_iter()
            .map(|proto| {
                let is_import = !wanted.is_empty() && !wanted.contains(proto.name.as_str());
                LegacyFile::new(proto, is_import)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let native = legacy
            .iter()
            .map(NativeFile::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { legacy, native })
    }
}

/// One rule as seen across both pipelines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleInfo {
    /// Rule name.
    pub name: RuleName,
    /// Pipelines that register the rule.
    pub pipelines: Vec<Pipeline>,
    /// Plugin-host check identifier.
    pub check_id: String,
    /// One-line description.
    pub description: &'static str,
    /// Documentation URI.
    pub uri: String,
}

/// Runs both pipelines over one configuration.
pub struct DualPipeline {
    legacy: RuleRegistry<LegacyFile>,
    native: RuleRegistry<NativeFile>,
    configs: ConfigSequence,
    options: EngineOptions,
}

impl DualPipeline {
    /// Creates a driver from prebuilt registries.
    #[must_use]
    pub fn new(
        legacy: RuleRegistry<LegacyFile>,
        native: RuleRegistry<NativeFile>,
        configs: ConfigSequence,
    ) -> Self {
        Self {
            legacy,
            native,
            configs,
            options: EngineOptions::default(),
        }
    }

    /// Creates a driver with the built-in rules registered.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Registry`] if rule registration fails.
    pub fn with_builtin_rules(configs: ConfigSequence) -> Result<Self, EngineError> {
        let mut legacy = RuleRegistry::<LegacyFile>::new();
        aep_lint_rules::add_legacy_rules(&mut legacy)?;
        let mut native = RuleRegistry::<NativeFile>::new();
        aep_lint_rules::add_native_rules(&mut native)?;
        Ok(Self::new(legacy, native, configs))
    }

    /// Replaces the engine options of both pipelines.
    #[must_use]
    pub fn options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets whether comment directives are ignored.
    #[must_use]
    pub fn ignore_comment_disables(mut self, ignore: bool) -> Self {
        self.options.ignore_comment_disables = ignore;
        self
    }

    /// Sets debug mode (rule panics propagate).
    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.options.debug = debug;
        self
    }

    /// The legacy pipeline's registry.
    #[must_use]
    pub fn legacy_registry(&self) -> &RuleRegistry<LegacyFile> {
        &self.legacy
    }

    /// The native pipeline's registry.
    #[must_use]
    pub fn native_registry(&self) -> &RuleRegistry<NativeFile> {
        &self.native
    }

    /// The configuration shared by both pipelines.
    #[must_use]
    pub fn configs(&self) -> &ConfigSequence {
        &self.configs
    }

    /// Runs both pipelines and merges their responses.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] if either engine rejects its input.
    pub fn run(
        &self,
        legacy_files: &[LegacyFile],
        native_files: &[NativeFile],
    ) -> Result<Vec<CombinedResult>, EngineError> {
        let legacy = Engine::new(&self.legacy, &self.configs)
            .with_options(self.options)
            .run(legacy_files)?;
        let native = Engine::new(&self.native, &self.configs)
            .with_options(self.options)
            .run(native_files)?;
        let results = merge(legacy, native);
        info!(
            "Merged results for {} file(s), {} with problems",
            results.len(),
            results.iter().filter(|r| r.has_problems()).count()
        );
        Ok(results)
    }

    /// Runs both pipelines over prepared inputs.
    ///
    /// # Errors
    ///
    /// See [`Self::run`].
    pub fn run_inputs(&self, inputs: &DescriptorInputs) -> Result<Vec<CombinedResult>, EngineError> {
        self.run(&inputs.legacy, &inputs.native)
    }

    /// Lists every rule once, legacy registration order first.
    ///
    /// # Errors
    ///
    /// Returns [`CheckIdCollision`] if two rules share a check id.
    pub fn rules(&self) -> Result<Vec<RuleInfo>, CheckIdCollision> {
        let names: Vec<&RuleName> = self.legacy.names().chain(self.native.names()).collect();
        check_specs(names.iter().copied())?;

        let mut infos: Vec<RuleInfo> = Vec::new();
        let mut index: HashMap<&RuleName, usize> = HashMap::new();
        let entries = self
            .legacy
            .all()
            .iter()
            .map(|r| (Pipeline::Legacy, r.name(), r.description()))
            .chain(
                self.native
                    .all()
                    .iter()
                    .map(|r| (Pipeline::Native, r.name(), r.description())),
            );
        for (pipeline, name, description) in entries {
            if let Some(&i) = index.get(name) {
                infos[i].pipelines.push(pipeline);
                continue;
            }
            index.insert(name, infos.len());
            infos.push(RuleInfo {
                name: name.clone(),
                pipelines: vec![pipeline],
                check_id: check_spec(name).id,
                description,
                uri: name.uri(),
            });
        }
        Ok(infos)
    }
}
