use std::io::Write;
use std::time::Instant;
use tracing::{info, instrument};

use crate::config::Config;
use crate::corpus::ModuleCorpus;
use crate::emitter::{AliasEmitter, AliasPlan, CheckReport};
use crate::error::Result;
use crate::input;
use crate::resolver::{NameKind, OverrideTable, Resolution, Resolver};

/// Result of a complete generation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSummary {
    pub modules_scanned: usize,
    pub imports: usize,
    pub type_aliases: usize,
    pub const_aliases: usize,
    pub nested: usize,
}

/// Names and corpus loaded from disk, ready to resolve
pub struct Inputs {
    pub type_names: Vec<String>,
    pub enum_names: Vec<String>,
    pub corpus: ModuleCorpus,
}

pub struct Pipeline {
    config: Config,
    overrides: OverrideTable,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        let overrides = config.override_table();
        Self { config, overrides }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Read both name lists, then scan the corpus.
    ///
    /// Name lists come first so that a missing list fails before the corpus
    /// is touched.
    #[instrument(skip(self))]
    pub fn load(&self) -> Result<Inputs> {
        let type_names = input::load_names(&self.config.types_file)?;
        let enum_names = input::load_names(&self.config.enums_file)?;
        let corpus = ModuleCorpus::scan(
            &self.config.corpus_root,
            &self.config.module_prefix,
            &self.config.source_suffix,
        )?;
        Ok(Inputs {
            type_names,
            enum_names,
            corpus,
        })
    }

    fn resolver<'a>(&'a self, corpus: &'a ModuleCorpus) -> Resolver<'a> {
        Resolver::new(corpus, &self.overrides, &self.config.container)
    }

    /// Resolve everything and write the alias file to `out`.
    ///
    /// Nothing is written unless every name resolves.
    pub fn generate<W: Write>(&self, out: &mut W) -> Result<GenerationSummary> {
        let start = Instant::now();
        let inputs = self.load()?;
        let summary = self.generate_from(&inputs, out)?;
        info!(
            duration_ms = start.elapsed().as_millis() as u64,
            types = summary.type_aliases,
            enums = summary.const_aliases,
            "generation finished"
        );
        Ok(summary)
    }

    pub fn generate_from<W: Write>(&self, inputs: &Inputs, out: &mut W) -> Result<GenerationSummary> {
        let resolver = self.resolver(&inputs.corpus);
        let plan = AliasPlan::build(&resolver, &inputs.type_names, &inputs.enum_names)?;

        let emitter = AliasEmitter::from_config(&self.config);
        emitter.write(&plan, &inputs.corpus, out)?;

        Ok(GenerationSummary {
            modules_scanned: inputs.corpus.len(),
            imports: emitter.imports(&plan, &inputs.corpus).len(),
            type_aliases: plan.types.len(),
            const_aliases: plan.enums.len(),
            nested: plan.nested_count(),
        })
    }

    /// Resolve every name and report all failures instead of the first
    pub fn check(&self) -> Result<CheckReport> {
        let inputs = self.load()?;
        let resolver = self.resolver(&inputs.corpus);
        Ok(CheckReport::run(&resolver, &inputs.type_names, &inputs.enum_names))
    }

    /// Resolve a single name against the corpus without reading the name lists
    pub fn resolve_one(&self, name: &str, kind: NameKind) -> Result<Resolution> {
        let corpus = ModuleCorpus::scan(
            &self.config.corpus_root,
            &self.config.module_prefix,
            &self.config.source_suffix,
        )?;
        self.resolver(&corpus).resolve(name, kind)
    }
}
