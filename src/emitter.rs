use std::collections::BTreeSet;
use std::io::Write;
use tracing::info;

use crate::config::{Config, ImportPolicy};
use crate::constants;
use crate::corpus::ModuleCorpus;
use crate::error::{LegacyError, Result};
use crate::resolver::{NameKind, Resolution, Resolver};

/// Every legacy name resolved, in input order.
///
/// Built completely before anything is written so that an unresolved name
/// leaves the output untouched and the import block can list exactly the
/// modules in use.
#[derive(Debug, Clone, Default)]
pub struct AliasPlan {
    pub types: Vec<Resolution>,
    pub enums: Vec<Resolution>,
}

impl AliasPlan {
    /// Resolve all names, stopping at the first one that matches no module
    pub fn build(resolver: &Resolver<'_>, type_names: &[String], enum_names: &[String]) -> Result<Self> {
        let types = type_names
            .iter()
            .map(|name| resolver.resolve(name, NameKind::Type))
            .collect::<Result<Vec<_>>>()?;
        let enums = enum_names
            .iter()
            .map(|name| resolver.resolve(name, NameKind::Enum))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { types, enums })
    }

    /// Modules referenced by at least one alias, sorted and deduplicated
    pub fn used_modules(&self) -> BTreeSet<&str> {
        self.types
            .iter()
            .chain(self.enums.iter())
            .map(|r| r.module.as_str())
            .collect()
    }

    pub fn nested_count(&self) -> usize {
        self.types.iter().chain(self.enums.iter()).filter(|r| r.nested).count()
    }
}

/// Outcome of resolving every name without stopping at the first failure
#[derive(Debug, Default)]
pub struct CheckReport {
    pub resolved: usize,
    pub failures: Vec<LegacyError>,
}

impl CheckReport {
    pub fn run(resolver: &Resolver<'_>, type_names: &[String], enum_names: &[String]) -> Self {
        let mut report = Self::default();
        let all = type_names
            .iter()
            .map(|name| (name, NameKind::Type))
            .chain(enum_names.iter().map(|name| (name, NameKind::Enum)));
        for (name, kind) in all {
            match resolver.resolve(name, kind) {
                Ok(_) => report.resolved += 1,
                Err(e) => report.failures.push(e),
            }
        }
        report
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of resolved names, or `CheckFailed` if any name failed
    pub fn ensure_clean(&self) -> Result<usize> {
        if self.is_clean() {
            Ok(self.resolved)
        } else {
            Err(LegacyError::CheckFailed {
                unresolved: self.failures.len(),
                total: self.resolved + self.failures.len(),
            })
        }
    }
}

/// Writes the Go alias file
pub struct AliasEmitter<'a> {
    import_base: &'a str,
    package_name: &'a str,
    policy: ImportPolicy,
}

impl<'a> AliasEmitter<'a> {
    pub fn new(import_base: &'a str, package_name: &'a str, policy: ImportPolicy) -> Self {
        Self {
            import_base,
            package_name,
            policy,
        }
    }

    pub fn from_config(config: &'a Config) -> Self {
        Self::new(&config.import_base, &config.package_name, config.import_policy)
    }

    pub fn imports<'p>(&self, plan: &'p AliasPlan, corpus: &'p ModuleCorpus) -> BTreeSet<&'p str> {
        match self.policy {
            ImportPolicy::UsedOnly => plan.used_modules(),
            ImportPolicy::AllModules => corpus.module_names().collect(),
        }
    }

    pub fn write<W: Write>(&self, plan: &AliasPlan, corpus: &ModuleCorpus, out: &mut W) -> Result<()> {
        let imports = self.imports(plan, corpus);

        writeln!(out, "// DO NOT MODIFY: Generated by {}", constants::GENERATED_BY)?;
        writeln!(out)?;
        writeln!(out, "package {}", self.package_name)?;
        writeln!(out)?;

        writeln!(out, "import (")?;
        for module in &imports {
            writeln!(out, "\t\"{}\"", constants::import_path(self.import_base, module))?;
        }
        writeln!(out, ")")?;
        writeln!(out)?;

        write_block(out, "type", &plan.types)?;
        writeln!(out)?;
        write_block(out, "const", &plan.enums)?;
        out.flush()?;

        info!(
            imports = imports.len(),
            types = plan.types.len(),
            enums = plan.enums.len(),
            "wrote alias file"
        );
        Ok(())
    }
}

fn write_block<W: Write>(out: &mut W, keyword: &str, aliases: &[Resolution]) -> Result<()> {
    writeln!(out, "{}", constants::DEPRECATION_NOTICE)?;
    writeln!(out, "{} (", keyword)?;
    for alias in aliases {
        writeln!(out, "\t{} = {}", alias.legacy_name, alias.qualified())?;
    }
    writeln!(out, ")")?;
    Ok(())
}
