use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

use crate::constants;
use crate::corpus::ModuleCorpus;
use crate::error::{LegacyError, Result};

const MAX_SUGGESTIONS: usize = 5;

/// What kind of declaration a legacy name refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum NameKind {
    /// Message or enum type (`type X ...`)
    Type,
    /// Enum value constant (tab-indented member of a `const (...)` block)
    Enum,
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameKind::Type => write!(f, "type"),
            NameKind::Enum => write!(f, "enum"),
        }
    }
}

/// Legacy names whose declared identifier changed in the split
#[derive(Debug, Clone, Default)]
pub struct OverrideTable {
    entries: BTreeMap<String, String>,
}

impl OverrideTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut table = Self::empty();
        for (legacy, declared) in constants::RENAMED_DECLARATIONS {
            table.insert(legacy.to_string(), declared.to_string());
        }
        table
    }

    pub fn insert(&mut self, legacy: String, declared: String) {
        self.entries.insert(legacy, declared);
    }

    /// The identifier to search for: the override target if there is one,
    /// otherwise the legacy name itself.
    pub fn lookup<'a>(&'a self, legacy: &'a str) -> &'a str {
        self.entries.get(legacy).map(String::as_str).unwrap_or(legacy)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Where a legacy name lives after the split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub legacy_name: String,
    pub module: String,
    pub declared_name: String,
    /// Declared under the container prefix rather than at top level
    pub nested: bool,
}

impl Resolution {
    /// Right-hand side of the alias, e.g. `waE2E.Message`
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.module, self.declared_name)
    }
}

struct Probe {
    needle: String,
    declared_name: String,
    nested: bool,
}

pub struct Resolver<'a> {
    corpus: &'a ModuleCorpus,
    overrides: &'a OverrideTable,
    container: &'a str,
}

impl<'a> Resolver<'a> {
    pub fn new(corpus: &'a ModuleCorpus, overrides: &'a OverrideTable, container: &'a str) -> Self {
        Self {
            corpus,
            overrides,
            container,
        }
    }

    /// Find the module declaring `legacy_name`.
    ///
    /// Modules are visited in corpus order and each is probed for the direct
    /// declaration before the container-qualified one. The first hit wins.
    pub fn resolve(&self, legacy_name: &str, kind: NameKind) -> Result<Resolution> {
        let search_name = self.overrides.lookup(legacy_name);
        if search_name != legacy_name {
            debug!(legacy = legacy_name, declared = search_name, "applying rename override");
        }
        let probes = self.probes(search_name, kind);

        for (module, source) in self.corpus.iter() {
            if let Some(probe) = probes.iter().find(|p| source.contains(&p.needle)) {
                debug!(
                    legacy = legacy_name,
                    module,
                    declared = %probe.declared_name,
                    nested = probe.nested,
                    "resolved"
                );
                return Ok(Resolution {
                    legacy_name: legacy_name.to_string(),
                    module: module.to_string(),
                    declared_name: probe.declared_name.clone(),
                    nested: probe.nested,
                });
            }
        }

        let suggestions = self.suggestions(search_name, kind);
        warn!(legacy = legacy_name, %kind, candidates = suggestions.len(), "unresolved legacy name");
        Err(LegacyError::Unresolved {
            kind,
            name: legacy_name.to_string(),
            suggestions,
        })
    }

    fn probes(&self, search_name: &str, kind: NameKind) -> [Probe; 2] {
        let nested_name = format!("{}_{}", self.container, search_name);
        let lead = match kind {
            NameKind::Type => "type ",
            NameKind::Enum => "\t",
        };
        [
            Probe {
                needle: format!("{}{} ", lead, search_name),
                declared_name: search_name.to_string(),
                nested: false,
            },
            Probe {
                needle: format!("{}{} ", lead, nested_name),
                declared_name: nested_name,
                nested: true,
            },
        ]
    }

    /// Declarations that look like a rename of `search_name`: same name in a
    /// different case, or the name nested under some other message.
    fn suggestions(&self, search_name: &str, kind: NameKind) -> Vec<String> {
        if search_name.is_empty() {
            return Vec::new();
        }
        let nested_suffix = format!("_{}", search_name);
        let declared: Vec<(&str, &str)> = match kind {
            NameKind::Type => self.corpus.declared_types().collect(),
            NameKind::Enum => self.corpus.declared_constants().collect(),
        };

        let mut found: Vec<String> = Vec::new();
        for (module, name) in declared {
            if name.ends_with(&nested_suffix) || name.eq_ignore_ascii_case(search_name) {
                let candidate = format!("{}.{}", module, name);
                if !found.contains(&candidate) {
                    found.push(candidate);
                }
                if found.len() == MAX_SUGGESTIONS {
                    break;
                }
            }
        }
        found
    }
}
