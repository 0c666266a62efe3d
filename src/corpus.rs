use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{LegacyError, Result};

/// Top-level type declaration as laid out by protoc-gen-go
static TYPE_DECLARATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^type ([A-Za-z_][A-Za-z0-9_]*) ").expect("valid regex"));

/// Typed constant inside a `const (...)` block, e.g. `\tFoo_BAR Foo = 1`.
/// gofmt pads the columns, so both gaps may be several spaces wide.
static CONST_DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\t([A-Za-z_][A-Za-z0-9_]*) +[A-Za-z_][A-Za-z0-9_.]* += ").expect("valid regex")
});

/// Generated definition sources keyed by module (directory) name.
///
/// Iteration is in module-name order so that resolution, and therefore the
/// generated file, does not depend on directory listing order.
#[derive(Debug, Clone, Default)]
pub struct ModuleCorpus {
    modules: BTreeMap<String, String>,
}

impl ModuleCorpus {
    /// Build a corpus from already loaded sources
    pub fn from_modules<I, K, V>(modules: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            modules: modules
                .into_iter()
                .map(|(name, source)| (name.into(), source.into()))
                .collect(),
        }
    }

    /// Load the first `suffix` file of every `prefix*` subdirectory of `root`.
    ///
    /// Subdirectories without such a file are skipped. A file that exists but
    /// cannot be read fails the scan, since dropping it could let another
    /// module claim its names.
    pub fn scan(root: &Path, prefix: &str, suffix: &str) -> Result<Self> {
        let mut modules = BTreeMap::new();

        for (module, dir) in module_dirs(root, prefix)? {
            match definition_file(&dir, suffix)? {
                Some(file) => {
                    let source = fs::read_to_string(&file).map_err(|source| {
                        LegacyError::CorpusRead { path: file.clone(), source }
                    })?;
                    debug!(module = %module, file = %file.display(), bytes = source.len(), "loaded module source");
                    modules.insert(module, source);
                }
                None => debug!(module = %module, "no definition file, skipping"),
            }
        }

        info!(root = %root.display(), modules = modules.len(), "scanned module corpus");
        Ok(Self { modules })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.modules.iter().map(|(name, source)| (name.as_str(), source.as_str()))
    }

    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    pub fn get(&self, module: &str) -> Option<&str> {
        self.modules.get(module).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Every top-level type declared in the corpus, as `(module, name)` pairs.
    pub fn declared_types(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().flat_map(|(module, source)| {
            TYPE_DECLARATION
                .captures_iter(source)
                .filter_map(move |caps| caps.get(1).map(|m| (module, m.as_str())))
        })
    }

    /// Every typed enum constant declared in the corpus, as `(module, name)` pairs.
    pub fn declared_constants(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().flat_map(|(module, source)| {
            CONST_DECLARATION
                .captures_iter(source)
                .filter_map(move |caps| caps.get(1).map(|m| (module, m.as_str())))
        })
    }
}

fn module_dirs(root: &Path, prefix: &str) -> Result<Vec<(String, PathBuf)>> {
    let root_err = |source| LegacyError::CorpusRoot { path: root.to_path_buf(), source };

    let mut dirs = Vec::new();
    for entry in fs::read_dir(root).map_err(root_err)? {
        let entry = entry.map_err(root_err)?;
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        let path = entry.path();
        if name.starts_with(prefix) && path.is_dir() {
            dirs.push((name, path));
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn definition_file(dir: &Path, suffix: &str) -> Result<Option<PathBuf>> {
    let dir_err = |source| LegacyError::CorpusRead { path: dir.to_path_buf(), source };

    let mut candidates = Vec::new();
    for entry in fs::read_dir(dir).map_err(dir_err)? {
        let entry = entry.map_err(dir_err)?;
        let matches = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(suffix));
        if matches && entry.path().is_file() {
            candidates.push(entry.path());
        }
    }
    candidates.sort();
    Ok(candidates.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn scan_keeps_prefixed_dirs_with_definition_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "waE2E/WAWebProtobufsE2E.pb.go", "type Message struct {\n");
        write(root, "waAdv/WAAdv.pb.go", "type ADVKeyIndexList struct {\n");
        write(root, "waEmpty/README.md", "nothing here");
        write(root, "other/Other.pb.go", "type Other struct {\n");
        write(root, "extra.go", "package proto\n");

        let corpus = ModuleCorpus::scan(root, "wa", ".pb.go").unwrap();

        let names: Vec<&str> = corpus.module_names().collect();
        assert_eq!(names, vec!["waAdv", "waE2E"]);
        assert_eq!(corpus.get("waE2E"), Some("type Message struct {\n"));
        assert!(corpus.get("waEmpty").is_none());
    }

    #[test]
    fn first_definition_file_in_name_order_wins() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "waMulti/B.pb.go", "second");
        write(root, "waMulti/A.pb.go", "first");
        write(root, "waMulti/extra.go", "not a definition file");

        let corpus = ModuleCorpus::scan(root, "wa", ".pb.go").unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.get("waMulti"), Some("first"));
    }

    #[test]
    fn missing_root_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("proto");
        assert!(matches!(
            ModuleCorpus::scan(&missing, "wa", ".pb.go"),
            Err(LegacyError::CorpusRoot { .. })
        ));
    }

    #[test]
    fn declared_types_are_line_anchored() {
        let corpus = ModuleCorpus::from_modules([(
            "waE2E",
            "type Message struct {\n\tHeader *Message_Header\n}\n\ntype Message_Header struct {\n// type NotADecl \n",
        )]);

        let declared: Vec<(&str, &str)> = corpus.declared_types().collect();
        assert_eq!(declared, vec![("waE2E", "Message"), ("waE2E", "Message_Header")]);
    }

    #[test]
    fn declared_constants_skip_struct_fields() {
        let corpus = ModuleCorpus::from_modules([(
            "waFingerprint",
            "const (\n\tHostedState_E2EE HostedState = 0\n\tHostedState_HOSTED    HostedState   = 1\n)\n\ntype FingerprintData struct {\n\tHostedState *HostedState `protobuf:\"varint,5\"`\n\tVersion     uint32\n}\n",
        )]);

        let declared: Vec<(&str, &str)> = corpus.declared_constants().collect();
        assert_eq!(
            declared,
            vec![("waFingerprint", "HostedState_E2EE"), ("waFingerprint", "HostedState_HOSTED")]
        );
    }

    #[test]
    fn unreadable_definition_file_fails_the_scan() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "waAdv/WAAdv.pb.go", "type ADVKeyIndexList struct {\n");
        let broken = root.join("waBroken/WABroken.pb.go");
        fs::create_dir_all(broken.parent().unwrap()).unwrap();
        fs::write(&broken, [0xff, 0xfe]).unwrap();

        match ModuleCorpus::scan(root, "wa", ".pb.go") {
            Err(LegacyError::CorpusRead { path, .. }) => assert_eq!(path, broken),
            other => panic!("expected CorpusRead, got {:?}", other),
        }
    }
}
