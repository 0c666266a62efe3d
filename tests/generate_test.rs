use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

use proto_legacy::config::{Config, ImportPolicy};
use proto_legacy::error::LegacyError;
use proto_legacy::pipeline::Pipeline;
use proto_legacy::resolver::NameKind;

const HANDSHAKE_PB: &str = "\
package waWa6

type HandshakeMessage_ServerHello struct {
\tstate protoimpl.MessageState
}

type HandshakeMessage_ClientHello struct {
\tstate protoimpl.MessageState
}
";

const E2E_PB: &str = "\
package waE2E

type ContextInfo_ExternalAdReplyInfo_MediaType int32

const (
\tContextInfo_ExternalAdReplyInfo_NONE  ContextInfo_ExternalAdReplyInfo_MediaType = 0
\tContextInfo_ExternalAdReplyInfo_IMAGE ContextInfo_ExternalAdReplyInfo_MediaType = 1
)

type Message struct {
\tConversation *string
}

type ContextInfo_ExternalAdReplyInfo struct {
\tTitle *string
}
";

const ADV_PB: &str = "\
package waAdv

type ADVEncryptionType int32

const (
\tADVEncryptionType_E2EE    ADVEncryptionType = 0
\tADVEncryptionType_HOSTED  ADVEncryptionType = 1
)

type ADVKeyIndexList struct {
\tRawID *uint32
}
";

struct Fixture {
    _dir: TempDir,
    root: PathBuf,
}

impl Fixture {
    fn new(types: &str, enums: &str) -> Result<Self> {
        let dir = tempdir()?;
        let root = dir.path().to_path_buf();
        write(&root, "binary/proto/old-types.txt", types)?;
        write(&root, "binary/proto/old-enums.txt", enums)?;
        write(&root, "proto/waWa6/WAWebProtobufsWa6.pb.go", HANDSHAKE_PB)?;
        write(&root, "proto/waE2E/WAWebProtobufsE2E.pb.go", E2E_PB)?;
        write(&root, "proto/waE2E/extra.go", "package waE2E\n")?;
        write(&root, "proto/waAdv/WAAdv.pb.go", ADV_PB)?;
        write(&root, "proto/waEmpty/doc.go", "package waEmpty\n")?;
        write(&root, "proto/extra.go", "package proto\n")?;
        Ok(Self { _dir: dir, root })
    }

    fn config(&self) -> Config {
        Config {
            types_file: self.root.join("binary/proto/old-types.txt"),
            enums_file: self.root.join("binary/proto/old-enums.txt"),
            corpus_root: self.root.join("proto"),
            ..Config::default()
        }
    }
}

fn write(root: &Path, rel: &str, content: &str) -> Result<()> {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap())?;
    fs::write(path, content)?;
    Ok(())
}

fn generate(config: Config) -> Result<String, LegacyError> {
    let mut out = Vec::new();
    Pipeline::new(config).generate(&mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

#[test]
fn generates_shim_for_split_packages() -> Result<()> {
    let fixture = Fixture::new(
        "HandshakeServerHello\nMessage\nExternalAdReplyInfo\nADVKeyIndexList\n",
        "ADVEncryptionType_E2EE\nExternalAdReplyInfo_IMAGE\n",
    )?;

    let output = generate(fixture.config())?;

    let expected = "// DO NOT MODIFY: Generated by generatelegacy.sh

package proto

import (
\t\"github.com/snaril/whatsmeow/proto/waAdv\"
\t\"github.com/snaril/whatsmeow/proto/waE2E\"
\t\"github.com/snaril/whatsmeow/proto/waWa6\"
)

// Deprecated: use new packages directly
type (
\tHandshakeServerHello = waWa6.HandshakeMessage_ServerHello
\tMessage = waE2E.Message
\tExternalAdReplyInfo = waE2E.ContextInfo_ExternalAdReplyInfo
\tADVKeyIndexList = waAdv.ADVKeyIndexList
)

// Deprecated: use new packages directly
const (
\tADVEncryptionType_E2EE = waAdv.ADVEncryptionType_E2EE
\tExternalAdReplyInfo_IMAGE = waE2E.ContextInfo_ExternalAdReplyInfo_IMAGE
)
";
    assert_eq!(output, expected);
    Ok(())
}

#[test]
fn repeated_runs_are_byte_identical() -> Result<()> {
    let fixture = Fixture::new("Message\nADVKeyIndexList\n", "ADVEncryptionType_HOSTED\n")?;

    let first = generate(fixture.config())?;
    let second = generate(fixture.config())?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn reordering_input_reorders_output() -> Result<()> {
    let forward = Fixture::new("Message\nADVKeyIndexList\n", "")?;
    let backward = Fixture::new("ADVKeyIndexList\nMessage\n", "")?;

    let aliases = |s: &str| -> Vec<String> {
        s.lines()
            .filter(|l| l.contains(" = "))
            .map(str::to_string)
            .collect()
    };

    let mut forward_aliases = aliases(&generate(forward.config())?);
    let backward_aliases = aliases(&generate(backward.config())?);
    forward_aliases.reverse();
    assert_eq!(forward_aliases, backward_aliases);
    Ok(())
}

#[test]
fn all_modules_policy_lists_every_scanned_module() -> Result<()> {
    let fixture = Fixture::new("Message\n", "")?;
    let config = Config {
        import_policy: ImportPolicy::AllModules,
        ..fixture.config()
    };

    let output = generate(config)?;
    assert!(output.contains("proto/waAdv\""));
    assert!(output.contains("proto/waWa6\""));
    assert!(!output.contains("waEmpty"));
    Ok(())
}

#[test]
fn unresolved_name_aborts_without_output() -> Result<()> {
    let fixture = Fixture::new("Message\nNoSuchType\nADVKeyIndexList\n", "")?;

    let mut out = Vec::new();
    let err = Pipeline::new(fixture.config())
        .generate(&mut out)
        .expect_err("NoSuchType must not resolve");

    assert!(out.is_empty());
    assert_eq!(err.to_string(), "NoSuchType not found");
    Ok(())
}

#[test]
fn missing_name_list_is_reported() -> Result<()> {
    let fixture = Fixture::new("Message\n", "")?;
    fs::remove_file(fixture.root.join("binary/proto/old-enums.txt"))?;

    match generate(fixture.config()) {
        Err(LegacyError::MissingInput { path, .. }) => {
            assert!(path.ends_with("old-enums.txt"));
        }
        other => panic!("expected MissingInput, got {:?}", other),
    }
    Ok(())
}

#[test]
fn config_overrides_extend_builtin_table() -> Result<()> {
    let fixture = Fixture::new("ServerHelloLegacy\nHandshakeClientHello\n", "")?;
    let mut config = fixture.config();
    config
        .overrides
        .insert("ServerHelloLegacy".to_string(), "HandshakeMessage_ServerHello".to_string());

    let output = generate(config)?;
    assert!(output.contains("\tServerHelloLegacy = waWa6.HandshakeMessage_ServerHello\n"));
    assert!(output.contains("\tHandshakeClientHello = waWa6.HandshakeMessage_ClientHello\n"));
    Ok(())
}

#[test]
fn check_reports_every_unresolved_name() -> Result<()> {
    let fixture = Fixture::new("Message\nGhost\n", "ADVEncryptionType_E2EE\nPhantom\n")?;

    let report = Pipeline::new(fixture.config()).check()?;
    assert_eq!(report.resolved, 2);
    let names: Vec<String> = report
        .failures
        .iter()
        .filter_map(|f| match f {
            LegacyError::Unresolved { name, .. } => Some(name.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(names, vec!["Ghost", "Phantom"]);
    Ok(())
}

#[test]
fn resolve_one_reports_nested_declarations() -> Result<()> {
    let fixture = Fixture::new("", "")?;
    let pipeline = Pipeline::new(fixture.config());

    let resolution = pipeline.resolve_one("ExternalAdReplyInfo", NameKind::Type)?;
    assert_eq!(resolution.qualified(), "waE2E.ContextInfo_ExternalAdReplyInfo");
    assert!(resolution.nested);

    let hint = pipeline
        .resolve_one("ServerHello", NameKind::Type)
        .expect_err("ServerHello is only declared nested under HandshakeMessage");
    assert_eq!(
        hint.to_string(),
        "ServerHello not found (candidates: waWa6.HandshakeMessage_ServerHello)"
    );
    Ok(())
}
