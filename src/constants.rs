/// Fixed locations and naming conventions of the split proto tree.
/// Every value here can be overridden from the config file.

// Input lists, relative to the working directory
pub const DEFAULT_TYPES_FILE: &str = "old-types.txt";
pub const DEFAULT_ENUMS_FILE: &str = "old-enums.txt";

// Corpus layout
pub const DEFAULT_CORPUS_ROOT: &str = "../../proto";
pub const MODULE_PREFIX: &str = "wa";
pub const SOURCE_SUFFIX: &str = ".pb.go";

// Generated file
pub const IMPORT_BASE: &str = "github.com/snaril/whatsmeow/proto";
pub const PACKAGE_NAME: &str = "proto";
pub const GENERATED_BY: &str = "generatelegacy.sh";
pub const DEPRECATION_NOTICE: &str = "// Deprecated: use new packages directly";

/// Message that nested declarations are hoisted out of by protoc-gen-go.
pub const CONTAINER_NAME: &str = "ContextInfo";

pub const DEFAULT_CONFIG_FILE: &str = "proto-legacy.toml";

/// Legacy names whose declared identifier changed in the split, not just its package.
pub const RENAMED_DECLARATIONS: &[(&str, &str)] = &[
    ("HandshakeServerHello", "HandshakeMessage_ServerHello"),
    ("HandshakeClientHello", "HandshakeMessage_ClientHello"),
    ("HandshakeClientFinish", "HandshakeMessage_ClientFinish"),
    (
        "InteractiveMessage_Header_JpegThumbnail",
        "InteractiveMessage_Header_JPEGThumbnail",
    ),
];

/// Build the import path of a module in the split tree
pub fn import_path(base: &str, module: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), module)
}
