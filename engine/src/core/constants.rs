// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "FieldScope";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "fieldscope";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".fieldscope";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "fieldscope.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "FIELDSCOPE_CONFIG";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "FIELDSCOPE_LOG";

// =============================================================================
// Environment Variables - Extraction
// =============================================================================

/// Environment variable to enable or disable payload-derived (gen_ai) attributes
pub const ENV_GEN_AI: &str = "FIELDSCOPE_GEN_AI";

/// Environment variable for the payload size limit in bytes
pub const ENV_PAYLOAD_LIMIT: &str = "FIELDSCOPE_PAYLOAD_LIMIT";

/// Environment variable for the `gen_ai.system` value (empty disables it)
pub const ENV_GEN_AI_SYSTEM: &str = "FIELDSCOPE_GEN_AI_SYSTEM";

// =============================================================================
// Extraction Defaults
// =============================================================================

/// Payloads larger than this are skipped without parsing (1 MiB)
pub const DEFAULT_PAYLOAD_LIMIT_BYTES: usize = 1024 * 1024;

/// Value written as `gen_ai.system` when payload attributes were emitted
pub const DEFAULT_GEN_AI_SYSTEM: &str = "aws.bedrock";

/// Maximum nesting followed when rendering reflected objects as JSON
pub const MAX_RENDER_DEPTH: usize = 16;

/// Characters per token used when a count is approximated from text
pub const CHARS_PER_TOKEN: f64 = 6.0;
