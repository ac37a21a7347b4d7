use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::constants::{ENV_CONFIG, ENV_GEN_AI, ENV_GEN_AI_SYSTEM, ENV_PAYLOAD_LIMIT};

#[derive(Parser)]
#[command(name = "fieldscope")]
#[command(
    version,
    about = "Telemetry attribute extraction for opaque API calls",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Decode payload bodies into gen_ai attributes
    #[arg(long, global = true, env = ENV_GEN_AI)]
    pub gen_ai: Option<bool>,

    /// Skip payloads larger than this (bytes, or with a k/m suffix)
    #[arg(long, global = true, env = ENV_PAYLOAD_LIMIT, value_parser = parse_byte_size)]
    pub payload_limit: Option<usize>,

    /// Value written as gen_ai.system (empty to disable)
    #[arg(long, global = true, env = ENV_GEN_AI_SYSTEM)]
    pub gen_ai_system: Option<String>,
}

/// Parse a byte size such as `4096`, `512k` or `2m`
fn parse_byte_size(s: &str) -> Result<usize, String> {
    let trimmed = s.trim().to_lowercase();
    let (digits, multiplier) = if let Some(n) = trimmed.strip_suffix('k') {
        (n, 1024)
    } else if let Some(n) = trimmed.strip_suffix('m') {
        (n, 1024 * 1024)
    } else {
        (trimmed.as_str(), 1)
    };
    digits
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_mul(multiplier))
        .ok_or_else(|| {
            format!(
                "Invalid size '{}'. Use a byte count, optionally suffixed with k or m",
                s
            )
        })
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// List request categories and their attribute mappings
    Categories,
    /// Resolve one payload attribute from a JSON body file
    Resolve {
        /// Attribute key, e.g. gen_ai.usage.input_tokens
        #[arg(long, short)]
        attribute: String,
        /// Payload file
        file: PathBuf,
    },
    /// Run model-invocation extraction over request/response body files
    Invoke {
        /// Model identifier recorded as gen_ai.request.model
        #[arg(long)]
        model_id: String,
        /// Request body file
        #[arg(long)]
        request: Option<PathBuf>,
        /// Response body file
        #[arg(long)]
        response: Option<PathBuf>,
    },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub config: Option<PathBuf>,
    pub gen_ai: Option<bool>,
    pub payload_limit: Option<usize>,
    pub gen_ai_system: Option<String>,
}

pub fn parse() -> (CliConfig, Commands) {
    let cli = Cli::parse();
    let config = CliConfig {
        config: cli.config,
        gen_ai: cli.gen_ai,
        payload_limit: cli.payload_limit,
        gen_ai_system: cli.gen_ai_system,
    };
    (config, cli.command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_byte_size() {
        assert_eq!(parse_byte_size("4096"), Ok(4096));
        assert_eq!(parse_byte_size("512k"), Ok(512 * 1024));
        assert_eq!(parse_byte_size("2M"), Ok(2 * 1024 * 1024));
        assert_eq!(parse_byte_size(" 1 m "), Ok(1024 * 1024));
        assert!(parse_byte_size("lots").is_err());
        assert!(parse_byte_size("-1").is_err());
    }

    #[test]
    fn test_cli_parses_invoke() {
        let cli = Cli::try_parse_from([
            "fieldscope",
            "--payload-limit",
            "64k",
            "invoke",
            "--model-id",
            "meta.llama3-8b-instruct-v1:0",
            "--request",
            "req.json",
        ])
        .unwrap();

        assert_eq!(cli.payload_limit, Some(64 * 1024));
        match cli.command {
            Commands::Invoke {
                model_id,
                request,
                response,
            } => {
                assert_eq!(model_id, "meta.llama3-8b-instruct-v1:0");
                assert_eq!(request, Some(PathBuf::from("req.json")));
                assert!(response.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_global_flag_after_subcommand() {
        let cli = Cli::try_parse_from([
            "fieldscope",
            "resolve",
            "-a",
            "gen_ai.request.top_p",
            "body.json",
            "--gen-ai",
            "false",
        ])
        .unwrap();
        assert_eq!(cli.gen_ai, Some(false));
        assert!(matches!(cli.command, Commands::Resolve { .. }));
    }
}
