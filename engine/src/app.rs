//! Core application

use std::path::Path;

use anyhow::{Context, Result};

use crate::core::cli::{self, Commands};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME, APP_NAME_LOWER, ENV_LOG};
use crate::domain::adapters::{ModelInvocation, ModelInvocationCall};
use crate::domain::extract::registry::body_attribute;
use crate::domain::extract::{
    AttributeExtractor, Derivation, FieldPathRegistry, Operation, Phase, RecordedAttributes,
    payload, resolve_body,
};
use crate::utils::file::{expand_path, read_payload};

pub struct CoreApp {
    pub config: AppConfig,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        let app = Self {
            config: AppConfig::load(&cli_config)?,
        };

        match command {
            Commands::Categories => {
                app.print_categories();
                Ok(())
            }
            Commands::Resolve { attribute, file } => app.resolve(&attribute, &file),
            Commands::Invoke {
                model_id,
                request,
                response,
            } => app.invoke(model_id, request.as_deref(), response.as_deref()),
        }
    }

    fn init_logging() {
        let default_filter = format!("warn,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .with_writer(std::io::stderr)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    fn print_categories(&self) {
        println!("{} request categories:", APP_NAME);
        for category in FieldPathRegistry::global().categories() {
            println!();
            println!("  {}", category.name);
            for phase in [Phase::Request, Phase::Response] {
                for mapping in category.mappings(phase) {
                    println!(
                        "    {:<9} {:<45} {}",
                        phase,
                        mapping.key,
                        mapping.path_display()
                    );
                }
            }
        }
    }

    fn resolve(&self, attribute: &str, file: &Path) -> Result<()> {
        let attr = body_attribute(attribute)
            .with_context(|| format!("No payload attribute named '{}'", attribute))?;

        let path = expand_path(&file.to_string_lossy());
        let bytes = read_payload(&path, self.config.extract.payload_limit_bytes)?;
        let tree = payload::parse(&bytes)
            .with_context(|| format!("Failed to parse payload: {}", path.display()))?;

        match resolve_body(attr, &tree) {
            Some(resolved) => {
                let note = match resolved.derivation {
                    Derivation::Direct => "",
                    Derivation::Approximated => " (approximated)",
                };
                println!("{} = {}{}", resolved.key, resolved.value, note);
            }
            None => println!("{} not found", attr.key),
        }
        Ok(())
    }

    fn invoke(
        &self,
        model_id: String,
        request: Option<&Path>,
        response: Option<&Path>,
    ) -> Result<()> {
        let operation = Operation::lookup("InvokeModel")
            .context("InvokeModel operation is not registered")?;
        let extractor = AttributeExtractor::new(self.config.extract.clone());
        let mut attributes = RecordedAttributes::new();

        let limit = self.config.extract.payload_limit_bytes;
        let request_call = LocalInvocation::load(&model_id, request, limit)?;
        let response_call = LocalInvocation::load(&model_id, response, limit)?;

        let written = extractor.on_request(operation, &ModelInvocation(&request_call), &mut attributes)
            + extractor.on_response(operation, &ModelInvocation(&response_call), &mut attributes);
        tracing::debug!(written, "Invocation attributes extracted");

        for (key, value) in attributes.iter() {
            println!("{} = {}", key, value);
        }
        Ok(())
    }
}

/// A model invocation read back from payload files on disk.
struct LocalInvocation {
    model_id: String,
    body: Option<Vec<u8>>,
}

impl LocalInvocation {
    fn load(model_id: &str, body: Option<&Path>, limit: usize) -> Result<Self> {
        let body = body
            .map(|p| read_payload(&expand_path(&p.to_string_lossy()), limit))
            .transpose()?;
        Ok(Self {
            model_id: model_id.to_string(),
            body,
        })
    }
}

impl ModelInvocationCall for LocalInvocation {
    fn model_id(&self) -> Option<&str> {
        Some(&self.model_id)
    }

    fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::domain::extract::keys;

    fn payload_file(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_local_invocation_without_body() {
        let call = LocalInvocation::load("m", None, 1024).unwrap();
        assert_eq!(call.model_id(), Some("m"));
        assert_eq!(call.body(), None);
    }

    #[test]
    fn test_local_invocation_extracts_request_and_response() {
        let request = payload_file(r#"{"max_tokens": 256, "temperature": 0.5}"#);
        let response = payload_file(r#"{"usage": {"input_tokens": 12, "output_tokens": 40}}"#);
        let limit = 1024;

        let request_call =
            LocalInvocation::load("anthropic.claude-v2", Some(request.path()), limit).unwrap();
        let response_call =
            LocalInvocation::load("anthropic.claude-v2", Some(response.path()), limit).unwrap();

        let operation = Operation::lookup("InvokeModel").unwrap();
        let extractor = AttributeExtractor::new(Default::default());
        let mut attributes = RecordedAttributes::new();
        extractor.on_request(operation, &ModelInvocation(&request_call), &mut attributes);
        extractor.on_response(operation, &ModelInvocation(&response_call), &mut attributes);

        assert_eq!(
            attributes.get_str(keys::GEN_AI_REQUEST_MODEL),
            Some("anthropic.claude-v2")
        );
        assert_eq!(attributes.get_i64(keys::GEN_AI_REQUEST_MAX_TOKENS), Some(256));
        assert_eq!(attributes.get_f64(keys::GEN_AI_REQUEST_TEMPERATURE), Some(0.5));
        assert_eq!(attributes.get_i64(keys::GEN_AI_USAGE_INPUT_TOKENS), Some(12));
        assert_eq!(attributes.get_i64(keys::GEN_AI_USAGE_OUTPUT_TOKENS), Some(40));
    }

    #[test]
    fn test_local_invocation_over_limit_fails() {
        let request = payload_file(&format!(r#"{{"prompt": "{}"}}"#, "x".repeat(64)));
        assert!(LocalInvocation::load("m", Some(request.path()), 16).is_err());
    }
}
