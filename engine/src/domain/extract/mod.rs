//! Attribute extraction from opaque request/response objects.
//!
//! For a call in some request category, walk each mapped field path over the
//! request (or response), decode payload bodies when a mapping points at one,
//! and write every value that resolved to the caller's sink. A failure only
//! ever drops the attribute it belongs to.

pub mod candidates;
pub mod error;
pub mod payload;
pub mod registry;
pub mod serialize;
pub mod sink;
pub mod traversal;

use std::collections::HashMap;

use serde::Deserialize;

use crate::core::constants::{DEFAULT_GEN_AI_SYSTEM, DEFAULT_PAYLOAD_LIMIT_BYTES};
use crate::domain::reflect::{AccessorCache, FieldValue};

pub use candidates::{
    BodyAttribute, CandidatePathList, Derivation, ResolvedAttribute, ValueKind, resolve_body,
};
pub use error::{ExtractError, PayloadError};
pub use payload::{Number, ValueTree};
pub use registry::{Decode, FieldMapping, FieldPathRegistry, Operation, Phase, RequestCategory};
pub use sink::{AttributeSink, AttributeValue, RecordedAttributes, SpanSink};
pub use traversal::{FieldSource, ReflectSource, traverse, try_traverse};

/// Attribute keys written by the built-in tables.
pub mod keys {
    // Object storage, queues, streams
    pub const AWS_S3_BUCKET: &str = "aws.s3.bucket";
    pub const AWS_SQS_QUEUE_URL: &str = "aws.sqs.queue.url";
    pub const AWS_SQS_QUEUE_NAME: &str = "aws.sqs.queue.name";
    pub const AWS_KINESIS_STREAM_NAME: &str = "aws.kinesis.stream.name";

    // Key-value store
    pub const AWS_DYNAMODB_TABLE_NAMES: &str = "aws.dynamodb.table_names";
    pub const AWS_DYNAMODB_CONSUMED_CAPACITY: &str = "aws.dynamodb.consumed_capacity";
    pub const AWS_DYNAMODB_ITEM_COLLECTION_METRICS: &str = "aws.dynamodb.item_collection_metrics";
    pub const AWS_DYNAMODB_GLOBAL_SECONDARY_INDEXES: &str = "aws.dynamodb.global_secondary_indexes";
    pub const AWS_DYNAMODB_LOCAL_SECONDARY_INDEXES: &str = "aws.dynamodb.local_secondary_indexes";
    pub const AWS_DYNAMODB_PROVISIONED_READ_CAPACITY: &str =
        "aws.dynamodb.provisioned_read_capacity";
    pub const AWS_DYNAMODB_PROVISIONED_WRITE_CAPACITY: &str =
        "aws.dynamodb.provisioned_write_capacity";
    pub const AWS_DYNAMODB_CONSISTENT_READ: &str = "aws.dynamodb.consistent_read";
    pub const AWS_DYNAMODB_PROJECTION: &str = "aws.dynamodb.projection";
    pub const AWS_DYNAMODB_ATTRIBUTES_TO_GET: &str = "aws.dynamodb.attributes_to_get";
    pub const AWS_DYNAMODB_INDEX_NAME: &str = "aws.dynamodb.index_name";
    pub const AWS_DYNAMODB_LIMIT: &str = "aws.dynamodb.limit";
    pub const AWS_DYNAMODB_SCAN_FORWARD: &str = "aws.dynamodb.scan_forward";
    pub const AWS_DYNAMODB_SELECT: &str = "aws.dynamodb.select";
    pub const AWS_DYNAMODB_SEGMENT: &str = "aws.dynamodb.segment";
    pub const AWS_DYNAMODB_TOTAL_SEGMENTS: &str = "aws.dynamodb.total_segments";
    pub const AWS_DYNAMODB_COUNT: &str = "aws.dynamodb.count";
    pub const AWS_DYNAMODB_SCANNED_COUNT: &str = "aws.dynamodb.scanned_count";
    pub const AWS_DYNAMODB_EXCLUSIVE_START_TABLE: &str = "aws.dynamodb.exclusive_start_table";

    // Notifications
    pub const MESSAGING_DESTINATION_NAME: &str = "messaging.destination.name";
    pub const AWS_SNS_TOPIC_ARN: &str = "aws.sns.topic.arn";

    // Bedrock resources
    pub const AWS_BEDROCK_GUARDRAIL_ID: &str = "aws.bedrock.guardrail.id";
    pub const AWS_BEDROCK_GUARDRAIL_ARN: &str = "aws.bedrock.guardrail.arn";
    pub const AWS_BEDROCK_AGENT_ID: &str = "aws.bedrock.agent.id";
    pub const AWS_BEDROCK_KNOWLEDGE_BASE_ID: &str = "aws.bedrock.knowledge_base.id";
    pub const AWS_BEDROCK_DATA_SOURCE_ID: &str = "aws.bedrock.data_source.id";

    // GenAI
    pub const GEN_AI_SYSTEM: &str = "gen_ai.system";
    pub const GEN_AI_REQUEST_MODEL: &str = "gen_ai.request.model";
    pub const GEN_AI_REQUEST_MAX_TOKENS: &str = "gen_ai.request.max_tokens";
    pub const GEN_AI_REQUEST_TEMPERATURE: &str = "gen_ai.request.temperature";
    pub const GEN_AI_REQUEST_TOP_P: &str = "gen_ai.request.top_p";
    pub const GEN_AI_RESPONSE_FINISH_REASONS: &str = "gen_ai.response.finish_reasons";
    pub const GEN_AI_USAGE_INPUT_TOKENS: &str = "gen_ai.usage.input_tokens";
    pub const GEN_AI_USAGE_OUTPUT_TOKENS: &str = "gen_ai.usage.output_tokens";

    // Workflows, secrets, functions
    pub const AWS_STEP_FUNCTIONS_STATE_MACHINE_ARN: &str = "aws.step_functions.state_machine.arn";
    pub const AWS_STEP_FUNCTIONS_ACTIVITY_ARN: &str = "aws.step_functions.activity.arn";
    pub const AWS_SECRETSMANAGER_SECRET_ARN: &str = "aws.secretsmanager.secret.arn";
    pub const AWS_LAMBDA_FUNCTION_NAME: &str = "aws.lambda.function.name";
    pub const AWS_LAMBDA_FUNCTION_ARN: &str = "aws.lambda.function.arn";
    pub const AWS_LAMBDA_RESOURCE_MAPPING_ID: &str = "aws.lambda.resource_mapping.id";

    // Failures
    pub const ERROR_TYPE: &str = "error.type";
}

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Decode payload bodies into gen_ai attributes.
    pub gen_ai: bool,
    /// Payloads larger than this are skipped unparsed.
    pub payload_limit_bytes: usize,
    /// Written as `gen_ai.system` when a payload attribute was emitted. Blank disables it.
    pub gen_ai_system: Option<String>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            gen_ai: true,
            payload_limit_bytes: DEFAULT_PAYLOAD_LIMIT_BYTES,
            gen_ai_system: Some(DEFAULT_GEN_AI_SYSTEM.to_string()),
        }
    }
}

// ============================================================================
// EXTRACTOR
// ============================================================================

pub struct AttributeExtractor<'r> {
    registry: &'r FieldPathRegistry,
    cache: &'r AccessorCache,
    config: ExtractConfig,
}

impl AttributeExtractor<'static> {
    /// Extractor over the built-in tables and the process-wide accessor cache.
    pub fn new(config: ExtractConfig) -> Self {
        Self::with_parts(FieldPathRegistry::global(), AccessorCache::global(), config)
    }
}

impl<'r> AttributeExtractor<'r> {
    pub fn with_parts(
        registry: &'r FieldPathRegistry,
        cache: &'r AccessorCache,
        config: ExtractConfig,
    ) -> Self {
        Self {
            registry,
            cache,
            config,
        }
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    pub fn registry(&self) -> &'r FieldPathRegistry {
        self.registry
    }

    /// Request-phase attributes. Returns the number written.
    pub fn on_request<S, K>(&self, operation: &Operation<'_>, request: &S, sink: &mut K) -> usize
    where
        S: FieldSource + ?Sized,
        K: AttributeSink + ?Sized,
    {
        self.extract(operation, Phase::Request, request, sink)
    }

    /// Response-phase attributes. Returns the number written.
    pub fn on_response<S, K>(&self, operation: &Operation<'_>, response: &S, sink: &mut K) -> usize
    where
        S: FieldSource + ?Sized,
        K: AttributeSink + ?Sized,
    {
        self.extract(operation, Phase::Response, response, sink)
    }

    /// The call failed: record the error type instead of response attributes.
    pub fn on_failure<K>(&self, operation: &Operation<'_>, error_type: &str, sink: &mut K) -> usize
    where
        K: AttributeSink + ?Sized,
    {
        if error_type.is_empty() {
            return 0;
        }
        tracing::trace!(
            operation = operation.name,
            category = operation.category,
            error_type,
            "Recording call failure"
        );
        sink.put_str(keys::ERROR_TYPE, error_type.to_string());
        1
    }

    /// Operation mappings first, then the category's, for one phase.
    pub fn extract<S, K>(
        &self,
        operation: &Operation<'_>,
        phase: Phase,
        source: &S,
        sink: &mut K,
    ) -> usize
    where
        S: FieldSource + ?Sized,
        K: AttributeSink + ?Sized,
    {
        let mappings = operation
            .mappings(phase)
            .chain(self.registry.mappings(operation.category, phase));

        // A payload reached by several mappings is parsed once.
        let mut payloads: HashMap<&[&str], Option<ValueTree>> = HashMap::new();
        let mut written = 0;
        let mut from_payload = false;

        for mapping in mappings {
            match mapping.decode {
                Decode::Body(attr) => {
                    if !self.config.gen_ai {
                        continue;
                    }
                    let tree = payloads
                        .entry(mapping.path)
                        .or_insert_with(|| self.load_payload(source, mapping.path));
                    let Some(tree) = tree else {
                        continue;
                    };
                    match resolve_body(attr, tree) {
                        Some(resolved) => {
                            tracing::trace!(
                                attribute = resolved.key,
                                derivation = ?resolved.derivation,
                                "Payload attribute resolved"
                            );
                            sink.put(resolved.key, resolved.value);
                            written += 1;
                            from_payload = true;
                        }
                        None => {
                            tracing::trace!(attribute = attr.key, "No candidate path matched");
                        }
                    }
                }
                Decode::Text | Decode::Count => match self.resolve_field(source, mapping) {
                    Ok(value) => {
                        sink.put(mapping.key, value);
                        written += 1;
                    }
                    Err(error) => {
                        tracing::trace!(attribute = mapping.key, %error, "Attribute skipped");
                    }
                },
            }
        }

        if from_payload && let Some(system) = self.gen_ai_system() {
            sink.put_str(keys::GEN_AI_SYSTEM, system.to_string());
            written += 1;
        }

        tracing::trace!(
            operation = operation.name,
            category = operation.category,
            %phase,
            written,
            "Extraction finished"
        );
        written
    }

    /// Configured system name; blank counts as unset.
    fn gen_ai_system(&self) -> Option<&str> {
        self.config
            .gen_ai_system
            .as_deref()
            .filter(|system| !system.trim().is_empty())
    }

    fn resolve_field<S>(&self, source: &S, mapping: &FieldMapping) -> Result<AttributeValue, ExtractError>
    where
        S: FieldSource + ?Sized,
    {
        let value = try_traverse(self.cache, source, mapping.path)?;
        let last = mapping.path.last().copied().unwrap_or_default();
        let text = serialize::serialize(&value).ok_or_else(|| ExtractError::miss(last, "empty value"))?;
        match mapping.decode {
            Decode::Count => serialize::parse_count(&text)
                .map(AttributeValue::Int)
                .ok_or(ExtractError::TypeMismatch {
                    expected: "integer",
                    found: value.kind(),
                }),
            _ => Ok(AttributeValue::Str(text)),
        }
    }

    fn load_payload<S>(&self, source: &S, path: &[&str]) -> Option<ValueTree>
    where
        S: FieldSource + ?Sized,
    {
        match self.try_load_payload(source, path) {
            Ok(tree) => Some(tree),
            Err(error @ (ExtractError::MalformedPayload(_) | ExtractError::PayloadTooLarge { .. })) => {
                tracing::debug!(path = ?path, %error, "Payload skipped");
                None
            }
            Err(error) => {
                tracing::trace!(path = ?path, %error, "Payload unavailable");
                None
            }
        }
    }

    fn try_load_payload<S>(&self, source: &S, path: &[&str]) -> Result<ValueTree, ExtractError>
    where
        S: FieldSource + ?Sized,
    {
        let value = try_traverse(self.cache, source, path)?;
        let bytes: &[u8] = match &value {
            FieldValue::Bytes(bytes) => *bytes,
            FieldValue::Str(text) => text.as_bytes(),
            other => {
                return Err(ExtractError::TypeMismatch {
                    expected: "payload",
                    found: other.kind(),
                });
            }
        };
        let limit = self.config.payload_limit_bytes;
        if bytes.len() > limit {
            return Err(ExtractError::PayloadTooLarge {
                size: bytes.len(),
                limit,
            });
        }
        Ok(payload::parse(bytes)?)
    }
}

#[cfg(test)]
#[path = "extractor_tests.rs"]
mod tests;
