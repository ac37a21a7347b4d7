//! Static field path tables.
//!
//! Every request category owns two ordered mapping lists, one per phase.
//! Operations carry extra mappings for one API call; they are evaluated before
//! the category's generic mappings. The tables are compiled in and never
//! mutated; an unknown category simply has no mappings.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::OnceLock;

use super::candidates::{BodyAttribute, ValueKind};
use super::keys;

// ============================================================================
// MAPPING TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Request,
    Response,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Phase::Request => "request",
            Phase::Response => "response",
        })
    }
}

/// How the terminal value of a mapping's path becomes an attribute.
#[derive(Debug, Clone, Copy)]
pub enum Decode {
    /// Serialized text.
    Text,
    /// Serialized text parsed as an integer.
    Count,
    /// The terminal holds a payload; the attribute is read from inside it.
    Body(&'static BodyAttribute),
}

/// Binding of an attribute key to a field path in one phase.
#[derive(Debug, Clone, Copy)]
pub struct FieldMapping {
    pub key: &'static str,
    pub path: &'static [&'static str],
    pub phase: Phase,
    pub decode: Decode,
}

impl FieldMapping {
    pub const fn new(
        key: &'static str,
        path: &'static [&'static str],
        phase: Phase,
        decode: Decode,
    ) -> Self {
        assert!(!path.is_empty(), "field path must not be empty");
        Self {
            key,
            path,
            phase,
            decode,
        }
    }

    pub const fn request(key: &'static str, path: &'static [&'static str]) -> Self {
        Self::new(key, path, Phase::Request, Decode::Text)
    }

    pub const fn response(key: &'static str, path: &'static [&'static str]) -> Self {
        Self::new(key, path, Phase::Response, Decode::Text)
    }

    pub const fn request_count(key: &'static str, path: &'static [&'static str]) -> Self {
        Self::new(key, path, Phase::Request, Decode::Count)
    }

    pub const fn response_count(key: &'static str, path: &'static [&'static str]) -> Self {
        Self::new(key, path, Phase::Response, Decode::Count)
    }

    pub const fn request_body(attr: &'static BodyAttribute, path: &'static [&'static str]) -> Self {
        Self::new(attr.key, path, Phase::Request, Decode::Body(attr))
    }

    pub const fn response_body(
        attr: &'static BodyAttribute,
        path: &'static [&'static str],
    ) -> Self {
        Self::new(attr.key, path, Phase::Response, Decode::Body(attr))
    }

    pub fn is_payload(&self) -> bool {
        matches!(self.decode, Decode::Body(_))
    }

    /// Dotted form of the path, for display.
    pub fn path_display(&self) -> String {
        self.path.join(".")
    }
}

/// A family of API calls sharing one set of mappings.
#[derive(Debug)]
pub struct RequestCategory {
    pub name: &'static str,
    pub request: &'static [FieldMapping],
    pub response: &'static [FieldMapping],
}

impl RequestCategory {
    pub fn mappings(&self, phase: Phase) -> &'static [FieldMapping] {
        match phase {
            Phase::Request => self.request,
            Phase::Response => self.response,
        }
    }
}

/// One API call with mappings specific to it.
#[derive(Debug, Clone, Copy)]
pub struct Operation<'a> {
    pub name: &'a str,
    pub category: &'a str,
    pub fields: &'a [FieldMapping],
}

impl<'a> Operation<'a> {
    pub const fn new(name: &'a str, category: &'a str, fields: &'a [FieldMapping]) -> Self {
        Self {
            name,
            category,
            fields,
        }
    }

    /// An operation with no overrides of its own.
    pub const fn generic(category: &'a str) -> Self {
        Self::new("", category, &[])
    }

    pub fn mappings(&self, phase: Phase) -> impl Iterator<Item = &'a FieldMapping> {
        self.fields.iter().filter(move |m| m.phase == phase)
    }

    /// Built-in operation by name.
    pub fn lookup(name: &str) -> Option<&'static Operation<'static>> {
        OPERATIONS.iter().find(|op| op.name == name)
    }
}

// ============================================================================
// CATEGORY NAMES
// ============================================================================

pub mod categories {
    pub const OBJECT_STORAGE: &str = "object-storage";
    pub const QUEUEING: &str = "queueing";
    pub const STREAM: &str = "stream";
    pub const KEY_VALUE_STORE: &str = "key-value-store";
    pub const NOTIFICATION: &str = "notification";
    pub const GUARDRAIL: &str = "guardrail";
    pub const AGENT: &str = "agent";
    pub const AGENT_RUNTIME: &str = "agent-runtime";
    pub const DATA_SOURCE: &str = "data-source";
    pub const KNOWLEDGE_BASE: &str = "knowledge-base";
    pub const MODEL_INVOCATION: &str = "model-invocation";
    pub const STATE_MACHINE: &str = "state-machine";
    pub const SECRET_STORE: &str = "secret-store";
    pub const FUNCTION: &str = "function";
}

// ============================================================================
// MODEL INVOCATION PAYLOAD CANDIDATES
// ============================================================================
//
// Order matters: the first path present in a payload wins even when a later
// entry belongs to the provider that actually produced it.

pub const MAX_TOKENS: BodyAttribute = BodyAttribute::new(
    keys::GEN_AI_REQUEST_MAX_TOKENS,
    ValueKind::Count,
    &[
        "/max_tokens",
        "/max_gen_len",
        "/textGenerationConfig/maxTokenCount",
        "/inferenceConfig/max_new_tokens",
    ],
);

pub const TEMPERATURE: BodyAttribute = BodyAttribute::new(
    keys::GEN_AI_REQUEST_TEMPERATURE,
    ValueKind::Probability,
    &[
        "/temperature",
        "/textGenerationConfig/temperature",
        "/inferenceConfig/temperature",
    ],
);

pub const TOP_P: BodyAttribute = BodyAttribute::new(
    keys::GEN_AI_REQUEST_TOP_P,
    ValueKind::Probability,
    &[
        "/top_p",
        "/p",
        "/textGenerationConfig/topP",
        "/inferenceConfig/top_p",
    ],
);

pub const FINISH_REASONS: BodyAttribute = BodyAttribute::new(
    keys::GEN_AI_RESPONSE_FINISH_REASONS,
    ValueKind::Sequence,
    &[
        "/stopReason",
        "/finish_reason",
        "/stop_reason",
        "/results/0/completionReason",
        "/generations/0/finish_reason",
        "/choices/0/finish_reason",
        "/outputs/0/stop_reason",
    ],
);

pub const INPUT_TOKENS: BodyAttribute = BodyAttribute::new(
    keys::GEN_AI_USAGE_INPUT_TOKENS,
    ValueKind::Count,
    &[
        "/inputTextTokenCount",
        "/prompt_token_count",
        "/usage/input_tokens",
        "/usage/prompt_tokens",
        "/usage/inputTokens",
    ],
)
.with_text_fallback(&["/prompt", "/message"]);

pub const OUTPUT_TOKENS: BodyAttribute = BodyAttribute::new(
    keys::GEN_AI_USAGE_OUTPUT_TOKENS,
    ValueKind::Count,
    &[
        "/generation_token_count",
        "/results/0/tokenCount",
        "/usage/output_tokens",
        "/usage/completion_tokens",
        "/usage/outputTokens",
    ],
)
.with_text_fallback(&["/text", "/outputs/0/text"]);

/// Every payload-derived attribute, for lookup by key.
pub static BODY_ATTRIBUTES: &[&BodyAttribute] = &[
    &MAX_TOKENS,
    &TEMPERATURE,
    &TOP_P,
    &FINISH_REASONS,
    &INPUT_TOKENS,
    &OUTPUT_TOKENS,
];

pub fn body_attribute(key: &str) -> Option<&'static BodyAttribute> {
    BODY_ATTRIBUTES.iter().copied().find(|attr| attr.key == key)
}

// ============================================================================
// CATEGORY TABLE
// ============================================================================

const BODY: &[&str] = &["body"];

pub static CATEGORIES: &[RequestCategory] = &[
    RequestCategory {
        name: categories::OBJECT_STORAGE,
        request: &[FieldMapping::request(keys::AWS_S3_BUCKET, &["Bucket"])],
        response: &[],
    },
    RequestCategory {
        name: categories::QUEUEING,
        request: &[
            FieldMapping::request(keys::AWS_SQS_QUEUE_URL, &["QueueUrl"]),
            FieldMapping::request(keys::AWS_SQS_QUEUE_NAME, &["QueueName"]),
        ],
        response: &[],
    },
    RequestCategory {
        name: categories::STREAM,
        request: &[FieldMapping::request(
            keys::AWS_KINESIS_STREAM_NAME,
            &["StreamName"],
        )],
        response: &[],
    },
    RequestCategory {
        name: categories::KEY_VALUE_STORE,
        request: &[FieldMapping::request(
            keys::AWS_DYNAMODB_TABLE_NAMES,
            &["TableName"],
        )],
        response: &[],
    },
    RequestCategory {
        name: categories::NOTIFICATION,
        request: &[
            FieldMapping::request(keys::MESSAGING_DESTINATION_NAME, &["TargetArn"]),
            FieldMapping::request(keys::MESSAGING_DESTINATION_NAME, &["TopicArn"]),
            FieldMapping::request(keys::AWS_SNS_TOPIC_ARN, &["TopicArn"]),
        ],
        response: &[],
    },
    RequestCategory {
        name: categories::GUARDRAIL,
        request: &[FieldMapping::request(
            keys::AWS_BEDROCK_GUARDRAIL_ID,
            &["guardrailIdentifier"],
        )],
        response: &[FieldMapping::response(
            keys::AWS_BEDROCK_GUARDRAIL_ARN,
            &["guardrailArn"],
        )],
    },
    RequestCategory {
        name: categories::AGENT,
        request: &[FieldMapping::request(keys::AWS_BEDROCK_AGENT_ID, &["agentId"])],
        response: &[FieldMapping::response(keys::AWS_BEDROCK_AGENT_ID, &["agentId"])],
    },
    RequestCategory {
        name: categories::AGENT_RUNTIME,
        request: &[
            FieldMapping::request(keys::AWS_BEDROCK_AGENT_ID, &["agentId"]),
            FieldMapping::request(keys::AWS_BEDROCK_KNOWLEDGE_BASE_ID, &["knowledgeBaseId"]),
        ],
        response: &[
            FieldMapping::response(keys::AWS_BEDROCK_AGENT_ID, &["agentId"]),
            FieldMapping::response(keys::AWS_BEDROCK_KNOWLEDGE_BASE_ID, &["knowledgeBaseId"]),
        ],
    },
    RequestCategory {
        name: categories::DATA_SOURCE,
        request: &[FieldMapping::request(
            keys::AWS_BEDROCK_DATA_SOURCE_ID,
            &["dataSourceId"],
        )],
        response: &[FieldMapping::response(
            keys::AWS_BEDROCK_DATA_SOURCE_ID,
            &["dataSourceId"],
        )],
    },
    RequestCategory {
        name: categories::KNOWLEDGE_BASE,
        request: &[FieldMapping::request(
            keys::AWS_BEDROCK_KNOWLEDGE_BASE_ID,
            &["knowledgeBaseId"],
        )],
        response: &[FieldMapping::response(
            keys::AWS_BEDROCK_KNOWLEDGE_BASE_ID,
            &["knowledgeBaseId"],
        )],
    },
    RequestCategory {
        name: categories::MODEL_INVOCATION,
        request: &[
            FieldMapping::request(keys::GEN_AI_REQUEST_MODEL, &["modelId"]),
            FieldMapping::request_body(&MAX_TOKENS, BODY),
            FieldMapping::request_body(&TEMPERATURE, BODY),
            FieldMapping::request_body(&TOP_P, BODY),
            FieldMapping::request_body(&INPUT_TOKENS, BODY),
        ],
        response: &[
            FieldMapping::response_body(&FINISH_REASONS, BODY),
            FieldMapping::response_body(&INPUT_TOKENS, BODY),
            FieldMapping::response_body(&OUTPUT_TOKENS, BODY),
        ],
    },
    RequestCategory {
        name: categories::STATE_MACHINE,
        request: &[
            FieldMapping::request(
                keys::AWS_STEP_FUNCTIONS_STATE_MACHINE_ARN,
                &["stateMachineArn"],
            ),
            FieldMapping::request(keys::AWS_STEP_FUNCTIONS_ACTIVITY_ARN, &["activityArn"]),
        ],
        response: &[],
    },
    RequestCategory {
        name: categories::SECRET_STORE,
        request: &[],
        response: &[FieldMapping::response(
            keys::AWS_SECRETSMANAGER_SECRET_ARN,
            &["ARN"],
        )],
    },
    RequestCategory {
        name: categories::FUNCTION,
        request: &[
            FieldMapping::request(keys::AWS_LAMBDA_FUNCTION_NAME, &["FunctionName"]),
            FieldMapping::request(keys::AWS_LAMBDA_RESOURCE_MAPPING_ID, &["UUID"]),
        ],
        response: &[FieldMapping::response(
            keys::AWS_LAMBDA_FUNCTION_ARN,
            &["Configuration", "FunctionArn"],
        )],
    },
];

// ============================================================================
// OPERATION OVERRIDES
// ============================================================================

const REQUEST_ITEMS: FieldMapping =
    FieldMapping::request(keys::AWS_DYNAMODB_TABLE_NAMES, &["RequestItems"]);
const CONSUMED_CAPACITY: FieldMapping =
    FieldMapping::response(keys::AWS_DYNAMODB_CONSUMED_CAPACITY, &["ConsumedCapacity"]);
const CONSISTENT_READ: FieldMapping =
    FieldMapping::request(keys::AWS_DYNAMODB_CONSISTENT_READ, &["ConsistentRead"]);
const PROJECTION: FieldMapping =
    FieldMapping::request(keys::AWS_DYNAMODB_PROJECTION, &["ProjectionExpression"]);
const ATTRIBUTES_TO_GET: FieldMapping =
    FieldMapping::request(keys::AWS_DYNAMODB_ATTRIBUTES_TO_GET, &["AttributesToGet"]);
const INDEX_NAME: FieldMapping =
    FieldMapping::request(keys::AWS_DYNAMODB_INDEX_NAME, &["IndexName"]);
const LIMIT: FieldMapping = FieldMapping::request_count(keys::AWS_DYNAMODB_LIMIT, &["Limit"]);
const SELECT: FieldMapping = FieldMapping::request(keys::AWS_DYNAMODB_SELECT, &["Select"]);

pub static OPERATIONS: &[Operation<'static>] = &[
    Operation::new(
        "BatchGetItem",
        categories::KEY_VALUE_STORE,
        &[REQUEST_ITEMS, CONSUMED_CAPACITY],
    ),
    Operation::new(
        "BatchWriteItem",
        categories::KEY_VALUE_STORE,
        &[
            REQUEST_ITEMS,
            CONSUMED_CAPACITY,
            FieldMapping::response(
                keys::AWS_DYNAMODB_ITEM_COLLECTION_METRICS,
                &["ItemCollectionMetrics"],
            ),
        ],
    ),
    Operation::new(
        "CreateTable",
        categories::KEY_VALUE_STORE,
        &[
            FieldMapping::request(
                keys::AWS_DYNAMODB_GLOBAL_SECONDARY_INDEXES,
                &["GlobalSecondaryIndexes"],
            ),
            FieldMapping::request(
                keys::AWS_DYNAMODB_LOCAL_SECONDARY_INDEXES,
                &["LocalSecondaryIndexes"],
            ),
            FieldMapping::request_count(
                keys::AWS_DYNAMODB_PROVISIONED_READ_CAPACITY,
                &["ProvisionedThroughput", "ReadCapacityUnits"],
            ),
            FieldMapping::request_count(
                keys::AWS_DYNAMODB_PROVISIONED_WRITE_CAPACITY,
                &["ProvisionedThroughput", "WriteCapacityUnits"],
            ),
        ],
    ),
    Operation::new(
        "GetItem",
        categories::KEY_VALUE_STORE,
        &[PROJECTION, CONSISTENT_READ, CONSUMED_CAPACITY],
    ),
    Operation::new(
        "Query",
        categories::KEY_VALUE_STORE,
        &[
            ATTRIBUTES_TO_GET,
            CONSISTENT_READ,
            INDEX_NAME,
            LIMIT,
            PROJECTION,
            FieldMapping::request(keys::AWS_DYNAMODB_SCAN_FORWARD, &["ScanIndexForward"]),
            SELECT,
            CONSUMED_CAPACITY,
        ],
    ),
    Operation::new(
        "Scan",
        categories::KEY_VALUE_STORE,
        &[
            ATTRIBUTES_TO_GET,
            CONSISTENT_READ,
            INDEX_NAME,
            LIMIT,
            PROJECTION,
            FieldMapping::request_count(keys::AWS_DYNAMODB_SEGMENT, &["Segment"]),
            FieldMapping::request_count(keys::AWS_DYNAMODB_TOTAL_SEGMENTS, &["TotalSegments"]),
            SELECT,
            FieldMapping::response_count(keys::AWS_DYNAMODB_COUNT, &["Count"]),
            FieldMapping::response_count(keys::AWS_DYNAMODB_SCANNED_COUNT, &["ScannedCount"]),
            CONSUMED_CAPACITY,
        ],
    ),
    Operation::new(
        "ListTables",
        categories::KEY_VALUE_STORE,
        &[
            FieldMapping::request(
                keys::AWS_DYNAMODB_EXCLUSIVE_START_TABLE,
                &["ExclusiveStartTableName"],
            ),
            LIMIT,
        ],
    ),
    Operation::new("InvokeModel", categories::MODEL_INVOCATION, &[]),
];

// ============================================================================
// REGISTRY
// ============================================================================

/// Read-only index over a category table.
#[derive(Debug)]
pub struct FieldPathRegistry {
    table: &'static [RequestCategory],
    index: HashMap<&'static str, usize>,
}

static GLOBAL: OnceLock<FieldPathRegistry> = OnceLock::new();

impl FieldPathRegistry {
    /// Index `table`. For a repeated category name the first entry is kept.
    pub fn from_table(table: &'static [RequestCategory]) -> Self {
        let mut index = HashMap::with_capacity(table.len());
        for (i, category) in table.iter().enumerate() {
            match index.entry(category.name) {
                Entry::Vacant(slot) => {
                    slot.insert(i);
                }
                Entry::Occupied(_) => {
                    tracing::warn!(
                        category = category.name,
                        "Duplicate category in table, keeping first"
                    );
                }
            }
        }
        tracing::debug!(categories = table.len(), "Field path registry built");
        Self { table, index }
    }

    /// Registry over the built-in table.
    pub fn global() -> &'static FieldPathRegistry {
        GLOBAL.get_or_init(|| FieldPathRegistry::from_table(CATEGORIES))
    }

    pub fn category(&self, name: &str) -> Option<&'static RequestCategory> {
        let table = self.table;
        self.index.get(name).map(|&i| &table[i])
    }

    /// Mappings for `category` in `phase`; empty for an unknown category.
    pub fn mappings(&self, category: &str, phase: Phase) -> &'static [FieldMapping] {
        self.category(category)
            .map(|c| c.mappings(phase))
            .unwrap_or(&[])
    }

    /// Categories in table order.
    pub fn categories(&self) -> impl Iterator<Item = &'static RequestCategory> {
        let table = self.table;
        table
            .iter()
            .enumerate()
            .filter(|(i, c)| self.index.get(c.name) == Some(i))
            .map(|(_, c)| c)
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
