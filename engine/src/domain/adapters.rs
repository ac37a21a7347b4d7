//! Narrow per-category capabilities for callers that already know their types.
//!
//! Implement the capability trait on your own request/response type, wrap it
//! in the matching adapter, and hand the adapter to the extractor as its
//! [`FieldSource`]. Top-level field names follow the service wire names the
//! category tables use.

use crate::domain::extract::FieldSource;
use crate::domain::reflect::{FieldValue, ToField};

pub trait ObjectStorageCall {
    fn bucket(&self) -> Option<&str>;
}

pub trait QueueCall {
    fn queue_url(&self) -> Option<&str> {
        None
    }

    fn queue_name(&self) -> Option<&str> {
        None
    }
}

pub trait StreamCall {
    fn stream_name(&self) -> Option<&str>;
}

pub trait TableCall {
    fn table_name(&self) -> Option<&str>;

    /// Operation-specific fields (`Limit`, `ConsistentRead`, ...).
    fn field(&self, _name: &str) -> Option<FieldValue<'_>> {
        None
    }
}

pub trait ModelInvocationCall {
    fn model_id(&self) -> Option<&str>;

    /// Serialized request or response body.
    fn body(&self) -> Option<&[u8]>;
}

pub struct ObjectStorage<'c, C: ?Sized>(pub &'c C);

pub struct Queue<'c, C: ?Sized>(pub &'c C);

pub struct Stream<'c, C: ?Sized>(pub &'c C);

pub struct Table<'c, C: ?Sized>(pub &'c C);

pub struct ModelInvocation<'c, C: ?Sized>(pub &'c C);

impl<C: ObjectStorageCall + ?Sized> FieldSource for ObjectStorage<'_, C> {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "Bucket" => self.0.bucket().to_field(),
            _ => None,
        }
    }
}

impl<C: QueueCall + ?Sized> FieldSource for Queue<'_, C> {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "QueueUrl" => self.0.queue_url().to_field(),
            "QueueName" => self.0.queue_name().to_field(),
            _ => None,
        }
    }
}

impl<C: StreamCall + ?Sized> FieldSource for Stream<'_, C> {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "StreamName" => self.0.stream_name().to_field(),
            _ => None,
        }
    }
}

impl<C: TableCall + ?Sized> FieldSource for Table<'_, C> {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "TableName" => self.0.table_name().to_field(),
            other => self.0.field(other),
        }
    }
}

impl<C: ModelInvocationCall + ?Sized> FieldSource for ModelInvocation<'_, C> {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "modelId" => self.0.model_id().to_field(),
            "body" => self.0.body().map(FieldValue::Bytes),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::extract::{
        AttributeExtractor, ExtractConfig, Operation, RecordedAttributes, keys,
        registry::categories,
    };

    struct Upload {
        bucket: String,
    }

    impl ObjectStorageCall for Upload {
        fn bucket(&self) -> Option<&str> {
            Some(&self.bucket)
        }
    }

    struct Receive;

    impl QueueCall for Receive {
        fn queue_url(&self) -> Option<&str> {
            Some("https://sqs.us-east-1.amazonaws.com/1/jobs")
        }
    }

    struct Scan {
        limit: i64,
    }

    impl TableCall for Scan {
        fn table_name(&self) -> Option<&str> {
            Some("orders")
        }

        fn field(&self, name: &str) -> Option<FieldValue<'_>> {
            match name {
                "Limit" => Some(FieldValue::Int(self.limit)),
                _ => None,
            }
        }
    }

    struct PutRecord;

    impl StreamCall for PutRecord {
        fn stream_name(&self) -> Option<&str> {
            None
        }
    }

    #[test]
    fn test_object_storage_adapter() {
        let upload = Upload {
            bucket: "assets".to_string(),
        };
        let source = ObjectStorage(&upload);
        assert_eq!(source.field("Bucket").unwrap().as_str(), Some("assets"));
        assert!(source.field("Key").is_none());
    }

    #[test]
    fn test_queue_defaults_absent() {
        let source = Queue(&Receive);
        assert!(source.field("QueueUrl").is_some());
        assert!(source.field("QueueName").is_none());
    }

    #[test]
    fn test_table_adapter_through_extractor() {
        let extractor = AttributeExtractor::new(ExtractConfig::default());
        let operation = Operation::lookup("Scan").unwrap();
        let mut sink = RecordedAttributes::new();

        let written = extractor.on_request(operation, &Table(&Scan { limit: 25 }), &mut sink);

        assert_eq!(written, 2);
        assert_eq!(sink.get_str(keys::AWS_DYNAMODB_TABLE_NAMES), Some("orders"));
        assert_eq!(sink.get_i64(keys::AWS_DYNAMODB_LIMIT), Some(25));
    }

    #[test]
    fn test_stream_adapter_missing_value_writes_nothing() {
        let extractor = AttributeExtractor::new(ExtractConfig::default());
        let mut sink = RecordedAttributes::new();
        let written = extractor.on_request(
            &Operation::generic(categories::STREAM),
            &Stream(&PutRecord),
            &mut sink,
        );
        assert_eq!(written, 0);
        assert!(sink.is_empty());
    }
}
