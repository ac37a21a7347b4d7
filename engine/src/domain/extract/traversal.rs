//! Field path traversal across chained objects.
//!
//! The first segment is answered by the caller's [`FieldSource`]; every later
//! segment goes through the accessor cache on the current object's runtime
//! type. The walk stops at the first missing link.

use std::panic::{self, AssertUnwindSafe};

use crate::domain::reflect::{AccessorCache, FieldValue, Reflect};

use super::error::ExtractError;

/// Keyed lookup of top-level request/response fields. Unknown names yield `None`.
pub trait FieldSource {
    fn field(&self, name: &str) -> Option<FieldValue<'_>>;
}

/// [`FieldSource`] over a reflected object, resolving top-level names through an accessor cache.
pub struct ReflectSource<'a> {
    target: &'a dyn Reflect,
    cache: &'a AccessorCache,
}

impl<'a> ReflectSource<'a> {
    pub fn new(target: &'a dyn Reflect) -> Self {
        Self::with_cache(target, AccessorCache::global())
    }

    pub fn with_cache(target: &'a dyn Reflect, cache: &'a AccessorCache) -> Self {
        Self { target, cache }
    }
}

impl FieldSource for ReflectSource<'_> {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        self.cache.resolve(self.target, name)?.invoke(self.target)
    }
}

/// Walk `path` from `source`, reporting why the walk stopped.
pub fn try_traverse<'a, S>(
    cache: &AccessorCache,
    source: &'a S,
    path: &[&str],
) -> Result<FieldValue<'a>, ExtractError>
where
    S: FieldSource + ?Sized,
{
    let Some((first, rest)) = path.split_first() else {
        return Err(ExtractError::miss("", "empty path"));
    };

    let mut current = match panic::catch_unwind(AssertUnwindSafe(|| source.field(first))) {
        Ok(Some(value)) => value,
        Ok(None) => return Err(ExtractError::miss(first, "no value")),
        Err(_) => return Err(ExtractError::miss(first, "field provider panicked")),
    };

    for segment in rest {
        let FieldValue::Object(object) = current else {
            return Err(ExtractError::miss(segment, "parent is not an object"));
        };
        let accessor =
            cache
                .resolve(object, segment)
                .ok_or_else(|| ExtractError::AccessorNotFound {
                    type_name: object.type_name(),
                    field: segment.to_string(),
                })?;
        current = accessor
            .invoke(object)
            .ok_or_else(|| ExtractError::miss(segment, "no value"))?;
    }

    Ok(current)
}

/// Walk `path` from `source`; `None` at the first absent link.
pub fn traverse<'a, S>(cache: &AccessorCache, source: &'a S, path: &[&str]) -> Option<FieldValue<'a>>
where
    S: FieldSource + ?Sized,
{
    match try_traverse(cache, source, path) {
        Ok(value) => Some(value),
        Err(error) => {
            tracing::trace!(path = ?path, %error, "Traversal stopped");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Configuration {
        function_arn: Option<String>,
    }

    impl Configuration {
        fn function_arn(&self) -> Option<&str> {
            self.function_arn.as_deref()
        }
    }

    crate::reflect!(Configuration { function_arn });

    struct GetFunctionResponse {
        configuration: Configuration,
    }

    impl GetFunctionResponse {
        fn configuration(&self) -> &dyn Reflect {
            &self.configuration
        }

        fn exploding(&self) -> &str {
            panic!("not today")
        }
    }

    crate::reflect!(GetFunctionResponse {
        configuration,
        exploding
    });

    struct PanickingSource;

    impl FieldSource for PanickingSource {
        fn field(&self, _name: &str) -> Option<FieldValue<'_>> {
            panic!("provider bug")
        }
    }

    fn response(arn: Option<&str>) -> GetFunctionResponse {
        GetFunctionResponse {
            configuration: Configuration {
                function_arn: arn.map(str::to_string),
            },
        }
    }

    #[test]
    fn test_traverse_nested_path() {
        let cache = AccessorCache::new();
        let response = response(Some("arn:aws:lambda:eu-west-1:1:function:resize"));
        let source = ReflectSource::with_cache(&response, &cache);

        let value = traverse(&cache, &source, &["Configuration", "FunctionArn"]).unwrap();
        assert_eq!(value.as_str(), Some("arn:aws:lambda:eu-west-1:1:function:resize"));
    }

    #[test]
    fn test_traverse_stops_at_null_link() {
        let cache = AccessorCache::new();
        let response = response(None);
        let source = ReflectSource::with_cache(&response, &cache);

        let err = try_traverse(&cache, &source, &["Configuration", "FunctionArn"]).unwrap_err();
        assert!(matches!(err, ExtractError::PathMiss { .. }));
    }

    #[test]
    fn test_traverse_missing_accessor() {
        let cache = AccessorCache::new();
        let response = response(Some("arn"));
        let source = ReflectSource::with_cache(&response, &cache);

        let err = try_traverse(&cache, &source, &["Configuration", "Runtime"]).unwrap_err();
        assert!(matches!(err, ExtractError::AccessorNotFound { .. }));
    }

    #[test]
    fn test_traverse_does_not_continue_past_scalar() {
        let cache = AccessorCache::new();
        let response = response(Some("arn"));
        let source = ReflectSource::with_cache(&response, &cache);

        let err =
            try_traverse(&cache, &source, &["Configuration", "FunctionArn", "Length"]).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::PathMiss {
                reason: "parent is not an object",
                ..
            }
        ));
        // The remainder of the path is never attempted.
        assert!(!cache.contains(
            crate::domain::reflect::type_key_of::<Configuration>(),
            "Length"
        ));
    }

    #[test]
    fn test_traverse_unknown_top_level_field() {
        let cache = AccessorCache::new();
        let response = response(Some("arn"));
        let source = ReflectSource::with_cache(&response, &cache);
        assert!(traverse(&cache, &source, &["Bucket"]).is_none());
    }

    #[test]
    fn test_traverse_absorbs_panics() {
        let cache = AccessorCache::new();
        let response = response(Some("arn"));
        let source = ReflectSource::with_cache(&response, &cache);

        assert!(traverse(&cache, &source, &["exploding"]).is_none());
        assert!(traverse(&cache, &PanickingSource, &["Bucket"]).is_none());
    }

    #[test]
    fn test_traverse_empty_path() {
        let cache = AccessorCache::new();
        assert!(traverse(&cache, &PanickingSource, &[]).is_none());
    }
}
