//! Traits implemented by generated code.

use std::sync::Arc;

use crate::RpcClientConfig;

/// A generated object or union.
///
/// Decoding is total: input of the wrong shape produces the zero value
/// instead of an error.
pub trait RpcModel: Sized {
    /// The zero value.
    fn new() -> Self;

    fn from_json(input: &serde_json::Value) -> Self;

    /// Parses `input` as JSON, falling back to [`RpcModel::new`] when it is
    /// not valid JSON.
    fn from_json_string(input: String) -> Self {
        match serde_json::from_str::<serde_json::Value>(&input) {
            Ok(value) => Self::from_json(&value),
            Err(_) => Self::new(),
        }
    }

    fn to_json_string(&self) -> String;

    /// `key=value` pairs joined by `&`. Values are not percent-encoded.
    fn to_query_params_string(&self) -> String;
}

/// A generated string enum. The default is the first member.
pub trait RpcEnum: Default {
    /// Unknown values decode to the default.
    fn from_string(input: String) -> Self;

    fn serial_value(&self) -> String;
}

/// A generated client or nested service.
pub trait RpcClientService {
    fn create(config: Arc<RpcClientConfig>) -> Self;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[derive(Debug, PartialEq)]
    struct Counter {
        count: i64,
    }

    impl RpcModel for Counter {
        fn new() -> Self {
            Self { count: 0 }
        }

        fn from_json(input: &Value) -> Self {
            Self {
                count: input.get("count").and_then(|v| v.as_i64()).unwrap_or_default(),
            }
        }

        fn to_json_string(&self) -> String {
            format!("{{\"count\":{}}}", self.count)
        }

        fn to_query_params_string(&self) -> String {
            format!("count={}", self.count)
        }
    }

    #[test]
    fn test_from_json_string_falls_back_on_invalid_json() {
        assert_eq!(Counter::from_json_string("{\"count\":4}".to_string()), Counter { count: 4 });
        assert_eq!(Counter::from_json_string("not json".to_string()), Counter::new());
        assert_eq!(Counter::from_json_string(String::new()), Counter::new());
    }
}
