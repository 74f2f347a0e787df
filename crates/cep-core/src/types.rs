use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Placeholder substituted with the queried code in [`SourceSpec::endpoint`].
pub const CODE_PLACEHOLDER: &str = "{cep}";

/// Normalized result produced by one upstream source.
///
/// On the wire all three fields are always present. A success envelope carries the
/// upstream payload in `data` and an empty `error`; a failure envelope carries an empty
/// `data` object and a non-empty `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub source: String,

    #[serde(default, deserialize_with = "null_as_empty_map")]
    pub data: Map<String, Value>,

    #[serde(default)]
    pub error: String,
}

fn null_as_empty_map<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ResultEnvelope {
    #[must_use]
    pub fn success(source: impl Into<String>, data: Map<String, Value>) -> Self {
        Self { source: source.into(), data, error: String::new() }
    }

    #[must_use]
    pub fn failure(source: impl Into<String>, error: impl Into<String>) -> Self {
        Self { source: source.into(), data: Map::new(), error: error.into() }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_empty()
    }
}

/// Static description of one upstream lookup service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    pub name: Arc<str>,
    /// URL template; every `{cep}` is replaced with the queried code.
    pub endpoint: String,
}

impl SourceSpec {
    pub fn new(name: impl Into<Arc<str>>, endpoint: impl Into<String>) -> Self {
        Self { name: name.into(), endpoint: endpoint.into() }
    }

    /// Builds the request URL for `code`. The code is substituted verbatim.
    #[must_use]
    pub fn url_for(&self, code: &str) -> String {
        self.endpoint.replace(CODE_PLACEHOLDER, code)
    }
}

/// Resolution of a single dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// The first envelope delivered by any source, success or failure.
    Resolved(ResultEnvelope),
    /// No source delivered anything before the shared deadline.
    DeadlineExceeded,
}

impl DispatchOutcome {
    #[must_use]
    pub fn as_metric_str(&self) -> &'static str {
        match self {
            Self::Resolved(_) => "resolved",
            Self::DeadlineExceeded => "deadline_exceeded",
        }
    }

    #[must_use]
    pub fn envelope(&self) -> Option<&ResultEnvelope> {
        match self {
            Self::Resolved(envelope) => Some(envelope),
            Self::DeadlineExceeded => None,
        }
    }
}
