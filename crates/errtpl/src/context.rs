use serde::Serialize;
use serde_json::{Map, Value};

/// Named template parameters.
///
/// Build with the [`params!`](crate::params) macro or collect from
/// `(key, value)` pairs.
pub type Params = Map<String, Value>;

/// Convert any serializable value into a parameter value.
///
/// Values that fail to serialize (a map with non-string keys, say) become
/// `null` and render as the missing-value sentinel.
pub fn to_param<T>(value: &T) -> Value
where
    T: Serialize + ?Sized,
{
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Merge parameter maps left to right. A key set by a later map overwrites
/// the same key from an earlier one.
///
/// ```
/// use errtpl::{merge_params, params};
/// let merged = merge_params([params! { "a" => 1, "b" => 1 }, params! { "b" => 2 }]);
/// assert_eq!(merged["a"], 1);
/// assert_eq!(merged["b"], 2);
/// ```
pub fn merge_params<I>(maps: I) -> Params
where
    I: IntoIterator<Item = Params>,
{
    let mut merged = Params::new();
    for map in maps {
        merged.extend(map);
    }
    merged
}

/// The parameters an error value was created with.
///
/// Displays as compact JSON, which is what ends up in full error reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ErrorContext(Params);

impl ErrorContext {
    pub fn new(params: Params) -> Self {
        Self(params)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn params(&self) -> &Params {
        &self.0
    }

    pub fn into_params(self) -> Params {
        self.0
    }
}

impl From<Params> for ErrorContext {
    fn from(params: Params) -> Self {
        Self(params)
    }
}

impl core::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match serde_json::to_string(&self.0) {
            Ok(json) => f.write_str(&json),
            Err(_) => Ok(()),
        }
    }
}
