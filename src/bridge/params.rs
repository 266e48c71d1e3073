//! Named script parameters and their encoding into interpreter arguments.

use std::fmt;

/// A single parameter value passed to the script.
///
/// Lists are not representable here: callers join them into one delimited
/// string before handing them over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Text(String),
    Flag(bool),
}

impl ParamValue {
    /// Empty text counts as "not supplied" and is never sent to the script
    fn is_empty(&self) -> bool {
        matches!(self, ParamValue::Text(text) if text.is_empty())
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Text(text) => f.write_str(text),
            ParamValue::Flag(flag) => write!(f, "{}", flag),
        }
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::Text(value.clone())
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Flag(value)
    }
}

/// Ordered mapping from script parameter name to value.
///
/// Names are passed through untouched, so they must use the exact casing the
/// script declares (`StartDate`, `EventId`, ...). `None` entries are kept so
/// that callers can build the mapping unconditionally; they are dropped at
/// encoding time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(&'static str, Option<ParamValue>)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter that always has a value
    pub fn with(mut self, name: &'static str, value: impl Into<ParamValue>) -> Self {
        self.entries.push((name, Some(value.into())));
        self
    }

    /// Add a parameter that may be absent
    pub fn with_opt<V: Into<ParamValue>>(mut self, name: &'static str, value: Option<V>) -> Self {
        self.entries.push((name, value.map(Into::into)));
        self
    }

    /// Look up the value stored for `name`, if any
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(key, _)| *key == name)
            .and_then(|(_, value)| value.as_ref())
    }

    /// Number of parameters that will actually be sent
    pub fn len(&self) -> usize {
        self.present().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names of the parameters that will actually be sent, in order
    pub fn names(&self) -> Vec<&'static str> {
        self.present().map(|(name, _)| name).collect()
    }

    fn present(&self) -> impl Iterator<Item = (&'static str, &ParamValue)> {
        self.entries.iter().filter_map(|(name, value)| match value {
            Some(value) if !value.is_empty() => Some((*name, value)),
            _ => None,
        })
    }

    /// Encode into interpreter tokens: `-Name value` for every present value
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.entries.len() * 2);
        for (name, value) in self.present() {
            args.push(format!("-{}", name));
            args.push(value.to_string());
        }
        args
    }
}
