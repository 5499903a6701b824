use faststr::FastStr;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Caller-supplied API key. Lives for one request and never shows up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(FastStr);

impl Credential {
    /// Returns `None` for an empty key, which counts as a missing one.
    pub fn new<T: Into<FastStr>>(key: T) -> Option<Self> {
        let key = key.into();
        if key.is_empty() { None } else { Some(Self(key)) }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

pub struct RequestData {
    pub url:     FastStr,
    pub headers: HashMap<FastStr, FastStr>,
    pub body:    Value,
}

impl RequestData {
    pub fn new<T>(url: T, body: Value) -> Self
    where
        T: Into<FastStr>,
    {
        Self {
            url: url.into(),
            headers: Default::default(),
            body,
        }
    }

    pub fn header<K, V>(&mut self, key: K, value: V)
    where
        K: Into<FastStr>,
        V: Into<FastStr>,
    {
        self.headers.insert(key.into(), value.into());
    }
}
