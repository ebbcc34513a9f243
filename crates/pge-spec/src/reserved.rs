//! Reserved (`hysds_`) parameter extraction
//!
//! A notebook configures its own job through parameters such as
//! `hysds_time_limit = 7200`. Those are pulled out here and never shown to
//! job submitters.

use crate::parameter::{ParameterDescriptor, ParameterMap};
use crate::value::{decode_default, ParameterValue};
use std::collections::BTreeMap;

/// Decoded reserved parameters, keyed by name without the prefix
///
/// Lookup structure only; the order of keys carries no meaning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SystemSpecSet {
    values: BTreeMap<String, ParameterValue>,
}

impl SystemSpecSet {
    /// Hard time limit in seconds
    pub const TIME_LIMIT: &'static str = "time_limit";
    /// Soft time limit in seconds
    pub const SOFT_TIME_LIMIT: &'static str = "soft_time_limit";
    /// Disk usage token such as `10GB`
    pub const DISK_USAGE: &'static str = "disk_usage";
    /// `individual` or `iteration`
    pub const SUBMISSION_TYPE: &'static str = "submission_type";
    /// Queue name or list of queue names
    pub const REQUIRED_QUEUE: &'static str = "required_queue";
    /// hysds-io label
    pub const LABEL: &'static str = "label";
    /// Explicit job command
    pub const COMMAND: &'static str = "command";

    /// Keys the builders read
    pub const RECOGNIZED: [&'static str; 7] = [
        Self::TIME_LIMIT,
        Self::SOFT_TIME_LIMIT,
        Self::DISK_USAGE,
        Self::SUBMISSION_TYPE,
        Self::REQUIRED_QUEUE,
        Self::LABEL,
        Self::COMMAND,
    ];

    /// Create empty set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParameterValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Value for key, if present
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParameterValue> {
        self.values.get(key)
    }

    /// Value for key rendered as text, if present
    #[must_use]
    pub fn get_text(&self, key: &str) -> Option<String> {
        self.get(key).map(ParameterValue::to_text)
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no reserved parameter was declared
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Keys that no builder reads
    pub fn unrecognized_keys(&self) -> impl Iterator<Item = &str> {
        self.values
            .keys()
            .map(String::as_str)
            .filter(|k| !Self::RECOGNIZED.iter().any(|r| r == k))
    }

    /// Iterate entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<ParameterValue>> FromIterator<(K, V)> for SystemSpecSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (k, v) in iter {
            set.insert(k, v);
        }
        set
    }
}

/// Decode every reserved parameter into a [`SystemSpecSet`]
///
/// Never fails: a default that is not JSON is kept as text (see
/// [`decode_default`]) and extraction moves on to the next parameter.
#[must_use]
pub fn extract(parameters: &ParameterMap) -> SystemSpecSet {
    partition(parameters).0
}

/// Split parameters into job configuration and user input in one pass
///
/// User parameters keep declaration order.
#[must_use]
pub fn partition(parameters: &ParameterMap) -> (SystemSpecSet, Vec<ParameterDescriptor>) {
    let mut system = SystemSpecSet::new();
    let mut user = Vec::new();

    for descriptor in parameters.values() {
        match descriptor.reserved_key() {
            Some(key) => {
                let value = decode_default(&descriptor.default_text);
                tracing::debug!(key, value = %value, "reserved parameter");
                system.insert(key, value);
            }
            None => user.push(descriptor.clone()),
        }
    }

    for key in system.unrecognized_keys() {
        tracing::warn!(key, "ignoring unrecognized reserved parameter");
    }

    (system, user)
}
