use std::fmt::Display;

use indexmap::IndexMap;

/// A partitioned table definition.
///
/// Column order follows insertion order and becomes the column order of the table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSpec {
    pub name: String,
    pub columns: IndexMap<String, String>,
    pub partition_keys: Vec<String>,
}

impl TableSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: IndexMap::new(),
            partition_keys: vec![],
        }
    }

    pub fn column(mut self, name: impl Into<String>, data_type: impl Into<String>) -> Self {
        self.columns.insert(name.into(), data_type.into());
        self
    }

    pub fn partition_key(mut self, name: impl Into<String>) -> Self {
        self.partition_keys.push(name.into());
        self
    }
}

/// Partition key values for `ADD PARTITION` and `LOAD DATA ... PARTITION(...)`.
///
/// Values are kept in their textual form because they are always rendered
/// as quoted string literals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionSpec {
    values: IndexMap<String, String>,
}

impl PartitionSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Display) {
        self.values.insert(key.into(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn as_map(&self) -> &IndexMap<String, String> {
        &self.values
    }
}

impl<K, V> FromIterator<(K, V)> for PartitionSpec
where
    K: Into<String>,
    V: Display,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut spec = Self::new();
        for (key, value) in iter {
            spec.insert(key, value);
        }
        spec
    }
}
