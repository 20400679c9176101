//! Extra variables passed to `ansible-playbook --extra-vars`

use std::collections::BTreeMap;

/// A single extra variable value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarValue {
    Scalar(String),
    /// Rendered comma-joined
    List(Vec<String>),
}

impl VarValue {
    pub fn render(&self) -> String {
        match self {
            VarValue::Scalar(value) => value.clone(),
            VarValue::List(values) => values.join(","),
        }
    }
}

impl From<&str> for VarValue {
    fn from(value: &str) -> Self {
        VarValue::Scalar(value.to_string())
    }
}

impl From<String> for VarValue {
    fn from(value: String) -> Self {
        VarValue::Scalar(value)
    }
}

impl From<&String> for VarValue {
    fn from(value: &String) -> Self {
        VarValue::Scalar(value.clone())
    }
}

impl From<u32> for VarValue {
    fn from(value: u32) -> Self {
        VarValue::Scalar(value.to_string())
    }
}

impl From<Vec<String>> for VarValue {
    fn from(values: Vec<String>) -> Self {
        VarValue::List(values)
    }
}

/// Ordered set of extra variables
///
/// Serialized as space separated `key='value'` tokens, the format the
/// playbooks have always been fed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtraVars {
    vars: BTreeMap<String, VarValue>,
}

impl ExtraVars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<VarValue>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<VarValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Add every entry of `other`, overwriting existing keys
    pub fn merge(&mut self, other: &ExtraVars) {
        for (key, value) in &other.vars {
            self.vars.insert(key.clone(), value.clone());
        }
    }

    pub fn get(&self, key: &str) -> Option<&VarValue> {
        self.vars.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &VarValue)> {
        self.vars.iter()
    }

    /// Render the `--extra-vars` argument
    pub fn to_arg(&self) -> String {
        self.vars
            .iter()
            .map(|(key, value)| format!("{}='{}'", key, escape_value(&value.render())))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl<K, V> FromIterator<(K, V)> for ExtraVars
where
    K: Into<String>,
    V: Into<VarValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut vars = ExtraVars::new();
        for (key, value) in iter {
            vars.insert(key, value);
        }
        vars
    }
}

/// Backslash-escape characters that would end or break a single-quoted value
fn escape_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '\\' || c == '\'' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
