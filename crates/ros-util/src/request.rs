//! Requests sent to the device.
//!
//! A request is a command path (`/ip/address/print`), named arguments and an
//! optional [`Query`]. Argument values are [`Value`]s; when a request is
//! rendered as text every value goes through the literal encoder, so caller
//! data can never be read as script syntax.

use std::fmt;

use ros_script::{encode, Value};

// ============================================================================
// Request
// ============================================================================

/// A command with arguments, ready to be sent over a [`Connection`](crate::Connection).
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    command: String,
    arguments: Vec<(String, Value)>,
    query: Option<Query>,
}

impl Request {
    /// Create a request for a command path.
    pub fn new(command: impl Into<String>) -> Self {
        Request {
            command: command.into(),
            arguments: Vec::new(),
            query: None,
        }
    }

    /// Attach a query, builder style.
    pub fn with_query(mut self, query: Query) -> Self {
        self.query = Some(query);
        self
    }

    /// Set an argument, builder style.
    pub fn with_argument(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_argument(name, value);
        self
    }

    /// Set an argument, replacing any previous value of the same name.
    ///
    /// [`Value::Null`] makes an empty argument (a bare name).
    pub fn set_argument(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let name = name.into();
        let value = value.into();
        match self.arguments.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.arguments.push((name, value)),
        }
        self
    }

    /// Remove an argument.
    pub fn remove_argument(&mut self, name: &str) -> &mut Self {
        self.arguments.retain(|(n, _)| n != name);
        self
    }

    /// Get the command path.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Get an argument value.
    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.arguments
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Get all arguments in insertion order.
    pub fn arguments(&self) -> &[(String, Value)] {
        &self.arguments
    }

    /// Get the query, if any.
    pub fn query(&self) -> Option<&Query> {
        self.query.as_ref()
    }
}

impl fmt::Display for Request {
    /// Renders `<command> name=<literal> ... ?cond ...`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command)?;
        for (name, value) in &self.arguments {
            match value {
                Value::Null => write!(f, " {}", name)?,
                _ => write!(f, " {}={}", name, encode(value))?,
            }
        }
        if let Some(query) = &self.query {
            write!(f, " {}", query)?;
        }
        Ok(())
    }
}

// ============================================================================
// Query
// ============================================================================

/// One word of a query.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Property equals a value.
    Equal {
        /// Property name.
        name: String,
        /// Expected value.
        value: Value,
    },
    /// Logical OR of the two preceding conditions.
    Or,
}

/// A structured filter applied by the device to a `print`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    conditions: Vec<Condition>,
}

impl Query {
    /// Match items whose property equals a value.
    pub fn where_equal(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Query {
            conditions: vec![Condition::Equal {
                name: name.into(),
                value: value.into(),
            }],
        }
    }

    /// Also match items whose property equals a value.
    pub fn or_where_equal(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Equal {
            name: name.into(),
            value: value.into(),
        });
        self.conditions.push(Condition::Or);
        self
    }

    /// Get the conditions in the order the device evaluates them.
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words: Vec<String> = self
            .conditions
            .iter()
            .map(|c| match c {
                Condition::Equal { name, value } => format!("?{}={}", name, encode(value)),
                Condition::Or => "?#|".to_string(),
            })
            .collect();
        f.write_str(&words.join(" "))
    }
}

// ============================================================================
// Properties
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Property {
    Named(String, Value),
    Flag(String),
}

/// Property values for `add`, `set`, `print` and friends.
///
/// Flags are properties given by name only. Commands that change items send
/// them as `name=true`; commands that read items send them as bare
/// arguments (`detail`, `without-paging`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Properties {
    entries: Vec<Property>,
}

impl Properties {
    /// Create an empty property list.
    pub fn new() -> Self {
        Properties::default()
    }

    /// Add a named value.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.push(Property::Named(name.into(), value.into()));
        self
    }

    /// Add a flag.
    pub fn flag(mut self, name: impl Into<String>) -> Self {
        self.entries.push(Property::Flag(name.into()));
        self
    }

    /// Check if a property or flag of this name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.names().any(|n| n == name)
    }

    /// Names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|p| match p {
            Property::Named(n, _) | Property::Flag(n) => n.as_str(),
        })
    }

    /// Check if there are no properties.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Apply as new item values: flags become `name=true`.
    pub(crate) fn apply_as_values(&self, request: &mut Request) {
        for property in &self.entries {
            match property {
                Property::Named(name, value) => request.set_argument(name.clone(), value.clone()),
                Property::Flag(name) => request.set_argument(name.clone(), true),
            };
        }
    }

    /// Apply as command arguments: flags become empty arguments.
    pub(crate) fn apply_as_arguments(&self, request: &mut Request) {
        for property in &self.entries {
            match property {
                Property::Named(name, value) => request.set_argument(name.clone(), value.clone()),
                Property::Flag(name) => request.set_argument(name.clone(), Value::Null),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_display_encodes_values() {
        let request = Request::new("/ip/address/set")
            .with_argument("numbers", "*1,*2")
            .with_argument("disabled", true)
            .with_argument("detail", Value::Null);
        assert_eq!(
            request.to_string(),
            "/ip/address/set numbers=\"\\2A1\\2C\\2A2\" disabled=true detail"
        );
    }

    #[test]
    fn test_set_argument_replaces() {
        let mut request = Request::new("/file/print").with_argument("file", "a");
        request.set_argument("file", "b");
        assert_eq!(request.arguments().len(), 1);
        assert_eq!(request.argument("file"), Some(&Value::text("b")));
        request.remove_argument("file");
        assert!(request.argument("file").is_none());
    }

    #[test]
    fn test_query_display() {
        let query = Query::where_equal(".id", "*1").or_where_equal("name", "*1");
        assert_eq!(
            query.to_string(),
            "?.id=\"\\2A1\" ?name=\"\\2A1\" ?#|"
        );
    }

    #[test]
    fn test_properties_flag_modes() {
        let props = Properties::new().with("comment", "x").flag("disabled");
        assert!(props.contains("disabled"));

        let mut set = Request::new("/set");
        props.apply_as_values(&mut set);
        assert_eq!(set.argument("disabled"), Some(&Value::Bool(true)));

        let mut print = Request::new("/print");
        props.apply_as_arguments(&mut print);
        assert_eq!(print.argument("disabled"), Some(&Value::Null));
    }
}
