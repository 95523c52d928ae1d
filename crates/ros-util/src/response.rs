//! Responses returned by the device.
//!
//! Every request produces a [`ResponseCollection`]: zero or more data
//! entries (`!re`), possibly error entries (`!trap`), and a final `!done`
//! entry which may itself carry a `ret` property.

/// Kind of a response entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseType {
    /// An item or value (`!re`).
    Data,
    /// A failure report (`!trap`, `!fatal`).
    Error,
    /// End of the reply (`!done`).
    Done,
}

/// A single response entry with its properties.
///
/// Property values are kept as the bytes received; file contents and
/// script sources need not be UTF-8.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    kind: ResponseType,
    properties: Vec<(String, Vec<u8>)>,
}

impl Response {
    /// Create an entry without properties.
    pub fn new(kind: ResponseType) -> Self {
        Response {
            kind,
            properties: Vec::new(),
        }
    }

    /// Create a data entry.
    pub fn data() -> Self {
        Response::new(ResponseType::Data)
    }

    /// Create an error entry with a message.
    pub fn error(message: impl Into<String>) -> Self {
        Response::new(ResponseType::Error).with_property("message", message.into())
    }

    /// Create a done entry.
    pub fn done() -> Self {
        Response::new(ResponseType::Done)
    }

    /// Add a property, builder style.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.properties.push((name.into(), value.into()));
        self
    }

    /// Get the entry kind.
    pub fn kind(&self) -> ResponseType {
        self.kind
    }

    /// Get a property value as text; `None` when absent or not UTF-8.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.property_bytes(name)
            .and_then(|v| std::str::from_utf8(v).ok())
    }

    /// Get a property value as received.
    pub fn property_bytes(&self, name: &str) -> Option<&[u8]> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// Get all properties in the order received.
    pub fn properties(&self) -> &[(String, Vec<u8>)] {
        &self.properties
    }

    /// Check if this is an error entry.
    pub fn is_error(&self) -> bool {
        self.kind == ResponseType::Error
    }
}

/// All entries received for one request, in order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResponseCollection {
    responses: Vec<Response>,
}

impl ResponseCollection {
    /// Create a collection.
    pub fn new(responses: Vec<Response>) -> Self {
        ResponseCollection { responses }
    }

    /// Get the number of entries, including the final `!done`.
    pub fn len(&self) -> usize {
        self.responses.len()
    }

    /// Check if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// Iterate over all entries.
    pub fn iter(&self) -> std::slice::Iter<'_, Response> {
        self.responses.iter()
    }

    /// Get the first entry.
    pub fn first(&self) -> Option<&Response> {
        self.responses.first()
    }

    /// Get the last entry (normally `!done`).
    pub fn last(&self) -> Option<&Response> {
        self.responses.last()
    }

    /// Get a property of the first entry.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.first().and_then(|r| r.property(name))
    }

    /// Get a property of the first entry as received.
    pub fn property_bytes(&self, name: &str) -> Option<&[u8]> {
        self.first().and_then(|r| r.property_bytes(name))
    }

    /// Entries of one kind.
    pub fn of_type(&self, kind: ResponseType) -> ResponseCollection {
        ResponseCollection::new(
            self.responses
                .iter()
                .filter(|r| r.kind == kind)
                .cloned()
                .collect(),
        )
    }

    /// Count entries of one kind.
    pub fn count_of(&self, kind: ResponseType) -> usize {
        self.responses.iter().filter(|r| r.kind == kind).count()
    }

    /// Check if any entry is an error.
    pub fn has_errors(&self) -> bool {
        self.responses.iter().any(Response::is_error)
    }
}

impl IntoIterator for ResponseCollection {
    type Item = Response;
    type IntoIter = std::vec::IntoIter<Response>;

    fn into_iter(self) -> Self::IntoIter {
        self.responses.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResponseCollection {
    type Item = &'a Response;
    type IntoIter = std::slice::Iter<'a, Response>;

    fn into_iter(self) -> Self::IntoIter {
        self.responses.iter()
    }
}

impl FromIterator<Response> for ResponseCollection {
    fn from_iter<I: IntoIterator<Item = Response>>(iter: I) -> Self {
        ResponseCollection::new(iter.into_iter().collect())
    }
}
