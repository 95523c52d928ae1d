//! Shared helpers for session tests: a scripted in-memory connection.

#![allow(dead_code)]

use std::io::Read;

use ros_script::Value;
use ros_util::{
    Connection, Request, Response, ResponseCollection, SeekRead, SessionConfig, SessionError,
    SessionResult, Util,
};

/// Largest read the mock makes from a streamed argument.
pub const MOCK_READ_SIZE: usize = 4096;

type Handler = Box<dyn FnMut(&Request) -> SessionResult<ResponseCollection>>;

/// A connection answering from a closure and recording every request.
///
/// Streamed arguments are read in pieces and recorded in the request as
/// text, so tests inspect them like any other argument.
pub struct MockConnection {
    handler: Handler,
    pub sent: Vec<Request>,
    /// `(command, argument)` for every streamed argument.
    pub streamed: Vec<(String, String)>,
}

impl MockConnection {
    /// Answer every request with the closure's reply.
    pub fn new(mut handler: impl FnMut(&Request) -> ResponseCollection + 'static) -> Self {
        MockConnection::fallible(move |request| Ok(handler(request)))
    }

    /// Answer every request with the closure's result, which may fail.
    pub fn fallible(
        handler: impl FnMut(&Request) -> SessionResult<ResponseCollection> + 'static,
    ) -> Self {
        MockConnection {
            handler: Box::new(handler),
            sent: Vec::new(),
            streamed: Vec::new(),
        }
    }

    /// A connection whose transport is down.
    pub fn broken() -> Self {
        MockConnection::fallible(|_| Err(SessionError::transport("connection reset")))
    }

    /// Commands sent so far, in order.
    pub fn commands(&self) -> Vec<&str> {
        self.sent.iter().map(|r| r.command()).collect()
    }

    /// Number of requests sent for a command.
    pub fn count(&self, command: &str) -> usize {
        self.sent.iter().filter(|r| r.command() == command).count()
    }

    /// The last request sent for a command.
    pub fn last(&self, command: &str) -> Option<&Request> {
        self.sent.iter().rev().find(|r| r.command() == command)
    }
}

impl Connection for MockConnection {
    fn send(&mut self, request: &Request) -> SessionResult<ResponseCollection> {
        self.sent.push(request.clone());
        (self.handler)(request)
    }

    fn send_with_body(
        &mut self,
        request: &Request,
        name: &str,
        body: &mut dyn SeekRead,
    ) -> SessionResult<ResponseCollection> {
        let mut value = Vec::new();
        let mut chunk = vec![0u8; MOCK_READ_SIZE];
        loop {
            let n = body.read(&mut chunk)?;
            if n == 0 {
                break;
            }
            value.extend_from_slice(&chunk[..n]);
        }
        self.streamed
            .push((request.command().to_string(), name.to_string()));
        let request = request.clone().with_argument(name, Value::Text(value));
        self.send(&request)
    }
}

/// An empty `!done` reply.
pub fn done() -> ResponseCollection {
    ResponseCollection::new(vec![Response::done()])
}

/// A `!done` reply carrying `ret`.
pub fn done_ret(ret: &str) -> ResponseCollection {
    ResponseCollection::new(vec![Response::done().with_property("ret", ret)])
}

/// A `!trap` reply.
pub fn trap(message: &str) -> ResponseCollection {
    ResponseCollection::new(vec![Response::error(message), Response::done()])
}

/// One data entry per `(id, name)` pair, then `!done`.
pub fn items(items: &[(&str, &str)]) -> ResponseCollection {
    items
        .iter()
        .map(|(id, name)| {
            Response::data()
                .with_property(".id", *id)
                .with_property("name", *name)
        })
        .chain(std::iter::once(Response::done()))
        .collect()
}

/// Session configuration without settle delays.
pub fn test_config() -> SessionConfig {
    SessionConfig {
        settle_delay_ms: 0,
        ..SessionConfig::default()
    }
}

/// Wrap a mock with no settle delay and numbered script names.
pub fn util(connection: MockConnection) -> Util<MockConnection> {
    util_with_config(connection, test_config())
}

/// [`util`] with a custom configuration.
pub fn util_with_config(connection: MockConnection, config: SessionConfig) -> Util<MockConnection> {
    let mut n = 0;
    Util::with_config(connection, config).with_name_generator(move || {
        n += 1;
        format!("tmp{}", n)
    })
}

/// Text value of an argument.
pub fn arg_text<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
    request.argument(name).and_then(Value::as_str)
}
