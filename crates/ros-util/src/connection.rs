//! The transport seam.

use std::io::{Read, Seek};

use tracing::trace;

use crate::error::SessionResult;
use crate::request::Request;
use crate::response::ResponseCollection;

/// A synchronous RouterOS API session.
///
/// Implementations send the request, block until the reply's `!done` (or a
/// fatal error) arrives, and return every entry received. Transport failures
/// are reported as [`SessionError::Transport`](crate::SessionError::Transport);
/// failures reported by the device belong in the returned collection.
pub trait Connection {
    /// Send a request and wait for its complete reply.
    fn send(&mut self, request: &Request) -> SessionResult<ResponseCollection>;

    /// Send a request with one more argument, `name`, whose value is read
    /// from `body` between its current position and its end.
    ///
    /// The value's length is known up front from `Seek`, so implementations
    /// can copy it to the wire in pieces instead of holding it whole. The
    /// position of `body` afterwards is unspecified.
    fn send_with_body(
        &mut self,
        request: &Request,
        name: &str,
        body: &mut dyn SeekRead,
    ) -> SessionResult<ResponseCollection>;
}

/// A readable stream that can report its length.
pub trait SeekRead: Read + Seek {}

impl<T: Read + Seek + ?Sized> SeekRead for T {}

impl<C: Connection + ?Sized> Connection for &mut C {
    fn send(&mut self, request: &Request) -> SessionResult<ResponseCollection> {
        (**self).send(request)
    }

    fn send_with_body(
        &mut self,
        request: &Request,
        name: &str,
        body: &mut dyn SeekRead,
    ) -> SessionResult<ResponseCollection> {
        (**self).send_with_body(request, name, body)
    }
}

impl<C: Connection + ?Sized> Connection for Box<C> {
    fn send(&mut self, request: &Request) -> SessionResult<ResponseCollection> {
        (**self).send(request)
    }

    fn send_with_body(
        &mut self,
        request: &Request,
        name: &str,
        body: &mut dyn SeekRead,
    ) -> SessionResult<ResponseCollection> {
        (**self).send_with_body(request, name, body)
    }
}

/// Send with tracing of the rendered command and reply size.
pub(crate) fn send_traced<C: Connection + ?Sized>(
    connection: &mut C,
    request: &Request,
) -> SessionResult<ResponseCollection> {
    trace!("Sending '{}'", request.command());
    let responses = connection.send(request)?;
    trace!(
        "Reply to '{}': {} entries ({} errors)",
        request.command(),
        responses.len(),
        responses.count_of(crate::ResponseType::Error)
    );
    Ok(responses)
}

/// [`send_traced`] for a request with a streamed argument.
pub(crate) fn send_traced_with_body<C: Connection + ?Sized>(
    connection: &mut C,
    request: &Request,
    name: &str,
    body: &mut dyn SeekRead,
) -> SessionResult<ResponseCollection> {
    trace!("Sending '{}' with streamed '{}'", request.command(), name);
    let responses = connection.send_with_body(request, name, body)?;
    trace!(
        "Reply to '{}': {} entries ({} errors)",
        request.command(),
        responses.len(),
        responses.count_of(crate::ResponseType::Error)
    );
    Ok(responses)
}
