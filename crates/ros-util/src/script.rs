//! Script assembly and one-off remote execution.
//!
//! A script is assembled as one `:local` declaration per parameter followed
//! by the source text. Parameter values are encoded as literals, so the
//! source can refer to them as `$name` without any quoting concerns.
//! Streamed parameters are escaped chunk by chunk and never held in memory
//! as a whole. [`Util::exec`] assembles into a buffer that moves to a
//! temporary file past the configured spool limit, and streams it from
//! there as the uploaded source.

use std::io::{self, Read, Seek, SeekFrom, Write};

use ros_script::{encode, escape_text, Value};
use tempfile::SpooledTempFile;
use tracing::{debug, warn};

use crate::config::DEFAULT_CHUNK_SIZE;
use crate::connection::Connection;
use crate::error::SessionResult;
use crate::menu::Util;
use crate::request::{Query, Request};
use crate::response::{ResponseCollection, ResponseType};

/// Name of the parameter holding the running script's own name.
pub const SCRIPT_NAME_PARAM: &str = "_";

/// A script parameter value.
pub enum ScriptParam<'a> {
    /// A value declared as its literal.
    Value(Value),
    /// Bytes read to the end and declared as a string.
    Stream(&'a mut dyn Read),
}

impl std::fmt::Debug for ScriptParam<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScriptParam::Value(v) => f.debug_tuple("Value").field(v).finish(),
            ScriptParam::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

impl From<Value> for ScriptParam<'_> {
    fn from(value: Value) -> Self {
        ScriptParam::Value(value)
    }
}

/// Ordered script parameters.
#[derive(Debug, Default)]
pub struct ScriptParams<'a> {
    entries: Vec<(String, ScriptParam<'a>)>,
}

impl<'a> ScriptParams<'a> {
    /// Create an empty parameter list.
    pub fn new() -> Self {
        ScriptParams::default()
    }

    /// Add a value parameter.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.push((name.into(), ScriptParam::Value(value.into())));
        self
    }

    /// Add a streamed parameter.
    pub fn with_stream(mut self, name: impl Into<String>, stream: &'a mut dyn Read) -> Self {
        self.entries.push((name.into(), ScriptParam::Stream(stream)));
        self
    }

    /// Add a parameter.
    pub fn push(&mut self, name: impl Into<String>, param: ScriptParam<'a>) {
        self.entries.push((name.into(), param));
    }

    /// Check if a parameter of this name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Get the number of parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Assembly
// ============================================================================

/// Write parameter declarations followed by `source` to `writer`.
///
/// Returns the number of bytes written. Streams are read in chunks of
/// [`DEFAULT_CHUNK_SIZE`] bytes.
pub fn append_script<W: Write + ?Sized>(
    writer: &mut W,
    source: &str,
    params: &mut ScriptParams<'_>,
) -> io::Result<usize> {
    append_script_chunked(writer, source, params, DEFAULT_CHUNK_SIZE)
}

/// [`append_script`] with an explicit stream chunk size.
pub fn append_script_chunked<W: Write + ?Sized>(
    writer: &mut W,
    source: &str,
    params: &mut ScriptParams<'_>,
    chunk_size: usize,
) -> io::Result<usize> {
    let mut out = CountingWriter {
        inner: writer,
        written: 0,
    };
    for (name, param) in params.entries.iter_mut() {
        write!(out, ":local \"{}\" ", escape_text(name.as_bytes()))?;
        match param {
            ScriptParam::Value(value) => out.write_all(encode(value).as_bytes())?,
            ScriptParam::Stream(stream) => {
                out.write_all(b"\"")?;
                let mut chunk = vec![0u8; chunk_size.max(1)];
                loop {
                    let n = match stream.read(&mut chunk) {
                        Ok(0) => break,
                        Ok(n) => n,
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                        Err(e) => return Err(e),
                    };
                    out.write_all(escape_text(&chunk[..n]).as_bytes())?;
                }
                out.write_all(b"\"")?;
            }
        }
        out.write_all(b";\n")?;
    }
    out.write_all(source.as_bytes())?;
    Ok(out.written)
}

struct CountingWriter<'w, W: ?Sized> {
    inner: &'w mut W,
    written: usize,
}

impl<W: Write + ?Sized> Write for CountingWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Assemble a script in memory.
pub fn assemble_script(source: &str, params: &mut ScriptParams<'_>) -> io::Result<Vec<u8>> {
    let mut script = Vec::new();
    append_script(&mut script, source, params)?;
    Ok(script)
}

// ============================================================================
// Execution
// ============================================================================

pub(crate) enum ScriptRun {
    /// The upload was refused; holds the upload reply.
    Rejected(ResponseCollection),
    /// The script ran and was removed.
    Finished {
        result: ResponseCollection,
        source: Option<Vec<u8>>,
    },
}

impl<C: Connection> Util<C> {
    /// Run a one-off script at the current menu.
    ///
    /// The script is uploaded under `name` (generated when `None`), run and
    /// removed. Its own name is available to it as `$"_"` unless `params`
    /// already define `_`. If the upload is refused the upload reply is
    /// returned and nothing is run; otherwise the reply to the run.
    pub fn exec(
        &mut self,
        source: &str,
        params: ScriptParams<'_>,
        policy: Option<&str>,
        name: Option<&str>,
    ) -> SessionResult<ResponseCollection> {
        match self.run_script(source, params, policy, name, false)? {
            ScriptRun::Rejected(upload) => Ok(upload),
            ScriptRun::Finished { result, .. } => Ok(result),
        }
    }

    pub(crate) fn run_script(
        &mut self,
        source: &str,
        mut params: ScriptParams<'_>,
        policy: Option<&str>,
        name: Option<&str>,
        retrieve: bool,
    ) -> SessionResult<ScriptRun> {
        let name = match name {
            Some(name) => name.to_string(),
            None => self.names.next_name(),
        };
        if !params.contains(SCRIPT_NAME_PARAM) {
            params.push(SCRIPT_NAME_PARAM, ScriptParam::Value(Value::text(&name)));
        }

        let mut script = SpooledTempFile::new(self.config.spool_limit);
        let menu = self.menu_as_script();
        writeln!(script, "{}", menu)?;
        let written = append_script_chunked(&mut script, source, &mut params, self.config.effective_chunk_size())?;
        script.write_all(b"\n")?;
        script.seek(SeekFrom::Start(0))?;
        debug!(
            "Uploading script '{}' ({} bytes)",
            name,
            menu.len() + written + 2
        );

        let mut upload = Request::new("/system/script/add").with_argument("name", name.as_str());
        if let Some(policy) = policy {
            upload.set_argument("policy", policy);
        }
        let uploaded = self.send_with_body(&upload, "source", &mut script)?;
        if uploaded.has_errors() {
            warn!("Script '{}' was not accepted", name);
            return Ok(ScriptRun::Rejected(uploaded));
        }

        let outcome = self.run_uploaded(&name, retrieve);
        let removal = self.send(&Request::new("/system/script/remove").with_argument("numbers", name.as_str()));
        let (result, source) = outcome?;
        if removal?.has_errors() {
            warn!("Script '{}' could not be removed", name);
        }
        Ok(ScriptRun::Finished { result, source })
    }

    fn run_uploaded(
        &mut self,
        name: &str,
        retrieve: bool,
    ) -> SessionResult<(ResponseCollection, Option<Vec<u8>>)> {
        let result = self.send(&Request::new("/system/script/run").with_argument("number", name))?;
        if result.has_errors() {
            debug!("Script '{}' reported errors", name);
        }
        if !retrieve {
            return Ok((result, None));
        }
        let print = Request::new("/system/script/print")
            .with_argument(".proplist", "source")
            .with_query(Query::where_equal("name", name));
        let source = self
            .send(&print)?
            .of_type(ResponseType::Data)
            .property_bytes("source")
            .map(<[u8]>::to_vec);
        Ok((result, source))
    }
}
