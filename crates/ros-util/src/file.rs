//! File contents over the `/file` menu.
//!
//! The device has no command to read a file and writes to it complete at
//! some unspecified point after the command returns. Writing therefore
//! waits for the configured settle delay between steps, and reading copies
//! the file into a transient script's source and reads that back.

use std::io::{Cursor, Seek, SeekFrom};

use tracing::{debug, warn};

use crate::connection::{Connection, SeekRead};
use crate::error::SessionResult;
use crate::menu::Util;
use crate::request::{Query, Request};
use crate::response::ResponseType;
use crate::script::{ScriptParams, ScriptRun};

/// Script copying `$filename`'s contents into its own source.
const READ_FILE_SCRIPT: &str = "/system script set $\"_\" source=[/file get $filename contents]";

/// New contents for a file.
pub enum FileData<'a> {
    /// Contents in memory.
    Bytes(&'a [u8]),
    /// Contents from the current position of a stream to its end.
    /// The stream is left at the position it started from.
    Stream(&'a mut dyn SeekRead),
}

impl<'a> From<&'a [u8]> for FileData<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        FileData::Bytes(bytes)
    }
}

impl<'a> From<&'a str> for FileData<'a> {
    fn from(text: &'a str) -> Self {
        FileData::Bytes(text.as_bytes())
    }
}

impl<'a> From<&'a Vec<u8>> for FileData<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        FileData::Bytes(bytes)
    }
}

impl<C: Connection> Util<C> {
    /// Write, replace or delete a file.
    ///
    /// With `data`, the file is created (or replaced, if `overwrite`) and
    /// `true` is returned when the size reported afterwards matches. A
    /// stream is passed to the connection as it is, never read into memory
    /// here, and is rewound to its starting position afterwards. Without
    /// `data`, the file is deleted and `true` is returned when it is gone.
    /// `false` also covers an existing file without `overwrite` and deleting
    /// a file that does not exist.
    pub fn file_put_contents(
        &mut self,
        name: &str,
        data: Option<FileData<'_>>,
        overwrite: bool,
    ) -> SessionResult<bool> {
        let check = Request::new("/file/print")
            .with_argument(".proplist", "")
            .with_query(Query::where_equal("name", name));
        let exists = self.send(&check)?.len() > 1;

        let Some(data) = data else {
            if !exists {
                debug!("File '{}' does not exist, nothing to remove", name);
                return Ok(false);
            }
            self.send(&Request::new("/file/remove").with_argument("numbers", name))?;
            self.settle();
            let removed = self.send(&check)?.len() <= 1;
            if !removed {
                warn!("File '{}' is still present after removal", name);
            }
            return Ok(removed);
        };

        if exists && !overwrite {
            debug!("File '{}' exists and overwrite was not requested", name);
            return Ok(false);
        }
        let create = check.clone().with_argument("file", name);
        if self.send(&create)?.has_errors() {
            warn!("File '{}' could not be created", name);
            return Ok(false);
        }
        self.settle();

        let mut cursor;
        let body: &mut dyn SeekRead = match data {
            FileData::Bytes(bytes) => {
                cursor = Cursor::new(bytes);
                &mut cursor
            }
            FileData::Stream(stream) => stream,
        };
        let start = body.stream_position()?;
        let end = body.seek(SeekFrom::End(0))?;
        body.seek(SeekFrom::Start(start))?;
        let expected = end.saturating_sub(start).to_string();

        let write = Request::new("/file/set").with_argument("numbers", name);
        self.send(&write.clone().with_argument("contents", ""))?;
        let written = self.send_with_body(&write, "contents", body);
        body.seek(SeekFrom::Start(start))?;
        written?;
        self.settle();

        let size_request = check.with_argument(".proplist", "size");
        let size = self
            .send(&size_request)?
            .of_type(ResponseType::Data)
            .property("size")
            .map(|s| s.trim().to_string());
        let verified = size.as_deref() == Some(expected.as_str());
        if !verified {
            warn!(
                "File '{}' reports size {:?}, expected {}",
                name, size, expected
            );
        }
        Ok(verified)
    }

    /// Read a file's contents as bytes; `None` if it does not exist or
    /// cannot be read.
    ///
    /// `script_name` names the transient script used for the copy; a name
    /// is generated when `None`.
    pub fn file_get_contents(
        &mut self,
        name: &str,
        script_name: Option<&str>,
    ) -> SessionResult<Option<Vec<u8>>> {
        let check = Request::new("/file/print").with_query(Query::where_equal("name", name));
        if self.send(&check)?.count_of(ResponseType::Data) == 0 {
            debug!("File '{}' does not exist", name);
            return Ok(None);
        }
        let params = ScriptParams::new().with("filename", name);
        match self.run_script(READ_FILE_SCRIPT, params, None, script_name, true)? {
            ScriptRun::Rejected(_) => Ok(None),
            ScriptRun::Finished { source, .. } => Ok(source),
        }
    }

    fn settle(&self) {
        let delay = self.config.settle_delay();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}
