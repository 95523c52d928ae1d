//! Menu navigation, item resolution and bulk commands.

use std::borrow::Cow;

use chrono::{DateTime, FixedOffset, TimeZone};
use ros_script::{decode, Value};
use tracing::{debug, warn};

use crate::config::SessionConfig;
use crate::connection::{send_traced, send_traced_with_body, Connection, SeekRead};
use crate::criteria::{as_position, Criteria};
use crate::error::{SessionError, SessionResult};
use crate::naming::{HostScriptNames, ScriptNameGenerator};
use crate::request::{Properties, Query, Request};
use crate::response::{ResponseCollection, ResponseType};

/// `print` arguments that turn a request into a never-ending stream.
const PROHIBITED_PRINT_ARGUMENTS: [&str; 3] = ["follow", "follow-only", "count-only"];

/// A session wrapper holding the current menu and its cached item IDs.
///
/// Every command is built relative to the current menu. The ID cache holds
/// the IDs of the menu's items in listing order, so positions can be
/// translated to IDs without listing the menu on every call. `None` means
/// the cache is unknown; `Some(vec![])` means the menu was listed and had
/// no items.
pub struct Util<C> {
    pub(crate) connection: C,
    pub(crate) config: SessionConfig,
    pub(crate) names: Box<dyn ScriptNameGenerator>,
    menu: String,
    id_cache: Option<Vec<String>>,
}

impl<C: Connection> Util<C> {
    /// Wrap a connection, starting at the root menu.
    pub fn new(connection: C) -> Self {
        Util::with_config(connection, SessionConfig::default())
    }

    /// Wrap a connection with explicit configuration.
    pub fn with_config(connection: C, config: SessionConfig) -> Self {
        let names = HostScriptNames::new(config.script_name_prefix.clone());
        Util {
            connection,
            config,
            names: Box::new(names),
            menu: "/".to_string(),
            id_cache: None,
        }
    }

    /// Replace the generator of transient script names.
    pub fn with_name_generator(mut self, names: impl ScriptNameGenerator + 'static) -> Self {
        self.names = Box::new(names);
        self
    }

    /// Get the underlying connection.
    pub fn connection(&self) -> &C {
        &self.connection
    }

    /// Get the underlying connection mutably.
    pub fn connection_mut(&mut self) -> &mut C {
        &mut self.connection
    }

    /// Unwrap the connection.
    pub fn into_inner(self) -> C {
        self.connection
    }

    /// Get the session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // ========================================================================
    // Menu
    // ========================================================================

    /// Get the current menu, e.g. `/ip/address`.
    pub fn menu(&self) -> &str {
        &self.menu
    }

    /// Change the current menu.
    ///
    /// Absolute paths (leading `/`) replace the menu; relative ones are
    /// appended to it. Both `/` and spaces separate levels and `..` goes up
    /// one level. An empty path keeps the menu. The ID cache is cleared in
    /// every case, including the empty path.
    pub fn set_path(&mut self, path: &str) -> &mut Self {
        if !path.is_empty() {
            let mut levels: Vec<String> = if path.starts_with('/') {
                Vec::new()
            } else {
                self.levels().map(str::to_string).collect()
            };
            for token in path
                .split(|c: char| c == '/' || c.is_whitespace())
                .filter(|t| !t.is_empty())
            {
                if token == ".." {
                    levels.pop();
                } else {
                    levels.push(token.to_string());
                }
            }
            self.menu = format!("/{}", levels.join("/"));
            debug!("Menu changed to '{}'", self.menu);
        }
        self.clear_id_cache();
        self
    }

    /// Get the cached IDs, if known.
    pub fn id_cache(&self) -> Option<&[String]> {
        self.id_cache.as_deref()
    }

    /// Forget the cached IDs; the next positional lookup lists the menu again.
    pub fn clear_id_cache(&mut self) -> &mut Self {
        if self.id_cache.take().is_some() {
            debug!("ID cache of '{}' cleared", self.menu);
        }
        self
    }

    fn levels(&self) -> impl Iterator<Item = &str> {
        self.menu.split('/').filter(|l| !l.is_empty())
    }

    /// The current menu in script syntax, e.g. `/ip address`.
    pub(crate) fn menu_as_script(&self) -> String {
        format!("/{}", self.levels().collect::<Vec<_>>().join(" "))
    }

    /// Full command path for an action at the current menu.
    pub(crate) fn command(&self, action: &str) -> String {
        if self.menu == "/" {
            format!("/{}", action)
        } else {
            format!("{}/{}", self.menu, action)
        }
    }

    pub(crate) fn send(&mut self, request: &Request) -> SessionResult<ResponseCollection> {
        send_traced(&mut self.connection, request)
    }

    pub(crate) fn send_with_body(
        &mut self,
        request: &Request,
        name: &str,
        body: &mut dyn SeekRead,
    ) -> SessionResult<ResponseCollection> {
        send_traced_with_body(&mut self.connection, request, name, body)
    }

    /// Create a request for a command at the current menu.
    ///
    /// `command` is a single action such as `print`; anything containing `/`
    /// would leave the menu and is rejected. Flags in `args` become empty
    /// arguments.
    pub fn new_request(
        &self,
        command: &str,
        args: &Properties,
        query: Option<Query>,
    ) -> SessionResult<Request> {
        if command.contains('/') {
            return Err(SessionError::MenuMismatch(command.to_string()));
        }
        let mut request = Request::new(self.command(command));
        args.apply_as_arguments(&mut request);
        if let Some(query) = query {
            request = request.with_query(query);
        }
        Ok(request)
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Turn selectors into a comma separated list of item IDs.
    ///
    /// With no criteria, all items are returned, from the ID cache when it
    /// is known. Otherwise each criterion contributes its IDs in order:
    ///
    /// - a position is looked up in the ID cache (listing the menu if
    ///   needed); positions past the end contribute nothing
    /// - a string that is a position is treated as one
    /// - any other string without commas passes through unchanged
    /// - a comma list passes `*` IDs through and resolves the other parts
    /// - a query lists the matching items, leaving the cache alone
    /// - a predicate lists every item, keeps those it accepts, and
    ///   rebuilds the cache from that listing
    pub fn resolve(&mut self, criteria: &[Criteria<'_>]) -> SessionResult<String> {
        if criteria.is_empty() {
            return Ok(self.ensure_id_cache()?.join(","));
        }
        let mut ids = Vec::new();
        self.resolve_into(criteria, &mut ids)?;
        Ok(ids.join(","))
    }

    fn resolve_into(&mut self, criteria: &[Criteria<'_>], ids: &mut Vec<String>) -> SessionResult<()> {
        for criterion in criteria {
            match criterion {
                Criteria::Index(n) => ids.extend(self.id_at(*n)?),
                Criteria::Query(query) => {
                    let request = Request::new(self.command("print"))
                        .with_argument(".proplist", ".id")
                        .with_query(query.clone());
                    let responses = self.send(&request)?;
                    ids.extend(data_ids(&responses));
                }
                Criteria::Predicate(accept) => {
                    let responses = self.send(&Request::new(self.command("print")))?;
                    let mut cache = Vec::new();
                    for response in responses.iter().filter(|r| r.kind() == ResponseType::Data) {
                        let Some(id) = response.property(".id") else {
                            continue;
                        };
                        if accept(response) {
                            ids.push(id.to_string());
                        }
                        cache.push(id.to_string());
                    }
                    debug!("ID cache of '{}' rebuilt with {} items", self.menu, cache.len());
                    self.id_cache = Some(cache);
                }
                Criteria::Name(text) => self.resolve_text(text, ids)?,
            }
        }
        Ok(())
    }

    fn resolve_text(&mut self, text: &str, ids: &mut Vec<String>) -> SessionResult<()> {
        if let Some(n) = as_position(text) {
            ids.extend(self.id_at(n)?);
            return Ok(());
        }
        if !text.contains(',') {
            ids.push(text.to_string());
            return Ok(());
        }
        let mut rest = Vec::new();
        for segment in text.split(',').filter(|s| !s.is_empty()) {
            if segment.starts_with('*') {
                ids.push(segment.to_string());
            } else {
                rest.push(Criteria::Name(Cow::Owned(segment.to_string())));
            }
        }
        if !rest.is_empty() {
            self.resolve_into(&rest, ids)?;
        }
        Ok(())
    }

    fn id_at(&mut self, position: i64) -> SessionResult<Option<String>> {
        let cache = self.ensure_id_cache()?;
        Ok(usize::try_from(position)
            .ok()
            .and_then(|i| cache.get(i))
            .cloned())
    }

    fn ensure_id_cache(&mut self) -> SessionResult<&[String]> {
        if self.id_cache.is_none() {
            let responses = self.send(&Request::new(self.command("find")))?;
            let ids: Vec<String> = match ret(&responses) {
                Some(ret) => ret
                    .split([';', ','])
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
                    .collect(),
                None => Vec::new(),
            };
            debug!("ID cache of '{}' rebuilt with {} items", self.menu, ids.len());
            self.id_cache = Some(ids);
        }
        Ok(self.id_cache.as_deref().unwrap_or_default())
    }

    // ========================================================================
    // Bulk commands
    // ========================================================================

    fn bulk(&mut self, action: &str, criteria: &[Criteria<'_>]) -> SessionResult<ResponseCollection> {
        let numbers = self.resolve(criteria)?;
        let request = Request::new(self.command(action)).with_argument("numbers", numbers);
        self.send(&request)
    }

    /// Enable the selected items (all items when `criteria` is empty).
    pub fn enable(&mut self, criteria: &[Criteria<'_>]) -> SessionResult<ResponseCollection> {
        self.bulk("enable", criteria)
    }

    /// Disable the selected items (all items when `criteria` is empty).
    pub fn disable(&mut self, criteria: &[Criteria<'_>]) -> SessionResult<ResponseCollection> {
        self.bulk("disable", criteria)
    }

    /// Remove the selected items (all items when `criteria` is empty).
    pub fn remove(&mut self, criteria: &[Criteria<'_>]) -> SessionResult<ResponseCollection> {
        let result = self.bulk("remove", criteria);
        self.clear_id_cache();
        result
    }

    /// Set the comment of the selected items.
    pub fn comment(
        &mut self,
        criteria: &[Criteria<'_>],
        comment: impl Into<Value>,
    ) -> SessionResult<ResponseCollection> {
        let numbers = self.resolve(criteria)?;
        let request = Request::new(self.command("comment"))
            .with_argument("comment", comment)
            .with_argument("numbers", numbers);
        self.send(&request)
    }

    /// Set properties on the selected items.
    ///
    /// `None` targets menus without items (`/system identity`). Flags are
    /// sent as `name=true`.
    pub fn set(
        &mut self,
        criteria: Option<&[Criteria<'_>]>,
        values: &Properties,
    ) -> SessionResult<ResponseCollection> {
        let mut request = Request::new(self.command("set"));
        values.apply_as_values(&mut request);
        if let Some(criteria) = criteria {
            let numbers = self.resolve(criteria)?;
            request.set_argument("numbers", numbers);
        }
        self.send(&request)
    }

    /// Set one property, or unset it when `value` is `None`.
    pub fn edit(
        &mut self,
        criteria: &[Criteria<'_>],
        value_name: &str,
        value: Option<Value>,
    ) -> SessionResult<ResponseCollection> {
        match value {
            Some(value) => self.set(Some(criteria), &Properties::new().with(value_name, value)),
            None => self.unset(criteria, value_name),
        }
    }

    /// Unset a property of the selected items.
    pub fn unset(
        &mut self,
        criteria: &[Criteria<'_>],
        value_name: &str,
    ) -> SessionResult<ResponseCollection> {
        let numbers = self.resolve(criteria)?;
        let request = Request::new(self.command("unset"))
            .with_argument("numbers", numbers)
            .with_argument("value-name", value_name);
        self.send(&request)
    }

    /// Add one item per entry of `items`.
    ///
    /// Returns the new IDs comma separated, with an empty slot for each item
    /// the device did not add (`*1D,,*1E`). New IDs are appended to a known
    /// ID cache.
    pub fn add(&mut self, items: &[Properties]) -> SessionResult<String> {
        let mut added = Vec::with_capacity(items.len());
        for values in items {
            let mut request = Request::new(self.command("add"));
            values.apply_as_values(&mut request);
            let responses = self.send(&request)?;
            let id = ret(&responses).unwrap_or_default().to_string();
            if id.is_empty() {
                warn!("'{}' did not return a new ID", request.command());
            } else if let Some(cache) = self.id_cache.as_mut() {
                cache.push(id.clone());
            }
            added.push(id);
        }
        Ok(added.join(","))
    }

    /// Move the selected items above the first item matched by `destination`.
    pub fn move_items(
        &mut self,
        criteria: &[Criteria<'_>],
        destination: &[Criteria<'_>],
    ) -> SessionResult<ResponseCollection> {
        let numbers = self.resolve(criteria)?;
        let destination = self.resolve(destination)?;
        let first = destination.split(',').next().unwrap_or_default().to_string();
        let request = Request::new(self.command("move"))
            .with_argument("numbers", numbers)
            .with_argument("destination", first);
        self.clear_id_cache();
        self.send(&request)
    }

    /// Count items, optionally filtered; `-1` when the menu cannot be counted.
    pub fn count(&mut self, query: Option<&Query>) -> i64 {
        let mut request = Request::new(self.command("print")).with_argument("count-only", Value::Null);
        if let Some(query) = query {
            request = request.with_query(query.clone());
        }
        let responses = match self.send(&request) {
            Ok(responses) => responses,
            Err(e) => {
                warn!("Counting at '{}' failed: {}", self.menu, e);
                return -1;
            }
        };
        match responses
            .last()
            .and_then(|r| r.property("ret"))
            .and_then(|ret| ret.trim().parse::<i64>().ok())
        {
            Some(count) => count,
            None => {
                warn!("Counting at '{}' returned no count", self.menu);
                -1
            }
        }
    }

    /// List items with `print`.
    ///
    /// Returns only data entries, or `None` when the device reported an
    /// error. Arguments that would make the listing never end are rejected.
    pub fn get_all(
        &mut self,
        args: &Properties,
        query: Option<Query>,
    ) -> SessionResult<Option<ResponseCollection>> {
        if let Some(name) = PROHIBITED_PRINT_ARGUMENTS
            .iter()
            .find(|name| args.contains(name))
        {
            return Err(SessionError::ProhibitedArgument(name.to_string()));
        }
        let request = self.new_request("print", args, query)?;
        let responses = self.send(&request)?;
        if responses.has_errors() {
            return Ok(None);
        }
        Ok(Some(responses.of_type(ResponseType::Data)))
    }

    /// Read one property of one item.
    ///
    /// `None` as the item targets menus without items. A position past the
    /// end of the listing, or an error from the device, gives `None`.
    pub fn get(
        &mut self,
        item: Option<Criteria<'_>>,
        value_name: &str,
    ) -> SessionResult<Option<String>> {
        let number = match item {
            Some(criterion) => {
                let id = self.resolve(std::slice::from_ref(&criterion))?;
                if id.is_empty() {
                    return Ok(None);
                }
                Some(id)
            }
            None => None,
        };

        let mut request = Request::new(self.command("get")).with_argument("value-name", value_name);
        if let Some(number) = &number {
            request.set_argument("number", number.as_str());
        }
        let responses = self.send(&request)?;
        if responses.has_errors() {
            return Ok(None);
        }
        if let Some(value) = ret(&responses) {
            return Ok(Some(value.to_string()));
        }

        // Older devices answer `get` with an empty reply; read it from a listing.
        let query = number.map(|n| Query::where_equal(".id", n.as_str()).or_where_equal("name", n));
        let args = Properties::new().with(".proplist", value_name).flag("detail");
        Ok(self
            .get_all(&args, query)?
            .and_then(|items| items.property(value_name).map(str::to_string)))
    }

    /// Read the device clock.
    ///
    /// Uses the clock's GMT offset as the time zone. `None` when the clock
    /// cannot be read or parsed.
    pub fn current_time(&mut self) -> SessionResult<Option<DateTime<FixedOffset>>> {
        let request = Request::new("/system/clock/print").with_argument(".proplist", "date,time,gmt-offset");
        let responses = self.send(&request)?;
        let clock = match responses.of_type(ResponseType::Data).first() {
            Some(clock) => clock.clone(),
            None => return Ok(None),
        };
        let (Some(date), Some(time)) = (clock.property("date"), clock.property("time")) else {
            return Ok(None);
        };
        let local = match decode(&format!("{} {}", date, time)) {
            Value::Timestamp(t) => t.naive_utc(),
            _ => return Ok(None),
        };
        let offset = clock
            .property("gmt-offset")
            .map_or(Some(0), parse_gmt_offset)
            .and_then(FixedOffset::east_opt);
        Ok(offset.and_then(|offset| offset.from_local_datetime(&local).single()))
    }
}

/// The `ret` property of a reply, from whichever entry carries it.
pub(crate) fn ret(responses: &ResponseCollection) -> Option<&str> {
    responses.iter().find_map(|r| r.property("ret"))
}

fn data_ids(responses: &ResponseCollection) -> impl Iterator<Item = String> + '_ {
    responses
        .iter()
        .filter(|r| r.kind() == ResponseType::Data)
        .filter_map(|r| r.property(".id"))
        .map(str::to_string)
}

/// Parse `+02:00`, `-05:30` or a signed second count into seconds east of UTC.
fn parse_gmt_offset(text: &str) -> Option<i32> {
    let text = text.trim();
    let (sign, digits) = match text.as_bytes().first() {
        Some(b'-') => (-1, &text[1..]),
        Some(b'+') => (1, &text[1..]),
        _ => (1, text),
    };
    let seconds = if let Some((h, m)) = digits.split_once(':') {
        let hours = h.parse::<i32>().ok()?.checked_mul(3600)?;
        hours.checked_add(m.parse::<i32>().ok()?.checked_mul(60)?)?
    } else {
        digits.parse::<i32>().ok()?
    };
    seconds.checked_mul(sign)
}
