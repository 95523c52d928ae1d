//! RouterOS API convenience layer.
//!
//! This crate wraps a [`Connection`] to a RouterOS device and provides the
//! operations a configuration tool needs on top of raw requests:
//!
//! - **Menu navigation**: a current menu path that every command is built
//!   relative to (`/ip/address`, `/interface/bridge/port`, ...)
//! - **Item selection**: [`Util::resolve`] turns positional numbers, names,
//!   comma lists, queries and predicates into the device's stable item IDs,
//!   caching the positional ID list of the current menu
//! - **Bulk commands**: enable, disable, remove, comment, set, unset, add,
//!   move, count and print at the current menu
//! - **Scripts**: [`assemble_script`] prepends parameters as `:local`
//!   declarations; [`Util::exec`] uploads, runs and removes a one-off script
//! - **Files**: [`Util::file_put_contents`] and [`Util::file_get_contents`]
//!   emulate file I/O using only the device's `/file` and script menus
//!
//! The transport itself is out of scope; anything that can send a
//! [`Request`], stream one of its arguments from a [`SeekRead`], and return
//! a [`ResponseCollection`] can be wrapped.
//!
//! # Example
//!
//! ```rust,ignore
//! use ros_util::{Criteria, Properties, Util};
//!
//! let mut util = Util::new(connection);
//! util.set_path("/ip/address");
//! util.add(&[Properties::new().with("address", "10.0.0.1/24").with("interface", "ether1")])?;
//! util.disable(&[Criteria::from(0)])?;
//! ```

mod config;
mod connection;
mod criteria;
mod error;
mod file;
mod menu;
mod naming;
mod request;
mod response;
mod script;

pub use config::*;
pub use connection::*;
pub use criteria::*;
pub use error::*;
pub use file::*;
pub use menu::*;
pub use naming::*;
pub use request::*;
pub use response::*;
pub use script::*;
