//! Blocking generic netlink protocol implementation for Linux.
//!
//! This module provides the message and attribute codecs and a
//! request/response [`Connection`] over a `NETLINK_GENERIC` socket.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use genetlink::netlink::genl::{CtrlCmd, GENL_ID_CTRL, GenlMessage};
//! use genetlink::netlink::message::{NLM_F_DUMP, NLM_F_REQUEST};
//! use genetlink::netlink::{Connection, NetlinkMessage};
//!
//! # fn example() -> genetlink::Result<()> {
//! let conn = Connection::open()?;
//!
//! let genl = GenlMessage::new(CtrlCmd::GetFamily as u8, 1);
//! let families = conn.request(NetlinkMessage::genl(
//!     GENL_ID_CTRL,
//!     NLM_F_REQUEST | NLM_F_DUMP,
//!     &genl,
//! ))?;
//! println!("{} families registered", families.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Byte Order
//!
//! Netlink headers and most attributes use the host's byte order. Every
//! encode and decode call takes an explicit [`ByteOrder`]; use
//! [`host_order`] or [`Connection::byte_order`] when talking to the kernel.

pub mod attr;
pub mod config;
pub mod connection;
pub mod endian;
mod error;
#[cfg(test)]
mod fixtures;
pub mod genl;
pub mod message;
pub mod socket;

pub use attr::{AttrIter, Attribute};
pub use config::{ConnectionConfig, PortId};
pub use connection::Connection;
pub use endian::{ByteOrder, host_order};
pub use error::{Error, Result};
pub use genl::{GenlMessage, GenlMsgHdr};
pub use message::{MessageIter, NLMSG_HDRLEN, NetlinkMessage, NlMsgError, NlMsgHdr, NlMsgType};
pub use socket::{NetlinkSocket, Transport};
