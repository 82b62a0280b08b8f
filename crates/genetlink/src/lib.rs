//! Blocking generic netlink client for Linux.
//!
//! This crate opens a `NETLINK_GENERIC` socket, sends one request at a time
//! and collects the complete reply, reassembling multi-part dumps and
//! turning kernel error records into [`Error`] values. Messages and
//! attributes are plain owned values with explicit byte-order codecs.
//!
//! Family-specific protocols (resolving family IDs, multicast groups,
//! typed commands) are built on top by callers with the types in
//! [`netlink::genl`] and [`netlink::attr`].
//!
//! # Example
//!
//! ```rust,no_run
//! use genetlink::netlink::genl::{CtrlAttr, CtrlCmd, GENL_ID_CTRL, GenlMessage};
//! use genetlink::netlink::message::NLM_F_REQUEST;
//! use genetlink::netlink::{Attribute, NetlinkMessage};
//! use genetlink::Connection;
//!
//! fn main() -> genetlink::Result<()> {
//!     let conn = Connection::open()?;
//!     let order = conn.byte_order();
//!
//!     // Look up the controller family itself
//!     let genl = GenlMessage::new(CtrlCmd::GetFamily as u8, 1)
//!         .with_attr(Attribute::string(CtrlAttr::FamilyName as u16, "nlctrl")?, order)?;
//!     let replies = conn.request(NetlinkMessage::genl(GENL_ID_CTRL, NLM_F_REQUEST, &genl))?;
//!
//!     for attr in replies[0].genl_payload()?.attrs(order) {
//!         let attr = attr?;
//!         if attr.kind() == CtrlAttr::FamilyId as u16 {
//!             println!("nlctrl id: {}", attr.as_u16(order)?);
//!         }
//!     }
//!
//!     conn.close()
//! }
//! ```

pub mod netlink;
pub mod util;

// Re-export common types at crate root for convenience
pub use netlink::{Connection, Error, Result};
