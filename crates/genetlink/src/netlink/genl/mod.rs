//! Generic Netlink (GENL) message support.
//!
//! Generic Netlink multiplexes many kernel subsystems ("families") over one
//! netlink protocol. Each family has a dynamically assigned ID that is used
//! as the `nlmsg_type` of its messages; only the controller family has a
//! fixed ID ([`GENL_ID_CTRL`]).
//!
//! This module provides the GENL header codec and the controller family
//! constants. Resolving family names is left to callers, which build
//! controller requests with these types and send them through
//! [`Connection::request`](crate::netlink::Connection::request).
//!
//! # Example
//!
//! ```rust,no_run
//! use genetlink::netlink::genl::{CtrlAttr, CtrlCmd, GENL_ID_CTRL, GenlMessage};
//! use genetlink::netlink::message::NLM_F_REQUEST;
//! use genetlink::netlink::{Attribute, Connection, NetlinkMessage};
//!
//! # fn example() -> genetlink::Result<()> {
//! let conn = Connection::open()?;
//! let order = conn.byte_order();
//!
//! let genl = GenlMessage::new(CtrlCmd::GetFamily as u8, 1)
//!     .with_attr(Attribute::string(CtrlAttr::FamilyName as u16, "nlctrl")?, order)?;
//! let replies = conn.request(NetlinkMessage::genl(GENL_ID_CTRL, NLM_F_REQUEST, &genl))?;
//! println!("{} reply message(s)", replies.len());
//! # Ok(())
//! # }
//! ```

mod header;

pub use header::{GENL_HDRLEN, GenlMessage, GenlMsgHdr};

// Control family constants (fixed, not dynamically assigned)
pub const GENL_ID_CTRL: u16 = 0x10;

/// Control family commands
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtrlCmd {
    Unspec = 0,
    NewFamily = 1,
    DelFamily = 2,
    GetFamily = 3,
    NewOps = 4,
    DelOps = 5,
    GetOps = 6,
    NewMcastGrp = 7,
    DelMcastGrp = 8,
    GetMcastGrp = 9,
    GetPolicy = 10,
}

/// Control family attributes
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtrlAttr {
    Unspec = 0,
    FamilyId = 1,
    FamilyName = 2,
    Version = 3,
    HdrSize = 4,
    MaxAttr = 5,
    Ops = 6,
    McastGroups = 7,
    Policy = 8,
    OpPolicy = 9,
    Op = 10,
}

/// Control family multicast group attributes
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtrlAttrMcastGrp {
    Unspec = 0,
    Name = 1,
    Id = 2,
}
