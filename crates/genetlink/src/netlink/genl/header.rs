//! Generic Netlink message header.
//!
//! GENL messages have an additional header after the standard netlink header:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ nlmsghdr (16 bytes)                     │
//! │   nlmsg_len, nlmsg_type (family_id),    │
//! │   nlmsg_flags, nlmsg_seq, nlmsg_pid     │
//! ├─────────────────────────────────────────┤
//! │ genlmsghdr (4 bytes)                    │
//! │   cmd (u8), version (u8), reserved (u16)│
//! ├─────────────────────────────────────────┤
//! │ Attributes (TLV format)                 │
//! └─────────────────────────────────────────┘
//! ```

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::netlink::attr::{AttrIter, Attribute};
use crate::netlink::endian::ByteOrder;
use crate::netlink::error::{Error, Result};
use crate::netlink::message::NetlinkMessage;

/// Generic Netlink message header.
///
/// This header immediately follows the standard netlink header in GENL messages.
/// `reserved` is always written as zero and never read back.
#[repr(C)]
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned,
)]
pub struct GenlMsgHdr {
    /// Command identifier (family-specific)
    pub cmd: u8,
    /// Interface version
    pub version: u8,
    /// Reserved for future use
    pub reserved: [u8; 2],
}

/// Size of the GENL header in bytes.
pub const GENL_HDRLEN: usize = std::mem::size_of::<GenlMsgHdr>();

impl GenlMsgHdr {
    /// Create a new GENL header with the given command and version.
    #[inline]
    pub const fn new(cmd: u8, version: u8) -> Self {
        Self {
            cmd,
            version,
            reserved: [0; 2],
        }
    }
}

/// A generic netlink payload: GENL header followed by an attribute stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenlMessage {
    /// GENL header.
    pub header: GenlMsgHdr,
    /// Bytes after the header, usually concatenated attributes.
    pub payload: Vec<u8>,
}

impl GenlMessage {
    /// Create a message with an empty payload.
    pub fn new(cmd: u8, version: u8) -> Self {
        Self {
            header: GenlMsgHdr::new(cmd, version),
            payload: Vec::new(),
        }
    }

    /// Append an attribute to the payload.
    ///
    /// The payload is left unchanged if the attribute cannot be encoded.
    pub fn push_attr(&mut self, mut attr: Attribute, order: ByteOrder) -> Result<&mut Self> {
        self.payload.extend(attr.encode(order)?);
        Ok(self)
    }

    /// Builder form of [`push_attr`](Self::push_attr).
    pub fn with_attr(mut self, attr: Attribute, order: ByteOrder) -> Result<Self> {
        self.push_attr(attr, order)?;
        Ok(self)
    }

    /// Iterate over the attributes in the payload.
    pub fn attrs(&self, order: ByteOrder) -> AttrIter<'_> {
        AttrIter::new(&self.payload, order)
    }

    /// Encode header and payload. No padding is added at this layer.
    pub fn encode(&self) -> Vec<u8> {
        let header = GenlMsgHdr::new(self.header.cmd, self.header.version);
        let mut buf = Vec::with_capacity(GENL_HDRLEN + self.payload.len());
        buf.extend_from_slice(header.as_bytes());
        buf.extend_from_slice(&self.payload);
        buf
    }

    /// Decode a GENL header and copy the remaining bytes as payload.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let (header, payload) = GenlMsgHdr::ref_from_prefix(buf).map_err(|_| {
            Error::MalformedMessage(format!(
                "GENL header needs {} bytes, got {}",
                GENL_HDRLEN,
                buf.len()
            ))
        })?;

        Ok(Self {
            header: GenlMsgHdr::new(header.cmd, header.version),
            payload: payload.to_vec(),
        })
    }
}

impl NetlinkMessage {
    /// Create a netlink message addressed to a GENL family.
    pub fn genl(family_id: u16, flags: u16, msg: &GenlMessage) -> Self {
        Self::new(family_id, flags, msg.encode())
    }

    /// Decode the GENL header and payload carried by this message.
    pub fn genl_payload(&self) -> Result<GenlMessage> {
        GenlMessage::decode(&self.payload)
    }
}
