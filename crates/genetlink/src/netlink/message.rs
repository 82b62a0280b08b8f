//! Netlink message header and parsing.
//!
//! Wire layout of one message (all integers in host byte order):
//!
//! ```text
//! ┌──────────────┬────────────┬─────────────┬─────────────┬─────────────┐
//! │ nlmsg_len u32│ type   u16 │ flags   u16 │ seq     u32 │ pid     u32 │
//! ├──────────────┴────────────┴─────────────┴─────────────┴─────────────┤
//! │ payload (nlmsg_len - 16 bytes), zero padded to a 4-byte boundary    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use super::attr::{AttrIter, get};
use super::endian::ByteOrder;
use super::error::{Error, Result};
use crate::util::align_up;

/// Netlink message header alignment.
pub const NLMSG_ALIGNTO: usize = 4;

/// Align a length to NLMSG_ALIGNTO boundary.
#[inline]
pub const fn nlmsg_align(len: usize) -> usize {
    align_up(len, NLMSG_ALIGNTO)
}

/// Size of the netlink message header.
pub const NLMSG_HDRLEN: usize = nlmsg_align(std::mem::size_of::<RawMsgHdr>());

/// On-wire header bytes. Field order matches struct nlmsghdr.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
struct RawMsgHdr {
    len: [u8; 4],
    msg_type: [u8; 2],
    flags: [u8; 2],
    seq: [u8; 4],
    pid: [u8; 4],
}

/// Netlink message header (mirrors struct nlmsghdr).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NlMsgHdr {
    /// Length of message including header.
    pub nlmsg_len: u32,
    /// Message type.
    pub nlmsg_type: u16,
    /// Additional flags.
    pub nlmsg_flags: u16,
    /// Sequence number.
    pub nlmsg_seq: u32,
    /// Sending process port ID.
    pub nlmsg_pid: u32,
}

impl NlMsgHdr {
    /// Create a new message header.
    pub fn new(msg_type: u16, flags: u16) -> Self {
        Self {
            nlmsg_len: NLMSG_HDRLEN as u32,
            nlmsg_type: msg_type,
            nlmsg_flags: flags,
            nlmsg_seq: 0,
            nlmsg_pid: 0,
        }
    }

    /// Check if this is an error message.
    pub fn is_error(&self) -> bool {
        self.nlmsg_type == NlMsgType::ERROR
    }

    /// Check if this is a done message.
    pub fn is_done(&self) -> bool {
        self.nlmsg_type == NlMsgType::DONE
    }

    /// Check if this message has the multi flag.
    pub fn is_multi(&self) -> bool {
        self.nlmsg_flags & NLM_F_MULTI != 0
    }

    fn to_raw(self, order: ByteOrder) -> RawMsgHdr {
        RawMsgHdr {
            len: order.u32_bytes(self.nlmsg_len),
            msg_type: order.u16_bytes(self.nlmsg_type),
            flags: order.u16_bytes(self.nlmsg_flags),
            seq: order.u32_bytes(self.nlmsg_seq),
            pid: order.u32_bytes(self.nlmsg_pid),
        }
    }

    fn from_raw(raw: &RawMsgHdr, order: ByteOrder) -> Self {
        Self {
            nlmsg_len: order.read_u32(raw.len),
            nlmsg_type: order.read_u16(raw.msg_type),
            nlmsg_flags: order.read_u16(raw.flags),
            nlmsg_seq: order.read_u32(raw.seq),
            nlmsg_pid: order.read_u32(raw.pid),
        }
    }

    /// Parse a header from the front of `data`.
    ///
    /// Only the fixed 16 bytes are read; `nlmsg_len` is not checked.
    pub fn from_bytes(data: &[u8], order: ByteOrder) -> Result<Self> {
        let (raw, _) = RawMsgHdr::ref_from_prefix(data).map_err(|_| {
            Error::MalformedMessage(format!(
                "header needs {} bytes, got {}",
                NLMSG_HDRLEN,
                data.len()
            ))
        })?;
        Ok(Self::from_raw(raw, order))
    }
}

/// Standard netlink message types.
pub struct NlMsgType;

impl NlMsgType {
    /// No operation, message must be discarded.
    pub const NOOP: u16 = 1;
    /// Error message or ACK.
    pub const ERROR: u16 = 2;
    /// End of multipart message.
    pub const DONE: u16 = 3;
    /// Data lost, request resend.
    pub const OVERRUN: u16 = 4;
    /// First type available to protocol families.
    pub const MIN_TYPE: u16 = 0x10;
}

/// Netlink message flags.
pub const NLM_F_REQUEST: u16 = 0x01;
pub const NLM_F_MULTI: u16 = 0x02;
pub const NLM_F_ACK: u16 = 0x04;
pub const NLM_F_ECHO: u16 = 0x08;
pub const NLM_F_DUMP_INTR: u16 = 0x10;
pub const NLM_F_DUMP_FILTERED: u16 = 0x20;

// Modifiers to GET request
pub const NLM_F_ROOT: u16 = 0x100;
pub const NLM_F_MATCH: u16 = 0x200;
pub const NLM_F_ATOMIC: u16 = 0x400;
pub const NLM_F_DUMP: u16 = NLM_F_ROOT | NLM_F_MATCH;

// Modifiers to NEW request
pub const NLM_F_REPLACE: u16 = 0x100;
pub const NLM_F_EXCL: u16 = 0x200;
pub const NLM_F_CREATE: u16 = 0x400;
pub const NLM_F_APPEND: u16 = 0x800;

// Flags on ACK/error records
pub const NLM_F_CAPPED: u16 = 0x100;
pub const NLM_F_ACK_TLVS: u16 = 0x200;

/// A netlink message: header plus owned payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetlinkMessage {
    /// Message header. `nlmsg_len` becomes authoritative after [`encode`](Self::encode).
    pub header: NlMsgHdr,
    /// Payload bytes following the header.
    pub payload: Vec<u8>,
}

impl NetlinkMessage {
    /// Create a message with the given type, flags and payload.
    pub fn new(msg_type: u16, flags: u16, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            header: NlMsgHdr::new(msg_type, flags),
            payload: payload.into(),
        }
    }

    /// Encode the message for the wire.
    ///
    /// Sets `header.nlmsg_len` to the unaligned header plus payload length and
    /// returns a buffer padded with zeros to the message alignment. Fails if
    /// the length does not fit the 32-bit length field.
    pub fn encode(&mut self, order: ByteOrder) -> Result<Vec<u8>> {
        let len = NLMSG_HDRLEN + self.payload.len();
        self.header.nlmsg_len = u32::try_from(len).map_err(|_| {
            Error::MalformedMessage(format!(
                "message of {} bytes exceeds the 32-bit length field",
                len
            ))
        })?;

        let mut buf = vec![0u8; nlmsg_align(len)];
        buf[..NLMSG_HDRLEN].copy_from_slice(self.header.to_raw(order).as_bytes());
        buf[NLMSG_HDRLEN..len].copy_from_slice(&self.payload);
        Ok(buf)
    }

    /// Decode one message from the front of `buf`.
    ///
    /// Bytes past `nlmsg_len` are ignored.
    pub fn decode(buf: &[u8], order: ByteOrder) -> Result<Self> {
        let header = NlMsgHdr::from_bytes(buf, order)?;
        let len = header.nlmsg_len as usize;
        if len < NLMSG_HDRLEN || len > buf.len() {
            return Err(Error::MalformedMessage(format!(
                "invalid message length {} for {} byte buffer",
                len,
                buf.len()
            )));
        }

        Ok(Self {
            header,
            payload: buf[NLMSG_HDRLEN..len].to_vec(),
        })
    }

    /// Length this message occupies on the wire, padding included.
    pub fn wire_len(&self) -> usize {
        nlmsg_align(NLMSG_HDRLEN + self.payload.len())
    }

    /// Check if this is an error record or ACK.
    pub fn is_error(&self) -> bool {
        self.header.is_error()
    }

    /// Check if this is a DONE marker.
    pub fn is_done(&self) -> bool {
        self.header.is_done()
    }

    /// Check if this message is part of a multi-part reply.
    pub fn is_multi(&self) -> bool {
        self.header.is_multi()
    }
}

/// Iterator over netlink messages in a received buffer.
///
/// Stops at the first malformed message after yielding its error. A trailing
/// remainder shorter than a header ends iteration.
pub struct MessageIter<'a> {
    data: &'a [u8],
    order: ByteOrder,
}

impl<'a> MessageIter<'a> {
    /// Create a new message iterator.
    pub fn new(data: &'a [u8], order: ByteOrder) -> Self {
        Self { data, order }
    }
}

impl Iterator for MessageIter<'_> {
    type Item = Result<NetlinkMessage>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.data.len() < NLMSG_HDRLEN {
            return None;
        }

        let msg = match NetlinkMessage::decode(self.data, self.order) {
            Ok(m) => m,
            Err(e) => {
                self.data = &[];
                return Some(Err(e));
            }
        };

        let aligned_len = nlmsg_align(msg.header.nlmsg_len as usize);

        // Move to next message
        if aligned_len >= self.data.len() {
            self.data = &[];
        } else {
            self.data = &self.data[aligned_len..];
        }

        Some(Ok(msg))
    }
}

/// Parse every message in a received buffer.
pub fn parse_messages(data: &[u8], order: ByteOrder) -> Result<Vec<NetlinkMessage>> {
    MessageIter::new(data, order).collect()
}

/// Extended ACK attribute carrying a human-readable error message.
pub const NLMSGERR_ATTR_MSG: u16 = 1;
/// Extended ACK attribute carrying the offset of the offending attribute.
pub const NLMSGERR_ATTR_OFFS: u16 = 2;

/// Netlink error record payload (mirrors struct nlmsgerr).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NlMsgError {
    /// Error code (negative errno or 0 for ACK).
    pub error: i32,
    /// Header of the request that caused the error, when echoed.
    pub msg: Option<NlMsgHdr>,
    /// Extended ACK message text.
    pub ext_ack_msg: Option<String>,
}

impl NlMsgError {
    /// Parse an error record from the payload of an `NLMSG_ERROR` message.
    ///
    /// Only the leading 32-bit code is mandatory. The echoed request header
    /// and extended ACK attributes are picked up when present.
    pub fn parse(flags: u16, payload: &[u8], order: ByteOrder) -> Result<Self> {
        let Some((code, rest)) = payload.split_first_chunk::<4>() else {
            return Err(Error::InvalidErrorCode {
                len: payload.len(),
            });
        };
        let error = order.read_i32(*code);
        let msg = NlMsgHdr::from_bytes(rest, order).ok();

        let mut ext_ack_msg = None;
        if flags & NLM_F_ACK_TLVS != 0
            && let Some(hdr) = msg
        {
            let echoed = if flags & NLM_F_CAPPED != 0 {
                NLMSG_HDRLEN
            } else {
                nlmsg_align(hdr.nlmsg_len as usize)
            };
            if let Some(tlvs) = rest.get(echoed..) {
                ext_ack_msg = AttrIter::new(tlvs, order)
                    .filter_map(|a| a.ok())
                    .find(|a| a.kind() == NLMSGERR_ATTR_MSG)
                    .and_then(|a| get::string(&a.value).ok().map(str::to_owned));
            }
        }

        Ok(Self {
            error,
            msg,
            ext_ack_msg,
        })
    }

    /// Check if this is an ACK (no error).
    pub fn is_ack(&self) -> bool {
        self.error == 0
    }

    /// Convert a non-ACK record into an [`Error::Kernel`].
    pub fn to_error(&self) -> Error {
        Error::from_errno_with_detail(self.error, self.ext_ack_msg.as_deref())
    }
}
