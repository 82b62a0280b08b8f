//! Netlink attribute (nlattr) handling.
//!
//! An attribute is a TLV: a 4-byte header (`nla_len`, `nla_type`) followed by
//! the value. `nla_len` counts header plus value without padding; the whole
//! attribute is padded to a 4-byte boundary on the wire.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use super::endian::ByteOrder;
use super::error::{Error, Result};
use crate::util::align_up;

/// Netlink attribute alignment.
pub const NLA_ALIGNTO: usize = 4;

/// Align a length to NLA_ALIGNTO boundary.
#[inline]
pub const fn nla_align(len: usize) -> usize {
    align_up(len, NLA_ALIGNTO)
}

/// Size of the attribute header.
pub const NLA_HDRLEN: usize = nla_align(std::mem::size_of::<RawAttrHdr>());

/// Attribute type flags.
pub const NLA_F_NESTED: u16 = 1 << 15;
pub const NLA_F_NET_BYTEORDER: u16 = 1 << 14;
pub const NLA_TYPE_MASK: u16 = !(NLA_F_NESTED | NLA_F_NET_BYTEORDER);

/// Largest value an attribute can carry.
pub const NLA_MAX_VALUE_LEN: usize = u16::MAX as usize - NLA_HDRLEN;

/// Header plus value length as the 16-bit `nla_len`.
fn attr_len(value_len: usize) -> Result<u16> {
    u16::try_from(NLA_HDRLEN + value_len).map_err(|_| {
        Error::InvalidAttribute(format!(
            "value of {} bytes exceeds the {} byte attribute limit",
            value_len, NLA_MAX_VALUE_LEN
        ))
    })
}

/// On-wire attribute header bytes (struct nlattr).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
struct RawAttrHdr {
    len: [u8; 2],
    nla_type: [u8; 2],
}

/// A netlink attribute with an owned value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attribute {
    /// Length including header, without padding. Set by [`encode`](Self::encode).
    pub nla_len: u16,
    /// Attribute type, flags included.
    pub nla_type: u16,
    /// Value bytes.
    pub value: Vec<u8>,
}

impl Attribute {
    /// Create an attribute with a raw value.
    ///
    /// Fails if header plus value does not fit the 16-bit length field.
    pub fn new(nla_type: u16, value: impl Into<Vec<u8>>) -> Result<Self> {
        let value = value.into();
        Ok(Self {
            nla_len: attr_len(value.len())?,
            nla_type,
            value,
        })
    }

    /// Attribute with a value known to fit the length field.
    fn fixed(nla_type: u16, value: Vec<u8>) -> Self {
        Self {
            nla_len: (NLA_HDRLEN + value.len()) as u16,
            nla_type,
            value,
        }
    }

    /// Create an empty (flag) attribute.
    pub fn flag(nla_type: u16) -> Self {
        Self::fixed(nla_type, Vec::new())
    }

    /// Create a u8 attribute.
    pub fn u8(nla_type: u16, value: u8) -> Self {
        Self::fixed(nla_type, vec![value])
    }

    /// Create a u16 attribute.
    pub fn u16(nla_type: u16, value: u16, order: ByteOrder) -> Self {
        Self::fixed(nla_type, order.u16_bytes(value).to_vec())
    }

    /// Create a u32 attribute.
    pub fn u32(nla_type: u16, value: u32, order: ByteOrder) -> Self {
        Self::fixed(nla_type, order.u32_bytes(value).to_vec())
    }

    /// Create an i32 attribute.
    pub fn i32(nla_type: u16, value: i32, order: ByteOrder) -> Self {
        Self::fixed(nla_type, order.i32_bytes(value).to_vec())
    }

    /// Create a u64 attribute.
    pub fn u64(nla_type: u16, value: u64, order: ByteOrder) -> Self {
        Self::fixed(nla_type, order.u64_bytes(value).to_vec())
    }

    /// Create a null-terminated string attribute.
    pub fn string(nla_type: u16, value: &str) -> Result<Self> {
        let mut data = Vec::with_capacity(value.len() + 1);
        data.extend_from_slice(value.as_bytes());
        data.push(0);
        Self::new(nla_type, data)
    }

    /// Create a nested attribute from child attributes.
    ///
    /// The children are encoded back to back and `NLA_F_NESTED` is set.
    pub fn nested(nla_type: u16, children: &mut [Attribute], order: ByteOrder) -> Result<Self> {
        Self::new(nla_type | NLA_F_NESTED, encode_attrs(children, order)?)
    }

    /// Get the attribute type without flags.
    pub fn kind(&self) -> u16 {
        self.nla_type & NLA_TYPE_MASK
    }

    /// Check if this is a nested attribute.
    pub fn is_nested(&self) -> bool {
        self.nla_type & NLA_F_NESTED != 0
    }

    /// Length this attribute occupies on the wire, padding included.
    pub fn wire_len(&self) -> usize {
        nla_align(NLA_HDRLEN + self.value.len())
    }

    /// Iterate over the attributes nested inside this attribute's value.
    pub fn nested_attrs(&self, order: ByteOrder) -> AttrIter<'_> {
        AttrIter::new(&self.value, order)
    }

    /// Encode the attribute for the wire.
    ///
    /// Sets `nla_len` to header plus value length and returns a buffer padded
    /// with zeros to the attribute alignment. Fails if the value is too large
    /// for the 16-bit length field.
    pub fn encode(&mut self, order: ByteOrder) -> Result<Vec<u8>> {
        self.nla_len = attr_len(self.value.len())?;
        let len = self.nla_len as usize;

        let raw = RawAttrHdr {
            len: order.u16_bytes(self.nla_len),
            nla_type: order.u16_bytes(self.nla_type),
        };
        let mut buf = vec![0u8; nla_align(len)];
        buf[..NLA_HDRLEN].copy_from_slice(raw.as_bytes());
        buf[NLA_HDRLEN..len].copy_from_slice(&self.value);
        Ok(buf)
    }

    /// Decode one attribute from the front of `buf`.
    ///
    /// Bytes past `nla_len` (padding, following attributes) are ignored.
    pub fn decode(buf: &[u8], order: ByteOrder) -> Result<Self> {
        let (raw, _) = RawAttrHdr::ref_from_prefix(buf).map_err(|_| {
            Error::InvalidAttribute(format!(
                "header needs {} bytes, got {}",
                NLA_HDRLEN,
                buf.len()
            ))
        })?;

        let nla_len = order.read_u16(raw.len);
        let len = nla_len as usize;
        if len < NLA_HDRLEN || len > buf.len() {
            return Err(Error::InvalidAttribute(format!(
                "invalid attribute length {} for {} byte buffer",
                len,
                buf.len()
            )));
        }

        Ok(Self {
            nla_len,
            nla_type: order.read_u16(raw.nla_type),
            value: buf[NLA_HDRLEN..len].to_vec(),
        })
    }
}

/// Encode attributes back to back, each padded to the attribute alignment.
pub fn encode_attrs(attrs: &mut [Attribute], order: ByteOrder) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(attrs.iter().map(Attribute::wire_len).sum());
    for attr in attrs {
        buf.extend(attr.encode(order)?);
    }
    Ok(buf)
}

/// Iterator over netlink attributes in a buffer.
///
/// Yields an error and stops if an attribute overruns the buffer.
pub struct AttrIter<'a> {
    data: &'a [u8],
    order: ByteOrder,
}

impl<'a> AttrIter<'a> {
    /// Create a new attribute iterator.
    pub fn new(data: &'a [u8], order: ByteOrder) -> Self {
        Self { data, order }
    }

    /// Check if there are no more attributes.
    pub fn is_empty(&self) -> bool {
        self.data.len() < NLA_HDRLEN
    }
}

impl Iterator for AttrIter<'_> {
    type Item = Result<Attribute>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.data.len() < NLA_HDRLEN {
            return None;
        }

        let attr = match Attribute::decode(self.data, self.order) {
            Ok(a) => a,
            Err(e) => {
                self.data = &[];
                return Some(Err(e));
            }
        };

        let aligned_len = nla_align(attr.nla_len as usize);

        // Move to next attribute
        if aligned_len >= self.data.len() {
            self.data = &[];
        } else {
            self.data = &self.data[aligned_len..];
        }

        Some(Ok(attr))
    }
}

/// Helper functions for extracting typed values from attribute payloads.
pub mod get {
    use super::*;

    fn array<const N: usize>(data: &[u8], what: &str) -> Result<[u8; N]> {
        data.first_chunk::<N>()
            .copied()
            .ok_or_else(|| Error::InvalidAttribute(format!("truncated {} attribute", what)))
    }

    /// Extract a u8 value.
    pub fn u8(data: &[u8]) -> Result<u8> {
        data.first()
            .copied()
            .ok_or_else(|| Error::InvalidAttribute("empty u8 attribute".into()))
    }

    /// Extract a u16 value.
    pub fn u16(data: &[u8], order: ByteOrder) -> Result<u16> {
        Ok(order.read_u16(array(data, "u16")?))
    }

    /// Extract a u32 value.
    pub fn u32(data: &[u8], order: ByteOrder) -> Result<u32> {
        Ok(order.read_u32(array(data, "u32")?))
    }

    /// Extract an i32 value.
    pub fn i32(data: &[u8], order: ByteOrder) -> Result<i32> {
        Ok(order.read_i32(array(data, "i32")?))
    }

    /// Extract a u64 value.
    pub fn u64(data: &[u8], order: ByteOrder) -> Result<u64> {
        Ok(order.read_u64(array(data, "u64")?))
    }

    /// Extract a u16 value (big endian / network order).
    pub fn u16_be(data: &[u8]) -> Result<u16> {
        u16(data, ByteOrder::Big)
    }

    /// Extract a u32 value (big endian / network order).
    pub fn u32_be(data: &[u8]) -> Result<u32> {
        u32(data, ByteOrder::Big)
    }

    /// Extract a null-terminated string.
    pub fn string(data: &[u8]) -> Result<&str> {
        // Find null terminator or use whole buffer
        let len = data.iter().position(|&b| b == 0).unwrap_or(data.len());
        std::str::from_utf8(&data[..len])
            .map_err(|e| Error::InvalidAttribute(format!("invalid UTF-8: {}", e)))
    }
}

impl Attribute {
    /// Value as u8.
    pub fn as_u8(&self) -> Result<u8> {
        get::u8(&self.value)
    }

    /// Value as u16.
    pub fn as_u16(&self, order: ByteOrder) -> Result<u16> {
        get::u16(&self.value, order)
    }

    /// Value as u32.
    pub fn as_u32(&self, order: ByteOrder) -> Result<u32> {
        get::u32(&self.value, order)
    }

    /// Value as u64.
    pub fn as_u64(&self, order: ByteOrder) -> Result<u64> {
        get::u64(&self.value, order)
    }

    /// Value as a string, up to the first NUL.
    pub fn as_str(&self) -> Result<&str> {
        get::string(&self.value)
    }
}
