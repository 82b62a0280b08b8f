//! Host byte order detection.
//!
//! Netlink carries every multi-byte integer in the byte order of the host,
//! not network order. The order is detected once per process and handed to the
//! codec as a plain [`ByteOrder`] value.

use std::sync::OnceLock;

/// Byte order of multi-byte integers on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    /// Least significant byte first.
    Little,
    /// Most significant byte first.
    Big,
}

static HOST_ORDER: OnceLock<ByteOrder> = OnceLock::new();

/// Byte order of the running host.
///
/// Computed on first use and cached for the lifetime of the process.
pub fn host_order() -> ByteOrder {
    *HOST_ORDER.get_or_init(detect)
}

fn detect() -> ByteOrder {
    let buf = 0x1234u16.to_ne_bytes();
    if buf[0] == 0x34 {
        ByteOrder::Little
    } else {
        ByteOrder::Big
    }
}

impl ByteOrder {
    /// Decode a u16.
    #[inline]
    pub fn read_u16(self, bytes: [u8; 2]) -> u16 {
        match self {
            ByteOrder::Little => u16::from_le_bytes(bytes),
            ByteOrder::Big => u16::from_be_bytes(bytes),
        }
    }

    /// Decode a u32.
    #[inline]
    pub fn read_u32(self, bytes: [u8; 4]) -> u32 {
        match self {
            ByteOrder::Little => u32::from_le_bytes(bytes),
            ByteOrder::Big => u32::from_be_bytes(bytes),
        }
    }

    /// Decode an i32.
    #[inline]
    pub fn read_i32(self, bytes: [u8; 4]) -> i32 {
        self.read_u32(bytes) as i32
    }

    /// Decode a u64.
    #[inline]
    pub fn read_u64(self, bytes: [u8; 8]) -> u64 {
        match self {
            ByteOrder::Little => u64::from_le_bytes(bytes),
            ByteOrder::Big => u64::from_be_bytes(bytes),
        }
    }

    /// Encode a u16.
    #[inline]
    pub fn u16_bytes(self, value: u16) -> [u8; 2] {
        match self {
            ByteOrder::Little => value.to_le_bytes(),
            ByteOrder::Big => value.to_be_bytes(),
        }
    }

    /// Encode a u32.
    #[inline]
    pub fn u32_bytes(self, value: u32) -> [u8; 4] {
        match self {
            ByteOrder::Little => value.to_le_bytes(),
            ByteOrder::Big => value.to_be_bytes(),
        }
    }

    /// Encode an i32.
    #[inline]
    pub fn i32_bytes(self, value: i32) -> [u8; 4] {
        self.u32_bytes(value as u32)
    }

    /// Encode a u64.
    #[inline]
    pub fn u64_bytes(self, value: u64) -> [u8; 8] {
        match self {
            ByteOrder::Little => value.to_le_bytes(),
            ByteOrder::Big => value.to_be_bytes(),
        }
    }
}
