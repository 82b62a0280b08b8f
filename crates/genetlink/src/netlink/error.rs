//! Error types for generic netlink operations.

use std::io;

/// Result type for generic netlink operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while encoding, decoding or exchanging messages.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Envelope or generic netlink header is undersized or overruns its buffer.
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    /// Attribute is undersized, overruns its buffer, or has an unexpected payload.
    #[error("invalid attribute: {0}")]
    InvalidAttribute(String),

    /// Creating, binding or configuring the socket failed.
    #[error("socket error: {0}")]
    Socket(#[source] io::Error),

    /// Sending a request failed.
    #[error("send error: {0}")]
    Send(#[source] io::Error),

    /// Receiving a reply failed.
    #[error("receive error: {0}")]
    Recv(#[source] io::Error),

    /// Closing the socket failed.
    #[error("close error: {0}")]
    Close(#[source] io::Error),

    /// Reply carried a different sequence number than the request.
    #[error("sequence mismatch: expected {expected}, got {actual}")]
    SequenceMismatch {
        /// Sequence number of the request.
        expected: u32,
        /// Sequence number of the reply.
        actual: u32,
    },

    /// Reply carried a different port ID than the request.
    #[error("port ID mismatch: expected {expected}, got {actual}")]
    PortIdMismatch {
        /// Port ID of the request.
        expected: u32,
        /// Port ID of the reply.
        actual: u32,
    },

    /// The whole reply was a single DONE marker.
    #[error("reply contained only a DONE message")]
    UnexpectedDone,

    /// Error record too short to hold the 32-bit error code.
    #[error("invalid error code: error record payload is {len} bytes")]
    InvalidErrorCode {
        /// Payload length of the error record.
        len: usize,
    },

    /// Kernel returned an error code.
    #[error("kernel error: {message} (errno {errno})")]
    Kernel {
        /// The errno value from the kernel.
        errno: i32,
        /// Human-readable error message.
        message: String,
    },

    /// The connection has been closed.
    #[error("using closed connection")]
    ConnectionClosed,
}

impl Error {
    /// Create a kernel error from the code in a netlink error record.
    ///
    /// The kernel reports negative errno values; the stored errno is positive.
    pub fn from_errno(errno: i32) -> Self {
        let errno = errno.wrapping_neg();
        let message = io::Error::from_raw_os_error(errno).to_string();
        Self::Kernel { errno, message }
    }

    /// Create a kernel error carrying the extended ACK message, if any.
    pub fn from_errno_with_detail(errno: i32, detail: Option<&str>) -> Self {
        match (Self::from_errno(errno), detail) {
            (Self::Kernel { errno, message }, Some(detail)) => Self::Kernel {
                errno,
                message: format!("{}: {}", detail, message),
            },
            (err, _) => err,
        }
    }

    /// Get the errno value if this is a kernel error.
    pub fn errno(&self) -> Option<i32> {
        match self {
            Self::Kernel { errno, .. } => Some(*errno),
            _ => None,
        }
    }

    /// Check if this is a "not found" error (ENOENT, ENODEV, ...).
    pub fn is_not_found(&self) -> bool {
        matches!(self.errno(), Some(libc::ENOENT | libc::ENODEV))
    }

    /// Check if this is a permission error (EPERM, EACCES).
    pub fn is_permission_denied(&self) -> bool {
        matches!(self.errno(), Some(libc::EPERM | libc::EACCES))
    }

    /// Check if a socket operation timed out.
    ///
    /// Only possible when a send or receive timeout was configured.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Send(e) | Self::Recv(e) => matches!(
                e.kind(),
                io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }

    /// Check if this is an acknowledgement record (kernel code 0).
    pub fn is_ack(&self) -> bool {
        self.errno() == Some(0)
    }

    /// Check if this error was raised by the kernel rather than locally.
    pub fn is_kernel(&self) -> bool {
        matches!(self, Self::Kernel { .. })
    }
}
