//! Low-level blocking netlink socket operations.

use std::io;
use std::mem::ManuallyDrop;
use std::os::unix::io::{AsRawFd, RawFd};
use std::time::Duration;

use netlink_sys::{Socket, SocketAddr, protocols};

use super::config::ConnectionConfig;
use super::error::{Error, Result};

/// Datagram transport a [`Connection`](super::Connection) exchanges messages over.
///
/// Every call moves one whole datagram. [`NetlinkSocket`] is the kernel-backed
/// implementation; other implementations can replay captured traffic.
pub trait Transport: Send {
    /// Send one datagram.
    fn send(&mut self, buf: &[u8]) -> io::Result<()>;

    /// Copy the next datagram into `buf` without consuming it.
    ///
    /// Returns the number of bytes copied, at most `buf.len()`.
    fn peek(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Consume the next datagram into `buf`.
    ///
    /// Returns the number of bytes copied, at most `buf.len()`.
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Release the underlying descriptor.
    fn close(&mut self) -> io::Result<()>;
}

fn closed() -> io::Error {
    io::Error::from_raw_os_error(libc::EBADF)
}

/// Blocking `NETLINK_GENERIC` socket.
pub struct NetlinkSocket {
    /// The underlying socket, `None` once closed.
    socket: Option<Socket>,
    /// Local port ID (assigned by kernel).
    port_id: u32,
}

impl NetlinkSocket {
    /// Create a generic netlink socket and bind it to a kernel-assigned address.
    pub fn new(config: &ConnectionConfig) -> Result<Self> {
        let mut socket = Socket::new(protocols::NETLINK_GENERIC).map_err(Error::Socket)?;

        // Bind to get a port ID
        let mut addr = SocketAddr::new(0, 0);
        socket.bind(&addr).map_err(Error::Socket)?;
        socket.get_address(&mut addr).map_err(Error::Socket)?;
        let port_id = addr.port_number();

        if config.ext_ack {
            socket.set_ext_ack(true).ok(); // Ignore if not supported
        }

        let fd = socket.as_raw_fd();
        if let Some(timeout) = config.recv_timeout {
            set_timeout(fd, libc::SO_RCVTIMEO, timeout).map_err(Error::Socket)?;
        }
        if let Some(timeout) = config.send_timeout {
            set_timeout(fd, libc::SO_SNDTIMEO, timeout).map_err(Error::Socket)?;
        }
        if let Some(size) = config.recv_buffer_size {
            let size = libc::c_int::try_from(size).unwrap_or(libc::c_int::MAX);
            setsockopt(fd, libc::SOL_SOCKET, libc::SO_RCVBUF, &size).map_err(Error::Socket)?;
        }

        Ok(Self {
            socket: Some(socket),
            port_id,
        })
    }

    /// Get the local port ID the kernel assigned at bind.
    pub fn port_id(&self) -> u32 {
        self.port_id
    }

    /// Check if the socket has been closed.
    pub fn is_closed(&self) -> bool {
        self.socket.is_none()
    }

    fn socket(&self) -> io::Result<&Socket> {
        self.socket.as_ref().ok_or_else(closed)
    }

    fn recv_with(&self, buf: &mut [u8], flags: libc::c_int) -> io::Result<usize> {
        let mut chunk = buf;
        self.socket()?.recv(&mut chunk, flags)
    }
}

impl Transport for NetlinkSocket {
    fn send(&mut self, buf: &[u8]) -> io::Result<()> {
        self.socket()?.send(buf, 0)?;
        Ok(())
    }

    fn peek(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.recv_with(buf, libc::MSG_PEEK)
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.recv_with(buf, 0)
    }

    fn close(&mut self) -> io::Result<()> {
        let socket = ManuallyDrop::new(self.socket.take().ok_or_else(closed)?);
        // SAFETY: the fd is owned by `socket`, which is never dropped, so it
        // is closed exactly once here.
        let ret = unsafe { libc::close(socket.as_raw_fd()) };
        if ret < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

impl AsRawFd for NetlinkSocket {
    fn as_raw_fd(&self) -> RawFd {
        self.socket.as_ref().map_or(-1, |s| s.as_raw_fd())
    }
}

fn set_timeout(fd: RawFd, option: libc::c_int, timeout: Duration) -> io::Result<()> {
    let tv = libc::timeval {
        tv_sec: timeout.as_secs().try_into().unwrap_or(libc::time_t::MAX),
        tv_usec: timeout.subsec_micros() as libc::suseconds_t,
    };
    setsockopt(fd, libc::SOL_SOCKET, option, &tv)
}

fn setsockopt<T>(fd: RawFd, level: libc::c_int, option: libc::c_int, value: &T) -> io::Result<()> {
    // SAFETY: `value` points to a live T and the length passed is its size.
    let ret = unsafe {
        libc::setsockopt(
            fd,
            level,
            option,
            value as *const T as *const libc::c_void,
            std::mem::size_of::<T>() as libc::socklen_t,
        )
    };
    if ret < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
