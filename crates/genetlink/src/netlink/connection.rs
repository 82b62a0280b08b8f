//! Generic netlink connection with request/response handling.
//!
//! A [`Connection`] owns one socket and runs one request at a time: it stamps
//! the request with the next sequence number and its port ID, sends it, then
//! receives datagrams until the reply is complete. Multi-part replies
//! (`NLM_F_MULTI`) are reassembled up to their `NLMSG_DONE` marker and every
//! received message is checked against the request before it is accepted.

use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use bytes::BytesMut;
use tracing::{debug, trace};

use super::config::{ConnectionConfig, PortId};
use super::endian::{ByteOrder, host_order};
use super::error::{Error, Result};
use super::message::{NetlinkMessage, NlMsgError, NlMsgHdr, nlmsg_align, parse_messages};
use super::socket::{NetlinkSocket, Transport};

/// Fallback when the page size cannot be queried.
const DEFAULT_PAGE_SIZE: usize = 4096;

/// Size increment of the receive buffer.
fn page_size() -> usize {
    static PAGE_SIZE: OnceLock<usize> = OnceLock::new();
    *PAGE_SIZE.get_or_init(|| {
        // SAFETY: sysconf has no preconditions.
        let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        usize::try_from(size)
            .ok()
            .filter(|&s| s > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
    })
}

/// State guarded by the connection lock.
struct Inner<T> {
    transport: T,
    /// Sequence number of the next request.
    seq: u32,
    closed: bool,
}

/// Generic netlink connection.
///
/// All requests on one connection are serialized: the lock is held from send
/// until the last reply datagram has been received and validated. The
/// connection is `Send + Sync` and may be shared between threads, which then
/// take turns.
///
/// # Example
///
/// ```rust,no_run
/// use genetlink::netlink::genl::{CtrlAttr, CtrlCmd, GENL_ID_CTRL, GenlMessage};
/// use genetlink::netlink::message::{NLM_F_DUMP, NLM_F_REQUEST};
/// use genetlink::netlink::{Connection, NetlinkMessage};
///
/// # fn example() -> genetlink::Result<()> {
/// let conn = Connection::open()?;
/// let order = conn.byte_order();
///
/// // Dump every registered family
/// let genl = GenlMessage::new(CtrlCmd::GetFamily as u8, 1);
/// let msg = NetlinkMessage::genl(GENL_ID_CTRL, NLM_F_REQUEST | NLM_F_DUMP, &genl);
///
/// for reply in conn.request(msg)? {
///     let family = reply.genl_payload()?;
///     for attr in family.attrs(order) {
///         let attr = attr?;
///         if attr.kind() == CtrlAttr::FamilyName as u16 {
///             println!("{}", attr.as_str()?);
///         }
///     }
/// }
///
/// conn.close()?;
/// # Ok(())
/// # }
/// ```
pub struct Connection<T: Transport = NetlinkSocket> {
    inner: Mutex<Inner<T>>,
    port_id: u32,
    order: ByteOrder,
}

impl Connection<NetlinkSocket> {
    /// Open a connection with the default configuration.
    pub fn open() -> Result<Self> {
        Self::open_with(ConnectionConfig::default())
    }

    /// Open a connection with the given socket options.
    pub fn open_with(config: ConnectionConfig) -> Result<Self> {
        let socket = NetlinkSocket::new(&config)?;
        let port_id = match config.port_id {
            PortId::Process => std::process::id(),
            PortId::Bound => socket.port_id(),
        };
        debug!(
            port_id,
            bound_port = socket.port_id(),
            "opened generic netlink socket"
        );
        Ok(Self::with_transport(socket, port_id))
    }
}

impl<T: Transport> Connection<T> {
    /// Create a connection over an existing transport.
    ///
    /// The sequence counter starts at a random value so that concurrent users
    /// of the same protocol are unlikely to collide.
    pub fn with_transport(transport: T, port_id: u32) -> Self {
        Self {
            inner: Mutex::new(Inner {
                transport,
                seq: rand::random(),
                closed: false,
            }),
            port_id,
            order: host_order(),
        }
    }

    /// Get the port ID stamped on requests that do not carry one.
    pub fn port_id(&self) -> u32 {
        self.port_id
    }

    /// Get the byte order used on the wire.
    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    /// Get the sequence number the next request will carry.
    pub fn sequence(&self) -> u32 {
        self.lock().seq
    }

    /// Check if the connection has been closed.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Send a request and collect every reply message.
    ///
    /// The request's sequence number is overwritten and its port ID is filled
    /// in when zero. A trailing `NLMSG_DONE` of a multi-part reply is dropped.
    /// On any error no messages are returned; the connection stays usable.
    ///
    /// Every `NLMSG_ERROR` reply fails the request with [`Error::Kernel`],
    /// including an acknowledgement (code 0), which shows up as
    /// [`Error::is_ack`]. Requests that set `NLM_F_ACK` should expect it.
    pub fn request(&self, mut msg: NetlinkMessage) -> Result<Vec<NetlinkMessage>> {
        let mut inner = self.lock();
        if inner.closed {
            return Err(Error::ConnectionClosed);
        }

        msg.header.nlmsg_seq = inner.seq;
        inner.seq = inner.seq.wrapping_add(1);
        if msg.header.nlmsg_pid == 0 {
            msg.header.nlmsg_pid = self.port_id;
        }

        let buf = msg.encode(self.order)?;
        trace!(
            seq = msg.header.nlmsg_seq,
            port_id = msg.header.nlmsg_pid,
            msg_type = msg.header.nlmsg_type,
            flags = msg.header.nlmsg_flags,
            len = buf.len(),
            "sending request"
        );
        inner.transport.send(&buf).map_err(Error::Send)?;

        self.receive(&mut inner.transport, &msg.header)
    }

    /// Close the socket.
    ///
    /// Later requests fail with [`Error::ConnectionClosed`]. Closing twice
    /// reports `EBADF`.
    pub fn close(&self) -> Result<()> {
        let mut inner = self.lock();
        inner.closed = true;
        debug!(port_id = self.port_id, "closing generic netlink socket");
        inner.transport.close().map_err(Error::Close)
    }

    /// Receive until the reply to `request` is complete.
    fn receive(&self, transport: &mut T, request: &NlMsgHdr) -> Result<Vec<NetlinkMessage>> {
        let mut replies = Vec::new();

        loop {
            let batch = self.recv_batch(transport)?;

            // Only the last multi-part message of a batch decides completion.
            let mut done = true;
            for msg in &batch {
                self.validate(request, msg)?;

                if !msg.is_multi() {
                    continue;
                }
                done = msg.is_done();
            }

            replies.extend(batch);
            if done {
                break;
            }
        }

        if replies.len() > 1 && replies.last().is_some_and(NetlinkMessage::is_done) {
            replies.pop();
        }

        if replies.len() == 1 && replies[0].is_done() {
            return Err(Error::UnexpectedDone);
        }

        Ok(replies)
    }

    /// Receive one datagram and split it into messages.
    ///
    /// The datagram is peeked into a buffer grown one page at a time until it
    /// fits, then consumed into a buffer of that size.
    fn recv_batch(&self, transport: &mut T) -> Result<Vec<NetlinkMessage>> {
        let page = page_size();
        let mut size = page;

        loop {
            let mut buf = BytesMut::zeroed(size);
            let n = transport.peek(&mut buf[..]).map_err(Error::Recv)?;
            if n < size {
                break;
            }
            size += page;
        }

        let mut buf = BytesMut::zeroed(size);
        let n = transport.recv(&mut buf[..]).map_err(Error::Recv)?;
        buf.truncate(nlmsg_align(n).min(size));

        let batch = parse_messages(&buf, self.order)?;
        trace!(
            bytes = n,
            buffer = size,
            messages = batch.len(),
            "received datagram"
        );
        Ok(batch)
    }

    /// Check a reply against the request it answers.
    fn validate(&self, request: &NlMsgHdr, msg: &NetlinkMessage) -> Result<()> {
        if msg.is_error() {
            let err = NlMsgError::parse(msg.header.nlmsg_flags, &msg.payload, self.order)?;
            return Err(err.to_error());
        }

        if msg.header.nlmsg_seq != request.nlmsg_seq {
            return Err(Error::SequenceMismatch {
                expected: request.nlmsg_seq,
                actual: msg.header.nlmsg_seq,
            });
        }

        if msg.header.nlmsg_pid != request.nlmsg_pid {
            return Err(Error::PortIdMismatch {
                expected: request.nlmsg_pid,
                actual: msg.header.nlmsg_pid,
            });
        }

        Ok(())
    }
}
