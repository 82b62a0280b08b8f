//! Common test utilities for integration tests.
//!
//! Provides helpers for opening connections against the running kernel and
//! decoding controller replies, plus a macro for skipping tests where
//! generic netlink sockets are unavailable (some sandboxes).

use std::time::Duration;

use genetlink::netlink::genl::{CtrlAttr, CtrlCmd, GENL_ID_CTRL, GenlMessage};
use genetlink::netlink::message::NLM_F_REQUEST;
use genetlink::netlink::{
    Attribute, ByteOrder, Connection, ConnectionConfig, NetlinkMessage, PortId,
};
use genetlink::{Error, Result};

/// Receive timeout for every test connection, so a lost reply fails the
/// test instead of hanging it.
pub const TIMEOUT: Duration = Duration::from_secs(5);

/// Open a connection with the test timeout applied.
///
/// Tests run on parallel threads, so only one socket can own the process ID
/// as its address; stamp requests with the kernel-assigned port instead.
pub fn connection() -> Result<Connection> {
    Connection::open_with(
        ConnectionConfig::new()
            .recv_timeout(TIMEOUT)
            .port_id(PortId::Bound)
            .build(),
    )
}

/// Check if generic netlink sockets can be opened here.
pub fn genl_available() -> bool {
    match connection() {
        Ok(conn) => conn.close().is_ok(),
        Err(Error::Socket(e)) => {
            eprintln!("generic netlink unavailable: {e}");
            false
        }
        Err(_) => false,
    }
}

/// Build a controller GETFAMILY request for `name`.
pub fn get_family(name: &str, order: ByteOrder) -> Result<NetlinkMessage> {
    let genl = GenlMessage::new(CtrlCmd::GetFamily as u8, 1)
        .with_attr(Attribute::string(CtrlAttr::FamilyName as u16, name)?, order)?;
    Ok(NetlinkMessage::genl(GENL_ID_CTRL, NLM_F_REQUEST, &genl))
}

/// Find an attribute in a controller reply.
pub fn find_attr(msg: &NetlinkMessage, kind: CtrlAttr, order: ByteOrder) -> Option<Attribute> {
    msg.genl_payload()
        .ok()?
        .attrs(order)
        .filter_map(|a| a.ok())
        .find(|a| a.kind() == kind as u16)
}

/// Skip the test if generic netlink sockets cannot be opened.
///
/// Use this at the beginning of integration tests returning `Result`.
#[macro_export]
macro_rules! require_genl {
    () => {
        if !crate::common::genl_available() {
            eprintln!("Skipping test: requires generic netlink");
            return Ok(());
        }
    };
}
