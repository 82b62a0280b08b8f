//! Integration tests for the connection lifecycle.

use std::sync::Arc;
use std::thread;

use genetlink::netlink::genl::{CtrlAttr, GENL_ID_CTRL};
use genetlink::netlink::{Connection, ConnectionConfig, PortId};
use genetlink::{Error, Result};

use crate::common::{TIMEOUT, connection, find_attr, get_family};

#[test]
fn test_sequence_advances() -> Result<()> {
    require_genl!();

    let conn = connection()?;
    let order = conn.byte_order();
    let start = conn.sequence();

    for i in 0..3u32 {
        let replies = conn.request(get_family("nlctrl", order)?)?;
        assert_eq!(replies[0].header.nlmsg_seq, start.wrapping_add(i));
    }
    assert_eq!(conn.sequence(), start.wrapping_add(3));

    conn.close()
}

#[test]
fn test_bound_port_matches_socket() -> Result<()> {
    require_genl!();

    let conn = Connection::open_with(
        ConnectionConfig::new()
            .recv_timeout(TIMEOUT)
            .port_id(PortId::Bound)
            .ext_ack(false)
            .recv_buffer_size(1 << 16)
            .build(),
    )?;
    assert_ne!(conn.port_id(), 0);

    let replies = conn.request(get_family("nlctrl", conn.byte_order())?)?;
    assert_eq!(replies[0].header.nlmsg_pid, conn.port_id());

    conn.close()
}

#[test]
fn test_request_after_close() -> Result<()> {
    require_genl!();

    let conn = connection()?;
    conn.close()?;

    let err = conn
        .request(get_family("nlctrl", conn.byte_order())?)
        .unwrap_err();
    assert!(matches!(err, Error::ConnectionClosed));
    assert!(matches!(conn.close(), Err(Error::Close(_))));
    Ok(())
}

#[test]
fn test_shared_between_threads() -> Result<()> {
    require_genl!();

    let conn = Arc::new(connection()?);
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let conn = Arc::clone(&conn);
            thread::spawn(move || -> Result<u16> {
                let order = conn.byte_order();
                let replies = conn.request(get_family("nlctrl", order)?)?;
                let id = find_attr(&replies[0], CtrlAttr::FamilyId, order)
                    .ok_or_else(|| Error::InvalidAttribute("missing family id".into()))?;
                id.as_u16(order)
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().expect("thread panicked")?, GENL_ID_CTRL);
    }

    conn.close()
}

#[test]
fn test_drop_without_close() -> Result<()> {
    require_genl!();

    for _ in 0..16 {
        let conn = connection()?;
        conn.request(get_family("nlctrl", conn.byte_order())?)?;
    }
    Ok(())
}
