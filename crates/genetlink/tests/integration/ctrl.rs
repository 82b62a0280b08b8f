//! Integration tests against the generic netlink controller.

use genetlink::Result;
use genetlink::netlink::genl::{CtrlAttr, CtrlCmd, GENL_ID_CTRL, GenlMessage};
use genetlink::netlink::message::{NLM_F_DUMP, NLM_F_REQUEST};
use genetlink::netlink::NetlinkMessage;

use crate::common::{connection, find_attr, get_family};

#[test]
fn test_get_nlctrl_family() -> Result<()> {
    require_genl!();

    let conn = connection()?;
    let order = conn.byte_order();
    let replies = conn.request(get_family("nlctrl", order)?)?;

    assert_eq!(replies.len(), 1);
    let reply = &replies[0];
    assert_eq!(reply.header.nlmsg_type, GENL_ID_CTRL);
    assert_eq!(reply.header.nlmsg_pid, conn.port_id());
    assert_eq!(reply.genl_payload()?.header.cmd, CtrlCmd::NewFamily as u8);

    let id = find_attr(reply, CtrlAttr::FamilyId, order).expect("family id");
    assert_eq!(id.as_u16(order)?, GENL_ID_CTRL);

    let name = find_attr(reply, CtrlAttr::FamilyName, order).expect("family name");
    assert_eq!(name.as_str()?, "nlctrl");

    conn.close()
}

#[test]
fn test_dump_families() -> Result<()> {
    require_genl!();

    let conn = connection()?;
    let order = conn.byte_order();
    let genl = GenlMessage::new(CtrlCmd::GetFamily as u8, 1);
    let replies = conn.request(NetlinkMessage::genl(
        GENL_ID_CTRL,
        NLM_F_REQUEST | NLM_F_DUMP,
        &genl,
    ))?;

    // The controller always lists itself
    assert!(!replies.is_empty());
    assert!(replies.iter().all(|m| m.is_multi() && !m.is_done()));

    let names: Vec<String> = replies
        .iter()
        .filter_map(|m| find_attr(m, CtrlAttr::FamilyName, order))
        .filter_map(|a| a.as_str().ok().map(str::to_owned))
        .collect();
    assert!(names.iter().any(|n| n == "nlctrl"));

    conn.close()
}

#[test]
fn test_unknown_family() -> Result<()> {
    require_genl!();

    let conn = connection()?;
    let err = conn
        .request(get_family("genetlink-test-no-such-family", conn.byte_order())?)
        .unwrap_err();

    assert!(err.is_kernel());
    assert!(err.is_not_found());

    conn.close()
}
