//! Generic netlink message fixtures for testing.
//!
//! Pre-captured controller traffic for exercising the codec and the receive
//! loop without a kernel. All fixtures are little-endian and use sequence
//! number 1 and port ID 0x1000.

/// Controller request resolving the "nlctrl" family by name.
pub fn ctrl_getfamily_request() -> Vec<u8> {
    vec![
        // nlmsghdr
        0x20, 0x00, 0x00, 0x00, // len = 32
        0x10, 0x00, // type = GENL_ID_CTRL
        0x01, 0x00, // flags = NLM_F_REQUEST
        0x01, 0x00, 0x00, 0x00, // seq = 1
        0x00, 0x10, 0x00, 0x00, // pid = 0x1000
        // genlmsghdr
        0x03, // cmd = CTRL_CMD_GETFAMILY
        0x01, // version = 1
        0x00, 0x00, // reserved
        // CTRL_ATTR_FAMILY_NAME = "nlctrl"
        0x0b, 0x00, // len = 11
        0x02, 0x00, // type = CTRL_ATTR_FAMILY_NAME (2)
        b'n', b'l', b'c', b't', b'r', b'l', 0x00, 0x00, // "nlctrl\0" + padding
    ]
}

/// Controller reply describing the "nlctrl" family.
/// Trimmed to the scalar attributes; ops and groups are omitted.
pub fn ctrl_newfamily_reply() -> Vec<u8> {
    vec![
        // nlmsghdr
        0x40, 0x00, 0x00, 0x00, // len = 64
        0x10, 0x00, // type = GENL_ID_CTRL
        0x00, 0x00, // flags = 0
        0x01, 0x00, 0x00, 0x00, // seq = 1
        0x00, 0x10, 0x00, 0x00, // pid = 0x1000
        // genlmsghdr
        0x01, // cmd = CTRL_CMD_NEWFAMILY
        0x02, // version = 2
        0x00, 0x00, // reserved
        // CTRL_ATTR_FAMILY_NAME = "nlctrl"
        0x0b, 0x00, // len = 11
        0x02, 0x00, // type = CTRL_ATTR_FAMILY_NAME (2)
        b'n', b'l', b'c', b't', b'r', b'l', 0x00, 0x00, // "nlctrl\0" + padding
        // CTRL_ATTR_FAMILY_ID = 0x10
        0x06, 0x00, // len = 6
        0x01, 0x00, // type = CTRL_ATTR_FAMILY_ID (1)
        0x10, 0x00, 0x00, 0x00, // id = 16 + padding
        // CTRL_ATTR_VERSION = 2
        0x08, 0x00, // len = 8
        0x03, 0x00, // type = CTRL_ATTR_VERSION (3)
        0x02, 0x00, 0x00, 0x00,
        // CTRL_ATTR_HDRSIZE = 0
        0x08, 0x00, // len = 8
        0x04, 0x00, // type = CTRL_ATTR_HDRSIZE (4)
        0x00, 0x00, 0x00, 0x00,
        // CTRL_ATTR_MAXATTR = 10
        0x08, 0x00, // len = 8
        0x05, 0x00, // type = CTRL_ATTR_MAXATTR (5)
        0x0a, 0x00, 0x00, 0x00,
    ]
}

/// Error record for an unknown family name (-ENOENT), request header echoed.
pub fn error_enoent_reply() -> Vec<u8> {
    vec![
        // nlmsghdr
        0x24, 0x00, 0x00, 0x00, // len = 36
        0x02, 0x00, // type = NLMSG_ERROR
        0x00, 0x01, // flags = NLM_F_CAPPED
        0x01, 0x00, 0x00, 0x00, // seq = 1
        0x00, 0x10, 0x00, 0x00, // pid = 0x1000
        // nlmsgerr
        0xfe, 0xff, 0xff, 0xff, // error = -2 (ENOENT)
        0x20, 0x00, 0x00, 0x00, // echoed len = 32
        0x10, 0x00, // echoed type = GENL_ID_CTRL
        0x01, 0x00, // echoed flags = NLM_F_REQUEST
        0x01, 0x00, 0x00, 0x00, // echoed seq = 1
        0x00, 0x10, 0x00, 0x00, // echoed pid = 0x1000
    ]
}

/// End of a multi-part dump.
pub fn dump_done() -> Vec<u8> {
    vec![
        0x14, 0x00, 0x00, 0x00, // len = 20
        0x03, 0x00, // type = NLMSG_DONE
        0x02, 0x00, // flags = NLM_F_MULTI
        0x01, 0x00, 0x00, 0x00, // seq = 1
        0x00, 0x10, 0x00, 0x00, // pid = 0x1000
        0x00, 0x00, 0x00, 0x00, // status = 0
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::attr::Attribute;
    use crate::netlink::endian::ByteOrder;
    use crate::netlink::genl::{CtrlAttr, CtrlCmd, GENL_ID_CTRL, GenlMessage};
    use crate::netlink::message::{
        NLM_F_REQUEST, NetlinkMessage, NlMsgError, NlMsgType, parse_messages,
    };

    const LE: ByteOrder = ByteOrder::Little;

    #[test]
    fn test_request_matches_builder() {
        let genl = GenlMessage::new(CtrlCmd::GetFamily as u8, 1)
            .with_attr(Attribute::string(CtrlAttr::FamilyName as u16, "nlctrl").unwrap(), LE)
            .unwrap();
        let mut msg = NetlinkMessage::genl(GENL_ID_CTRL, NLM_F_REQUEST, &genl);
        msg.header.nlmsg_seq = 1;
        msg.header.nlmsg_pid = 0x1000;

        assert_eq!(msg.encode(LE).unwrap(), ctrl_getfamily_request());
    }

    #[test]
    fn test_parse_family_reply() {
        let msg = NetlinkMessage::decode(&ctrl_newfamily_reply(), LE).unwrap();
        assert_eq!(msg.header.nlmsg_type, GENL_ID_CTRL);

        let genl = msg.genl_payload().unwrap();
        assert_eq!(genl.header.cmd, CtrlCmd::NewFamily as u8);
        assert_eq!(genl.header.version, 2);

        let attrs: Vec<Attribute> = genl.attrs(LE).collect::<Result<_, _>>().unwrap();
        let kinds: Vec<u16> = attrs.iter().map(Attribute::kind).collect();
        assert_eq!(kinds, vec![2, 1, 3, 4, 5]);
        assert_eq!(attrs[0].as_str().unwrap(), "nlctrl");
        assert_eq!(attrs[1].as_u16(LE).unwrap(), 0x10);
        assert_eq!(attrs[4].as_u32(LE).unwrap(), 10);
    }

    #[test]
    fn test_parse_error_record() {
        let msg = NetlinkMessage::decode(&error_enoent_reply(), LE).unwrap();
        assert!(msg.is_error());

        let err = NlMsgError::parse(msg.header.nlmsg_flags, &msg.payload, LE).unwrap();
        assert_eq!(err.error, -libc::ENOENT);
        let echoed = err.msg.unwrap();
        assert_eq!(echoed.nlmsg_type, GENL_ID_CTRL);
        assert_eq!(echoed.nlmsg_len, 32);
        assert_eq!(err.to_error().errno(), Some(libc::ENOENT));
    }

    #[test]
    fn test_dump_stream() {
        let mut stream = ctrl_newfamily_reply();
        stream.extend(dump_done());

        let msgs = parse_messages(&stream, LE).unwrap();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[1].header.nlmsg_type, NlMsgType::DONE);
        assert!(msgs[1].is_multi());
    }
}
