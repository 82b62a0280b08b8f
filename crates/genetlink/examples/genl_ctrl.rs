//! Query the generic netlink controller.
//!
//! Lists registered families or looks one up by name, printing its ID,
//! version and multicast groups.
//!
//! Run with:
//!   cargo run -p genetlink --example genl_ctrl -- list
//!   cargo run -p genetlink --example genl_ctrl -- get nlctrl
//!   RUST_LOG=genetlink=trace cargo run -p genetlink --example genl_ctrl -- get nl80211

use std::time::Duration;

use clap::{Parser, Subcommand};
use genetlink::netlink::genl::{CtrlAttr, CtrlAttrMcastGrp, CtrlCmd, GENL_ID_CTRL, GenlMessage};
use genetlink::netlink::message::{NLM_F_DUMP, NLM_F_REQUEST};
use genetlink::netlink::{
    Attribute, ByteOrder, Connection, ConnectionConfig, NetlinkMessage, PortId,
};
use genetlink::Result;

#[derive(Parser)]
#[command(name = "genl_ctrl", version, about = "Generic netlink controller query")]
struct Cli {
    /// Receive timeout in milliseconds.
    #[arg(short, long, default_value_t = 2000)]
    timeout: u64,

    /// Stamp requests with the kernel-assigned port instead of the process ID.
    #[arg(long)]
    bound_port: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List all registered families.
    List,
    /// Show one family by name.
    Get {
        /// Family name (e.g. nlctrl, nl80211, wireguard).
        name: String,
    },
}

#[derive(Debug, Default)]
struct Family {
    id: u16,
    name: String,
    version: u32,
    max_attr: u32,
    groups: Vec<(String, u32)>,
}

impl Family {
    fn parse(msg: &NetlinkMessage, order: ByteOrder) -> Result<Self> {
        let genl = msg.genl_payload()?;
        let mut family = Family::default();

        for attr in genl.attrs(order) {
            let attr = attr?;
            match attr.kind() {
                k if k == CtrlAttr::FamilyId as u16 => family.id = attr.as_u16(order)?,
                k if k == CtrlAttr::FamilyName as u16 => family.name = attr.as_str()?.to_string(),
                k if k == CtrlAttr::Version as u16 => family.version = attr.as_u32(order)?,
                k if k == CtrlAttr::MaxAttr as u16 => family.max_attr = attr.as_u32(order)?,
                k if k == CtrlAttr::McastGroups as u16 => {
                    family.groups = parse_groups(&attr, order)?;
                }
                _ => {}
            }
        }

        Ok(family)
    }
}

fn parse_groups(attr: &Attribute, order: ByteOrder) -> Result<Vec<(String, u32)>> {
    let mut groups = Vec::new();

    // One nested entry per group, indexed from 1
    for entry in attr.nested_attrs(order) {
        let entry = entry?;
        let mut name = String::new();
        let mut id = 0;
        for field in entry.nested_attrs(order) {
            let field = field?;
            match field.kind() {
                k if k == CtrlAttrMcastGrp::Name as u16 => name = field.as_str()?.to_string(),
                k if k == CtrlAttrMcastGrp::Id as u16 => id = field.as_u32(order)?,
                _ => {}
            }
        }
        groups.push((name, id));
    }

    Ok(groups)
}

fn print_family(family: &Family) {
    println!(
        "{:<20} id {:<5} version {:<3} maxattr {}",
        family.name, family.id, family.version, family.max_attr
    );
    for (name, id) in &family.groups {
        println!("    group {name} id {id}");
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = ConnectionConfig::new()
        .recv_timeout(Duration::from_millis(cli.timeout))
        .port_id(if cli.bound_port {
            PortId::Bound
        } else {
            PortId::Process
        })
        .build();

    let conn = Connection::open_with(config)?;
    let order = conn.byte_order();

    let request = match &cli.command {
        Command::List => NetlinkMessage::genl(
            GENL_ID_CTRL,
            NLM_F_REQUEST | NLM_F_DUMP,
            &GenlMessage::new(CtrlCmd::GetFamily as u8, 1),
        ),
        Command::Get { name } => {
            let genl = GenlMessage::new(CtrlCmd::GetFamily as u8, 1)
                .with_attr(Attribute::string(CtrlAttr::FamilyName as u16, name)?, order)?;
            NetlinkMessage::genl(GENL_ID_CTRL, NLM_F_REQUEST, &genl)
        }
    };

    for reply in conn.request(request)? {
        print_family(&Family::parse(&reply, order)?);
    }

    conn.close()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        if e.is_not_found() {
            eprintln!("Error: family not found");
        } else {
            eprintln!("Error: {e}");
        }
        std::process::exit(1);
    }
}
