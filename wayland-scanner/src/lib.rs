mod builder;
mod error;
mod generate;
mod parse;
mod plan;
mod property;
mod protocol;

pub use error::{ModelError, ScanError};
pub use generate::{Mode, generate_protocol};
pub use parse::{WAYLAND_CLIENT_NS, WAYLAND_NS, parse_protocol};
pub use plan::{InterfacePlan, MessagePlan, Plan, TypeSlot, WL_OBJECT};
pub use protocol::*;

/// parses, plans and renders one protocol document in one go.
///
/// nothing is produced unless every stage succeeds.
pub fn compile(input: &[u8], filename: &str, mode: Mode) -> Result<Vec<u8>, ScanError> {
    let protocol = parse_protocol(input, filename)?;
    let plan = Plan::new(&protocol);
    let mut out = Vec::new();
    generate_protocol(&mut out, &protocol, &plan, mode).map_err(ScanError::Write)?;
    Ok(out)
}
