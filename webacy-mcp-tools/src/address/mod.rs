//! Address-level risk tools (Basic tier).

mod sanctions;
mod threat;

pub use sanctions::{CheckSanctionStatusInput, CheckSanctionStatusTool};
pub use threat::{CheckAddressThreatInput, CheckAddressThreatTool};

use crate::client::WebacyClient;
use webacy_mcp_core::{box_tool, DynTool};

/// Both address tools.
pub fn all_tools(client: &WebacyClient) -> Vec<Box<dyn DynTool>> {
    vec![
        box_tool(CheckAddressThreatTool::new(client.clone())),
        box_tool(CheckSanctionStatusTool::new(client.clone())),
    ]
}
