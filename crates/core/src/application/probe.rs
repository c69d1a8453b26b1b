// Tool availability report for a whole toolset

use crate::domain::Toolset;
use crate::port::{ToolAvailability, ToolProbe};
use tracing::{debug, warn};

/// Availability of one configured tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolReport {
    pub role: &'static str,
    pub program: String,
    pub availability: ToolAvailability,
}

/// Probe every tool in `tools`, in toolset order
pub fn probe_toolset(probe: &dyn ToolProbe, tools: &Toolset) -> Vec<ToolReport> {
    tools
        .entries()
        .into_iter()
        .map(|(role, program)| {
            let availability = probe.probe(program);
            match &availability {
                ToolAvailability::Available(path) => {
                    debug!(role, program, path = %path.display(), "Tool available")
                }
                ToolAvailability::NotFound => warn!(role, program, "Tool not found"),
                ToolAvailability::ProbeFailed(reason) => {
                    warn!(role, program, reason = %reason, "Tool probe failed")
                }
            }
            ToolReport {
                role,
                program: program.to_string(),
                availability,
            }
        })
        .collect()
}
