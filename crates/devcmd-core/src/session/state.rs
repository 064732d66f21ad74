use crate::capability::CapabilityStatus;

/// Mutable state of one session, owned by the
/// [`SessionController`](super::SessionController).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    /// Active technology filter. `None` means every technology.
    pub selected_technology: Option<String>,
    pub listening: bool,
    pub last_command: Option<String>,
    /// Snapshot from the last status check.
    pub capabilities: CapabilityStatus,
}
