use edgesync_types::VersionToken;
use std::cmp::Ordering;

/// What one peer needs this cycle, derived from the two tokens alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDirection {
    /// Coordinator is ahead: send it the peer-scoped rows.
    Push,
    /// Peer is ahead: bring its rows in.
    Pull,
    Noop,
    /// At least one token is unknown.
    Skip,
}

impl SyncDirection {
    pub fn decide(master: Option<VersionToken>, peer: Option<VersionToken>) -> Self {
        let (Some(master), Some(peer)) = (master, peer) else {
            return Self::Skip;
        };
        match master.cmp(&peer) {
            Ordering::Greater => Self::Push,
            Ordering::Less => Self::Pull,
            Ordering::Equal => Self::Noop,
        }
    }
}
