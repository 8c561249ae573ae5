use edgesync_types::{PeerId, Table};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No endpoint could be found for the peer this cycle.
    Unresolved,
    /// Either token was unknown.
    UnknownToken,
}

/// Result of one peer within a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerOutcome {
    Skipped(SkipReason),
    Unchanged,
    /// Tables whose batch the peer accepted.
    Pushed(Vec<Table>),
    /// Tables whose pulled batch was written locally.
    Pulled(Vec<Table>),
}

impl fmt::Display for PeerOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |tables: &[Table]| {
            tables.iter().map(|t| t.wire_name()).collect::<Vec<_>>().join(", ")
        };
        match self {
            Self::Skipped(SkipReason::Unresolved) => f.write_str("skipped (unresolved)"),
            Self::Skipped(SkipReason::UnknownToken) => f.write_str("skipped (unknown token)"),
            Self::Unchanged => f.write_str("up to date"),
            Self::Pushed(tables) => write!(f, "pushed [{}]", join(tables)),
            Self::Pulled(tables) => write!(f, "pulled [{}]", join(tables)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub peers: Vec<(PeerId, PeerOutcome)>,
}

impl CycleReport {
    pub fn outcome(&self, peer: &PeerId) -> Option<&PeerOutcome> {
        self.peers.iter().find(|(id, _)| id == peer).map(|(_, outcome)| outcome)
    }

    pub fn skipped(&self) -> usize {
        self.peers.iter().filter(|(_, o)| matches!(o, PeerOutcome::Skipped(_))).count()
    }

    pub fn transferred(&self) -> usize {
        self.peers
            .iter()
            .filter(|(_, o)| matches!(o, PeerOutcome::Pushed(_) | PeerOutcome::Pulled(_)))
            .count()
    }
}
