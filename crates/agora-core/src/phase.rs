//! Debate phases and their fixed ordering.

use serde::{Deserialize, Serialize};

/// Phase of a debate run.
///
/// Phases are strictly sequential: there is no branching and no skipping.
/// `Artifacts` is the only terminal phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebatePhase {
    /// Moderator introduces the debate.
    Welcome,
    /// Each persona states an opening perspective.
    Perspectives,
    /// Each persona critiques one other persona.
    Critiques,
    /// Each persona answers the critiques it received.
    Responses,
    /// Each persona looks for consensus across the transcript.
    CommonGround,
    /// Each persona states a closing position.
    FinalPositions,
    /// Moderator writes the structured report.
    Synthesis,
    /// Derived, deterministic post-processing.
    Artifacts,
}

impl DebatePhase {
    /// Every phase in execution order.
    pub const ALL: [DebatePhase; 8] = [
        Self::Welcome,
        Self::Perspectives,
        Self::Critiques,
        Self::Responses,
        Self::CommonGround,
        Self::FinalPositions,
        Self::Synthesis,
        Self::Artifacts,
    ];

    /// The phase that follows this one, or `None` for the terminal phase.
    pub fn next(self) -> Option<DebatePhase> {
        match self {
            Self::Welcome => Some(Self::Perspectives),
            Self::Perspectives => Some(Self::Critiques),
            Self::Critiques => Some(Self::Responses),
            Self::Responses => Some(Self::CommonGround),
            Self::CommonGround => Some(Self::FinalPositions),
            Self::FinalPositions => Some(Self::Synthesis),
            Self::Synthesis => Some(Self::Artifacts),
            Self::Artifacts => None,
        }
    }

    /// Whether this is the terminal phase.
    pub fn is_terminal(self) -> bool {
        self == Self::Artifacts
    }

    /// Whether personas contribute per-agent output in this phase.
    pub fn is_agent_phase(self) -> bool {
        matches!(
            self,
            Self::Perspectives
                | Self::Critiques
                | Self::Responses
                | Self::CommonGround
                | Self::FinalPositions
        )
    }

    /// Human-readable title used in reports.
    pub fn title(self) -> &'static str {
        match self {
            Self::Welcome => "Welcome",
            Self::Perspectives => "Initial Perspectives",
            Self::Critiques => "Critiques",
            Self::Responses => "Responses to Critiques",
            Self::CommonGround => "Common Ground",
            Self::FinalPositions => "Final Positions",
            Self::Synthesis => "Synthesis",
            Self::Artifacts => "Artifacts",
        }
    }
}

impl std::fmt::Display for DebatePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Welcome => write!(f, "welcome"),
            Self::Perspectives => write!(f, "perspectives"),
            Self::Critiques => write!(f, "critiques"),
            Self::Responses => write!(f, "responses"),
            Self::CommonGround => write!(f, "common_ground"),
            Self::FinalPositions => write!(f, "final_positions"),
            Self::Synthesis => write!(f, "synthesis"),
            Self::Artifacts => write!(f, "artifacts"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_sequence_is_linear() {
        let mut walked = vec![DebatePhase::Welcome];
        let mut current = DebatePhase::Welcome;
        while let Some(next) = current.next() {
            assert!(next > current);
            walked.push(next);
            current = next;
        }
        assert_eq!(walked, DebatePhase::ALL.to_vec());
        assert!(current.is_terminal());
    }

    #[test]
    fn test_agent_phases() {
        let agent_phases: Vec<_> = DebatePhase::ALL
            .iter()
            .copied()
            .filter(|p| p.is_agent_phase())
            .collect();
        assert_eq!(agent_phases.len(), 5);
        assert!(!DebatePhase::Welcome.is_agent_phase());
        assert!(!DebatePhase::Synthesis.is_agent_phase());
    }

    #[test]
    fn test_display_matches_serde() {
        for phase in DebatePhase::ALL {
            let json = serde_json::to_string(&phase).unwrap();
            assert_eq!(json, format!("\"{}\"", phase));
        }
    }
}
