/// Turn lifecycle.
///
/// `Idle → RetrievalDecision → (SingleRetrieval | AgenticLoop | NoRetrieval)
/// → ContextBuild → Generation → Complete`, with `Failed` reachable from any
/// non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    RetrievalDecision,
    SingleRetrieval,
    AgenticLoop,
    NoRetrieval,
    ContextBuild,
    Generation,
    Complete,
    Failed,
}

impl TurnState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }

    pub fn can_transition_to(&self, next: TurnState) -> bool {
        use TurnState::*;

        if next == Failed {
            return !self.is_terminal();
        }

        matches!(
            (self, next),
            (Idle, RetrievalDecision)
                | (RetrievalDecision, SingleRetrieval | AgenticLoop | NoRetrieval | ContextBuild)
                | (SingleRetrieval | AgenticLoop | NoRetrieval, ContextBuild)
                | (ContextBuild, Generation)
                | (Generation, Complete)
        )
    }
}

/// Current state of one turn plus the path it took.
#[derive(Debug, Clone)]
pub struct TurnTracker {
    turn_id: String,
    path: Vec<TurnState>,
}

impl TurnTracker {
    pub fn new(turn_id: impl Into<String>) -> Self {
        Self {
            turn_id: turn_id.into(),
            path: vec![TurnState::Idle],
        }
    }

    pub fn turn_id(&self) -> &str {
        &self.turn_id
    }

    pub fn state(&self) -> TurnState {
        self.path.last().copied().unwrap_or(TurnState::Idle)
    }

    pub fn path(&self) -> &[TurnState] {
        &self.path
    }

    pub fn advance(&mut self, next: TurnState) {
        let current = self.state();
        debug_assert!(
            current.can_transition_to(next),
            "invalid turn transition {current:?} -> {next:?}"
        );
        tracing::debug!(turn_id = %self.turn_id, from = ?current, to = ?next, "Turn state transition");
        self.path.push(next);
    }
}
