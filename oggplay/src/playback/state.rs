//! Lifecycle state shared by the whole playback graph

/// Lifecycle state of the graph; all stages transition together
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifecycleState {
    Null,
    Ready,
    Paused,
    Playing,
}

impl LifecycleState {
    /// States visited when moving from `self` up to `target`, excluding `self`.
    ///
    /// Downward moves go straight to the target.
    pub fn path_to(self, target: LifecycleState) -> Vec<LifecycleState> {
        const ORDER: [LifecycleState; 4] = [
            LifecycleState::Null,
            LifecycleState::Ready,
            LifecycleState::Paused,
            LifecycleState::Playing,
        ];

        if target <= self {
            if target == self {
                return Vec::new();
            }
            return vec![target];
        }

        ORDER
            .iter()
            .copied()
            .filter(|state| *state > self && *state <= target)
            .collect()
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleState::Null => write!(f, "null"),
            LifecycleState::Ready => write!(f, "ready"),
            LifecycleState::Paused => write!(f, "paused"),
            LifecycleState::Playing => write!(f, "playing"),
        }
    }
}
