//! Per-visitor state that outlives a single wizard run.

use serde::{Deserialize, Serialize};

/// Flags tracked for one visitor across page interactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitorSession {
    exit_offer_shown: bool,
}

impl VisitorSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exit_offer_shown(&self) -> bool {
        self.exit_offer_shown
    }

    /// Report the pointer leaving the page at vertical position `pointer_y`.
    ///
    /// Returns `true` exactly once per session: the first time the pointer
    /// exits through the top edge.
    pub fn offer_exit_intent(&mut self, pointer_y: i32) -> bool {
        if self.exit_offer_shown || pointer_y > 0 {
            return false;
        }
        self.exit_offer_shown = true;
        true
    }
}
