/// Enable/disable lifecycle gate.
///
/// Stands in for the owning component's active state. Mutators check the
/// gate once on entry and do nothing while it is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveGate {
    active: bool,
}

impl ActiveGate {
    pub fn new(active: bool) -> Self {
        Self { active }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        if self.active != active {
            tracing::debug!(active, "gate toggled");
        }
        self.active = active;
    }
}

impl Default for ActiveGate {
    fn default() -> Self {
        Self::new(true)
    }
}
