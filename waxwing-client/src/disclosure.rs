/// A show/hide affordance. Pure state, no I/O and no timing: flipping it
/// must never depend on the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Disclosure {
    visible: bool,
}

impl Disclosure {
    pub fn hidden() -> Self {
        Self { visible: false }
    }

    pub fn shown() -> Self {
        Self { visible: true }
    }

    /// Flips and returns the new visibility.
    pub fn toggle(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}
