//! Reboot-acknowledgment gate
//!
//! After a reset the controller refuses normal commands until the host
//! acknowledges the restart with a line containing exactly `!`. This
//! forces the host software to notice that the board rebooted (and that
//! any in-flight state it believed in is gone) before it can command
//! hardware again.

/// Gate state: Locked on power-up, Unlocked once for the whole powered
/// session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum GateState {
    Locked,
    Unlocked,
}

/// What the engine should do with an input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GateDecision {
    /// Gate is open; hand the line to the parser/dispatcher
    Pass,
    /// The exact `!` acknowledgment arrived; gate is now open
    Acknowledged,
    /// Still locked; re-emit the awaiting prompt, nothing else
    Rejected,
    /// `!` with trailing bytes is a forced-reboot request; reset the
    /// processor without unlocking
    ForceReboot,
}

/// Two-state guard in front of the command dispatcher
#[derive(Debug, Clone)]
pub struct RebootGate {
    state: GateState,
}

impl Default for RebootGate {
    fn default() -> Self {
        Self::new()
    }
}

impl RebootGate {
    /// A freshly powered gate starts locked
    pub fn new() -> Self {
        Self {
            state: GateState::Locked,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.state == GateState::Locked
    }

    /// Classify an input line against the current gate state
    ///
    /// The line must already be stripped of its terminator. Unlocking is
    /// one-way: nothing but an actual processor reset re-locks the gate.
    pub fn admit(&mut self, line: &[u8]) -> GateDecision {
        if self.state == GateState::Unlocked {
            return GateDecision::Pass;
        }

        match line {
            b"!" => {
                self.state = GateState::Unlocked;
                GateDecision::Acknowledged
            }
            [b'!', ..] => GateDecision::ForceReboot,
            _ => GateDecision::Rejected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_locked() {
        let gate = RebootGate::new();
        assert!(gate.is_locked());
    }

    #[test]
    fn test_exact_bang_unlocks() {
        let mut gate = RebootGate::new();
        assert_eq!(gate.admit(b"!"), GateDecision::Acknowledged);
        assert!(!gate.is_locked());
        assert_eq!(gate.admit(b"os"), GateDecision::Pass);
    }

    #[test]
    fn test_other_lines_rejected_without_state_change() {
        let mut gate = RebootGate::new();
        assert_eq!(gate.admit(b"os"), GateDecision::Rejected);
        assert_eq!(gate.admit(b""), GateDecision::Rejected);
        assert_eq!(gate.admit(b"rt"), GateDecision::Rejected);
        assert!(gate.is_locked());
    }

    #[test]
    fn test_bang_with_trailing_bytes_forces_reboot() {
        let mut gate = RebootGate::new();
        assert_eq!(gate.admit(b"!x"), GateDecision::ForceReboot);
        // Still locked: a forced reboot is not an acknowledgment
        assert!(gate.is_locked());
    }

    #[test]
    fn test_unlock_is_terminal() {
        let mut gate = RebootGate::new();
        gate.admit(b"!");
        // Another bare "!" is now just a line for the dispatcher
        assert_eq!(gate.admit(b"!"), GateDecision::Pass);
        assert_eq!(gate.admit(b"!x"), GateDecision::Pass);
    }
}
