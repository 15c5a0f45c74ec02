//! Update-significance rules: small policy objects evaluated against
//! accumulated drift to decide whether a position change is worth a
//! network broadcast. Decoupled from the recomputation logic so the
//! throttling policy can evolve without touching the graph.

use std::time::Duration;

/// Broadcast threshold applied to nodes without an explicit sensitivity
/// rule, in millimeters.
pub const DEFAULT_SENSITIVITY: f32 = 20.0;

/// What a rule is evaluated against: positional drift accumulated since
/// the last broadcast of the node.
#[derive(Debug, Clone, Copy)]
pub struct Drift {
    /// Euclidean distance in millimeters between the current world pose
    /// and the last broadcast one.
    pub distance: f32,
    /// Wall time since the last broadcast.
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Sensitivity,
    Speed,
}

/// A significance rule attached to a node; at most one per kind.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(tag = "kind")]
pub enum UpdateRule {
    /// Satisfied once positional drift exceeds `threshold` millimeters.
    Sensitivity { threshold: f32 },
    /// Satisfied once observed speed exceeds `threshold` millimeters per
    /// millisecond.
    ///
    /// The broadcast gate currently consults `Sensitivity` only; this
    /// variant is an extension point and stays dormant until a caller
    /// wires it into its own policy.
    Speed { threshold: f32 },
}

impl UpdateRule {
    #[inline]
    pub fn kind(&self) -> RuleKind {
        match *self {
            UpdateRule::Sensitivity { .. } => RuleKind::Sensitivity,
            UpdateRule::Speed { .. } => RuleKind::Speed,
        }
    }

    pub fn is_satisfied(&self, drift: &Drift) -> bool {
        match *self {
            UpdateRule::Sensitivity { threshold } => drift.distance > threshold,
            UpdateRule::Speed { threshold } => {
                let millis = drift.elapsed.as_secs() as f32 * 1_000.0
                    + drift.elapsed.subsec_millis() as f32;
                millis > 0.0 && drift.distance / millis > threshold
            }
        }
    }
}

/// Returns true when every attached rule accepts the observed drift.
pub fn all_satisfied(rules: &[UpdateRule], drift: &Drift) -> bool {
    rules.iter().all(|v| v.is_satisfied(drift))
}

#[cfg(test)]
mod test {
    use super::*;

    fn drift(distance: f32, millis: u64) -> Drift {
        Drift {
            distance,
            elapsed: Duration::from_millis(millis),
        }
    }

    #[test]
    fn sensitivity() {
        let rule = UpdateRule::Sensitivity { threshold: 20.0 };
        assert!(!rule.is_satisfied(&drift(19.0, 100)));
        assert!(!rule.is_satisfied(&drift(20.0, 100)));
        assert!(rule.is_satisfied(&drift(20.5, 100)));
    }

    #[test]
    fn speed() {
        let rule = UpdateRule::Speed { threshold: 1.0 };
        assert!(!rule.is_satisfied(&drift(50.0, 100)));
        assert!(rule.is_satisfied(&drift(150.0, 100)));
        // No elapsed time means no observable speed.
        assert!(!rule.is_satisfied(&drift(150.0, 0)));
    }

    #[test]
    fn conjunction() {
        let rules = [
            UpdateRule::Sensitivity { threshold: 20.0 },
            UpdateRule::Speed { threshold: 1.0 },
        ];
        assert!(all_satisfied(&rules, &drift(150.0, 100)));
        assert!(!all_satisfied(&rules, &drift(50.0, 100)));
        assert!(all_satisfied(&[], &drift(0.0, 0)));
    }
}
