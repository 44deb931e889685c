//! Outcome codes, one enum per phase.
//!
//! Outcomes report rules violations and combat results. They are values, not
//! errors: a failed order never stops the rest of the turn.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Result of a movement-phase order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveOutcome {
    Success,
    /// The order's shape is not a movement-phase form.
    Malformed,
    /// The unit already has an order this phase.
    RepeatUnit,
    /// The unit belongs to another nation.
    EnemyUnit,
    /// No unit stands in the ordered province.
    MissingUnit,
    /// The unit's type cannot enter or act from that terrain.
    BadTerrain,
    /// The target is out of reach or not a legal destination.
    BadTarget,
    /// The requested coast is not reachable.
    BadCoast,
    /// Several coasts are reachable and none was named.
    CoastAmbiguous,
    /// No surviving convoy chain carried the army.
    NoConvoy,
    /// The supported or convoyed unit is doing something else.
    BadRecipient,
    /// No unit stands in the supported or convoyed province.
    MissingRecipient,
    /// The unit was driven out by an attack.
    Dislodged,
    /// The support was cut.
    Cut,
    /// Another unit moved into the target instead.
    Weak,
    /// Opposing units held the target; nobody entered.
    Standoff,
}

/// Result of a retreat-phase order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RetreatOutcome {
    Success,
    Malformed,
    RepeatUnit,
    EnemyUnit,
    MissingUnit,
    BadTerrain,
    BadTarget,
    BadCoast,
    CoastAmbiguous,
    /// The target was left empty by a standoff, or another unit retreated
    /// there too.
    Standoff,
    /// Another unit holds the target.
    Occupied,
}

/// Result of a build-phase order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildOutcome {
    Success,
    Malformed,
    RepeatUnit,
    EnemyUnit,
    MissingUnit,
    BadTerrain,
    CoastAmbiguous,
    /// The nation has no builds left.
    NoBuilds,
    /// The nation owes no disbands.
    NoDisbands,
    /// The target is not one of the nation's home centers.
    NotHome,
    /// The nation does not control the target.
    NotControlled,
    /// A unit stands in, or is already being built in, the target.
    Occupied,
}

/// An outcome tagged with the phase it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Move(MoveOutcome),
    Retreat(RetreatOutcome),
    Build(BuildOutcome),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Outcome::Move(MoveOutcome::Success)
                | Outcome::Retreat(RetreatOutcome::Success)
                | Outcome::Build(BuildOutcome::Success)
        )
    }
}

impl From<MoveOutcome> for Outcome {
    fn from(o: MoveOutcome) -> Self {
        Outcome::Move(o)
    }
}

impl From<RetreatOutcome> for Outcome {
    fn from(o: RetreatOutcome) -> Self {
        Outcome::Retreat(o)
    }
}

impl From<BuildOutcome> for Outcome {
    fn from(o: BuildOutcome) -> Self {
        Outcome::Build(o)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Move(o) => write!(f, "{o:?}"),
            Outcome::Retreat(o) => write!(f, "{o:?}"),
            Outcome::Build(o) => write!(f, "{o:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_across_phases() {
        assert!(Outcome::from(MoveOutcome::Success).is_success());
        assert!(Outcome::from(RetreatOutcome::Success).is_success());
        assert!(Outcome::from(BuildOutcome::Success).is_success());
        assert!(!Outcome::from(MoveOutcome::Cut).is_success());
        assert!(!Outcome::from(BuildOutcome::Occupied).is_success());
    }

    #[test]
    fn display_uses_code_name() {
        assert_eq!(Outcome::Move(MoveOutcome::NoConvoy).to_string(), "NoConvoy");
    }

    #[test]
    fn serializes_with_phase_tag() {
        let json = serde_json::to_string(&Outcome::Retreat(RetreatOutcome::Standoff)).unwrap();
        assert_eq!(json, r#"{"Retreat":"Standoff"}"#);
        let back: Outcome = serde_json::from_str(r#"{"Build":"NotHome"}"#).unwrap();
        assert_eq!(back, Outcome::Build(BuildOutcome::NotHome));
    }
}
