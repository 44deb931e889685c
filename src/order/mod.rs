//! Orders and their per-phase outcomes.
//!
//! An [`Order`] is a plain value whose form is decided by which fields are
//! set; see [`Order::kind`]. The same shapes are reused across phases: a
//! hold is a disband outside the movement phase, and a move is a retreat
//! during the retreat phase.

pub mod outcome;

pub use outcome::{BuildOutcome, MoveOutcome, Outcome, RetreatOutcome};

use serde::{Deserialize, Serialize};

use crate::board::{Coast, ProvinceId, UnitType};

/// The form of an order, derived from which fields are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderKind {
    /// No legal combination of fields.
    Invalid,
    /// `unit` only.
    HoldDisband,
    /// `unit` and `target`.
    MoveRetreat,
    /// `unit` and `recipient`.
    SupportHold,
    /// `unit`, `recipient`, and `target`.
    SupportMove,
    /// `unit`, `recipient`, `target`, and the convoy flag.
    Convoy,
    /// `target` only.
    Build,
}

/// An instruction for one unit, or a build.
///
/// Orders compare by value, so one nation can never stage two identical
/// orders in the same phase.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Order {
    /// Province of the unit giving the order. Unset only for builds.
    pub unit: Option<ProvinceId>,
    /// Province of the unit being supported or convoyed.
    pub recipient: Option<ProvinceId>,
    /// Destination of a move, supported move, convoy, or build.
    pub target: Option<ProvinceId>,
    /// Destination coast, for fleets moving or being built onto a
    /// province with named coasts.
    pub target_coast: Option<Coast>,
    pub convoy: bool,
    /// Unit type to build. Ignored outside the build phase.
    pub build: Option<UnitType>,
}

impl Order {
    /// A hold, or a disband outside the movement phase.
    pub fn hold(unit: ProvinceId) -> Self {
        Order {
            unit: Some(unit),
            ..Default::default()
        }
    }

    /// Alias of [`Order::hold`] that reads better in retreat and build phases.
    pub fn disband(unit: ProvinceId) -> Self {
        Self::hold(unit)
    }

    /// A move, or a retreat during the retreat phase.
    pub fn move_to(unit: ProvinceId, target: ProvinceId) -> Self {
        Order {
            unit: Some(unit),
            target: Some(target),
            ..Default::default()
        }
    }

    /// A move onto a named coast.
    pub fn move_to_coast(unit: ProvinceId, target: ProvinceId, coast: Coast) -> Self {
        Order {
            target_coast: Some(coast),
            ..Self::move_to(unit, target)
        }
    }

    pub fn support_hold(supporter: ProvinceId, holder: ProvinceId) -> Self {
        Order {
            unit: Some(supporter),
            recipient: Some(holder),
            ..Default::default()
        }
    }

    pub fn support_move(supporter: ProvinceId, mover: ProvinceId, target: ProvinceId) -> Self {
        Order {
            unit: Some(supporter),
            recipient: Some(mover),
            target: Some(target),
            ..Default::default()
        }
    }

    pub fn convoy(fleet: ProvinceId, army: ProvinceId, target: ProvinceId) -> Self {
        Order {
            unit: Some(fleet),
            recipient: Some(army),
            target: Some(target),
            convoy: true,
            ..Default::default()
        }
    }

    pub fn build(target: ProvinceId, unit: UnitType) -> Self {
        Order {
            target: Some(target),
            build: Some(unit),
            ..Default::default()
        }
    }

    pub fn build_on_coast(target: ProvinceId, unit: UnitType, coast: Coast) -> Self {
        Order {
            target_coast: Some(coast),
            ..Self::build(target, unit)
        }
    }

    /// Classifies the order by shape alone. Never checks legality.
    pub fn kind(&self) -> OrderKind {
        match (
            self.unit.is_some(),
            self.recipient.is_some(),
            self.target.is_some(),
            self.convoy,
        ) {
            (true, false, false, false) => OrderKind::HoldDisband,
            (true, false, true, false) => OrderKind::MoveRetreat,
            (true, true, false, false) => OrderKind::SupportHold,
            (true, true, true, false) => OrderKind::SupportMove,
            (true, true, true, true) => OrderKind::Convoy,
            (false, false, true, false) => OrderKind::Build,
            _ => OrderKind::Invalid,
        }
    }
}
