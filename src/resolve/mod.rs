//! Order resolution.
//!
//! Turns the staged orders of one phase into per-order outcomes and the
//! next [`Game`]. Movement uses the Kruijswijk algorithm; retreats and
//! adjustments are resolved directly.

pub mod build;
pub mod kruijswijk;
pub mod phase;
pub mod retreat;

pub use kruijswijk::{adjudicate, Adjudication, MoveResult, Resolver};
pub use phase::next_phase;

use tracing::info;

use crate::board::{NationId, ProvinceId};
use crate::game::{Game, Phase, Season};
use crate::order::{Order, Outcome};

pub(crate) use build::resolve_builds;
pub(crate) use retreat::resolve_retreats;

/// One order and what became of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedOrder {
    pub nation: NationId,
    pub order: Order,
    pub outcome: Outcome,
}

/// The result of resolving a phase.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// State at the start of the following phase.
    pub game: Game,
    pub results: Vec<ResolvedOrder>,
}

impl Resolution {
    /// Outcome of the order given to the unit in `province`.
    pub fn outcome(&self, province: ProvinceId) -> Option<Outcome> {
        self.results
            .iter()
            .find(|r| r.order.unit == Some(province))
            .map(|r| r.outcome)
    }

    /// Outcomes for one nation, in resolution order.
    pub fn outcomes_of(&self, nation: NationId) -> impl Iterator<Item = &ResolvedOrder> {
        self.results.iter().filter(move |r| r.nation == nation)
    }
}

/// Adjudicates a movement phase and builds the following state.
pub(crate) fn resolve_movement(game: &Game, orders: &[(NationId, Order)]) -> Resolution {
    let adj = adjudicate(game, orders);
    let mut next = phase::advance(game, !adj.dislodged.is_empty());

    for &(from, _) in &adj.moves {
        next.vacate(from);
    }
    for d in &adj.dislodged {
        next.vacate(d.occupancy.province);
    }
    for &(_, arrived) in &adj.moves {
        next.place(arrived);
    }
    for d in &adj.dislodged {
        next.dislodge(*d);
    }
    if !adj.dislodged.is_empty() {
        for &p in &adj.bounces {
            if next.unit(p).is_none() {
                next.contest(p);
            }
        }
    }
    // With a retreat pending, centers change hands once retreats settle.
    if game.season() == Season::Fall && next.phase() != Phase::Retreat {
        next.capture_centers();
    }

    info!(
        year = game.year(),
        season = ?game.season(),
        moves = adj.moves.len(),
        dislodged = adj.dislodged.len(),
        next = ?next.phase(),
        "movement resolved"
    );

    let results = adj
        .results
        .into_iter()
        .map(|r| ResolvedOrder {
            nation: r.nation,
            order: r.order,
            outcome: r.outcome.into(),
        })
        .collect();
    Resolution {
        game: next,
        results,
    }
}
