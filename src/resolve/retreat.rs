//! Retreat-phase resolution.
//!
//! If two dislodged units retreat to the same province, both are disbanded.
//! Dislodged units without an order are disbanded as well.

use tracing::info;

use crate::board::{CoastError, NationId, ProvinceId, UnitType};
use crate::game::{Game, Occupancy, Season};
use crate::order::{Order, OrderKind, RetreatOutcome};

use super::{phase, Resolution, ResolvedOrder};

/// Resolves retreat-phase orders and builds the following state.
///
/// Orders are expected to have passed arena validation; anything else is
/// reported and the unit is disbanded.
pub(crate) fn resolve_retreats(game: &Game, orders: &[(NationId, Order)]) -> Resolution {
    let n = game.board().len();

    // Count retreat targets to detect conflicts.
    let mut target_count = vec![0u8; n];
    for (_, order) in orders {
        if order.kind() == OrderKind::MoveRetreat {
            if let Some(t) = order.target.filter(|t| t.index() < n) {
                target_count[t.index()] = target_count[t.index()].saturating_add(1);
            }
        }
    }

    let mut results = Vec::with_capacity(orders.len());
    let mut arrivals: Vec<Occupancy> = Vec::new();
    let mut ordered = vec![false; n];

    for &(nation, order) in orders {
        let Some(d) = order.unit.and_then(|p| game.dislodged(p)) else {
            results.push(retreat_result(nation, order, RetreatOutcome::MissingUnit));
            continue;
        };
        ordered[d.occupancy.province.index()] = true;
        let outcome = match (order.kind(), order.target) {
            (OrderKind::HoldDisband, _) => RetreatOutcome::Success,
            (OrderKind::MoveRetreat, Some(target)) => {
                if target_count.get(target.index()).is_some_and(|&c| c > 1) {
                    RetreatOutcome::Standoff
                } else {
                    match arrival(game, &d.occupancy, target, &order) {
                        Ok(occ) => {
                            arrivals.push(occ);
                            RetreatOutcome::Success
                        }
                        Err(o) => o,
                    }
                }
            }
            _ => RetreatOutcome::Malformed,
        };
        results.push(retreat_result(nation, order, outcome));
    }

    // Unordered dislodged units are disbanded.
    for d in game.dislodged_units() {
        if !ordered[d.occupancy.province.index()] {
            let order = Order::disband(d.occupancy.province);
            results.push(retreat_result(d.occupancy.nation, order, RetreatOutcome::Success));
        }
    }

    let mut next = phase::advance(game, false);
    for occ in &arrivals {
        next.place(*occ);
    }
    if game.season() == Season::Fall {
        next.capture_centers();
    }

    info!(
        year = game.year(),
        season = ?game.season(),
        retreated = arrivals.len(),
        disbanded = game.dislodged_units().count().saturating_sub(arrivals.len()),
        "retreats resolved"
    );

    Resolution {
        game: next,
        results,
    }
}

/// The unit as it lands in `target`, with the fleet coast settled.
fn arrival(
    game: &Game,
    unit: &Occupancy,
    target: ProvinceId,
    order: &Order,
) -> Result<Occupancy, RetreatOutcome> {
    let edge = game
        .unit_edge(unit, target)
        .ok_or(RetreatOutcome::BadTarget)?;
    let coast = match unit.unit {
        UnitType::Army => None,
        UnitType::Fleet => edge.arrival_coast(order.target_coast).map_err(|e| match e {
            CoastError::Ambiguous => RetreatOutcome::CoastAmbiguous,
            CoastError::Invalid => RetreatOutcome::BadCoast,
        })?,
    };
    Ok(Occupancy {
        province: target,
        coast,
        ..*unit
    })
}

fn retreat_result(nation: NationId, order: Order, outcome: RetreatOutcome) -> ResolvedOrder {
    ResolvedOrder {
        nation,
        order,
        outcome: outcome.into(),
    }
}
