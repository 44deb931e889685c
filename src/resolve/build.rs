//! Build/disband-phase resolution.
//!
//! Applies staged builds and disbands at the end of a game year. Any nation
//! still fielding more units than it controls centers loses the units
//! farthest from its territory (civil disorder).

use tracing::{info, warn};

use crate::arena::PendingBuild;
use crate::board::{NationId, ProvinceId};
use crate::game::{Game, Occupancy};
use crate::order::{BuildOutcome, Order, OrderKind};

use super::{phase, Resolution, ResolvedOrder};

/// Resolves build-phase orders and builds the following spring.
///
/// `orders` carries the staged disbands and `builds` the staged builds,
/// both already validated against the adjustment counts.
pub(crate) fn resolve_builds(
    game: &Game,
    orders: &[(NationId, Order)],
    builds: &[(ProvinceId, PendingBuild)],
) -> Resolution {
    let mut next = phase::advance(game, false);
    let mut results = Vec::with_capacity(orders.len() + builds.len());

    for &(nation, order) in orders {
        let owned = order
            .unit
            .and_then(|p| game.unit(p))
            .is_some_and(|u| u.nation == nation);
        let outcome = match (order.kind(), owned) {
            (OrderKind::HoldDisband, true) => {
                if let Some(p) = order.unit {
                    next.vacate(p);
                }
                BuildOutcome::Success
            }
            (OrderKind::HoldDisband, false) => BuildOutcome::MissingUnit,
            _ => BuildOutcome::Malformed,
        };
        results.push(build_result(nation, order, outcome));
    }

    for &(province, b) in builds {
        next.place(Occupancy {
            province,
            coast: b.coast,
            unit: b.unit,
            nation: b.nation,
        });
        let order = Order {
            target: Some(province),
            target_coast: b.coast,
            build: Some(b.unit),
            ..Default::default()
        };
        results.push(build_result(b.nation, order, BuildOutcome::Success));
    }

    for nation in game.board().nation_ids() {
        let owed = next
            .unit_count(nation)
            .saturating_sub(game.center_count(nation));
        if owed == 0 {
            continue;
        }
        warn!(?nation, owed, "civil disorder disbands");
        for occ in next.farthest_units(nation).into_iter().take(owed) {
            next.vacate(occ.province);
            results.push(build_result(
                nation,
                Order::disband(occ.province),
                BuildOutcome::Success,
            ));
        }
    }

    info!(
        year = game.year(),
        builds = builds.len(),
        units = next.units().count(),
        "adjustments resolved"
    );

    Resolution {
        game: next,
        results,
    }
}

fn build_result(nation: NationId, order: Order, outcome: BuildOutcome) -> ResolvedOrder {
    ResolvedOrder {
        nation,
        order,
        outcome: outcome.into(),
    }
}
