//! Incremental order staging for one phase of one game.
//!
//! An [`Arena`] validates each order as it arrives against the game and the
//! orders already staged, keeps a per-nation ledger of every order with its
//! outcome, and can be queried, edited, and finally resolved into the next
//! [`Game`]. Dropping an arena without resolving it leaves the game as it was.
//!
//! Only successful orders claim a unit or change the build economy; failed
//! orders are kept in the ledger for auditing and removing them is free.

mod validate;

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{debug, warn};

use crate::board::{Coast, NationId, ProvinceId, UnitType};
use crate::game::{Game, Occupancy, Phase};
use crate::order::{Order, OrderKind, Outcome};
use crate::resolve::{self, Resolution};

/// Errors for calls that name something outside the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArenaError {
    #[error("nation {0:?} is not on the board")]
    UnknownNation(NationId),
}

/// A build staged for the build phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingBuild {
    pub nation: NationId,
    pub unit: UnitType,
    pub coast: Option<Coast>,
}

/// The order currently claiming a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct UnitOrder {
    nation: NationId,
    order: Order,
    outcome: Outcome,
}

/// Staging area for one phase of a game.
#[derive(Debug, Clone)]
pub struct Arena<'g> {
    game: &'g Game,
    nation_orders: Vec<BTreeMap<Order, Outcome>>,
    unit_orders: BTreeMap<ProvinceId, UnitOrder>,
    builds: BTreeMap<ProvinceId, PendingBuild>,
    build_count: Vec<i32>,
}

impl Game {
    /// Opens an empty arena for this game's current phase.
    pub fn arena(&self) -> Arena<'_> {
        Arena::new(self)
    }

    /// Opens an arena with every nation's default orders staged: holds in a
    /// movement phase, disbands in a retreat phase, and in a build phase the
    /// disbands a nation over its center count owes, farthest units first.
    pub fn civil_disorder(&self) -> Arena<'_> {
        let mut arena = self.arena();
        for nation in self.board().nation_ids() {
            arena.civil_disorder(nation);
        }
        arena
    }
}

impl<'g> Arena<'g> {
    pub fn new(game: &'g Game) -> Self {
        let nations = game.board().nations().len();
        let build_count = game
            .board()
            .nation_ids()
            .map(|n| match game.phase() {
                Phase::Build => game.center_count(n) as i32 - game.unit_count(n) as i32,
                _ => 0,
            })
            .collect();
        Arena {
            game,
            nation_orders: vec![BTreeMap::new(); nations],
            unit_orders: BTreeMap::new(),
            builds: BTreeMap::new(),
            build_count,
        }
    }

    pub fn game(&self) -> &'g Game {
        self.game
    }

    /// Validates and stages an order, returning its outcome.
    ///
    /// A failing order is recorded in the nation's ledger but claims no unit.
    /// Adding an order that is already staged returns its recorded outcome;
    /// a recorded failure is validated again against the current staging.
    pub fn add(&mut self, nation: NationId, order: Order) -> Result<Outcome, ArenaError> {
        self.check_nation(nation)?;
        let ledger = &mut self.nation_orders[nation.index()];
        match ledger.get(&order).copied() {
            Some(outcome) if outcome.is_success() => return Ok(outcome),
            Some(_) => {
                ledger.remove(&order);
            }
            None => {}
        }
        let (unit, outcome) = self.validate(nation, &order);
        if outcome.is_success() {
            self.stage(nation, order, unit, outcome);
        }
        self.nation_orders[nation.index()].insert(order, outcome);
        debug!(?nation, ?order, %outcome, "order added");
        Ok(outcome)
    }

    /// The outcome an order has, or would have if added now. Never changes
    /// the arena.
    pub fn query(&self, nation: NationId, order: &Order) -> Result<Outcome, ArenaError> {
        self.check_nation(nation)?;
        match self.nation_orders[nation.index()].get(order) {
            Some(&outcome) if outcome.is_success() => Ok(outcome),
            _ => Ok(self.validate(nation, order).1),
        }
    }

    /// Withdraws a previously added order, releasing its unit and any build
    /// economy change. Returns the outcome it had.
    pub fn remove(&mut self, nation: NationId, order: &Order) -> Option<Outcome> {
        let outcome = self.nation_orders.get_mut(nation.index())?.remove(order)?;
        if outcome.is_success() {
            self.unstage(nation, order);
        }
        debug!(?nation, ?order, "order removed");
        Some(outcome)
    }

    /// Withdraws every order a nation has added.
    pub fn clear(&mut self, nation: NationId) {
        let Some(ledger) = self.nation_orders.get_mut(nation.index()) else {
            return;
        };
        let ledger = std::mem::take(ledger);
        for (order, outcome) in &ledger {
            if outcome.is_success() {
                self.unstage(nation, order);
            }
        }
        debug!(?nation, count = ledger.len(), "orders cleared");
    }

    /// Gives every unit without an order the default hold (or, in a retreat
    /// phase, disband). Does nothing in a build phase: an unordered nation
    /// keeps its units and any unused builds.
    pub fn fill_in(&mut self) {
        if self.game.phase() == Phase::Build {
            return;
        }
        for occ in self.unordered() {
            match self.add(occ.nation, Order::hold(occ.province)) {
                Ok(outcome) if outcome.is_success() => {}
                result => warn!(?occ, ?result, "default order rejected"),
            }
        }
    }

    /// Stages the default orders for one nation; see [`Game::civil_disorder`].
    pub fn civil_disorder(&mut self, nation: NationId) {
        if self.game.phase() != Phase::Build {
            let units: Vec<Occupancy> = self
                .unordered()
                .into_iter()
                .filter(|u| u.nation == nation)
                .collect();
            for occ in units {
                let _ = self.add(nation, Order::disband(occ.province));
            }
            return;
        }
        let owed = -self.build_count_left(nation);
        if owed <= 0 {
            return;
        }
        let candidates: Vec<Occupancy> = self
            .game
            .farthest_units(nation)
            .into_iter()
            .filter(|u| !self.unit_orders.contains_key(&u.province))
            .take(owed as usize)
            .collect();
        warn!(?nation, owed, "civil disorder disbands");
        for occ in candidates {
            let _ = self.add(nation, Order::disband(occ.province));
        }
    }

    /// Units (dislodged units in a retreat phase) with no order yet.
    pub fn unordered(&self) -> Vec<Occupancy> {
        self.acting_units()
            .filter(|u| !self.unit_orders.contains_key(&u.province))
            .collect()
    }

    /// Every order a nation has added, in order-value order.
    pub fn orders(&self, nation: NationId) -> Vec<Order> {
        self.nation_orders
            .get(nation.index())
            .map(|m| m.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Every order a nation has added with its outcome.
    pub fn outcomes(&self, nation: NationId) -> BTreeMap<Order, Outcome> {
        self.nation_orders
            .get(nation.index())
            .cloned()
            .unwrap_or_default()
    }

    /// The order claiming the unit in a province, with its outcome.
    pub fn unit(&self, province: ProvinceId) -> Option<(Order, Outcome)> {
        self.unit_orders
            .get(&province)
            .map(|u| (u.order, u.outcome))
    }

    /// Dislodged units given a retreat move, with that order. Empty outside
    /// retreat phases.
    pub fn retreats(&self) -> Vec<(Occupancy, Order)> {
        if self.game.phase() != Phase::Retreat {
            return Vec::new();
        }
        self.claimed(OrderKind::MoveRetreat)
    }

    /// Units explicitly ordered to disband. Empty in movement phases, and
    /// never includes automatic disbands.
    pub fn disbandments(&self) -> Vec<Occupancy> {
        if self.game.phase() == Phase::Movement {
            return Vec::new();
        }
        self.claimed(OrderKind::HoldDisband)
            .into_iter()
            .map(|(u, _)| u)
            .collect()
    }

    /// The build staged on a province, if any.
    pub fn build(&self, province: ProvinceId) -> Option<PendingBuild> {
        self.builds.get(&province).copied()
    }

    /// Provinces with a staged build.
    pub fn builds(&self) -> impl Iterator<Item = ProvinceId> + '_ {
        self.builds.keys().copied()
    }

    /// Builds a nation may still stage this phase. Negative values count
    /// disbands still owed. Always zero outside build phases.
    pub fn build_count_left(&self, nation: NationId) -> i32 {
        self.build_count.get(nation.index()).copied().unwrap_or(0)
    }

    /// Fills in default orders and resolves the phase, reporting every
    /// order's final outcome alongside the next game.
    pub fn resolve(mut self) -> Resolution {
        self.fill_in();
        let staged: Vec<(NationId, Order)> = self
            .unit_orders
            .values()
            .map(|u| (u.nation, u.order))
            .collect();
        match self.game.phase() {
            Phase::Movement => resolve::resolve_movement(self.game, &staged),
            Phase::Retreat => resolve::resolve_retreats(self.game, &staged),
            Phase::Build => {
                let builds: Vec<(ProvinceId, PendingBuild)> =
                    self.builds.iter().map(|(&p, &b)| (p, b)).collect();
                resolve::resolve_builds(self.game, &staged, &builds)
            }
        }
    }

    /// Fills in default orders and produces the next game.
    pub fn go(self) -> Game {
        self.resolve().game
    }

    fn check_nation(&self, nation: NationId) -> Result<(), ArenaError> {
        if nation.index() < self.nation_orders.len() {
            Ok(())
        } else {
            Err(ArenaError::UnknownNation(nation))
        }
    }

    fn acting_units(&self) -> impl Iterator<Item = Occupancy> + '_ {
        let game = self.game;
        game.board()
            .province_ids()
            .filter_map(move |p| game.acting_unit(p).copied())
    }

    fn claimed(&self, kind: OrderKind) -> Vec<(Occupancy, Order)> {
        self.unit_orders
            .iter()
            .filter(|(_, u)| u.order.kind() == kind)
            .filter_map(|(&p, u)| self.game.acting_unit(p).map(|occ| (*occ, u.order)))
            .collect()
    }

    fn stage(&mut self, nation: NationId, order: Order, unit: Option<ProvinceId>, outcome: Outcome) {
        if let Some(province) = unit {
            self.unit_orders.insert(
                province,
                UnitOrder {
                    nation,
                    order,
                    outcome,
                },
            );
        }
        if self.game.phase() != Phase::Build {
            return;
        }
        match (order.kind(), order.target, order.build) {
            (OrderKind::Build, Some(target), Some(unit)) => {
                let coast = self.build_coast(target, unit, order.target_coast);
                self.builds.insert(
                    target,
                    PendingBuild {
                        nation,
                        unit,
                        coast,
                    },
                );
                self.build_count[nation.index()] -= 1;
            }
            (OrderKind::HoldDisband, _, _) => self.build_count[nation.index()] += 1,
            _ => {}
        }
    }

    fn unstage(&mut self, nation: NationId, order: &Order) {
        if let Some(province) = order.unit {
            self.unit_orders.remove(&province);
        }
        if self.game.phase() != Phase::Build {
            return;
        }
        match (order.kind(), order.target) {
            (OrderKind::Build, Some(target)) => {
                self.builds.remove(&target);
                self.build_count[nation.index()] += 1;
            }
            (OrderKind::HoldDisband, _) => self.build_count[nation.index()] -= 1,
            _ => {}
        }
    }

    /// The coast a staged fleet build lands on; armies and single-coast
    /// provinces carry none.
    fn build_coast(&self, target: ProvinceId, unit: UnitType, coast: Option<Coast>) -> Option<Coast> {
        let split = self
            .game
            .board()
            .province(target)
            .is_some_and(|p| p.has_coasts());
        if unit == UnitType::Fleet && split {
            coast
        } else {
            None
        }
    }
}
