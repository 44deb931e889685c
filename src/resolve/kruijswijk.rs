//! Kruijswijk guess-and-check resolution of the movement phase.
//!
//! Every order carries one decision: whether a move succeeds, whether a
//! support is given, or whether a convoying fleet stays in place. Decisions
//! are resolved recursively. When the recursion meets a decision it is
//! already working on, the current guess is returned and recorded in a
//! dependency list; a cycle whose two guesses disagree is settled by the
//! backup rule:
//!
//! - a cycle without convoy orders is circular movement, and every move in
//!   it succeeds;
//! - a cycle through a convoy order is a paradox, and the armies those
//!   convoys carry fail without cutting support (Szykman rule).
//!
//! Orders that fail a static check (unreachable target, bad coast, support
//! for an action the recipient is not taking) are voided first and the unit
//! holds.

use tracing::debug;

use crate::board::{Coast, CoastError, NationId, ProvinceId, Terrain, UnitType};
use crate::game::{DislodgedUnit, Game, Occupancy};
use crate::order::{MoveOutcome, Order, OrderKind};

/// Resolution state for the guess-and-check algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResState {
    Unresolved,
    Guessing,
    Resolved,
}

/// What a unit actually does once static checks have run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Hold,
    Move {
        target: ProvinceId,
        /// Arrival coast, for fleets entering a province with named coasts.
        coast: Option<Coast>,
        convoyed: bool,
    },
    SupportHold {
        recipient: ProvinceId,
    },
    SupportMove {
        recipient: ProvinceId,
        target: ProvinceId,
    },
    Convoy {
        army: ProvinceId,
        target: ProvinceId,
    },
}

/// Internal tracking for a single order during adjudication.
#[derive(Debug, Clone, Copy)]
struct AdjResult {
    order: Order,
    unit: Occupancy,
    action: Action,
    /// Static failure; the unit holds instead.
    void: Option<MoveOutcome>,
    state: ResState,
    resolution: bool,
    /// Convoyed move failed by the paradox rule.
    paradox: bool,
}

/// A resolved movement-phase order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveResult {
    pub nation: NationId,
    pub order: Order,
    pub outcome: MoveOutcome,
}

/// Everything a movement phase changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Adjudication {
    pub results: Vec<MoveResult>,
    /// Successful moves: origin province and the unit as it arrives.
    pub moves: Vec<(ProvinceId, Occupancy)>,
    pub dislodged: Vec<DislodgedUnit>,
    /// Provinces some move bounced out of. Retreats may not enter those
    /// left empty.
    pub bounces: Vec<ProvinceId>,
}

/// Adjudicator for one set of movement-phase orders.
pub struct Resolver<'a> {
    game: &'a Game,
    adj: Vec<AdjResult>,
    /// Order index for the unit in each province.
    lookup: Vec<Option<usize>>,
    /// Valid moves into each province.
    attackers: Vec<Vec<usize>>,
    /// Valid supports for the unit in each province.
    supports: Vec<Vec<usize>>,
    deps: Vec<usize>,
}

impl<'a> Resolver<'a> {
    /// Prepares orders for adjudication. Orders for provinces without a
    /// unit, and second orders for the same unit, are ignored.
    pub fn new(game: &'a Game, orders: &[(NationId, Order)]) -> Self {
        let n = game.board().len();
        let mut resolver = Resolver {
            game,
            adj: Vec::with_capacity(orders.len()),
            lookup: vec![None; n],
            attackers: vec![Vec::new(); n],
            supports: vec![Vec::new(); n],
            deps: Vec::new(),
        };
        for &(_, order) in orders {
            let Some(unit) = order.unit.and_then(|p| game.unit(p)).copied() else {
                continue;
            };
            let slot = &mut resolver.lookup[unit.province.index()];
            if slot.is_some() {
                continue;
            }
            *slot = Some(resolver.adj.len());
            let (action, void) = raw_action(&order);
            resolver.adj.push(AdjResult {
                order,
                unit,
                action,
                void,
                state: ResState::Unresolved,
                resolution: false,
                paradox: false,
            });
        }
        resolver.check_convoys();
        resolver.check_moves();
        resolver.check_convoys();
        resolver.check_supports();
        resolver.index();
        resolver
    }

    /// Resolves every order and reports the outcome of the phase.
    pub fn adjudicate(mut self) -> Adjudication {
        for i in 0..self.adj.len() {
            self.resolve(i);
        }
        self.build_results()
    }

    // === Static checks ===

    fn void(&mut self, i: usize, outcome: MoveOutcome) {
        self.adj[i].void = Some(outcome);
        self.adj[i].action = Action::Hold;
    }

    fn order_at(&self, province: ProvinceId) -> Option<usize> {
        self.lookup.get(province.index()).copied().flatten()
    }

    fn action_at(&self, province: ProvinceId) -> Action {
        self.order_at(province)
            .map_or(Action::Hold, |j| self.adj[j].action)
    }

    fn terrain(&self, province: ProvinceId) -> Option<Terrain> {
        self.game.board().province(province).map(|p| p.terrain())
    }

    /// Voids convoy orders from fleets not at sea, or for armies not making
    /// the matching convoyed move.
    fn check_convoys(&mut self) {
        for i in 0..self.adj.len() {
            let Action::Convoy { army, target } = self.adj[i].action else {
                continue;
            };
            if let Err(outcome) = self.convoy_check(i, army, target) {
                self.void(i, outcome);
            }
        }
    }

    fn convoy_check(&self, i: usize, army: ProvinceId, target: ProvinceId) -> Result<(), MoveOutcome> {
        let fleet = self.adj[i].unit;
        if fleet.unit != UnitType::Fleet || self.terrain(fleet.province) != Some(Terrain::Water) {
            return Err(MoveOutcome::BadTerrain);
        }
        let carried = self.game.unit(army).ok_or(MoveOutcome::MissingRecipient)?;
        if carried.unit != UnitType::Army {
            return Err(MoveOutcome::BadRecipient);
        }
        match self.action_at(army) {
            Action::Move { target: t, convoyed, .. }
                if t == target && (convoyed || self.game.unit_edge(carried, t).is_none()) =>
            {
                Ok(())
            }
            _ => Err(MoveOutcome::BadRecipient),
        }
    }

    fn check_moves(&mut self) {
        for i in 0..self.adj.len() {
            let Action::Move { target, coast, .. } = self.adj[i].action else {
                continue;
            };
            match self.move_check(i, target, coast) {
                Ok(action) => self.adj[i].action = action,
                Err(outcome) => self.void(i, outcome),
            }
        }
    }

    fn move_check(
        &self,
        i: usize,
        target: ProvinceId,
        coast: Option<Coast>,
    ) -> Result<Action, MoveOutcome> {
        let unit = self.adj[i].unit;
        let dest = self
            .game
            .board()
            .province(target)
            .ok_or(MoveOutcome::BadTarget)?;
        if target == unit.province {
            return Err(MoveOutcome::BadTarget);
        }
        if !dest.terrain().supports(unit.unit) {
            return Err(MoveOutcome::BadTerrain);
        }
        if let Some(edge) = self.game.unit_edge(&unit, target) {
            let coast = match unit.unit {
                UnitType::Army => None,
                UnitType::Fleet => edge.arrival_coast(coast).map_err(|e| match e {
                    CoastError::Ambiguous => MoveOutcome::CoastAmbiguous,
                    CoastError::Invalid => MoveOutcome::BadCoast,
                })?,
            };
            return Ok(Action::Move {
                target,
                coast,
                convoyed: false,
            });
        }
        let coastal = |p| self.terrain(p) == Some(Terrain::Coastal);
        if unit.unit != UnitType::Army || !coastal(unit.province) || !coastal(target) {
            return Err(MoveOutcome::BadTarget);
        }
        let army = unit.province;
        let routed = self.game.board().has_convoy_route(army, target, |p| {
            self.action_at(p) == Action::Convoy { army, target }
        });
        if routed {
            Ok(Action::Move {
                target,
                coast: None,
                convoyed: true,
            })
        } else {
            Err(MoveOutcome::NoConvoy)
        }
    }

    fn check_supports(&mut self) {
        for i in 0..self.adj.len() {
            if let Err(outcome) = self.support_check(i) {
                self.void(i, outcome);
            }
        }
    }

    fn support_check(&self, i: usize) -> Result<(), MoveOutcome> {
        let unit = self.adj[i].unit;
        let (recipient, target) = match self.adj[i].action {
            Action::SupportHold { recipient } => (recipient, None),
            Action::SupportMove { recipient, target } => (recipient, Some(target)),
            _ => return Ok(()),
        };
        if recipient == unit.province {
            return Err(MoveOutcome::BadRecipient);
        }
        if self.game.unit(recipient).is_none() {
            return Err(MoveOutcome::MissingRecipient);
        }
        let into = match (target, self.action_at(recipient)) {
            (None, Action::Move { .. }) => return Err(MoveOutcome::BadRecipient),
            (None, _) => recipient,
            (Some(t), Action::Move { target: rt, .. }) if rt == t => t,
            (Some(_), _) => return Err(MoveOutcome::BadRecipient),
        };
        // A unit can only support into a province it could itself enter.
        if self.game.unit_edge(&unit, into).is_none() {
            return Err(MoveOutcome::BadTarget);
        }
        Ok(())
    }

    fn index(&mut self) {
        for i in 0..self.adj.len() {
            match self.adj[i].action {
                Action::Move { target, .. } => self.attackers[target.index()].push(i),
                Action::SupportHold { recipient } | Action::SupportMove { recipient, .. } => {
                    self.supports[recipient.index()].push(i)
                }
                _ => {}
            }
        }
    }

    // === Guess and check ===

    fn resolve(&mut self, i: usize) -> bool {
        match self.adj[i].state {
            ResState::Resolved => return self.adj[i].resolution,
            ResState::Guessing => {
                // Every read of a guess is recorded so the reader is never
                // committed as resolved.
                self.deps.push(i);
                return self.adj[i].resolution;
            }
            ResState::Unresolved => {}
        }

        let old = self.deps.len();
        self.adj[i].state = ResState::Guessing;
        self.adj[i].resolution = false;
        let first = self.adjudicate_order(i);

        if self.deps.len() == old {
            // Nothing depended on a guess.
            if self.adj[i].state != ResState::Resolved {
                self.adj[i].state = ResState::Resolved;
                self.adj[i].resolution = first;
            }
            return self.adj[i].resolution;
        }

        if self.deps[old] != i {
            // Part of a cycle that starts further up the stack.
            self.deps.push(i);
            self.adj[i].resolution = first;
            return first;
        }

        // `i` heads a cycle: try the opposite guess.
        self.reset_deps(old);
        self.adj[i].state = ResState::Guessing;
        self.adj[i].resolution = true;
        let second = self.adjudicate_order(i);

        if first == second {
            // Only one guess is consistent.
            self.reset_deps(old);
            self.adj[i].state = ResState::Resolved;
            self.adj[i].resolution = first;
            return first;
        }

        self.backup_rule(old);
        self.resolve(i)
    }

    fn reset_deps(&mut self, old: usize) {
        for d in self.deps.drain(old..) {
            self.adj[d].state = ResState::Unresolved;
        }
    }

    /// Settles a cycle with zero or two consistent resolutions.
    fn backup_rule(&mut self, old: usize) {
        let cycle: Vec<usize> = self.deps.drain(old..).collect();
        let convoy_involved = cycle
            .iter()
            .any(|&d| matches!(self.adj[d].action, Action::Convoy { .. }));

        let mut settled = 0;
        if convoy_involved {
            for &d in &cycle {
                let Action::Convoy { army, .. } = self.adj[d].action else {
                    continue;
                };
                if let Some(m) = self.order_at(army) {
                    if self.adj[m].state != ResState::Resolved {
                        self.adj[m].paradox = true;
                        self.adj[m].resolution = false;
                        self.adj[m].state = ResState::Resolved;
                        settled += 1;
                    }
                }
            }
        } else {
            for &d in &cycle {
                if matches!(self.adj[d].action, Action::Move { .. }) {
                    self.adj[d].resolution = true;
                    self.adj[d].state = ResState::Resolved;
                    settled += 1;
                }
            }
        }
        debug!(cycle = cycle.len(), convoy_involved, settled, "backup rule applied");

        for &d in &cycle {
            if self.adj[d].state != ResState::Resolved {
                // A cycle the rule could not break keeps its current guesses.
                self.adj[d].state = if settled > 0 {
                    ResState::Unresolved
                } else {
                    ResState::Resolved
                };
            }
        }
    }

    fn adjudicate_order(&mut self, i: usize) -> bool {
        match self.adj[i].action {
            Action::Hold => true,
            Action::Move { .. } => self.resolve_move(i),
            Action::SupportHold { .. } | Action::SupportMove { .. } => self.resolve_support(i),
            Action::Convoy { .. } => !self.is_dislodged(self.adj[i].unit.province),
        }
    }

    /// Determines if a move order succeeds.
    fn resolve_move(&mut self, i: usize) -> bool {
        let Action::Move { target, .. } = self.adj[i].action else {
            return false;
        };
        let attack = self.attack_strength(i);

        if let Some(j) = self.head_to_head(i) {
            if attack <= self.defend_strength(j) {
                return false;
            }
        } else if attack <= self.hold_strength(target) {
            return false;
        }

        for n in 0..self.attackers[target.index()].len() {
            let k = self.attackers[target.index()][n];
            if k != i && attack <= self.prevent_strength(k) {
                return false;
            }
        }
        true
    }

    /// Determines if support is given: neither cut nor dislodged.
    fn resolve_support(&mut self, i: usize) -> bool {
        let supporter = self.adj[i].unit;
        let (recipient, against) = match self.adj[i].action {
            Action::SupportMove { recipient, target } => (recipient, Some(target)),
            Action::SupportHold { recipient } => (recipient, None),
            _ => return false,
        };
        let p = supporter.province;
        for n in 0..self.attackers[p.index()].len() {
            let k = self.attackers[p.index()][n];
            let attacker = self.adj[k].unit;
            // Support cannot be cut by a unit of the same nation.
            if attacker.nation == supporter.nation {
                continue;
            }
            // Nor by the unit it supports, nor by the unit being attacked.
            if attacker.province == recipient || Some(attacker.province) == against {
                continue;
            }
            // A convoyed attack only cuts if it arrives.
            if !self.path_ok(k) {
                continue;
            }
            return false;
        }
        !self.is_dislodged(p)
    }

    /// True if some move into the (non-moving) unit's province succeeds.
    fn is_dislodged(&mut self, province: ProvinceId) -> bool {
        for n in 0..self.attackers[province.index()].len() {
            let k = self.attackers[province.index()][n];
            if self.resolve(k) {
                return true;
            }
        }
        false
    }

    /// The opposing move when two units try to swap places without a convoy.
    fn head_to_head(&self, i: usize) -> Option<usize> {
        let Action::Move {
            target,
            convoyed: false,
            ..
        } = self.adj[i].action
        else {
            return None;
        };
        let j = self.order_at(target)?;
        match self.adj[j].action {
            Action::Move {
                target: back,
                convoyed: false,
                ..
            } if back == self.adj[i].unit.province => Some(j),
            _ => None,
        }
    }

    /// True if a move reaches its target: always for direct moves, and for
    /// convoyed moves if a chain of successful matching convoys survives.
    fn path_ok(&mut self, i: usize) -> bool {
        let Action::Move {
            target, convoyed, ..
        } = self.adj[i].action
        else {
            return false;
        };
        if !convoyed {
            return true;
        }
        if self.adj[i].paradox {
            return false;
        }
        let army = self.adj[i].unit.province;
        let game = self.game;
        game.board().has_convoy_route(army, target, |p| match self.order_at(p) {
            Some(j) if self.adj[j].action == (Action::Convoy { army, target }) => self.resolve(j),
            _ => false,
        })
    }

    /// Counts successful supports for the unit in `province`, ignoring
    /// supports from `excluded`.
    fn support_count(&mut self, province: ProvinceId, excluded: Option<NationId>) -> u32 {
        let mut count = 0;
        for n in 0..self.supports[province.index()].len() {
            let s = self.supports[province.index()][n];
            if Some(self.adj[s].unit.nation) == excluded {
                continue;
            }
            if self.resolve(s) {
                count += 1;
            }
        }
        count
    }

    /// Computes the attack strength of a move order.
    fn attack_strength(&mut self, i: usize) -> u32 {
        let Action::Move { target, .. } = self.adj[i].action else {
            return 0;
        };
        if !self.path_ok(i) {
            return 0;
        }
        let attacker = self.adj[i].unit;
        let defender = match self.game.unit(target) {
            None => None,
            Some(occ) => {
                let leaving = match self.order_at(target) {
                    Some(j)
                        if matches!(self.adj[j].action, Action::Move { .. })
                            && self.head_to_head(i) != Some(j) =>
                    {
                        self.resolve(j)
                    }
                    _ => false,
                };
                if leaving {
                    None
                } else {
                    Some(occ.nation)
                }
            }
        };
        // A nation may not dislodge its own unit, nor help dislodge it.
        if defender == Some(attacker.nation) {
            return 0;
        }
        1 + self.support_count(attacker.province, defender)
    }

    /// Computes the hold strength of a province.
    fn hold_strength(&mut self, province: ProvinceId) -> u32 {
        if self.game.unit(province).is_none() {
            return 0;
        }
        match self.order_at(province) {
            Some(j) if matches!(self.adj[j].action, Action::Move { .. }) => {
                if self.resolve(j) {
                    0
                } else {
                    1
                }
            }
            _ => 1 + self.support_count(province, None),
        }
    }

    /// Strength of a unit in a head-to-head battle.
    fn defend_strength(&mut self, j: usize) -> u32 {
        let province = self.adj[j].unit.province;
        1 + self.support_count(province, None)
    }

    /// Computes the prevent strength of a move order.
    fn prevent_strength(&mut self, k: usize) -> u32 {
        if !self.path_ok(k) {
            return 0;
        }
        // A unit that lost its head-to-head battle cannot hold anyone off.
        if let Some(j) = self.head_to_head(k) {
            if self.resolve(j) {
                return 0;
            }
        }
        let province = self.adj[k].unit.province;
        1 + self.support_count(province, None)
    }

    // === Results ===

    /// Converts internal adjudication state to the external result format.
    fn build_results(&mut self) -> Adjudication {
        let n = self.game.board().len();
        let mut entered: Vec<Option<usize>> = vec![None; n];
        for (i, a) in self.adj.iter().enumerate() {
            if let Action::Move { target, .. } = a.action {
                if a.resolution {
                    entered[target.index()] = Some(i);
                }
            }
        }

        let mut out = Adjudication::default();

        for i in 0..self.adj.len() {
            let a = self.adj[i];
            let moved_out = matches!(a.action, Action::Move { .. }) && a.resolution;
            let outcome = if !moved_out && entered[a.unit.province.index()].is_some() {
                MoveOutcome::Dislodged
            } else if let Some(void) = a.void {
                void
            } else {
                match a.action {
                    Action::Hold | Action::Convoy { .. } => MoveOutcome::Success,
                    Action::SupportHold { .. } | Action::SupportMove { .. } => {
                        if a.resolution {
                            MoveOutcome::Success
                        } else {
                            MoveOutcome::Cut
                        }
                    }
                    Action::Move { target, coast, .. } => {
                        if a.resolution {
                            out.moves.push((
                                a.unit.province,
                                Occupancy {
                                    province: target,
                                    coast,
                                    ..a.unit
                                },
                            ));
                            MoveOutcome::Success
                        } else if !self.path_ok(i) {
                            MoveOutcome::NoConvoy
                        } else {
                            out.bounces.push(target);
                            if entered[target.index()].is_some() {
                                MoveOutcome::Weak
                            } else {
                                MoveOutcome::Standoff
                            }
                        }
                    }
                }
            };
            out.results.push(MoveResult {
                nation: a.unit.nation,
                order: a.order,
                outcome,
            });
        }

        // Units are dislodged whether or not they were ordered.
        for (p, winner) in entered.iter().enumerate() {
            let Some(k) = *winner else { continue };
            let province = ProvinceId(p as u16);
            let Some(occ) = self.game.unit(province).copied() else {
                continue;
            };
            let moved_out = self
                .order_at(province)
                .is_some_and(|j| matches!(self.adj[j].action, Action::Move { .. }) && self.adj[j].resolution);
            if !moved_out {
                out.dislodged.push(DislodgedUnit {
                    occupancy: occ,
                    attacker_from: self.adj[k].unit.province,
                });
            }
        }

        out.bounces.sort();
        out.bounces.dedup();
        out
    }
}

/// Maps an order's shape onto the action it requests.
fn raw_action(order: &Order) -> (Action, Option<MoveOutcome>) {
    let action = match (order.kind(), order.recipient, order.target) {
        (OrderKind::HoldDisband, _, _) => Action::Hold,
        (OrderKind::MoveRetreat, _, Some(target)) => Action::Move {
            target,
            coast: order.target_coast,
            convoyed: false,
        },
        (OrderKind::SupportHold, Some(recipient), _) => Action::SupportHold { recipient },
        (OrderKind::SupportMove, Some(recipient), Some(target)) => {
            Action::SupportMove { recipient, target }
        }
        (OrderKind::Convoy, Some(army), Some(target)) => Action::Convoy { army, target },
        _ => return (Action::Hold, Some(MoveOutcome::Malformed)),
    };
    (action, None)
}

/// Creates a resolver and adjudicates in one call.
pub fn adjudicate(game: &Game, orders: &[(NationId, Order)]) -> Adjudication {
    Resolver::new(game, orders).adjudicate()
}
