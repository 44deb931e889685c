//! Per-phase order validation.
//!
//! Each validator returns the province of the unit the order would claim
//! (if any) and the outcome. Movement-phase validation only checks
//! ownership: reachability and combat depend on the full order set and are
//! left to the adjudicator.

use crate::board::{CoastError, NationId, ProvinceId, UnitType};
use crate::game::{Occupancy, Phase};
use crate::order::{BuildOutcome, MoveOutcome, Order, OrderKind, Outcome, RetreatOutcome};

use super::Arena;

/// Why a unit cannot take an order, before any phase-specific rule.
enum Claim {
    Missing,
    Enemy,
    Repeat,
}

impl<'g> Arena<'g> {
    pub(super) fn validate(&self, nation: NationId, order: &Order) -> (Option<ProvinceId>, Outcome) {
        match self.game.phase() {
            Phase::Movement => {
                let (unit, o) = self.validate_move(nation, order);
                (unit, o.into())
            }
            Phase::Retreat => {
                let (unit, o) = self.validate_retreat(nation, order);
                (unit, o.into())
            }
            Phase::Build => {
                let (unit, o) = self.validate_build(nation, order);
                (unit, o.into())
            }
        }
    }

    /// Looks up the acting unit for `province` and checks it is this
    /// nation's and still unordered.
    fn claim(&self, nation: NationId, province: Option<ProvinceId>) -> Result<&'g Occupancy, Claim> {
        let unit = province
            .and_then(|p| self.game.acting_unit(p))
            .ok_or(Claim::Missing)?;
        if unit.nation != nation {
            return Err(Claim::Enemy);
        }
        if self.unit_orders.contains_key(&unit.province) {
            return Err(Claim::Repeat);
        }
        Ok(unit)
    }

    fn validate_move(&self, nation: NationId, order: &Order) -> (Option<ProvinceId>, MoveOutcome) {
        if matches!(order.kind(), OrderKind::Invalid | OrderKind::Build) {
            return (None, MoveOutcome::Malformed);
        }
        match self.claim(nation, order.unit) {
            Ok(unit) => (Some(unit.province), MoveOutcome::Success),
            Err(Claim::Missing) => (None, MoveOutcome::MissingUnit),
            Err(Claim::Enemy) => (None, MoveOutcome::EnemyUnit),
            Err(Claim::Repeat) => (None, MoveOutcome::RepeatUnit),
        }
    }

    fn validate_retreat(
        &self,
        nation: NationId,
        order: &Order,
    ) -> (Option<ProvinceId>, RetreatOutcome) {
        let kind = order.kind();
        if !matches!(kind, OrderKind::HoldDisband | OrderKind::MoveRetreat) {
            return (None, RetreatOutcome::Malformed);
        }
        let unit = match self.claim(nation, order.unit) {
            Ok(unit) => unit,
            Err(Claim::Missing) => return (None, RetreatOutcome::MissingUnit),
            Err(Claim::Enemy) => return (None, RetreatOutcome::EnemyUnit),
            Err(Claim::Repeat) => return (None, RetreatOutcome::RepeatUnit),
        };
        let claimed = Some(unit.province);
        let Some(target) = order.target else {
            return (claimed, RetreatOutcome::Success);
        };
        (claimed, self.retreat_target(unit, target, order))
    }

    fn retreat_target(&self, unit: &Occupancy, target: ProvinceId, order: &Order) -> RetreatOutcome {
        let game = self.game;
        let Some(edge) = game.unit_edge(unit, target) else {
            let supported = game
                .board()
                .province(target)
                .is_some_and(|p| p.terrain().supports(unit.unit));
            return if supported {
                RetreatOutcome::BadTarget
            } else {
                RetreatOutcome::BadTerrain
            };
        };
        if game.is_contested(target) {
            return RetreatOutcome::Standoff;
        }
        let attacker = game.dislodged(unit.province).map(|d| d.attacker_from);
        if attacker == Some(target) {
            return RetreatOutcome::BadTarget;
        }
        if game.unit(target).is_some() {
            return RetreatOutcome::Occupied;
        }
        if unit.unit == UnitType::Fleet {
            match edge.arrival_coast(order.target_coast) {
                Err(CoastError::Ambiguous) => return RetreatOutcome::CoastAmbiguous,
                Err(CoastError::Invalid) => return RetreatOutcome::BadCoast,
                Ok(_) => {}
            }
        }
        RetreatOutcome::Success
    }

    fn validate_build(&self, nation: NationId, order: &Order) -> (Option<ProvinceId>, BuildOutcome) {
        let count = self.build_count_left(nation);
        match order.kind() {
            OrderKind::HoldDisband => {
                if count >= 0 {
                    return (None, BuildOutcome::NoDisbands);
                }
                match self.claim(nation, order.unit) {
                    Ok(unit) => (Some(unit.province), BuildOutcome::Success),
                    Err(Claim::Missing) => (None, BuildOutcome::MissingUnit),
                    Err(Claim::Enemy) => (None, BuildOutcome::EnemyUnit),
                    Err(Claim::Repeat) => (None, BuildOutcome::RepeatUnit),
                }
            }
            OrderKind::Build => (None, self.build_target(nation, order, count)),
            _ => (None, BuildOutcome::Malformed),
        }
    }

    fn build_target(&self, nation: NationId, order: &Order, count: i32) -> BuildOutcome {
        let (Some(target), Some(unit)) = (order.target, order.build) else {
            return BuildOutcome::Malformed;
        };
        if count <= 0 {
            return BuildOutcome::NoBuilds;
        }
        let Some(province) = self.game.board().province(target) else {
            return BuildOutcome::NotHome;
        };
        if province.home() != Some(nation) {
            return BuildOutcome::NotHome;
        }
        if self.game.controller(target) != Some(nation) {
            return BuildOutcome::NotControlled;
        }
        if self.game.unit(target).is_some() || self.builds.contains_key(&target) {
            return BuildOutcome::Occupied;
        }
        if !province.terrain().supports(unit) {
            return BuildOutcome::BadTerrain;
        }
        let coast_ok = match order.target_coast {
            Some(c) => province.coasts().contains(&c),
            None => false,
        };
        if unit == UnitType::Fleet && province.has_coasts() && !coast_ok {
            return BuildOutcome::CoastAmbiguous;
        }
        BuildOutcome::Success
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::board::{Board, Coast, ProvinceId, UnitType};
    use crate::game::{Game, Occupancy, Phase, Season};
    use crate::order::{BuildOutcome, MoveOutcome, Order, Outcome, RetreatOutcome};

    fn game_at(phase: Phase) -> Game {
        let board = Arc::new(Board::standard().unwrap());
        Game::at(board, 1901, Season::Fall, phase)
    }

    fn id(g: &Game, name: &str) -> ProvinceId {
        g.board().find(name).unwrap()
    }

    #[test]
    fn move_phase_checks_ownership_only() {
        let g = Game::standard().unwrap();
        let germany = g.board().nation("Germany").unwrap();
        let mut arena = g.arena();
        let far_away = Order::move_to(id(&g, "Kie"), id(&g, "Mos"));
        assert_eq!(arena.add(germany, far_away), Ok(MoveOutcome::Success.into()));
        let again = Order::hold(id(&g, "Kie"));
        assert_eq!(arena.add(germany, again), Ok(MoveOutcome::RepeatUnit.into()));
        let build = Order::build(id(&g, "Ber"), UnitType::Army);
        assert_eq!(arena.add(germany, build), Ok(MoveOutcome::Malformed.into()));
        let missing = Order::hold(id(&g, "Bur"));
        assert_eq!(arena.add(germany, missing), Ok(MoveOutcome::MissingUnit.into()));
    }

    fn retreat_game() -> Game {
        let mut g = game_at(Phase::Retreat);
        let russia = g.board().nation("Russia").unwrap();
        let turkey = g.board().nation("Turkey").unwrap();
        let gal = id(&g, "Gal");
        let ukr = id(&g, "Ukr");
        let bla = id(&g, "BLA");
        // A Russian army driven from Galicia by an attack from Ukraine.
        g.add_dislodged(Occupancy::new(gal, UnitType::Army, russia), ukr).unwrap();
        // A Russian fleet driven from the Black Sea by an attack from Ankara.
        g.add_dislodged(Occupancy::new(bla, UnitType::Fleet, russia), id(&g, "Ank")).unwrap();
        g.set_unit(Occupancy::new(id(&g, "Vie"), UnitType::Army, turkey)).unwrap();
        g.block_retreat(id(&g, "Boh")).unwrap();
        g
    }

    #[test]
    fn retreat_validation() {
        let g = retreat_game();
        let russia = g.board().nation("Russia").unwrap();
        let turkey = g.board().nation("Turkey").unwrap();
        let arena = g.arena();
        let gal = id(&g, "Gal");
        let q = |nation, order: Order| arena.query(nation, &order).unwrap();
        let r = |o: RetreatOutcome| Outcome::from(o);

        assert_eq!(q(russia, Order::move_to(gal, id(&g, "Sil"))), r(RetreatOutcome::Success));
        assert_eq!(q(russia, Order::disband(gal)), r(RetreatOutcome::Success));
        assert_eq!(q(turkey, Order::disband(gal)), r(RetreatOutcome::EnemyUnit));
        assert_eq!(q(russia, Order::move_to(gal, id(&g, "Mos"))), r(RetreatOutcome::BadTarget));
        assert_eq!(q(russia, Order::move_to(gal, id(&g, "Boh"))), r(RetreatOutcome::Standoff));
        assert_eq!(q(russia, Order::move_to(gal, id(&g, "Ukr"))), r(RetreatOutcome::BadTarget));
        assert_eq!(q(russia, Order::move_to(gal, id(&g, "Vie"))), r(RetreatOutcome::Occupied));
        assert_eq!(q(russia, Order::support_hold(gal, id(&g, "Vie"))), r(RetreatOutcome::Malformed));
        // Nothing was dislodged from Warsaw.
        assert_eq!(q(russia, Order::hold(id(&g, "War"))), r(RetreatOutcome::MissingUnit));
    }

    #[test]
    fn fleet_retreat_coasts() {
        let g = retreat_game();
        let russia = g.board().nation("Russia").unwrap();
        let arena = g.arena();
        let bla = id(&g, "BLA");
        let bul = id(&g, "Bul");
        let q = |order: Order| arena.query(russia, &order).unwrap();

        // Only the east coast of Bulgaria touches the Black Sea.
        assert_eq!(q(Order::move_to(bla, bul)), RetreatOutcome::Success.into());
        assert_eq!(
            q(Order::move_to_coast(bla, bul, Coast::South)),
            RetreatOutcome::BadCoast.into()
        );
        assert_eq!(q(Order::move_to(bla, id(&g, "Ukr"))), RetreatOutcome::BadTerrain.into());
        assert_eq!(q(Order::move_to(bla, id(&g, "ADR"))), RetreatOutcome::BadTarget.into());
    }

    #[test]
    fn fleet_retreat_needs_coast_when_ambiguous() {
        let mut g = game_at(Phase::Retreat);
        let france = g.board().nation("France").unwrap();
        let mao = id(&g, "MAO");
        g.add_dislodged(Occupancy::new(mao, UnitType::Fleet, france), id(&g, "Bre"))
            .unwrap();
        let arena = g.arena();
        let spa = id(&g, "Spa");
        assert_eq!(
            arena.query(france, &Order::move_to(mao, spa)),
            Ok(RetreatOutcome::CoastAmbiguous.into())
        );
        assert_eq!(
            arena.query(france, &Order::move_to_coast(mao, spa, Coast::North)),
            Ok(RetreatOutcome::Success.into())
        );
    }

    #[test]
    fn build_validation() {
        let mut g = game_at(Phase::Build);
        let russia = g.board().nation("Russia").unwrap();
        let war = id(&g, "War");
        g.set_unit(Occupancy::new(war, UnitType::Army, russia)).unwrap();
        g.free_center(id(&g, "Sev")).unwrap();
        let mut arena = g.arena();
        assert_eq!(arena.build_count_left(russia), 2);

        let b = |o: BuildOutcome| Outcome::from(o);
        let q = |arena: &crate::arena::Arena<'_>, order: Order| arena.query(russia, &order).unwrap();

        assert_eq!(q(&arena, Order::build(id(&g, "Vie"), UnitType::Army)), b(BuildOutcome::NotHome));
        assert_eq!(q(&arena, Order::build(id(&g, "Sev"), UnitType::Army)), b(BuildOutcome::NotControlled));
        assert_eq!(q(&arena, Order::build(war, UnitType::Army)), b(BuildOutcome::Occupied));
        assert_eq!(q(&arena, Order::build(id(&g, "Mos"), UnitType::Fleet)), b(BuildOutcome::BadTerrain));
        assert_eq!(q(&arena, Order::disband(war)), b(BuildOutcome::NoDisbands));
        assert_eq!(q(&arena, Order::support_hold(war, id(&g, "Mos"))), b(BuildOutcome::Malformed));
        let no_kind = Order {
            target: Some(id(&g, "Mos")),
            ..Default::default()
        };
        assert_eq!(q(&arena, no_kind), b(BuildOutcome::Malformed));

        let stp = id(&g, "StP");
        assert_eq!(
            arena.add(russia, Order::build(stp, UnitType::Fleet)),
            Ok(b(BuildOutcome::CoastAmbiguous))
        );
        assert_eq!(arena.build_count_left(russia), 2);
        assert_eq!(
            arena.add(russia, Order::build_on_coast(stp, UnitType::Fleet, Coast::North)),
            Ok(b(BuildOutcome::Success))
        );
        assert_eq!(arena.build_count_left(russia), 1);
        assert_eq!(arena.build(stp).and_then(|p| p.coast), Some(Coast::North));
        // A second build on the same center is blocked by the first.
        assert_eq!(
            arena.add(russia, Order::build(stp, UnitType::Army)),
            Ok(b(BuildOutcome::Occupied))
        );
        assert_eq!(
            arena.add(russia, Order::build(id(&g, "Mos"), UnitType::Army)),
            Ok(b(BuildOutcome::Success))
        );
        assert_eq!(
            arena.query(russia, &Order::build(id(&g, "Sev"), UnitType::Army)),
            Ok(b(BuildOutcome::NoBuilds))
        );
    }

    #[test]
    fn disbands_need_a_deficit() {
        let mut g = game_at(Phase::Build);
        let turkey = g.board().nation("Turkey").unwrap();
        for name in ["Ank", "Con", "Smy", "Arm", "Syr"] {
            g.set_unit(Occupancy::new(id(&g, name), UnitType::Army, turkey)).unwrap();
        }
        let mut arena = g.arena();
        assert_eq!(arena.build_count_left(turkey), -2);
        let syr = Order::disband(id(&g, "Syr"));
        assert_eq!(arena.add(turkey, syr), Ok(BuildOutcome::Success.into()));
        assert_eq!(arena.build_count_left(turkey), -1);
        assert_eq!(arena.add(turkey, Order::hold(id(&g, "Bul"))), Ok(BuildOutcome::MissingUnit.into()));
        assert_eq!(arena.disbandments().len(), 1);
        arena.remove(turkey, &syr);
        assert_eq!(arena.build_count_left(turkey), -2);
    }
}
