//! Movement queries against the current position.
//!
//! These answer "where can this unit go" for order translators and for the
//! arena's retreat validation. During a retreat phase the unit considered
//! for a province is the dislodged one, if any.

use std::cmp::Reverse;

use crate::board::{Edge, NationId, ProvinceId, UnitType};

use super::state::{Game, Occupancy, Phase};

impl Game {
    /// The unit whose movement is relevant in this phase: the dislodged unit
    /// during retreats, otherwise the occupant.
    pub fn acting_unit(&self, province: ProvinceId) -> Option<&Occupancy> {
        match self.phase() {
            Phase::Retreat => self.dislodged(province).map(|d| &d.occupancy),
            _ => self.unit(province),
        }
    }

    /// The edge a unit would use to step directly into `to`, if its type may
    /// cross it and, for fleets, it leaves from the unit's coast.
    pub fn unit_edge(&self, occ: &Occupancy, to: ProvinceId) -> Option<Edge<'_>> {
        let edge = self.board().edge(occ.province, to)?;
        if !self.board().traversable(occ.unit, &edge) {
            return None;
        }
        if occ.unit == UnitType::Fleet && !edge.departs(occ.coast) {
            return None;
        }
        Some(edge)
    }

    /// Provinces the unit in `province` can step into directly.
    pub fn neighbors(&self, province: ProvinceId) -> Vec<ProvinceId> {
        let Some(occ) = self.acting_unit(province) else {
            return Vec::new();
        };
        self.board()
            .connections_from(province)
            .map(|e| e.to())
            .filter(|&to| self.unit_edge(occ, to).is_some())
            .collect()
    }

    pub fn has_neighbor(&self, from: ProvinceId, to: ProvinceId) -> bool {
        self.acting_unit(from)
            .is_some_and(|occ| self.unit_edge(occ, to).is_some())
    }

    /// Provinces the unit in `province` could be ordered to: direct
    /// neighbors plus, for an army in a movement phase, every coastal
    /// province reachable through fleets currently on the water.
    pub fn destinations(&self, province: ProvinceId) -> Vec<ProvinceId> {
        let mut dests = self.neighbors(province);
        if self.can_be_convoyed(province) {
            dests.extend(
                self.board()
                    .convoy_destinations(province, |p| self.fleet_at(p)),
            );
            dests.sort();
            dests.dedup();
        }
        dests
    }

    pub fn has_destination(&self, from: ProvinceId, to: ProvinceId) -> bool {
        self.has_neighbor(from, to)
            || (self.can_be_convoyed(from)
                && self.board().has_convoy_route(from, to, |p| self.fleet_at(p)))
    }

    /// Every simple chain of fleet-held water provinces linking two coastal
    /// provinces.
    pub fn convoy_chains(&self, from: ProvinceId, to: ProvinceId) -> Vec<Vec<ProvinceId>> {
        self.board().convoy_chains(from, to, |p| self.fleet_at(p))
    }

    /// Hops from `from` to the nearest province controlled by `nation`.
    pub fn center_distance(&self, from: ProvinceId, nation: NationId) -> Option<u32> {
        self.board()
            .distance(from, |p| self.controller(p) == Some(nation))
    }

    /// A nation's units ordered farthest from its controlled territory
    /// first, ties broken by province name. Units cut off from any
    /// controlled province rank farthest of all.
    pub fn farthest_units(&self, nation: NationId) -> Vec<Occupancy> {
        let mut ranked: Vec<(Option<Reverse<u32>>, &str, Occupancy)> = self
            .units_of(nation)
            .map(|u| {
                let dist = self.center_distance(u.province, nation).map(Reverse);
                let name = self
                    .board()
                    .province(u.province)
                    .map_or("", |p| p.name());
                (dist, name, *u)
            })
            .collect();
        ranked.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
        ranked.into_iter().map(|(_, _, u)| u).collect()
    }

    fn fleet_at(&self, province: ProvinceId) -> bool {
        self.unit(province)
            .is_some_and(|u| u.unit == UnitType::Fleet)
    }

    fn can_be_convoyed(&self, province: ProvinceId) -> bool {
        self.phase() == Phase::Movement
            && self
                .unit(province)
                .is_some_and(|u| u.unit == UnitType::Army)
    }
}
