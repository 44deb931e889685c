//! Multi-hop searches over the board.
//!
//! Which water provinces can carry an army depends on where fleets stand,
//! so every search takes a predicate instead of reading game state.

use std::collections::VecDeque;

use super::province::{ProvinceId, Terrain};
use super::Board;

impl Board {
    /// Enumerates every simple chain of water provinces, each accepted by
    /// `fleet_at`, that links `from` to `to`.
    ///
    /// Each chain lists the water provinces in order from the origin side.
    /// Both endpoints must be coastal; otherwise the result is empty.
    pub fn convoy_chains(
        &self,
        from: ProvinceId,
        to: ProvinceId,
        mut fleet_at: impl FnMut(ProvinceId) -> bool,
    ) -> Vec<Vec<ProvinceId>> {
        let mut chains = Vec::new();
        if from == to || !self.is_coastal(from) || !self.is_coastal(to) {
            return chains;
        }
        let mut path = Vec::new();
        for edge in self.connections_from(from) {
            let next = edge.to();
            if self.is_water(next) && fleet_at(next) {
                self.extend_chain(next, to, &mut fleet_at, &mut path, &mut chains);
            }
        }
        chains
    }

    fn extend_chain(
        &self,
        at: ProvinceId,
        to: ProvinceId,
        fleet_at: &mut impl FnMut(ProvinceId) -> bool,
        path: &mut Vec<ProvinceId>,
        chains: &mut Vec<Vec<ProvinceId>>,
    ) {
        path.push(at);
        for edge in self.connections_from(at) {
            let next = edge.to();
            if next == to {
                chains.push(path.clone());
            } else if self.is_water(next) && !path.contains(&next) && fleet_at(next) {
                self.extend_chain(next, to, fleet_at, path, chains);
            }
        }
        path.pop();
    }

    /// True if some chain of accepted water provinces links `from` to `to`.
    pub fn has_convoy_route(
        &self,
        from: ProvinceId,
        to: ProvinceId,
        fleet_at: impl FnMut(ProvinceId) -> bool,
    ) -> bool {
        let mut found = false;
        self.convoy_search(from, fleet_at, |p| {
            found = p == to;
            found
        });
        found
    }

    /// Every coastal province other than `from` reachable through a chain
    /// of accepted water provinces, in board order.
    pub fn convoy_destinations(
        &self,
        from: ProvinceId,
        fleet_at: impl FnMut(ProvinceId) -> bool,
    ) -> Vec<ProvinceId> {
        let mut seen = vec![false; self.len()];
        self.convoy_search(from, fleet_at, |p| {
            seen[p.index()] = true;
            false
        });
        self.province_ids().filter(|p| seen[p.index()]).collect()
    }

    /// Breadth-first walk over accepted water provinces starting next to
    /// `from`. Calls `visit` for each coastal province touched and stops as
    /// soon as it returns true.
    fn convoy_search(
        &self,
        from: ProvinceId,
        mut fleet_at: impl FnMut(ProvinceId) -> bool,
        mut visit: impl FnMut(ProvinceId) -> bool,
    ) {
        if !self.is_coastal(from) {
            return;
        }
        let mut visited = vec![false; self.len()];
        let mut queue = VecDeque::new();
        visited[from.index()] = true;
        queue.push_back(from);

        while let Some(at) = queue.pop_front() {
            for edge in self.connections_from(at) {
                let next = edge.to();
                if visited[next.index()] {
                    continue;
                }
                if self.is_water(next) {
                    if fleet_at(next) {
                        visited[next.index()] = true;
                        queue.push_back(next);
                    }
                } else if at != from && self.is_coastal(next) {
                    visited[next.index()] = true;
                    if visit(next) {
                        return;
                    }
                }
            }
        }
    }

    /// Hop count from `from` to the nearest province accepted by `goal`,
    /// over every connection regardless of unit type. `None` if no such
    /// province is reachable.
    pub fn distance(
        &self,
        from: ProvinceId,
        mut goal: impl FnMut(ProvinceId) -> bool,
    ) -> Option<u32> {
        if !self.contains(from) {
            return None;
        }
        if goal(from) {
            return Some(0);
        }
        let mut visited = vec![false; self.len()];
        visited[from.index()] = true;
        let mut frontier = vec![from];
        let mut dist = 0;

        while !frontier.is_empty() {
            dist += 1;
            let mut next_frontier = Vec::new();
            for &at in &frontier {
                for edge in self.connections_from(at) {
                    let next = edge.to();
                    if visited[next.index()] {
                        continue;
                    }
                    if goal(next) {
                        return Some(dist);
                    }
                    visited[next.index()] = true;
                    next_frontier.push(next);
                }
            }
            frontier = next_frontier;
        }
        None
    }

    fn is_water(&self, id: ProvinceId) -> bool {
        self.terrain(id) == Some(Terrain::Water)
    }

    fn is_coastal(&self, id: ProvinceId) -> bool {
        self.terrain(id) == Some(Terrain::Coastal)
    }
}

#[cfg(test)]
mod tests {
    use crate::board::{Board, ProvinceId};

    fn ids(board: &Board, names: &[&str]) -> Vec<ProvinceId> {
        names.iter().map(|n| board.find(n).unwrap()).collect()
    }

    #[test]
    fn chains_enumerate_all_simple_paths() {
        let b = Board::standard().unwrap();
        let fleets = ids(&b, &["ENG", "MAO", "IRI"]);
        let lon = b.find("Lon").unwrap();
        let bre = b.find("Bre").unwrap();
        let por = b.find("Por").unwrap();

        let chains = b.convoy_chains(lon, bre, |p| fleets.contains(&p));
        assert!(chains.contains(&ids(&b, &["ENG"])));
        assert!(chains.contains(&ids(&b, &["ENG", "MAO"])));
        assert!(chains.contains(&ids(&b, &["ENG", "IRI", "MAO"])));
        for chain in &chains {
            let mut sorted = chain.clone();
            sorted.sort();
            sorted.dedup();
            assert_eq!(sorted.len(), chain.len(), "chain revisits a province");
        }

        let to_por = b.convoy_chains(lon, por, |p| fleets.contains(&p));
        assert_eq!(to_por.len(), 2);
        assert!(to_por.iter().all(|c| c.last() == Some(&b.find("MAO").unwrap())));
    }

    #[test]
    fn chains_need_fleets_and_coastal_ends() {
        let b = Board::standard().unwrap();
        let lon = b.find("Lon").unwrap();
        let bre = b.find("Bre").unwrap();
        let par = b.find("Par").unwrap();
        assert!(b.convoy_chains(lon, bre, |_| false).is_empty());
        assert!(b.convoy_chains(lon, par, |_| true).is_empty());
    }

    #[test]
    fn route_and_destinations() {
        let b = Board::standard().unwrap();
        let fleets = ids(&b, &["NTH"]);
        let lon = b.find("Lon").unwrap();
        let nwy = b.find("Nwy").unwrap();
        let mos = b.find("Mos").unwrap();
        assert!(b.has_convoy_route(lon, nwy, |p| fleets.contains(&p)));
        assert!(!b.has_convoy_route(lon, mos, |p| fleets.contains(&p)));

        let dests = b.convoy_destinations(lon, |p| fleets.contains(&p));
        for name in ["Bel", "Den", "Edi", "Hol", "Nwy", "Yor"] {
            assert!(dests.contains(&b.find(name).unwrap()), "{name}");
        }
        assert!(!dests.contains(&lon));
        assert!(!dests.contains(&b.find("Wal").unwrap()));
    }

    #[test]
    fn distance_counts_hops() {
        let b = Board::standard().unwrap();
        let mos = b.find("Mos").unwrap();
        let war = b.find("War").unwrap();
        let gal = b.find("Gal").unwrap();
        assert_eq!(b.distance(mos, |p| p == mos), Some(0));
        assert_eq!(b.distance(mos, |p| p == war), Some(1));
        assert_eq!(b.distance(mos, |p| p == gal), Some(2));
        assert_eq!(b.distance(mos, |_| false), None);
    }
}
