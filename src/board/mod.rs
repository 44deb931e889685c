//! The geography graph.
//!
//! A [`Board`] is the closed set of provinces, connections, and nations. It is
//! built once (see [`BoardBuilder`] and [`Board::standard`]) and shared
//! read-only by every game played on it.

pub mod adjacency;
pub mod builder;
pub mod paths;
pub mod province;
pub mod standard;
pub mod unit;

pub use adjacency::{traversable, CoastError, Connection, Edge};
pub use builder::{BoardBuilder, BoardError, ConnectionSpec, ProvinceSpec};
pub use province::{Coast, NationId, Province, ProvinceId, Terrain};
pub use standard::STANDARD_UNITS;
pub use unit::UnitType;

use province::simplify;

/// An immutable map.
#[derive(Debug, Clone)]
pub struct Board {
    pub(crate) nations: Vec<String>,
    pub(crate) provinces: Vec<Province>,
    pub(crate) connections: Vec<Connection>,
    /// Indices into `connections` touching each province.
    pub(crate) incident: Vec<Vec<usize>>,
}

impl Board {
    /// Nation names in declaration order; a `NationId` indexes this slice.
    pub fn nations(&self) -> &[String] {
        &self.nations
    }

    pub fn nation_ids(&self) -> impl Iterator<Item = NationId> + '_ {
        (0..self.nations.len()).map(|i| NationId(i as u8))
    }

    pub fn nation_name(&self, nation: NationId) -> Option<&str> {
        self.nations.get(nation.index()).map(String::as_str)
    }

    /// Looks up a nation by name, ignoring case and punctuation.
    pub fn nation(&self, name: &str) -> Option<NationId> {
        let name = simplify(name);
        self.nations
            .iter()
            .position(|n| simplify(n) == name)
            .map(|i| NationId(i as u8))
    }

    /// Number of provinces.
    pub fn len(&self) -> usize {
        self.provinces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.provinces.is_empty()
    }

    pub fn province_ids(&self) -> impl Iterator<Item = ProvinceId> {
        (0..self.provinces.len()).map(|i| ProvinceId(i as u16))
    }

    pub fn provinces(&self) -> impl Iterator<Item = (ProvinceId, &Province)> {
        self.provinces
            .iter()
            .enumerate()
            .map(|(i, p)| (ProvinceId(i as u16), p))
    }

    pub fn province(&self, id: ProvinceId) -> Option<&Province> {
        self.provinces.get(id.index())
    }

    pub fn contains(&self, id: ProvinceId) -> bool {
        id.index() < self.provinces.len()
    }

    /// Exact lookup by full name or abbreviation, ignoring case.
    pub fn find(&self, name: &str) -> Option<ProvinceId> {
        let simple = simplify(name);
        self.provinces()
            .find(|(_, p)| p.has_abbreviation(name.trim()) || simplify(&p.name) == simple)
            .map(|(id, _)| id)
    }

    /// Prefix search for an order translator.
    ///
    /// Abbreviation matches win outright; otherwise every province whose
    /// simplified name starts with the simplified query is returned, ties
    /// included, in board order.
    pub fn search(&self, query: &str) -> Vec<ProvinceId> {
        let query = simplify(query);
        if query.is_empty() {
            return Vec::new();
        }
        let abbr: Vec<ProvinceId> = self
            .provinces()
            .filter(|(_, p)| p.abbreviations.iter().any(|a| simplify(a) == query))
            .map(|(id, _)| id)
            .collect();
        if !abbr.is_empty() {
            return abbr;
        }
        self.provinces()
            .filter(|(_, p)| simplify(&p.name).starts_with(&query))
            .map(|(id, _)| id)
            .collect()
    }

    /// Supply centers in board order.
    pub fn centers(&self) -> impl Iterator<Item = ProvinceId> + '_ {
        self.provinces()
            .filter(|(_, p)| p.center)
            .map(|(id, _)| id)
    }

    /// Home supply centers of one nation.
    pub fn home_centers(&self, nation: NationId) -> impl Iterator<Item = ProvinceId> + '_ {
        self.provinces()
            .filter(move |(_, p)| p.home == Some(nation))
            .map(|(id, _)| id)
    }

    /// Every connection in its stored orientation.
    pub fn connections(&self) -> impl Iterator<Item = Edge<'_>> {
        self.connections.iter().map(Connection::edge)
    }

    /// Edges leaving `province`.
    pub fn connections_from(&self, province: ProvinceId) -> impl Iterator<Item = Edge<'_>> {
        self.incident_to(province)
            .iter()
            .filter_map(move |&i| self.connections[i].from_side(province))
    }

    /// Edges arriving at `province`.
    pub fn connections_to(&self, province: ProvinceId) -> impl Iterator<Item = Edge<'_>> {
        self.connections_from(province).map(|e| e.reverse())
    }

    /// The edge from `from` to `to`, if the provinces border each other.
    pub fn edge(&self, from: ProvinceId, to: ProvinceId) -> Option<Edge<'_>> {
        self.connections_from(from).find(|e| e.to() == to)
    }

    /// True if the provinces border each other through the given coasts.
    pub fn connects(
        &self,
        from: ProvinceId,
        to: ProvinceId,
        from_coast: Option<Coast>,
        to_coast: Option<Coast>,
    ) -> bool {
        self.edge(from, to)
            .is_some_and(|e| e.accepts(from_coast, to_coast))
    }

    /// True if a unit of the given type may cross the edge.
    pub fn traversable(&self, unit: UnitType, edge: &Edge<'_>) -> bool {
        match (self.province(edge.from()), self.province(edge.to())) {
            (Some(a), Some(b)) => traversable(unit, a.terrain, b.terrain, edge.is_coastal()),
            _ => false,
        }
    }

    pub(crate) fn terrain(&self, id: ProvinceId) -> Option<Terrain> {
        self.province(id).map(Province::terrain)
    }

    fn incident_to(&self, province: ProvinceId) -> &[usize] {
        self.incident
            .get(province.index())
            .map_or(&[], Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Board {
        Board::standard().unwrap()
    }

    #[test]
    fn find_by_name_and_abbreviation() {
        let b = board();
        let stp = b.find("StP").unwrap();
        assert_eq!(b.find("st. petersburg"), Some(stp));
        assert_eq!(b.find("STP"), Some(stp));
        assert_eq!(b.province(stp).unwrap().name(), "St. Petersburg");
        assert_eq!(b.find("atlantis"), None);
    }

    #[test]
    fn search_prefers_abbreviation() {
        let b = board();
        // "nor" is not an abbreviation: prefix matches on names, ties kept.
        let hits = b.search("nor");
        let names: Vec<&str> = hits
            .iter()
            .map(|id| b.province(*id).unwrap().name())
            .collect();
        assert!(names.contains(&"North Africa"));
        assert!(names.contains(&"North Sea"));
        assert!(names.contains(&"Norway"));
        // "nth" is an abbreviation and wins outright.
        assert_eq!(b.search("nth"), vec![b.find("North Sea").unwrap()]);
        assert!(b.search("").is_empty());
    }

    #[test]
    fn connections_are_symmetric() {
        let b = board();
        let spa = b.find("Spa").unwrap();
        let mao = b.find("MAO").unwrap();
        let out = b.edge(spa, mao).unwrap();
        let back = b.edge(mao, spa).unwrap();
        assert_eq!(out.from_coasts(), back.to_coasts());
        assert_eq!(out.to_coasts(), back.from_coasts());
        assert_eq!(back.to_coasts(), &[Coast::North, Coast::South]);
        assert!(b.connections_to(spa).all(|e| e.to() == spa));
    }

    #[test]
    fn connects_checks_coasts() {
        let b = board();
        let bul = b.find("Bul").unwrap();
        let gre = b.find("Gre").unwrap();
        let rum = b.find("Rum").unwrap();
        assert!(b.connects(bul, gre, Some(Coast::South), None));
        assert!(!b.connects(bul, gre, Some(Coast::East), None));
        // Single permitted origin coast resolves itself.
        assert!(b.connects(bul, rum, None, None));
        assert!(b.connects(rum, bul, None, None));
        assert!(!b.connects(rum, bul, None, Some(Coast::South)));
    }

    #[test]
    fn traversal_on_standard_map() {
        let b = board();
        let lvp = b.find("Lvp").unwrap();
        let edi = b.find("Edi").unwrap();
        let yor = b.find("Yor").unwrap();
        // Liverpool and Edinburgh share only a land border.
        let e = b.edge(lvp, edi).unwrap();
        assert!(b.traversable(UnitType::Army, &e));
        assert!(!b.traversable(UnitType::Fleet, &e));
        let e = b.edge(edi, yor).unwrap();
        assert!(b.traversable(UnitType::Fleet, &e));
    }

    #[test]
    fn nation_lookup() {
        let b = board();
        assert_eq!(b.nations().len(), 7);
        let fr = b.nation("FRANCE").unwrap();
        assert_eq!(b.nation_name(fr), Some("France"));
        assert_eq!(b.home_centers(fr).count(), 3);
        assert_eq!(b.nation("Atlantis"), None);
    }
}
