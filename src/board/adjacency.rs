//! Undirected connections between provinces.
//!
//! Each border is stored once. Looking it up from the far end produces a
//! reversed [`Edge`] view whose endpoint coast lists are swapped, so callers
//! always see the edge oriented away from the province they asked about.
//!
//! An empty coast list on an endpoint means the edge accepts any coast
//! there (or the province has no named coasts at all).

use super::province::{Coast, ProvinceId, Terrain};
use super::unit::UnitType;

/// A stored border between two provinces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub(crate) a: ProvinceId,
    pub(crate) b: ProvinceId,
    pub(crate) a_coasts: Vec<Coast>,
    pub(crate) b_coasts: Vec<Coast>,
    /// Shared coastline between two coastal provinces: fleets may follow it.
    pub(crate) coastal: bool,
}

impl Connection {
    /// Views the connection oriented from `from`, or `None` if `from` is not
    /// one of its endpoints.
    pub fn from_side(&self, from: ProvinceId) -> Option<Edge<'_>> {
        if from == self.a {
            Some(Edge { conn: self, reversed: false })
        } else if from == self.b {
            Some(Edge { conn: self, reversed: true })
        } else {
            None
        }
    }

    /// Views the connection in its stored orientation.
    pub fn edge(&self) -> Edge<'_> {
        Edge { conn: self, reversed: false }
    }
}

/// A directed view of a [`Connection`].
#[derive(Debug, Clone, Copy)]
pub struct Edge<'a> {
    conn: &'a Connection,
    reversed: bool,
}

impl<'a> Edge<'a> {
    pub fn from(&self) -> ProvinceId {
        if self.reversed {
            self.conn.b
        } else {
            self.conn.a
        }
    }

    pub fn to(&self) -> ProvinceId {
        if self.reversed {
            self.conn.a
        } else {
            self.conn.b
        }
    }

    /// Coasts of the origin this edge may be used from.
    pub fn from_coasts(&self) -> &'a [Coast] {
        if self.reversed {
            &self.conn.b_coasts
        } else {
            &self.conn.a_coasts
        }
    }

    /// Coasts of the destination this edge arrives on.
    pub fn to_coasts(&self) -> &'a [Coast] {
        if self.reversed {
            &self.conn.a_coasts
        } else {
            &self.conn.b_coasts
        }
    }

    pub fn is_coastal(&self) -> bool {
        self.conn.coastal
    }

    /// The same border viewed from the other end.
    pub fn reverse(&self) -> Edge<'a> {
        Edge {
            conn: self.conn,
            reversed: !self.reversed,
        }
    }

    /// True if both coast arguments are acceptable under this edge's coast
    /// lists. A missing coast is accepted when the matching list has at
    /// most one entry.
    pub fn accepts(&self, from_coast: Option<Coast>, to_coast: Option<Coast>) -> bool {
        coast_accepts(self.from_coasts(), from_coast) && coast_accepts(self.to_coasts(), to_coast)
    }

    /// True if a fleet standing on `coast` of the origin may use this edge.
    pub fn departs(&self, coast: Option<Coast>) -> bool {
        coast_accepts(self.from_coasts(), coast)
    }

    /// Resolves the arrival coast for a fleet: the requested coast if the
    /// edge allows it, or the only allowed coast when none was requested.
    /// `Ok(None)` means the destination needs no coast.
    pub fn arrival_coast(&self, requested: Option<Coast>) -> Result<Option<Coast>, CoastError> {
        let coasts = self.to_coasts();
        match (requested, coasts) {
            (_, []) => Ok(None),
            (None, [only]) => Ok(Some(*only)),
            (None, _) => Err(CoastError::Ambiguous),
            (Some(c), coasts) if coasts.contains(&c) => Ok(Some(c)),
            (Some(_), _) => Err(CoastError::Invalid),
        }
    }
}

/// Why a coast could not be resolved on an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoastError {
    /// Several coasts are reachable and none was named.
    Ambiguous,
    /// The named coast is not reachable along this edge.
    Invalid,
}

/// Returns true if a unit of the given type may cross an edge whose
/// endpoints have the given terrain.
///
/// Fleets need water on one side or a shared coastline; armies need land
/// on both sides.
pub fn traversable(unit: UnitType, from: Terrain, to: Terrain, coastal: bool) -> bool {
    match unit {
        UnitType::Fleet => from == Terrain::Water || to == Terrain::Water || coastal,
        UnitType::Army => from != Terrain::Water && to != Terrain::Water,
    }
}

fn coast_accepts(allowed: &[Coast], coast: Option<Coast>) -> bool {
    match coast {
        None => allowed.len() <= 1,
        Some(c) => allowed.is_empty() || allowed.contains(&c),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn() -> Connection {
        Connection {
            a: ProvinceId(0),
            b: ProvinceId(1),
            a_coasts: vec![Coast::North, Coast::South],
            b_coasts: vec![Coast::East],
            coastal: true,
        }
    }

    #[test]
    fn reverse_swaps_coasts() {
        let c = conn();
        let fwd = c.edge();
        let rev = fwd.reverse();
        assert_eq!(rev.from(), ProvinceId(1));
        assert_eq!(rev.to(), ProvinceId(0));
        assert_eq!(rev.from_coasts(), &[Coast::East]);
        assert_eq!(rev.to_coasts(), &[Coast::North, Coast::South]);
        assert!(rev.is_coastal());
    }

    #[test]
    fn from_side_orients_edge() {
        let c = conn();
        assert_eq!(c.from_side(ProvinceId(1)).map(|e| e.to()), Some(ProvinceId(0)));
        assert_eq!(c.from_side(ProvinceId(0)).map(|e| e.to()), Some(ProvinceId(1)));
        assert!(c.from_side(ProvinceId(7)).is_none());
    }

    #[test]
    fn accepts_auto_resolves_single_coast() {
        let c = conn();
        let e = c.edge();
        // One destination coast: unspecified is fine.
        assert!(e.accepts(Some(Coast::North), None));
        // Two origin coasts: unspecified is ambiguous.
        assert!(!e.accepts(None, None));
        assert!(!e.accepts(Some(Coast::West), Some(Coast::East)));
        assert!(e.accepts(Some(Coast::South), Some(Coast::East)));
    }

    #[test]
    fn arrival_coast_resolution() {
        let c = conn();
        let rev = c.edge().reverse();
        assert_eq!(rev.arrival_coast(None), Err(CoastError::Ambiguous));
        assert_eq!(rev.arrival_coast(Some(Coast::South)), Ok(Some(Coast::South)));
        assert_eq!(rev.arrival_coast(Some(Coast::East)), Err(CoastError::Invalid));
        assert_eq!(c.edge().arrival_coast(None), Ok(Some(Coast::East)));
    }

    #[test]
    fn traversal_rules() {
        use Terrain::*;
        assert!(traversable(UnitType::Fleet, Water, Coastal, false));
        assert!(traversable(UnitType::Fleet, Coastal, Coastal, true));
        assert!(!traversable(UnitType::Fleet, Coastal, Coastal, false));
        assert!(traversable(UnitType::Army, Coastal, Inland, false));
        assert!(traversable(UnitType::Army, Coastal, Coastal, true));
        assert!(!traversable(UnitType::Army, Coastal, Water, false));
    }
}
