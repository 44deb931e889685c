//! Declarative board construction.
//!
//! A [`BoardBuilder`] is plain data, usually deserialized from JSON. Calling
//! [`BoardBuilder::build`] validates it and assigns dense ids; every rule the
//! graph relies on (no land/water edges, no single named coast, coasts
//! declared on every fleet edge into a split-coast province) is checked here
//! so the rest of the crate can assume them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::adjacency::Connection;
use super::province::{simplify, Coast, Province, ProvinceId, Terrain};
use super::Board;

/// Errors raised while building a board.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("board has no nations")]
    NoNations,

    #[error("duplicate nation '{0}'")]
    DuplicateNation(String),

    #[error("province with empty name")]
    EmptyName,

    #[error("duplicate province name '{0}'")]
    DuplicateName(String),

    #[error("province '{0}' has no abbreviations")]
    NoAbbreviations(String),

    #[error("duplicate abbreviation '{0}'")]
    DuplicateAbbreviation(String),

    #[error("unknown nation '{nation}' for province '{province}'")]
    UnknownNation { nation: String, province: String },

    #[error("province '{0}' cannot have exactly one named coast")]
    SingleCoast(String),

    #[error("province '{0}' is not coastal but declares coasts")]
    CoastsOnNonCoastal(String),

    #[error("water province '{0}' cannot be a supply center")]
    WaterCenter(String),

    #[error("connection from '{0}' needs exactly one of `to` and `to_all`")]
    MissingEndpoint(String),

    #[error("unknown province '{0}' in connection")]
    UnknownProvince(String),

    #[error("province '{0}' connects to itself")]
    SelfConnection(String),

    #[error("duplicate connection {0} - {1}")]
    DuplicateConnection(String, String),

    #[error("connection between land and water: {0} - {1}")]
    LandWater(String, String),

    #[error("coastal connection involving a non-coastal province: {0} - {1}")]
    CoastalFlag(String, String),

    #[error("'{0}' has no named coasts but the connection lists some")]
    UnexpectedCoasts(String),

    #[error("'{0}' has named coasts but the connection lists none")]
    MissingCoasts(String),

    #[error("no coast {coast} on '{province}'")]
    UnknownCoast { coast: Coast, province: String },

    #[error("too many {0} for a board")]
    TooMany(&'static str),

    #[error("invalid board description: {0}")]
    Json(#[from] serde_json::Error),
}

/// One province in a board description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvinceSpec {
    pub name: String,
    pub abbreviations: Vec<String>,
    pub terrain: Terrain,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coasts: Vec<Coast>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub center: bool,
    /// Nation this is a home center for; implies `center`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home: Option<String>,
}

/// One border (or a fan of borders sharing an origin) in a board description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionSpec {
    pub from: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    /// Shorthand for several connections out of `from` with the same
    /// origin coasts and coastal flag.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub to_all: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub from_coasts: Vec<Coast>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub to_coasts: Vec<Coast>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub coastal: bool,
}

/// A board description awaiting validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardBuilder {
    pub nations: Vec<String>,
    pub provinces: Vec<ProvinceSpec>,
    pub connections: Vec<ConnectionSpec>,
}

impl BoardBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON board description.
    pub fn from_json(json: &str) -> Result<Self, BoardError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn nation(mut self, name: impl Into<String>) -> Self {
        self.nations.push(name.into());
        self
    }

    pub fn province(mut self, spec: ProvinceSpec) -> Self {
        self.provinces.push(spec);
        self
    }

    pub fn connection(mut self, spec: ConnectionSpec) -> Self {
        self.connections.push(spec);
        self
    }

    /// Validates the description and produces an immutable board.
    pub fn build(&self) -> Result<Board, BoardError> {
        let mut board = Board {
            nations: Vec::with_capacity(self.nations.len()),
            provinces: Vec::with_capacity(self.provinces.len()),
            connections: Vec::new(),
            incident: Vec::new(),
        };

        for name in &self.nations {
            let name = name.trim();
            if board.nation(name).is_some() {
                return Err(BoardError::DuplicateNation(name.to_string()));
            }
            board.nations.push(name.to_string());
        }
        if board.nations.is_empty() {
            return Err(BoardError::NoNations);
        }
        if board.nations.len() > usize::from(u8::MAX) {
            return Err(BoardError::TooMany("nations"));
        }

        for spec in &self.provinces {
            let province = self.province_from_spec(&board, spec)?;
            board.provinces.push(province);
        }
        if board.provinces.len() > usize::from(u16::MAX) {
            return Err(BoardError::TooMany("provinces"));
        }
        board.incident = vec![Vec::new(); board.provinces.len()];

        for spec in &self.connections {
            let targets: Vec<&String> = match (&spec.to, spec.to_all.is_empty()) {
                (Some(to), true) => vec![to],
                (None, false) => spec.to_all.iter().collect(),
                _ => return Err(BoardError::MissingEndpoint(spec.from.clone())),
            };
            let from = resolve(&board, &spec.from)?;
            for to in targets {
                let to = resolve(&board, to)?;
                let conn = Connection {
                    a: from,
                    b: to,
                    a_coasts: spec.from_coasts.clone(),
                    b_coasts: spec.to_coasts.clone(),
                    coastal: spec.coastal,
                };
                validate_connection(&board, &conn)?;
                let idx = board.connections.len();
                board.incident[from.index()].push(idx);
                board.incident[to.index()].push(idx);
                board.connections.push(conn);
            }
        }

        Ok(board)
    }

    fn province_from_spec(&self, board: &Board, spec: &ProvinceSpec) -> Result<Province, BoardError> {
        let name = spec.name.trim();
        if name.is_empty() {
            return Err(BoardError::EmptyName);
        }
        if board.provinces.iter().any(|p| simplify(&p.name) == simplify(name)) {
            return Err(BoardError::DuplicateName(name.to_string()));
        }
        if spec.abbreviations.is_empty() {
            return Err(BoardError::NoAbbreviations(name.to_string()));
        }
        let mut abbreviations = Vec::with_capacity(spec.abbreviations.len());
        for abbr in &spec.abbreviations {
            let abbr = abbr.trim();
            let taken = abbr.is_empty()
                || abbreviations.iter().any(|a: &String| a.eq_ignore_ascii_case(abbr))
                || board.provinces.iter().any(|p| p.has_abbreviation(abbr));
            if taken {
                return Err(BoardError::DuplicateAbbreviation(abbr.to_string()));
            }
            abbreviations.push(abbr.to_string());
        }

        match spec.coasts.len() {
            0 => {}
            1 => return Err(BoardError::SingleCoast(name.to_string())),
            _ if spec.terrain != Terrain::Coastal => {
                return Err(BoardError::CoastsOnNonCoastal(name.to_string()))
            }
            _ => {}
        }

        let home = match &spec.home {
            Some(nation) => Some(board.nation(nation).ok_or_else(|| BoardError::UnknownNation {
                nation: nation.clone(),
                province: name.to_string(),
            })?),
            None => None,
        };
        let center = spec.center || home.is_some();
        if center && spec.terrain == Terrain::Water {
            return Err(BoardError::WaterCenter(name.to_string()));
        }

        Ok(Province {
            name: name.to_string(),
            abbreviations,
            terrain: spec.terrain,
            coasts: spec.coasts.clone(),
            center,
            home,
        })
    }
}

fn resolve(board: &Board, name: &str) -> Result<ProvinceId, BoardError> {
    board
        .find(name)
        .ok_or_else(|| BoardError::UnknownProvince(name.to_string()))
}

fn validate_connection(board: &Board, conn: &Connection) -> Result<(), BoardError> {
    let a = &board.provinces[conn.a.index()];
    let b = &board.provinces[conn.b.index()];
    let names = || (a.name.clone(), b.name.clone());

    if conn.a == conn.b {
        return Err(BoardError::SelfConnection(a.name.clone()));
    }
    if board.edge(conn.a, conn.b).is_some() {
        let (x, y) = names();
        return Err(BoardError::DuplicateConnection(x, y));
    }
    use Terrain::*;
    if matches!((a.terrain, b.terrain), (Inland, Water) | (Water, Inland)) {
        let (x, y) = names();
        return Err(BoardError::LandWater(x, y));
    }
    if conn.coastal && (a.terrain != Coastal || b.terrain != Coastal) {
        let (x, y) = names();
        return Err(BoardError::CoastalFlag(x, y));
    }
    let fleet_edge = conn.coastal || a.terrain == Water || b.terrain == Water;
    validate_endpoint(a, &conn.a_coasts, fleet_edge)?;
    validate_endpoint(b, &conn.b_coasts, fleet_edge)
}

/// A split-coast endpoint must list its coasts on every edge a fleet can use.
fn validate_endpoint(p: &Province, coasts: &[Coast], fleet_edge: bool) -> Result<(), BoardError> {
    if p.coasts.is_empty() {
        if !coasts.is_empty() {
            return Err(BoardError::UnexpectedCoasts(p.name.clone()));
        }
        return Ok(());
    }
    if coasts.is_empty() && fleet_edge {
        return Err(BoardError::MissingCoasts(p.name.clone()));
    }
    match coasts.iter().find(|c| !p.coasts.contains(c)) {
        Some(&coast) => Err(BoardError::UnknownCoast {
            coast,
            province: p.name.clone(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn province(name: &str, abbr: &str, terrain: Terrain) -> ProvinceSpec {
        ProvinceSpec {
            name: name.to_string(),
            abbreviations: vec![abbr.to_string()],
            terrain,
            coasts: Vec::new(),
            center: false,
            home: None,
        }
    }

    fn link(from: &str, to: &str) -> ConnectionSpec {
        ConnectionSpec {
            from: from.to_string(),
            to: Some(to.to_string()),
            ..Default::default()
        }
    }

    fn base() -> BoardBuilder {
        BoardBuilder::new()
            .nation("Red")
            .province(province("Highlands", "Hig", Terrain::Inland))
            .province(province("Shore", "Sho", Terrain::Coastal))
            .province(province("Bay", "BAY", Terrain::Water))
    }

    #[test]
    fn builds_simple_board() {
        let board = base()
            .connection(link("Hig", "Sho"))
            .connection(link("Sho", "BAY"))
            .build()
            .unwrap();
        assert_eq!(board.len(), 3);
        assert_eq!(board.connections().count(), 2);
    }

    #[test]
    fn rejects_land_water_edge() {
        let err = base().connection(link("Hig", "Bay")).build().unwrap_err();
        assert!(matches!(err, BoardError::LandWater(..)));
    }

    #[test]
    fn rejects_duplicate_abbreviation_ignoring_case() {
        let err = base()
            .province(province("Shoals", "SHO", Terrain::Water))
            .build()
            .unwrap_err();
        assert!(matches!(err, BoardError::DuplicateAbbreviation(a) if a == "SHO"));
    }

    #[test]
    fn rejects_duplicate_name() {
        let err = base()
            .province(province("shore", "Sh2", Terrain::Coastal))
            .build()
            .unwrap_err();
        assert!(matches!(err, BoardError::DuplicateName(_)));
    }

    #[test]
    fn rejects_single_named_coast() {
        let mut spec = province("Cape", "Cap", Terrain::Coastal);
        spec.coasts = vec![Coast::North];
        let err = base().province(spec).build().unwrap_err();
        assert!(matches!(err, BoardError::SingleCoast(_)));
    }

    #[test]
    fn rejects_reversed_duplicate_connection() {
        let err = base()
            .connection(link("Hig", "Sho"))
            .connection(link("Sho", "Hig"))
            .build()
            .unwrap_err();
        assert!(matches!(err, BoardError::DuplicateConnection(..)));
    }

    #[test]
    fn rejects_coastal_flag_on_inland() {
        let mut spec = link("Hig", "Sho");
        spec.coastal = true;
        let err = base().connection(spec).build().unwrap_err();
        assert!(matches!(err, BoardError::CoastalFlag(..)));
    }

    #[test]
    fn split_coast_needs_coasts_on_fleet_edges() {
        let mut cape = province("Cape", "Cap", Terrain::Coastal);
        cape.coasts = vec![Coast::North, Coast::South];
        let b = base().province(cape);

        let err = b.clone().connection(link("Cap", "Bay")).build().unwrap_err();
        assert!(matches!(err, BoardError::MissingCoasts(_)));

        // Army-only edges need no coasts.
        assert!(b.clone().connection(link("Cap", "Hig")).build().is_ok());

        let mut spec = link("Cap", "Bay");
        spec.from_coasts = vec![Coast::East];
        let err = b.clone().connection(spec).build().unwrap_err();
        assert!(matches!(err, BoardError::UnknownCoast { coast: Coast::East, .. }));

        let mut spec = link("Cap", "Bay");
        spec.from_coasts = vec![Coast::South];
        assert!(b.connection(spec).build().is_ok());
    }

    #[test]
    fn to_all_expands() {
        let spec = ConnectionSpec {
            from: "Sho".to_string(),
            to_all: vec!["Hig".to_string(), "Bay".to_string()],
            ..Default::default()
        };
        let board = base().connection(spec).build().unwrap();
        let sho = board.find("Sho").unwrap();
        assert_eq!(board.connections_from(sho).count(), 2);
    }

    #[test]
    fn home_implies_center_and_needs_known_nation() {
        let mut spec = province("Capital", "Cpt", Terrain::Inland);
        spec.home = Some("Red".to_string());
        let board = base().province(spec.clone()).build().unwrap();
        let cpt = board.find("Cpt").unwrap();
        assert!(board.province(cpt).unwrap().is_center());

        spec.home = Some("Blue".to_string());
        let err = base().province(spec).build().unwrap_err();
        assert!(matches!(err, BoardError::UnknownNation { .. }));
    }

    #[test]
    fn json_round_trip_shape() {
        let json = r#"{
            "nations": ["Red"],
            "provinces": [
                {"name": "Shore", "abbreviations": ["Sho"], "terrain": "coastal", "home": "Red"},
                {"name": "Bay", "abbreviations": ["BAY"], "terrain": "water"}
            ],
            "connections": [{"from": "Sho", "to": "BAY"}]
        }"#;
        let board = BoardBuilder::from_json(json).unwrap().build().unwrap();
        assert_eq!(board.centers().count(), 1);
        assert!(matches!(BoardBuilder::from_json("{"), Err(BoardError::Json(_))));
    }
}
