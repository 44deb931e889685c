//! The classic seven-nation map.

use super::builder::{BoardBuilder, BoardError};
use super::province::Coast;
use super::unit::UnitType;
use super::Board;

const STANDARD_JSON: &str = include_str!("../../data/standard.json");

/// Spring 1901 starting units: (nation, unit type, province abbreviation, coast).
pub const STANDARD_UNITS: [(&str, UnitType, &str, Option<Coast>); 22] = [
    ("Austria", UnitType::Army, "Vie", None),
    ("Austria", UnitType::Army, "Bud", None),
    ("Austria", UnitType::Fleet, "Tri", None),
    ("England", UnitType::Fleet, "Lon", None),
    ("England", UnitType::Fleet, "Edi", None),
    ("England", UnitType::Army, "Lvp", None),
    ("France", UnitType::Fleet, "Bre", None),
    ("France", UnitType::Army, "Par", None),
    ("France", UnitType::Army, "Mar", None),
    ("Germany", UnitType::Fleet, "Kie", None),
    ("Germany", UnitType::Army, "Ber", None),
    ("Germany", UnitType::Army, "Mun", None),
    ("Italy", UnitType::Fleet, "Nap", None),
    ("Italy", UnitType::Army, "Rom", None),
    ("Italy", UnitType::Army, "Ven", None),
    ("Russia", UnitType::Fleet, "StP", Some(Coast::South)),
    ("Russia", UnitType::Army, "Mos", None),
    ("Russia", UnitType::Army, "War", None),
    ("Russia", UnitType::Fleet, "Sev", None),
    ("Turkey", UnitType::Fleet, "Ank", None),
    ("Turkey", UnitType::Army, "Con", None),
    ("Turkey", UnitType::Army, "Smy", None),
];

impl Board {
    /// Builds the standard 75-province board.
    pub fn standard() -> Result<Board, BoardError> {
        BoardBuilder::from_json(STANDARD_JSON)?.build()
    }
}
