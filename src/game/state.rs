//! The authoritative game snapshot.
//!
//! Per-province tables are `Vec`s indexed by `ProvinceId`. A `Game` handed to
//! a caller is never mutated by this crate again: every phase transition
//! builds a fresh successor.

use std::sync::Arc;

use thiserror::Error;

use crate::board::{Board, BoardError, Coast, NationId, ProvinceId, UnitType, STANDARD_UNITS};

/// The season of a game turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Season {
    Spring,
    Fall,
}

/// The phase within a game turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Movement,
    Retreat,
    Build,
}

/// A unit standing on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Occupancy {
    pub province: ProvinceId,
    /// Only set for fleets on provinces with named coasts.
    pub coast: Option<Coast>,
    pub unit: UnitType,
    pub nation: NationId,
}

impl Occupancy {
    pub fn new(province: ProvinceId, unit: UnitType, nation: NationId) -> Self {
        Occupancy {
            province,
            coast: None,
            unit,
            nation,
        }
    }

    pub fn with_coast(mut self, coast: Coast) -> Self {
        self.coast = Some(coast);
        self
    }
}

/// A unit driven out of its province, awaiting a retreat order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DislodgedUnit {
    pub occupancy: Occupancy,
    /// Province the successful attack came from; the unit may not retreat there.
    pub attacker_from: ProvinceId,
}

/// Errors raised by the state mutators.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("province {0:?} is not on the board")]
    UnknownProvince(ProvinceId),

    #[error("nation {0:?} is not on the board")]
    UnknownNation(NationId),

    #[error("unknown province '{0}'")]
    UnknownProvinceName(String),

    #[error("unknown nation '{0}'")]
    UnknownNationName(String),

    #[error("{unit:?} cannot stand on '{province}'")]
    BadTerrain { unit: UnitType, province: String },

    #[error("fleet on '{0}' must name a coast")]
    CoastRequired(String),

    #[error("coast {coast} is not valid for this unit on '{province}'")]
    BadCoast { coast: Coast, province: String },

    #[error("'{0}' is not a supply center")]
    NotCenter(String),

    #[error(transparent)]
    Board(#[from] BoardError),
}

/// One point-in-time state of a game.
#[derive(Debug, Clone)]
pub struct Game {
    board: Arc<Board>,
    year: u16,
    season: Season,
    phase: Phase,
    units: Vec<Option<Occupancy>>,
    control: Vec<Option<NationId>>,
    dislodged: Vec<Option<DislodgedUnit>>,
    contested: Vec<bool>,
}

impl Game {
    /// Creates the opening position of a board: Spring 1901 movement, every
    /// home center controlled by its nation, no units.
    pub fn new(board: Arc<Board>) -> Self {
        Self::at(board, 1901, Season::Spring, Phase::Movement)
    }

    /// Creates an empty position at the given point in the calendar, with
    /// home centers controlled by their nations.
    pub fn at(board: Arc<Board>, year: u16, season: Season, phase: Phase) -> Self {
        let n = board.len();
        let control = board.provinces().map(|(_, p)| p.home()).collect();
        Game {
            board,
            year,
            season,
            phase,
            units: vec![None; n],
            control,
            dislodged: vec![None; n],
            contested: vec![false; n],
        }
    }

    /// The standard board with the Spring 1901 starting units.
    pub fn standard() -> Result<Self, GameError> {
        let board = Arc::new(Board::standard()?);
        let mut game = Game::new(Arc::clone(&board));
        for (nation, unit, abbr, coast) in STANDARD_UNITS {
            let province = board
                .find(abbr)
                .ok_or_else(|| GameError::UnknownProvinceName(abbr.to_string()))?;
            let nation = board
                .nation(nation)
                .ok_or_else(|| GameError::UnknownNationName(nation.to_string()))?;
            let mut occ = Occupancy::new(province, unit, nation);
            occ.coast = coast;
            game.set_unit(occ)?;
        }
        Ok(game)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Shared handle to the board, for building another game on it.
    pub fn board_handle(&self) -> Arc<Board> {
        Arc::clone(&self.board)
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn season(&self) -> Season {
        self.season
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The unit occupying a province.
    pub fn unit(&self, province: ProvinceId) -> Option<&Occupancy> {
        self.units.get(province.index()).and_then(Option::as_ref)
    }

    /// Every unit on the board, in province order.
    pub fn units(&self) -> impl Iterator<Item = &Occupancy> {
        self.units.iter().flatten()
    }

    pub fn units_of(&self, nation: NationId) -> impl Iterator<Item = &Occupancy> {
        self.units().filter(move |u| u.nation == nation)
    }

    pub fn unit_count(&self, nation: NationId) -> usize {
        self.units_of(nation).count()
    }

    /// The nation controlling a province, if any.
    pub fn controller(&self, province: ProvinceId) -> Option<NationId> {
        self.control.get(province.index()).copied().flatten()
    }

    /// Supply centers controlled by a nation, in province order.
    pub fn centers_of(&self, nation: NationId) -> impl Iterator<Item = ProvinceId> + '_ {
        self.board
            .centers()
            .filter(move |&p| self.controller(p) == Some(nation))
    }

    pub fn center_count(&self, nation: NationId) -> usize {
        self.centers_of(nation).count()
    }

    /// The unit dislodged from a province, during a retreat phase.
    pub fn dislodged(&self, province: ProvinceId) -> Option<&DislodgedUnit> {
        self.dislodged.get(province.index()).and_then(Option::as_ref)
    }

    pub fn dislodged_units(&self) -> impl Iterator<Item = &DislodgedUnit> {
        self.dislodged.iter().flatten()
    }

    /// True if no unit may retreat into the province this phase.
    pub fn is_contested(&self, province: ProvinceId) -> bool {
        self.contested.get(province.index()).copied().unwrap_or(false)
    }

    pub fn contested(&self) -> impl Iterator<Item = ProvinceId> + '_ {
        self.board.province_ids().filter(|&p| self.is_contested(p))
    }

    /// A nation holding more than half of all supply centers.
    pub fn winner(&self) -> Option<NationId> {
        let total = self.board.centers().count();
        self.board
            .nation_ids()
            .find(|&n| self.center_count(n) * 2 > total)
    }

    /// Places a unit after checking terrain, coast, and nation, replacing
    /// any occupant. Returns the replaced unit.
    pub fn set_unit(&mut self, occ: Occupancy) -> Result<Option<Occupancy>, GameError> {
        self.check_occupancy(&occ)?;
        Ok(self.place(occ))
    }

    /// Removes the unit in a province, returning it.
    pub fn remove_unit(&mut self, province: ProvinceId) -> Result<Option<Occupancy>, GameError> {
        self.check_province(province)?;
        Ok(self.vacate(province))
    }

    /// Gives control of a supply center to a nation. Returns the previous controller.
    pub fn take_center(
        &mut self,
        province: ProvinceId,
        nation: NationId,
    ) -> Result<Option<NationId>, GameError> {
        self.check_center(province)?;
        self.check_nation(nation)?;
        Ok(self.control[province.index()].replace(nation))
    }

    /// Leaves a supply center uncontrolled. Returns the previous controller.
    pub fn free_center(&mut self, province: ProvinceId) -> Result<Option<NationId>, GameError> {
        self.check_center(province)?;
        Ok(self.control[province.index()].take())
    }

    /// Records a unit as dislodged from its province by an attack from
    /// `attacker_from`.
    pub fn add_dislodged(
        &mut self,
        occ: Occupancy,
        attacker_from: ProvinceId,
    ) -> Result<(), GameError> {
        self.check_occupancy(&occ)?;
        self.check_province(attacker_from)?;
        self.dislodged[occ.province.index()] = Some(DislodgedUnit {
            occupancy: occ,
            attacker_from,
        });
        Ok(())
    }

    /// Marks a province as closed to retreats this phase.
    pub fn block_retreat(&mut self, province: ProvinceId) -> Result<(), GameError> {
        self.check_province(province)?;
        self.contested[province.index()] = true;
        Ok(())
    }

    pub fn unblock_retreat(&mut self, province: ProvinceId) -> Result<(), GameError> {
        self.check_province(province)?;
        self.contested[province.index()] = false;
        Ok(())
    }

    /// A copy of this game at the next point in the calendar, keeping units
    /// and control but none of the retreat-phase bookkeeping.
    pub(crate) fn successor(&self, year: u16, season: Season, phase: Phase) -> Game {
        let n = self.board.len();
        Game {
            board: Arc::clone(&self.board),
            year,
            season,
            phase,
            units: self.units.clone(),
            control: self.control.clone(),
            dislodged: vec![None; n],
            contested: vec![false; n],
        }
    }

    /// Places a unit whose legality the caller has already established.
    pub(crate) fn place(&mut self, occ: Occupancy) -> Option<Occupancy> {
        self.units[occ.province.index()].replace(occ)
    }

    pub(crate) fn vacate(&mut self, province: ProvinceId) -> Option<Occupancy> {
        self.units[province.index()].take()
    }

    pub(crate) fn dislodge(&mut self, dislodged: DislodgedUnit) {
        self.dislodged[dislodged.occupancy.province.index()] = Some(dislodged);
    }

    pub(crate) fn contest(&mut self, province: ProvinceId) {
        self.contested[province.index()] = true;
    }

    /// Hands each occupied supply center to its occupier.
    pub(crate) fn capture_centers(&mut self) {
        let centers: Vec<ProvinceId> = self.board.centers().collect();
        for p in centers {
            if let Some(u) = self.units[p.index()] {
                self.control[p.index()] = Some(u.nation);
            }
        }
    }

    fn check_province(&self, province: ProvinceId) -> Result<(), GameError> {
        if self.board.contains(province) {
            Ok(())
        } else {
            Err(GameError::UnknownProvince(province))
        }
    }

    fn check_nation(&self, nation: NationId) -> Result<(), GameError> {
        if nation.index() < self.board.nations().len() {
            Ok(())
        } else {
            Err(GameError::UnknownNation(nation))
        }
    }

    fn check_center(&self, province: ProvinceId) -> Result<(), GameError> {
        let p = self
            .board
            .province(province)
            .ok_or(GameError::UnknownProvince(province))?;
        if p.is_center() {
            Ok(())
        } else {
            Err(GameError::NotCenter(p.name().to_string()))
        }
    }

    fn check_occupancy(&self, occ: &Occupancy) -> Result<(), GameError> {
        self.check_nation(occ.nation)?;
        let p = self
            .board
            .province(occ.province)
            .ok_or(GameError::UnknownProvince(occ.province))?;
        if !p.terrain().supports(occ.unit) {
            return Err(GameError::BadTerrain {
                unit: occ.unit,
                province: p.name().to_string(),
            });
        }
        let needs_coast = occ.unit == UnitType::Fleet && p.has_coasts();
        match occ.coast {
            None if needs_coast => Err(GameError::CoastRequired(p.name().to_string())),
            Some(coast) if !needs_coast || !p.coasts().contains(&coast) => {
                Err(GameError::BadCoast {
                    coast,
                    province: p.name().to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}
