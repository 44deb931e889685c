//! Game state: one point-in-time snapshot of a game on a shared board.
//!
//! Contains unit occupancy, supply-center control, and the retreat-phase
//! bookkeeping (dislodged units and contested provinces), plus the
//! navigation queries an order translator needs.

pub mod navigation;
pub mod state;

pub use state::{DislodgedUnit, Game, GameError, Occupancy, Phase, Season};
