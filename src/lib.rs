//! Entente adjudication library.
//!
//! Exposes the board graph, game snapshots, orders, the order-staging arena,
//! and the phase resolvers. A typical turn:
//!
//! 1. Build or load a [`Board`] and start a [`Game`].
//! 2. Open an [`Arena`] on the game and `add` each nation's orders.
//! 3. Call [`Arena::go`] (or [`Arena::resolve`] for per-order outcomes) to
//!    get the next game state.

pub mod arena;
pub mod board;
pub mod game;
pub mod order;
pub mod resolve;

pub use arena::{Arena, ArenaError, PendingBuild};
pub use board::{Board, BoardBuilder, BoardError, Coast, NationId, ProvinceId, Terrain, UnitType};
pub use game::{DislodgedUnit, Game, GameError, Occupancy, Phase, Season};
pub use order::{BuildOutcome, MoveOutcome, Order, OrderKind, Outcome, RetreatOutcome};
pub use resolve::{Resolution, ResolvedOrder};
