//! Phase sequencing logic.
//!
//! Phase flow:
//! - Spring Movement -> Spring Retreat (if dislodged) OR Fall Movement
//! - Spring Retreat  -> Fall Movement
//! - Fall Movement   -> Fall Retreat (if dislodged) OR Fall Build
//! - Fall Retreat    -> Fall Build
//! - Fall Build      -> Spring Movement (next year)

use crate::game::{Game, Phase, Season};

/// Computes the (season, phase) that follows, given whether the phase just
/// resolved left any unit dislodged.
pub fn next_phase(season: Season, phase: Phase, has_dislodged: bool) -> (Season, Phase) {
    match phase {
        Phase::Movement if has_dislodged => (season, Phase::Retreat),
        Phase::Movement | Phase::Retreat => after_movement(season),
        Phase::Build => (Season::Spring, Phase::Movement),
    }
}

fn after_movement(season: Season) -> (Season, Phase) {
    match season {
        Season::Spring => (Season::Fall, Phase::Movement),
        Season::Fall => (Season::Fall, Phase::Build),
    }
}

/// A fresh successor of `game` positioned at the next phase, with the year
/// advanced after adjustments.
pub(crate) fn advance(game: &Game, has_dislodged: bool) -> Game {
    let (season, phase) = next_phase(game.season(), game.phase(), has_dislodged);
    let year = match game.phase() {
        Phase::Build => game.year().saturating_add(1),
        _ => game.year(),
    };
    game.successor(year, season, phase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spring_movement_no_dislodge() {
        assert_eq!(
            next_phase(Season::Spring, Phase::Movement, false),
            (Season::Fall, Phase::Movement)
        );
    }

    #[test]
    fn spring_movement_with_dislodge() {
        assert_eq!(
            next_phase(Season::Spring, Phase::Movement, true),
            (Season::Spring, Phase::Retreat)
        );
    }

    #[test]
    fn retreats_continue_the_year() {
        assert_eq!(
            next_phase(Season::Spring, Phase::Retreat, false),
            (Season::Fall, Phase::Movement)
        );
        assert_eq!(
            next_phase(Season::Fall, Phase::Retreat, false),
            (Season::Fall, Phase::Build)
        );
    }

    #[test]
    fn fall_movement_goes_to_builds() {
        assert_eq!(
            next_phase(Season::Fall, Phase::Movement, false),
            (Season::Fall, Phase::Build)
        );
        assert_eq!(
            next_phase(Season::Fall, Phase::Movement, true),
            (Season::Fall, Phase::Retreat)
        );
    }

    #[test]
    fn build_starts_next_year() {
        let g = Game::standard().unwrap();
        let fall = g.successor(1901, Season::Fall, Phase::Build);
        let next = advance(&fall, false);
        assert_eq!(next.year(), 1902);
        assert_eq!(next.season(), Season::Spring);
        assert_eq!(next.phase(), Phase::Movement);
        assert_eq!(next.units().count(), 22);
    }

    #[test]
    fn movement_keeps_the_year() {
        let g = Game::standard().unwrap();
        let next = advance(&g, false);
        assert_eq!(next.year(), 1901);
        assert_eq!(next.season(), Season::Fall);
    }
}
