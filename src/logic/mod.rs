//! Bracket business logic: seeding, building, progression and standings.

mod builder;
mod byes;
mod double_elimination;
mod progression;
mod round_robin;
mod seeding;
mod single_elimination;
mod standings;
mod swiss;
mod validation;

pub use builder::build_bracket;
pub use byes::{bracket_size, resolve_byes, seeding_order, ByePlan};
pub use double_elimination::build_double_elimination;
pub use progression::{forfeit, report_result, reset_bracket, start_match};
pub use round_robin::build_round_robin;
pub use seeding::{seed_participants, validate_participants, SeedingMethod};
pub use single_elimination::build_single_elimination;
pub use standings::{compute_standings, Standing};
pub use swiss::{build_swiss, default_rounds, generate_next_round};
pub use validation::validate_bracket;
