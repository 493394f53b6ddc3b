//! # hanabi-ai: Bot Strategies
//!
//! Strategies that pick a move for whoever's turn it is. The simulator in
//! `hanabi_cli` drives them; they only read the table and never mutate it.
//!
//! ## Core Components
//!
//! - [`Strategy`] - Trait every bot implements
//! - [`oracle`] - Rule-based bot that reads its own hand
//! - [`random`] - Seeded bot that picks uniformly among legal moves
//! - [`create_strategy`] - Factory by name
//!
//! ## Quick Start
//!
//! ```rust
//! use hanabi_ai::create_strategy;
//! use hanabi_engine::engine::Game;
//!
//! let mut game = Game::new(42);
//! game.add_player("a").unwrap();
//! game.add_player("b").unwrap();
//! game.start().unwrap();
//!
//! let mut bot = create_strategy("oracle", 42).expect("known strategy");
//! while let Some(mv) = bot.choose_move(game.current()) {
//!     game.apply(mv).unwrap();
//! }
//! assert!(game.current().is_game_over());
//! ```

use hanabi_engine::game::GameState;
use hanabi_engine::rules::Move;

pub mod oracle;
pub mod random;

/// Names accepted by [`create_strategy`].
pub const STRATEGY_NAMES: [&str; 2] = ["oracle", "random"];

/// A bot that chooses the next move for the current player.
///
/// # Example Implementation
///
/// ```rust
/// use hanabi_ai::Strategy;
/// use hanabi_engine::game::GameState;
/// use hanabi_engine::rules::Move;
///
/// struct AlwaysPlayFirst;
///
/// impl Strategy for AlwaysPlayFirst {
///     fn choose_move(&mut self, state: &GameState) -> Option<Move> {
///         state.current_player()?;
///         Some(Move::Play { card_index: 0 })
///     }
///
///     fn name(&self) -> &str {
///         "always-play-first"
///     }
/// }
/// ```
pub trait Strategy: Send {
    /// Picks a move for `state.current_player()`.
    ///
    /// Returns `None` when there is nothing to do: the game has not started
    /// or is already over. Any `Some` move must pass
    /// [`hanabi_engine::rules::validate_move`].
    fn choose_move(&mut self, state: &GameState) -> Option<Move>;

    fn name(&self) -> &str;
}

/// Builds a strategy by name; `seed` feeds strategies that use randomness.
///
/// Returns `None` for a name not in [`STRATEGY_NAMES`].
///
/// ```rust
/// use hanabi_ai::create_strategy;
///
/// assert_eq!(create_strategy("random", 1).unwrap().name(), "random");
/// assert!(create_strategy("psychic", 1).is_none());
/// ```
pub fn create_strategy(name: &str, seed: u64) -> Option<Box<dyn Strategy>> {
    match name {
        "oracle" => Some(Box::new(oracle::OracleStrategy::new())),
        "random" => Some(Box::new(random::RandomStrategy::new(seed))),
        _ => None,
    }
}
