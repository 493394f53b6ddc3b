//! # hanabi-engine: Cooperative Card Game Rules Engine
//!
//! A deterministic rules engine for a Hanabi-style game: players build five
//! colour piles from 1 to 5 while seeing everyone's hand but their own.
//! Shuffles are seeded, so a seed plus the move list reproduces a game
//! exactly.
//!
//! ## Core Modules
//!
//! - [`cards`] - Colours, cards and the 50-card composition
//! - [`deck`] - Seeded Fisher-Yates shuffle and the draw pile
//! - [`player`] - A seat: hand plus clue knowledge
//! - [`game`] - The shared table snapshot and its read accessors
//! - [`store`] - Single-snapshot holder with all-or-nothing updates
//! - [`rules`] - Moves, their validation and their outcomes
//! - [`engine`] - The [`engine::Game`] façade: lobby, deal and move pipelines
//! - [`logger`] - JSONL game records for replay
//! - [`errors`] - Error types for caller mistakes
//!
//! ## Quick Start
//!
//! ```rust
//! use hanabi_engine::engine::Game;
//! use hanabi_engine::rules::ClueKind;
//!
//! let mut game = Game::new(123123123);
//! game.add_player("nick").unwrap();
//! game.add_player("nick2").unwrap();
//! game.start().unwrap();
//!
//! game.give_info(ClueKind::Number, "nick2", 0).unwrap();
//! assert_eq!(game.current().info(), 7);
//! assert_eq!(game.current().current_player(), Some("nick2"));
//! ```
//!
//! ## Deterministic Shuffles
//!
//! ```rust
//! use hanabi_engine::deck::generate_deck;
//!
//! assert_eq!(generate_deck(42), generate_deck(42));
//! assert_eq!(generate_deck(42).len(), 50);
//! ```
//!
//! ## Move Validation
//!
//! Every move is checked before anything changes; a rejected move leaves the
//! table untouched:
//!
//! ```rust
//! use hanabi_engine::engine::Game;
//! use hanabi_engine::errors::GameError;
//!
//! let mut game = Game::new(1);
//! game.add_player("solo").unwrap();
//! game.start().unwrap();
//!
//! let before = game.current().clone();
//! assert!(matches!(
//!     game.play_card(9),
//!     Err(GameError::CardIndexOutOfRange { index: 9, .. })
//! ));
//! assert_eq!(game.current(), &before);
//! ```

pub mod cards;
pub mod deck;
pub mod engine;
pub mod errors;
pub mod game;
pub mod logger;
pub mod player;
pub mod rules;
pub mod store;
