use thiserror::Error;

/// Caller contract violations. A rejected call never changes the game state.
///
/// Misplays and the discard that makes a pile unwinnable are not errors;
/// they are ordinary moves with penalties.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Game has not started")]
    NotStarted,
    #[error("Game has already started")]
    AlreadyStarted,
    #[error("Game is over")]
    GameOver,
    #[error("At least one player is required to start")]
    NoPlayers,
    #[error("Player {0} has already joined")]
    PlayerExists(String),
    #[error("No player named {0}")]
    PlayerNotFound(String),
    #[error("Table is full ({max} players)")]
    TableFull { max: usize },
    #[error("Card index {index} is out of range (hand has {hand_size} cards)")]
    CardIndexOutOfRange { index: usize, hand_size: usize },
    #[error("No info tokens left")]
    NoInfoTokens,
    #[error("Players cannot give a clue to themselves")]
    CannotClueSelf,
    #[error("Unknown clue kind: {0} (expected \"number\" or \"colour\")")]
    UnknownClueKind(String),
    #[error("Unknown colour: {0}")]
    UnknownColour(String),
}
