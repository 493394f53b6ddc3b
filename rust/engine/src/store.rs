use crate::errors::GameError;
use crate::game::GameState;

/// Single-snapshot holder for one game.
///
/// All mutation goes through [`GameStore::update`], which works on a copy and
/// only swaps it in when the transform succeeds. A rejected move therefore
/// leaves the stored snapshot exactly as it was, even if the transform had
/// already touched the copy.
#[derive(Debug, Clone)]
pub struct GameStore {
    state: GameState,
}

impl GameStore {
    pub fn new(state: GameState) -> Self {
        Self { state }
    }

    pub fn current(&self) -> &GameState {
        &self.state
    }

    /// Runs `f` on a working copy and commits it if `f` returns `Ok`.
    pub fn update<T, F>(&mut self, f: F) -> Result<T, GameError>
    where
        F: FnOnce(&mut GameState) -> Result<T, GameError>,
    {
        let mut next = self.state.clone();
        let out = f(&mut next)?;
        self.state = next;
        Ok(out)
    }

    /// Replaces the snapshot wholesale, returning the old one.
    pub fn replace(&mut self, state: GameState) -> GameState {
        std::mem::replace(&mut self.state, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Player;

    #[test]
    fn failed_update_leaves_state_untouched() {
        let mut store = GameStore::new(GameState::new(3));
        let before = store.current().clone();

        let result: Result<(), GameError> = store.update(|s| {
            s.push_player(Player::new("half-applied"));
            s.remove_life();
            Err(GameError::NoPlayers)
        });

        assert_eq!(result, Err(GameError::NoPlayers));
        assert_eq!(store.current(), &before);
    }

    #[test]
    fn successful_update_commits_and_returns_value() {
        let mut store = GameStore::new(GameState::new(3));
        let n = store
            .update(|s| {
                s.push_player(Player::new("ann"));
                Ok(s.players().len())
            })
            .unwrap();
        assert_eq!(n, 1);
        assert!(store.current().has_player("ann"));
    }

    #[test]
    fn replace_swaps_snapshot() {
        let mut store = GameStore::new(GameState::new(3));
        let old = store.replace(GameState::new(4));
        assert_eq!(old.seed(), 3);
        assert_eq!(store.current().seed(), 4);
    }
}
