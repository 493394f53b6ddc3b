use crate::Strategy;
use hanabi_engine::game::GameState;
use hanabi_engine::rules::{Move, legal_moves};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Picks uniformly among [`legal_moves`]. Same seed, same choices.
#[derive(Debug, Clone)]
pub struct RandomStrategy {
    rng: ChaCha20Rng,
}

impl RandomStrategy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl Strategy for RandomStrategy {
    fn choose_move(&mut self, state: &GameState) -> Option<Move> {
        let mut moves = legal_moves(state);
        if moves.is_empty() {
            return None;
        }
        let i = self.rng.random_range(0..moves.len());
        Some(moves.swap_remove(i))
    }

    fn name(&self) -> &str {
        "random"
    }
}
