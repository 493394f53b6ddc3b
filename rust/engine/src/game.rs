use crate::cards::{all_colours, Card, Colour, MAX_NUMBER};
use crate::deck::Deck;
use crate::errors::GameError;
use crate::player::Player;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Life tokens at the start of a game.
pub const MAX_LIVES: u8 = 3;
/// Info tokens at the start of a game, and the cap discards refill to.
pub const MAX_INFO: u8 = 8;

/// Why a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum EndReason {
    /// The last copy of a card the pile still needed was discarded
    UnwinnablePile { card: Card },
    /// Misplays used up every life token
    OutOfLives,
    /// Every pile reached five
    AllPilesComplete,
    /// The deck ran out and each player took their final move
    DeckExhausted,
}

/// The whole shared table: the unit that moves read and replace.
///
/// Players keep join order, which is also turn order. Stacks and the discard
/// pile hold the most recent card at the front.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    seed: u64,
    players: Vec<Player>,
    current_player: Option<String>,
    game_over: bool,
    end_reason: Option<EndReason>,
    lives: u8,
    info: u8,
    deck: Deck,
    discard: VecDeque<Card>,
    stacks: BTreeMap<Colour, VecDeque<u8>>,
    final_turns: Option<usize>,
}

impl GameState {
    /// Fresh table for `seed`: shuffled deck, no players, full tokens.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            players: Vec::new(),
            current_player: None,
            game_over: false,
            end_reason: None,
            lives: MAX_LIVES,
            info: MAX_INFO,
            deck: Deck::new_with_seed(seed),
            discard: VecDeque::new(),
            stacks: all_colours()
                .into_iter()
                .map(|c| (c, VecDeque::new()))
                .collect(),
            final_turns: None,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
    pub fn players(&self) -> &[Player] {
        &self.players
    }
    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }
    pub fn has_player(&self, name: &str) -> bool {
        self.player(name).is_some()
    }
    pub fn current_player(&self) -> Option<&str> {
        self.current_player.as_deref()
    }
    pub fn is_started(&self) -> bool {
        self.current_player.is_some()
    }
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }
    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }
    pub fn lives(&self) -> u8 {
        self.lives
    }
    pub fn info(&self) -> u8 {
        self.info
    }
    pub fn deck(&self) -> &Deck {
        &self.deck
    }
    pub fn discard(&self) -> &VecDeque<Card> {
        &self.discard
    }
    pub fn stacks(&self) -> &BTreeMap<Colour, VecDeque<u8>> {
        &self.stacks
    }
    /// Moves left in the final round, once the deck has run out.
    pub fn final_turns(&self) -> Option<usize> {
        self.final_turns
    }

    /// Highest number placed on `colour`'s pile, `None` while it is empty.
    pub fn top_of_stack(&self, colour: Colour) -> Option<u8> {
        self.stacks.get(&colour).and_then(|s| s.front().copied())
    }

    pub fn stack_len(&self, colour: Colour) -> usize {
        self.stacks.get(&colour).map_or(0, VecDeque::len)
    }

    /// Card at `index` in `name`'s hand.
    pub fn card_at(&self, name: &str, index: usize) -> Result<Card, GameError> {
        let player = self
            .player(name)
            .ok_or_else(|| GameError::PlayerNotFound(name.to_string()))?;
        player
            .card_at(index)
            .ok_or(GameError::CardIndexOutOfRange {
                index,
                hand_size: player.hand_size(),
            })
    }

    /// Sum of the pile tops, 0 to 25.
    pub fn score(&self) -> u32 {
        all_colours()
            .into_iter()
            .map(|c| u32::from(self.top_of_stack(c).unwrap_or(0)))
            .sum()
    }

    pub fn all_piles_complete(&self) -> bool {
        all_colours()
            .into_iter()
            .all(|c| self.top_of_stack(c) == Some(MAX_NUMBER))
    }

    /// Cards in the deck, every hand, the discard pile and on the piles.
    /// Stays at the deck size for the whole game.
    pub fn total_cards(&self) -> usize {
        self.deck.remaining()
            + self.players.iter().map(Player::hand_size).sum::<usize>()
            + self.discard.len()
            + self.stacks.values().map(VecDeque::len).sum::<usize>()
    }

    /// How many copies of `card` are already on the discard pile.
    pub fn discarded_copies(&self, card: Card) -> usize {
        self.discard.iter().filter(|&&c| c == card).count()
    }

    pub fn first_player(&self) -> Option<&str> {
        self.players.first().map(|p| p.name.as_str())
    }

    /// The player after the current one in join order, wrapping around.
    pub fn next_player(&self) -> Option<&str> {
        if self.players.is_empty() {
            return None;
        }
        let current = self.current_player.as_deref()?;
        let index = self.players.iter().position(|p| p.name == current)?;
        let next = (index + 1) % self.players.len();
        Some(self.players[next].name.as_str())
    }

    pub(crate) fn player_mut(&mut self, name: &str) -> Result<&mut Player, GameError> {
        self.players
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| GameError::PlayerNotFound(name.to_string()))
    }

    pub(crate) fn push_player(&mut self, player: Player) {
        self.players.push(player);
    }

    pub(crate) fn remove_player(&mut self, name: &str) -> Option<Player> {
        let index = self.players.iter().position(|p| p.name == name)?;
        Some(self.players.remove(index))
    }

    /// Moves the top card of the deck into `name`'s hand. Dealing from an
    /// empty deck is a no-op.
    pub(crate) fn deal_to(&mut self, name: &str) -> Result<Option<Card>, GameError> {
        let Some(card) = self.deck.deal_card() else {
            return Ok(None);
        };
        self.player_mut(name)?.give_card(card);
        Ok(Some(card))
    }

    pub(crate) fn take_card(&mut self, name: &str, index: usize) -> Result<Card, GameError> {
        let player = self.player_mut(name)?;
        let hand_size = player.hand_size();
        player
            .take_card(index)
            .ok_or(GameError::CardIndexOutOfRange { index, hand_size })
    }

    pub(crate) fn put_on_stack(&mut self, card: Card) {
        self.stacks
            .entry(card.colour)
            .or_default()
            .push_front(card.number);
    }

    pub(crate) fn add_to_discard(&mut self, card: Card) {
        self.discard.push_front(card);
    }

    pub(crate) fn remove_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
    }

    pub(crate) fn add_info(&mut self) {
        self.info = (self.info + 1).min(MAX_INFO);
    }

    pub(crate) fn remove_info(&mut self) {
        self.info = self.info.saturating_sub(1);
    }

    pub(crate) fn set_current_player(&mut self, name: Option<String>) {
        self.current_player = name;
    }

    pub(crate) fn advance_turn(&mut self) {
        let next = self.next_player().map(str::to_string);
        if next.is_some() {
            self.current_player = next;
        }
    }

    pub(crate) fn set_final_turns(&mut self, turns: Option<usize>) {
        self.final_turns = turns;
    }

    /// Marks the game over. The first reason recorded wins.
    pub(crate) fn end_game(&mut self, reason: EndReason) {
        if !self.game_over {
            self.game_over = true;
            self.end_reason = Some(reason);
        }
    }
}
