use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position on the table. Slots are numbered `0..table_size`.
pub type Slot = usize;

/// Players are numbered `0..player_count`.
pub type PlayerId = usize;

/// A player can mark at most this many slots at once. Reaching it raises a claim.
pub const MAX_TOKENS: usize = 3;

/// An opaque card identifier. Its features are only known to the set oracle.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card(pub u32);

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whether a player's input comes from a person or from a background keypresser.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerKind {
    Human,
    Computer,
}

impl fmt::Display for PlayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerKind::Human => write!(f, "human"),
            PlayerKind::Computer => write!(f, "computer"),
        }
    }
}

/// The dealer's stock of cards that are neither on the table nor claimed.
///
/// Cards are drawn from the top; [`Deck::shuffle`] randomizes the remaining
/// order with the deck's own RNG so seeded games replay identically.
#[derive(Debug)]
pub struct Deck {
    /// Top of the deck is the end of the vector.
    cards: Vec<Card>,
    rng: StdRng,
}

impl Deck {
    /// Full shuffled deck of `size` cards.
    pub fn new(size: u32, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut deck = Self {
            cards: (0..size).map(Card).collect(),
            rng,
        };
        deck.shuffle();
        deck
    }

    /// Deck that deals `cards` in the given order. Nothing is shuffled until
    /// [`Deck::shuffle`] is called.
    pub fn from_cards(cards: impl IntoIterator<Item = Card>, seed: u64) -> Self {
        let mut cards: Vec<Card> = cards.into_iter().collect();
        cards.reverse();
        Self {
            cards,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Takes the top card.
    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    /// Returns `card` to the top of the deck.
    pub fn put_back(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// Shuffles the remaining cards with the deck's RNG.
    pub fn shuffle(&mut self) {
        self.cards.shuffle(&mut self.rng);
    }

    /// Get number of cards left
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Remaining cards, in no particular order.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}
