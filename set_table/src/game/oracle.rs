//! Set validity oracle.
//!
//! The dealer only needs two questions answered: is this triple a set, and
//! which sets exist in a collection of cards. [`SetOracle`] is the seam for
//! that; [`StandardRules`] is the classic game where every card is a point in
//! a `feature_size ^ features` grid.

use super::entities::Card;

/// Answers set questions for the dealer.
pub trait SetOracle: Send + Sync {
    fn is_valid_set(&self, cards: &[Card; 3]) -> bool;

    /// Up to `limit` sets found among `cards`, in index order.
    fn find_sets(&self, cards: &[Card], limit: usize) -> Vec<[Card; 3]> {
        let mut sets = Vec::new();
        if limit == 0 {
            return sets;
        }

        for i in 0..cards.len() {
            for j in (i + 1)..cards.len() {
                for k in (j + 1)..cards.len() {
                    let triple = [cards[i], cards[j], cards[k]];
                    if self.is_valid_set(&triple) {
                        sets.push(triple);
                        if sets.len() == limit {
                            return sets;
                        }
                    }
                }
            }
        }

        sets
    }
}

/// Classic rules: a triple is a set when, for every feature, the three cards
/// either all agree or all differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardRules {
    features: u32,
    feature_size: u32,
}

impl StandardRules {
    pub fn new(features: u32, feature_size: u32) -> Self {
        Self {
            features,
            feature_size: feature_size.max(1),
        }
    }

    /// Number of distinct cards under these rules. Saturates at `u32::MAX`
    /// when the grid is larger than the card id space.
    pub fn deck_size(&self) -> u32 {
        self.feature_size
            .checked_pow(self.features)
            .unwrap_or(u32::MAX)
    }

    /// Feature values of `card`, least significant feature first.
    pub fn features_of(&self, card: Card) -> Vec<u32> {
        let mut id = card.0;
        (0..self.features)
            .map(|_| {
                let value = id % self.feature_size;
                id /= self.feature_size;
                value
            })
            .collect()
    }
}

impl Default for StandardRules {
    fn default() -> Self {
        Self::new(4, 3)
    }
}

impl SetOracle for StandardRules {
    fn is_valid_set(&self, cards: &[Card; 3]) -> bool {
        let [a, b, c] = *cards;
        if a == b || b == c || a == c {
            return false;
        }

        let (fa, fb, fc) = (
            self.features_of(a),
            self.features_of(b),
            self.features_of(c),
        );
        fa.iter().zip(&fb).zip(&fc).all(|((x, y), z)| {
            let all_same = x == y && y == z;
            let all_different = x != y && y != z && x != z;
            all_same || all_different
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(features: [u32; 4]) -> Card {
        Card(features[0] + 3 * features[1] + 9 * features[2] + 27 * features[3])
    }

    #[test]
    fn test_default_rules_have_81_cards() {
        assert_eq!(StandardRules::default().deck_size(), 81);
    }

    #[test]
    fn test_deck_size_saturates_for_huge_grids() {
        assert_eq!(StandardRules::new(40, 3).deck_size(), u32::MAX);
        assert_eq!(StandardRules::new(20, 3).deck_size(), 3_486_784_401);
        assert_eq!(StandardRules::new(0, 3).deck_size(), 1);
    }

    #[test]
    fn test_features_of_round_trip() {
        let rules = StandardRules::default();
        assert_eq!(rules.features_of(card([2, 0, 1, 2])), vec![2, 0, 1, 2]);
    }

    #[test]
    fn test_all_same_or_all_different_is_set() {
        let rules = StandardRules::default();
        let triple = [card([0, 1, 2, 0]), card([1, 1, 0, 0]), card([2, 1, 1, 0])];
        assert!(rules.is_valid_set(&triple));
    }

    #[test]
    fn test_two_same_one_different_is_not_set() {
        let rules = StandardRules::default();
        let triple = [card([0, 0, 0, 0]), card([0, 0, 0, 1]), card([0, 0, 1, 2])];
        assert!(!rules.is_valid_set(&triple));
    }

    #[test]
    fn test_repeated_card_is_not_set() {
        let rules = StandardRules::default();
        assert!(!rules.is_valid_set(&[Card(4), Card(4), Card(4)]));
    }

    #[test]
    fn test_find_sets_honors_limit() {
        let rules = StandardRules::default();
        let everything: Vec<Card> = (0..81).map(Card).collect();

        assert_eq!(rules.find_sets(&everything, 1).len(), 1);
        assert_eq!(rules.find_sets(&everything, 5).len(), 5);
        assert!(rules.find_sets(&everything, 0).is_empty());
        // 81 * 80 / 6 sets in the full deck
        assert_eq!(rules.find_sets(&everything, usize::MAX).len(), 1080);
    }

    #[test]
    fn test_find_sets_in_setless_collection() {
        let rules = StandardRules::default();
        // Every card shares features 2..4 and uses only values 0 and 1 for
        // features 0 and 1, so no feature can ever be all-different.
        let cards = [
            card([0, 0, 0, 0]),
            card([0, 1, 0, 0]),
            card([1, 0, 0, 0]),
            card([1, 1, 0, 0]),
        ];
        assert!(rules.find_sets(&cards, 1).is_empty());
    }
}
