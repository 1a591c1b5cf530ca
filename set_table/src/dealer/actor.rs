//! Dealer loop: dealing, claim adjudication, reshuffles and the end of the game.

use super::{
    claims::{Claim, ClaimReceiver, Verdict},
    config::GameConfig,
};
use crate::game::{
    display::GameDisplay,
    entities::{Card, Deck, MAX_TOKENS, PlayerId},
    oracle::SetOracle,
    shutdown::Shutdown,
    table::{SharedTable, Table},
};
use serde::Serialize;
use std::{sync::Arc, time::Duration};
use tokio::time::{Instant, sleep};

/// Phases of the dealer loop, exposed for logging and tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DealerPhase {
    Dealing,
    Timing,
    Collecting,
    Terminated,
}

/// Final result of a game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GameOutcome {
    pub scores: Vec<u32>,
    pub winners: Vec<PlayerId>,
    pub rounds: u32,
    /// Cards taken off the table by accepted claims
    pub claimed: Vec<Card>,
    pub deck_remaining: usize,
}

/// Players tied at the highest score.
pub fn winners(scores: &[u32]) -> Vec<PlayerId> {
    let Some(&best) = scores.iter().max() else {
        return Vec::new();
    };
    scores
        .iter()
        .enumerate()
        .filter(|&(_, &score)| score == best)
        .map(|(player, _)| player)
        .collect()
}

/// The single consumer of claims and the only writer of other players' tokens.
pub struct Dealer {
    config: Arc<GameConfig>,
    table: SharedTable,
    deck: Deck,
    oracle: Arc<dyn SetOracle>,
    display: Arc<dyn GameDisplay>,
    claims: ClaimReceiver,
    shutdown: Shutdown,
    phase: DealerPhase,
    /// When the table is next collected and reshuffled
    reshuffle_at: Instant,
    claimed: Vec<Card>,
    rounds: u32,
}

impl Dealer {
    pub fn new(
        config: Arc<GameConfig>,
        table: SharedTable,
        deck: Deck,
        oracle: Arc<dyn SetOracle>,
        display: Arc<dyn GameDisplay>,
        claims: ClaimReceiver,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            config,
            table,
            deck,
            oracle,
            display,
            claims,
            shutdown,
            phase: DealerPhase::Dealing,
            reshuffle_at: Instant::now(),
            claimed: Vec::new(),
            rounds: 0,
        }
    }

    /// Runs rounds until the deck holds no set or termination is requested.
    pub async fn run(mut self) -> GameOutcome {
        log::info!(
            "Dealer starting with {} players and {} cards",
            self.config.player_count(),
            self.deck.len()
        );

        while !self.should_finish() {
            self.enter(DealerPhase::Dealing);
            self.place_cards_on_table().await;
            self.rounds += 1;
            self.reset_timer();

            self.enter(DealerPhase::Timing);
            self.timer_loop().await;

            self.enter(DealerPhase::Collecting);
            self.update_timer_display();
            self.remove_all_cards_from_table().await;
        }

        self.enter(DealerPhase::Terminated);
        let outcome = self.announce_winners().await;

        // Anything submitted after the last collection is dropped unresolved,
        // which tells the claimant there will be no verdict.
        self.claims.close();
        while let Some(claim) = self.claims.try_next() {
            log::debug!("Discarding claim of player {} at shutdown", claim.player);
        }

        log::info!("Dealer terminated after {} rounds", self.rounds);
        outcome
    }

    fn enter(&mut self, phase: DealerPhase) {
        log::debug!("Dealer {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    /// The game ends on request, or when the deck alone can no longer form a set.
    fn should_finish(&self) -> bool {
        if self.shutdown.is_triggered() {
            log::info!("Dealer stopping on termination request");
            return true;
        }
        if self.oracle.find_sets(self.deck.cards(), 1).is_empty() {
            log::info!("No sets left in the deck ({} cards)", self.deck.len());
            return true;
        }
        false
    }

    async fn timer_loop(&mut self) {
        while !self.shutdown.is_triggered() && Instant::now() < self.reshuffle_at {
            self.sleep_until_woken_or_timeout().await;
            self.update_timer_display();
            self.adjudicate_pending_claims().await;
            self.place_cards_on_table().await;
        }
    }

    async fn sleep_until_woken_or_timeout(&mut self) {
        let nap = self.config.tick_interval.min(self.time_left());

        tokio::select! {
            _ = sleep(nap) => {}
            _ = self.claims.woken(), if self.config.early_wake => {}
            _ = self.shutdown.triggered() => {}
        }
    }

    fn reset_timer(&mut self) {
        self.reshuffle_at = Instant::now() + self.config.round_duration;
        self.update_timer_display();
    }

    fn update_timer_display(&self) {
        let remaining = self.time_left();
        let warn = remaining <= self.config.warning_threshold;
        self.display.set_countdown(remaining, warn);
    }

    /// Drains the whole queue, oldest claim first.
    async fn adjudicate_pending_claims(&mut self) {
        while let Some(claim) = self.claims.try_next() {
            self.adjudicate(claim).await;
        }
    }

    /// Decides one claim. Everything between reading the claimed slots and
    /// resetting the timer happens under a single write lock.
    async fn adjudicate(&mut self, claim: Claim) {
        let table = Arc::clone(&self.table);
        let mut table = table.write().await;

        let still_held = claim
            .slots
            .iter()
            .all(|&slot| table.has_token(claim.player, slot));
        let verdict = if !still_held {
            Verdict::Withdrawn
        } else {
            match Self::cards_in(&table, &claim) {
                Some(cards) if self.oracle.is_valid_set(&cards) => self.accept(&mut table, &claim),
                _ => Verdict::Penalty,
            }
        };
        drop(table);

        log::info!(
            "Claim of player {} on {:?}: {:?}",
            claim.player,
            claim.slots,
            verdict
        );
        claim.resolve(verdict);
    }

    fn cards_in(table: &Table, claim: &Claim) -> Option<[Card; MAX_TOKENS]> {
        let mut cards = [Card(0); MAX_TOKENS];
        for (card, &slot) in cards.iter_mut().zip(&claim.slots) {
            *card = table.card_at(slot)?;
        }
        Some(cards)
    }

    fn accept(&mut self, table: &mut Table, claim: &Claim) -> Verdict {
        let score = match table.award_point(claim.player) {
            Ok(score) => score,
            Err(e) => {
                log::error!("Cannot score claim of player {}: {}", claim.player, e);
                return Verdict::Withdrawn;
            }
        };

        let retracted = table.retract_tokens_on(&claim.slots);
        for &(player, slot) in retracted.iter().filter(|(p, _)| *p != claim.player) {
            log::debug!("Token of player {} on slot {} retracted", player, slot);
        }

        for &slot in &claim.slots {
            match table.remove_card(slot) {
                Ok(card) => self.claimed.push(card),
                Err(e) => log::error!("Claimed slot {} could not be cleared: {}", slot, e),
            }
        }

        self.reset_timer();
        Verdict::Point { score }
    }

    /// Fills every empty slot, in slot order, while the deck lasts.
    async fn place_cards_on_table(&mut self) {
        let table = Arc::clone(&self.table);
        let mut table = table.write().await;

        for slot in table.empty_slots() {
            let Some(card) = self.deck.draw() else {
                break;
            };
            if let Err(e) = table.place_card(card, slot) {
                log::error!("Could not deal {} to slot {}: {}", card, slot, e);
                self.deck.put_back(card);
            }
        }

        if self.config.hints {
            self.log_hints(&table);
        }
    }

    fn log_hints(&self, table: &Table) {
        for set in self.oracle.find_sets(&table.cards(), usize::MAX) {
            let slots: Vec<_> = set.iter().filter_map(|&card| table.slot_of(card)).collect();
            log::info!("Hint: set {:?} in slots {:?}", set, slots);
        }
    }

    /// Ends the round: clears every token, returns every table card to the
    /// deck, resolves claims left in the queue and reshuffles.
    async fn remove_all_cards_from_table(&mut self) {
        let table = Arc::clone(&self.table);
        let mut table = table.write().await;

        let tokens = table.clear_all_tokens();
        let mut returned = 0;
        for slot in table.occupied_slots() {
            if let Ok(card) = table.remove_card(slot) {
                self.deck.put_back(card);
                returned += 1;
            }
        }
        drop(table);

        while let Some(claim) = self.claims.try_next() {
            log::debug!("Round over, withdrawing claim of player {}", claim.player);
            claim.resolve(Verdict::Withdrawn);
        }

        self.deck.shuffle();
        log::info!(
            "Round {} collected: {} cards back in the deck, {} tokens cleared",
            self.rounds,
            returned,
            tokens
        );
    }

    async fn announce_winners(&mut self) -> GameOutcome {
        let scores = self.table.read().await.scores().to_vec();
        let winners = winners(&scores);
        self.display.announce_winners(&winners);
        log::info!("Winners: {:?} with scores {:?}", winners, scores);

        GameOutcome {
            scores,
            winners,
            rounds: self.rounds,
            claimed: self.claimed.clone(),
            deck_remaining: self.deck.len(),
        }
    }

    /// Time left in the current round.
    fn time_left(&self) -> Duration {
        self.reshuffle_at.saturating_duration_since(Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dealer::claims::{self, ClaimSender};
    use crate::game::{
        display::{DisplayEvent, RecordingDisplay},
        oracle::StandardRules,
        shutdown::{self, ShutdownTrigger},
    };

    /// Under the default rules cards 0..9 form the sets {0, 1, 2}, {3, 4, 5},
    /// {0, 3, 6} and a few more; {0, 1, 3} and {2, 3, 4} are not sets.
    fn test_dealer(
        players: usize,
        deck: Vec<u32>,
        config: GameConfig,
    ) -> (Dealer, SharedTable, ClaimSender, ShutdownTrigger) {
        let (dealer, table, sender, trigger, _) = recorded_dealer(players, deck, config);
        (dealer, table, sender, trigger)
    }

    /// Like `test_dealer`, also handing back the display the dealer reports to.
    fn recorded_dealer(
        players: usize,
        deck: Vec<u32>,
        config: GameConfig,
    ) -> (Dealer, SharedTable, ClaimSender, ShutdownTrigger, Arc<RecordingDisplay>) {
        let display = Arc::new(RecordingDisplay::new());
        let table = Table::new(config.table_size, players, display.clone()).into_shared();
        let (sender, receiver) = claims::channel(players);
        let (trigger, shutdown) = shutdown::channel();
        let dealer = Dealer::new(
            Arc::new(config),
            table.clone(),
            Deck::from_cards(deck.into_iter().map(Card), 1),
            Arc::new(StandardRules::default()),
            display.clone(),
            receiver,
            shutdown,
        );
        (dealer, table, sender, trigger, display)
    }

    /// Every card the dealer knows of: deck, table and claimed pile.
    async fn all_cards(dealer: &Dealer, table: &SharedTable) -> Vec<Card> {
        let mut cards = dealer.deck.cards().to_vec();
        cards.extend(table.read().await.cards());
        cards.extend(&dealer.claimed);
        cards.sort();
        cards
    }

    fn small_config(players: usize) -> GameConfig {
        GameConfig {
            table_size: 6,
            players: vec![crate::game::entities::PlayerKind::Human; players],
            ..GameConfig::default()
        }
    }

    async fn mark(table: &SharedTable, player: PlayerId, slots: [usize; 3]) {
        let mut table = table.write().await;
        for slot in slots {
            table.place_token(player, slot).unwrap();
        }
    }

    #[test]
    fn test_winners_ties() {
        assert_eq!(winners(&[3, 3, 1]), vec![0, 1]);
        assert_eq!(winners(&[0, 2, 1]), vec![1]);
        assert_eq!(winners(&[0, 0]), vec![0, 1]);
        assert!(winners(&[]).is_empty());
    }

    #[tokio::test]
    async fn test_deal_fills_slots_in_order() {
        let (mut dealer, table, _, _) = test_dealer(1, (0..8).collect(), small_config(1));
        dealer.place_cards_on_table().await;

        let table = table.read().await;
        assert_eq!(table.cards(), (0..6).map(Card).collect::<Vec<_>>());
        assert_eq!(dealer.deck.len(), 2);
    }

    #[tokio::test]
    async fn test_deal_stops_when_deck_runs_out() {
        let (mut dealer, table, _, _) = test_dealer(1, vec![0, 1, 2, 3], small_config(1));
        dealer.place_cards_on_table().await;

        let table = table.read().await;
        assert_eq!(table.count_cards(), 4);
        assert_eq!(table.empty_slots(), vec![4, 5]);
        assert!(dealer.deck.is_empty());
    }

    #[tokio::test]
    async fn test_accepted_claim_clears_slots_and_foreign_tokens() {
        let (mut dealer, table, sender, _) = test_dealer(2, (0..9).collect(), small_config(2));
        dealer.place_cards_on_table().await;
        mark(&table, 0, [0, 1, 2]).await;
        mark(&table, 1, [2, 3, 4]).await;

        let (claim, verdict) = Claim::new(0, [0, 1, 2]);
        sender.submit(claim).await.unwrap();
        dealer.adjudicate_pending_claims().await;

        assert_eq!(verdict.await, Ok(Verdict::Point { score: 1 }));
        let table = table.read().await;
        for slot in [0, 1, 2] {
            assert_eq!(table.card_at(slot), None);
        }
        assert!(table.tokens_of(0).is_empty());
        assert_eq!(table.tokens_of(1), &[3, 4]);
        assert_eq!(table.scores(), &[1, 0]);
        assert_eq!(dealer.claimed, vec![Card(0), Card(1), Card(2)]);
    }

    #[tokio::test]
    async fn test_rejected_claim_keeps_tokens() {
        let (mut dealer, table, sender, _) = test_dealer(1, (0..9).collect(), small_config(1));
        dealer.place_cards_on_table().await;
        mark(&table, 0, [0, 1, 3]).await;

        let (claim, verdict) = Claim::new(0, [0, 1, 3]);
        sender.submit(claim).await.unwrap();
        dealer.adjudicate_pending_claims().await;

        assert_eq!(verdict.await, Ok(Verdict::Penalty));
        let table = table.read().await;
        assert_eq!(table.tokens_of(0), &[0, 1, 3]);
        assert_eq!(table.count_cards(), 6);
        assert_eq!(table.scores(), &[0]);
    }

    #[tokio::test]
    async fn test_overlapping_claim_is_withdrawn_after_earlier_accept() {
        let config = GameConfig {
            table_size: 9,
            ..small_config(2)
        };
        let (mut dealer, table, sender, _) = test_dealer(2, (0..12).collect(), config);
        dealer.place_cards_on_table().await;
        // Both triples are sets on the table as dealt, and they share slot 0.
        mark(&table, 0, [0, 1, 2]).await;
        mark(&table, 1, [0, 3, 6]).await;

        let (first, first_verdict) = Claim::new(0, [0, 1, 2]);
        let (second, second_verdict) = Claim::new(1, [0, 3, 6]);
        sender.submit(first).await.unwrap();
        sender.submit(second).await.unwrap();
        dealer.adjudicate_pending_claims().await;

        assert_eq!(first_verdict.await, Ok(Verdict::Point { score: 1 }));
        assert_eq!(second_verdict.await, Ok(Verdict::Withdrawn));
        let table = table.read().await;
        assert_eq!(table.scores(), &[1, 0]);
        assert_eq!(table.tokens_of(1), &[3, 6]);
        assert_eq!(table.card_at(3), Some(Card(3)));
    }

    #[tokio::test]
    async fn test_collection_returns_cards_and_withdraws_queued_claims() {
        let (mut dealer, table, sender, _) = test_dealer(1, (0..9).collect(), small_config(1));
        dealer.place_cards_on_table().await;
        mark(&table, 0, [0, 1, 3]).await;
        let (claim, verdict) = Claim::new(0, [0, 1, 3]);
        sender.submit(claim).await.unwrap();

        dealer.remove_all_cards_from_table().await;

        assert_eq!(verdict.await, Ok(Verdict::Withdrawn));
        let table = table.read().await;
        assert_eq!(table.count_cards(), 0);
        assert!(table.tokens_of(0).is_empty());
        assert_eq!(dealer.deck.len(), 9);
    }

    #[tokio::test]
    async fn test_setless_deck_terminates_without_dealing() {
        // Cards 0, 1, 3, 4 differ only in two features with two values each.
        let (dealer, table, _, _) = test_dealer(2, vec![0, 1, 3, 4], small_config(2));
        let outcome = dealer.run().await;

        assert_eq!(outcome.rounds, 0);
        assert_eq!(outcome.winners, vec![0, 1]);
        assert_eq!(outcome.deck_remaining, 4);
        assert_eq!(table.read().await.count_cards(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_round_timeout_reshuffles() {
        let config = GameConfig {
            round_duration: Duration::from_secs(2),
            ..small_config(1)
        };
        let (dealer, _table, _, trigger) = test_dealer(1, (0..9).collect(), config);
        let run = tokio::spawn(dealer.run());

        sleep(Duration::from_millis(4_500)).await;
        trigger.trigger();
        let outcome = run.await.unwrap();

        assert!(outcome.rounds >= 2, "rounds: {}", outcome.rounds);
        assert_eq!(outcome.deck_remaining, 9);
        assert!(outcome.claimed.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_accepted_claim_resets_timer() {
        let config = GameConfig {
            round_duration: Duration::from_secs(10),
            ..small_config(1)
        };
        let (mut dealer, table, sender, _) = test_dealer(1, (0..9).collect(), config);
        dealer.place_cards_on_table().await;
        dealer.reset_timer();

        sleep(Duration::from_secs(6)).await;
        mark(&table, 0, [0, 1, 2]).await;
        let (claim, _verdict) = Claim::new(0, [0, 1, 2]);
        sender.submit(claim).await.unwrap();
        dealer.adjudicate_pending_claims().await;

        assert_eq!(dealer.time_left(), Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_cards_conserved_through_a_round() {
        let expected: Vec<_> = (0..8).map(Card).collect();
        let (mut dealer, table, sender, _) = test_dealer(1, (0..8).collect(), small_config(1));

        dealer.place_cards_on_table().await;
        assert_eq!(table.read().await.count_cards(), 6);
        assert_eq!(all_cards(&dealer, &table).await, expected);

        mark(&table, 0, [0, 1, 2]).await;
        let (claim, verdict) = Claim::new(0, [0, 1, 2]);
        sender.submit(claim).await.unwrap();
        dealer.adjudicate_pending_claims().await;
        assert_eq!(verdict.await, Ok(Verdict::Point { score: 1 }));
        assert_eq!(dealer.claimed.len(), 3);
        assert_eq!(all_cards(&dealer, &table).await, expected);

        // Only two cards left for three vacated slots.
        dealer.place_cards_on_table().await;
        assert!(dealer.deck.is_empty());
        assert_eq!(table.read().await.empty_slots(), vec![2]);
        assert_eq!(all_cards(&dealer, &table).await, expected);

        dealer.remove_all_cards_from_table().await;
        assert_eq!(table.read().await.count_cards(), 0);
        assert_eq!(dealer.deck.len(), 5);
        assert_eq!(all_cards(&dealer, &table).await, expected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_reports_time_left_and_warns() {
        let config = GameConfig {
            round_duration: Duration::from_secs(10),
            warning_threshold: Duration::from_secs(5),
            ..small_config(1)
        };
        let (mut dealer, _table, _, _, display) = recorded_dealer(1, (0..9).collect(), config);
        dealer.reset_timer();

        sleep(Duration::from_secs(3)).await;
        dealer.update_timer_display();
        sleep(Duration::from_secs(4)).await;
        dealer.update_timer_display();

        let countdowns: Vec<_> = display
            .events()
            .into_iter()
            .filter(|e| matches!(e, DisplayEvent::Countdown { .. }))
            .collect();
        assert_eq!(
            countdowns,
            vec![
                DisplayEvent::Countdown {
                    remaining: Duration::from_secs(10),
                    warn: false
                },
                DisplayEvent::Countdown {
                    remaining: Duration::from_secs(7),
                    warn: false
                },
                DisplayEvent::Countdown {
                    remaining: Duration::from_secs(3),
                    warn: true
                },
            ]
        );
        assert_eq!(dealer.time_left(), Duration::from_secs(3));
    }
}
