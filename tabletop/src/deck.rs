use crate::card::Card;

/// A loose pile of cards that can be shuffled and drawn from the top.
///
/// Unlike an [`Area`](crate::area::Area) a deck has no position on the table;
/// it is bookkeeping for applications that deal cards out.
#[derive(Clone, Debug, Default)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn new(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn shuffle(&mut self, rng: &mut fastrand::Rng) {
        rng.shuffle(&mut self.cards);
    }

    /// Take the top card (the last one in the list).
    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::CardProps;

    fn cards(count: usize) -> Vec<Card> {
        (0..count)
            .map(|_| Card::new(CardProps::new(0.6, 1.0, 0.001, "f.jpg", "b.jpg")))
            .collect()
    }

    #[test]
    fn test_draw_takes_from_top() {
        let cards = cards(3);
        let mut deck = Deck::new(cards.clone());

        assert_eq!(deck.draw(), Some(cards[2].clone()));
        assert_eq!(deck.len(), 2);
        deck.draw();
        deck.draw();
        assert!(deck.draw().is_none());
        assert!(deck.is_empty());
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let cards = cards(20);
        let mut deck = Deck::new(cards.clone());
        deck.shuffle(&mut fastrand::Rng::with_seed(42));

        assert_eq!(deck.len(), 20);
        assert!(cards.iter().all(|card| deck.cards().contains(card)));
    }
}
