use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anyhow::Result;
use tabletop::{
    create_area, create_card, App, Area, AreaProps, Card, CardEngine, CardProps, Engine,
    EventKind, GameEvent, PlacementStrategy, Vec3,
};

const CARD_COUNT: usize = 28;
const CARD_FRONT: &str = "./board-restaurant.jpg";
const CARD_BACK: &str = "./carnival-midway.jpg";

/// Where a card sits in the deck -> hand -> table cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CardState {
    Deck,
    Hand,
    Table,
}

#[derive(Clone)]
struct Areas {
    table: Area,
    deck: Area,
    hand: Area,
}

impl Areas {
    /// Advance `card` one step around the cycle.
    fn advance(&self, card: &Card, state: &Cell<CardState>) {
        let next = match state.get() {
            CardState::Deck => {
                card.flip();
                card.place_on(&self.hand);
                CardState::Hand
            }
            CardState::Hand => {
                card.place_on(&self.table);
                CardState::Table
            }
            CardState::Table => {
                card.flip();
                card.place_on(&self.deck);
                CardState::Deck
            }
        };
        log::info!("card {} {:?} -> {:?}", card.id(), state.get(), next);
        state.set(next);
    }
}

struct CardTable {
    cards: Vec<Card>,
}

impl App for CardTable {
    fn init(&mut self, engine: &mut CardEngine) -> Result<()> {
        let areas = Areas {
            table: create_area(
                AreaProps::new(10.0, 7.0, "./bg-table2.jpg")
                    .with_placement(PlacementStrategy::Grid),
            ),
            deck: create_area(
                AreaProps::new(1.0, 1.4, "./bg-table.jpg")
                    .with_position(Vec3::new(-4.0, -2.5, 0.001))
                    .with_placement(PlacementStrategy::Stack),
            ),
            hand: create_area(
                AreaProps::new(6.0, 2.0, "./bg-table.jpg")
                    .with_position(Vec3::new(0.0, -2.5, 0.001))
                    .with_placement(PlacementStrategy::Fan),
            ),
        };
        engine.add(areas.table.clone())?;
        engine.add(areas.deck.clone())?;
        engine.add(areas.hand.clone())?;

        // "s" shuffles the deck.
        let rng = Rc::new(RefCell::new(fastrand::Rng::new()));
        let deck = areas.deck.clone();
        areas.deck.on(EventKind::KeyDown, move |event| {
            if let GameEvent::KeyDown { key } = event {
                if key.eq_ignore_ascii_case("s") {
                    deck.shuffle(&mut rng.borrow_mut());
                    log::info!("deck shuffled ({} cards)", deck.len());
                }
            }
        });

        for _ in 0..CARD_COUNT {
            let card = create_card(CardProps::new(0.6, 1.0, 0.001, CARD_FRONT, CARD_BACK));
            let state = Cell::new(CardState::Deck);
            let handle = card.downgrade();
            let cycle = areas.clone();
            card.on(EventKind::Click, move |_| {
                if let Some(card) = handle.upgrade() {
                    cycle.advance(&card, &state);
                }
            });

            engine.add(card.clone())?;
            card.place_on(&areas.deck);
            self.cards.push(card);
        }

        log::info!(
            "dealt {} cards; click to move them, press s to shuffle the deck",
            self.cards.len()
        );
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::builder().format_target(false).init();

    Engine::new()
        .with_title("Card Table")
        .with_size(1280, 720)
        .with_vsync(true)
        .run(CardTable { cards: Vec::new() })
}
