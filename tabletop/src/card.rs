//! A single physical card: face state, targets and per-frame animation.

use std::cell::RefCell;
use std::f32::consts::PI;
use std::fmt;
use std::rc::{Rc, Weak};

use glam::Vec3;

use crate::area::{Area, AreaInner};
use crate::events::{EventEmitter, EventKind, GameEvent, Subscription};
use crate::math::{approach, Transform3D};
use crate::object::{GameObject, Geometry, ObjectId, VisualDesc};

/// Radians the flip animation advances per frame; also the snap threshold.
pub const FLIP_STEP: f32 = 0.4;
/// Fraction of the remaining distance covered per frame by position and spin.
pub const EASING: f32 = 0.1;
/// Texture used on the four edges of every card unless overridden.
pub const DEFAULT_BORDER_TEXTURE: &str = "./bg-stone.jpg";

/// Which side of the card faces the camera.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    FaceUp,
    #[default]
    FaceDown,
}

impl Visibility {
    pub fn flipped(self) -> Self {
        match self {
            Visibility::FaceUp => Visibility::FaceDown,
            Visibility::FaceDown => Visibility::FaceUp,
        }
    }

    /// Flip rotation (about Y) that shows this side.
    pub fn flip_rotation(self) -> f32 {
        match self {
            Visibility::FaceUp => PI,
            Visibility::FaceDown => 0.0,
        }
    }
}

/// Construction parameters for a card.
#[derive(Clone, Debug, PartialEq)]
pub struct CardProps {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub front: String,
    pub back: String,
    pub border: String,
}

impl CardProps {
    pub fn new(
        width: f32,
        height: f32,
        depth: f32,
        front: impl Into<String>,
        back: impl Into<String>,
    ) -> Self {
        Self {
            width,
            height,
            depth,
            front: front.into(),
            back: back.into(),
            border: DEFAULT_BORDER_TEXTURE.to_string(),
        }
    }

    pub fn with_border(mut self, border: impl Into<String>) -> Self {
        self.border = border.into();
        self
    }
}

#[derive(Debug)]
struct CardState {
    visibility: Visibility,
    target_position: Vec3,
    target_rotation: f32,
    transform: Transform3D,
}

pub(crate) struct CardInner {
    id: ObjectId,
    props: CardProps,
    state: RefCell<CardState>,
    area: RefCell<Weak<AreaInner>>,
    events: EventEmitter,
}

/// Shared handle to a card. Clones refer to the same card.
#[derive(Clone)]
pub struct Card {
    inner: Rc<CardInner>,
}

/// Non-owning card handle. Handlers stored on a card's own emitter should
/// capture this instead of a `Card` so the card can be dropped.
#[derive(Clone, Debug, Default)]
pub struct WeakCard {
    inner: Weak<CardInner>,
}

impl WeakCard {
    pub fn upgrade(&self) -> Option<Card> {
        self.inner.upgrade().map(|inner| Card { inner })
    }
}

impl Card {
    pub fn new(props: CardProps) -> Self {
        Self {
            inner: Rc::new(CardInner {
                id: ObjectId::next(),
                props,
                state: RefCell::new(CardState {
                    visibility: Visibility::default(),
                    target_position: Vec3::ZERO,
                    target_rotation: 0.0,
                    transform: Transform3D::identity(),
                }),
                area: RefCell::new(Weak::new()),
                events: EventEmitter::new(),
            }),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.inner.id
    }

    pub fn downgrade(&self) -> WeakCard {
        WeakCard {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn width(&self) -> f32 {
        self.inner.props.width
    }

    pub fn height(&self) -> f32 {
        self.inner.props.height
    }

    pub fn depth(&self) -> f32 {
        self.inner.props.depth
    }

    pub fn props(&self) -> &CardProps {
        &self.inner.props
    }

    pub fn visibility(&self) -> Visibility {
        self.inner.state.borrow().visibility
    }

    pub fn is_face_up(&self) -> bool {
        self.visibility() == Visibility::FaceUp
    }

    /// Turn the card over. The flip animates over the following frames.
    pub fn flip(&self) {
        let mut state = self.inner.state.borrow_mut();
        state.visibility = state.visibility.flipped();
    }

    pub fn set_visibility(&self, visibility: Visibility) {
        self.inner.state.borrow_mut().visibility = visibility;
    }

    /// Set the position `update` moves toward.
    pub fn move_to(&self, position: Vec3) {
        self.inner.state.borrow_mut().target_position = position;
    }

    /// Set the in-plane rotation `update` turns toward.
    pub fn rotate(&self, angle: f32) {
        self.inner.state.borrow_mut().target_rotation = angle;
    }

    pub fn target_position(&self) -> Vec3 {
        self.inner.state.borrow().target_position
    }

    pub fn target_rotation(&self) -> f32 {
        self.inner.state.borrow().target_rotation
    }

    /// Current animated transform.
    pub fn transform(&self) -> Transform3D {
        self.inner.state.borrow().transform
    }

    /// Area this card is currently a member of.
    pub fn area(&self) -> Option<Area> {
        self.inner.area.borrow().upgrade().map(Area::from_inner)
    }

    pub(crate) fn set_area(&self, area: Option<&Area>) {
        *self.inner.area.borrow_mut() = match area {
            Some(area) => area.downgrade(),
            None => Weak::new(),
        };
    }

    /// Move this card into `area`, leaving its current area first.
    ///
    /// Placing a card on the area it already belongs to moves it to the end of
    /// that area's member order.
    pub fn place_on(&self, area: &Area) {
        if let Some(previous) = self.area() {
            log::debug!("card {} leaves area {}", self.id(), previous.id());
            previous.remove(self);
        }
        log::debug!("card {} placed on area {}", self.id(), area.id());
        area.add(self);
    }

    pub fn on<F>(&self, kind: EventKind, handler: F) -> Subscription
    where
        F: FnMut(&GameEvent) + 'static,
    {
        self.inner.events.on(kind, handler)
    }

    pub fn dispatch(&self, event: &GameEvent) {
        self.inner.events.dispatch(event);
    }

    /// Advance the flip, position and spin animations by one frame.
    pub fn update(&self) {
        let mut state = self.inner.state.borrow_mut();

        let target_flip = state.visibility.flip_rotation();
        let current_flip = state.transform.rotation.y;
        if (target_flip - current_flip).abs() < FLIP_STEP {
            state.transform.rotation.y = target_flip;
        } else {
            let step = match state.visibility {
                Visibility::FaceUp => FLIP_STEP,
                Visibility::FaceDown => -FLIP_STEP,
            };
            state.transform.rotation.y += step;
        }

        let target = state.target_position;
        let current = state.transform.position;
        state.transform.position = Vec3::new(
            approach(current.x, target.x, EASING),
            approach(current.y, target.y, EASING),
            approach(current.z, target.z, EASING),
        );

        let target_spin = state.target_rotation;
        state.transform.rotation.z = approach(state.transform.rotation.z, target_spin, EASING);
    }
}

impl PartialEq for Card {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Card {}

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Card")
            .field("id", &self.id())
            .field("visibility", &self.visibility())
            .field("area", &self.area().map(|area| area.id()))
            .finish()
    }
}

impl GameObject for Card {
    fn id(&self) -> ObjectId {
        self.inner.id
    }

    /// Box with border edges; the back faces +z so a face-down card at rest shows it.
    fn visual(&self) -> VisualDesc {
        let props = &self.inner.props;
        VisualDesc {
            geometry: Geometry::Box {
                width: props.width,
                height: props.height,
                depth: props.depth,
            },
            textures: vec![
                props.border.clone(),
                props.border.clone(),
                props.border.clone(),
                props.border.clone(),
                props.back.clone(),
                props.front.clone(),
            ],
        }
    }

    fn transform(&self) -> Transform3D {
        Card::transform(self)
    }

    fn events(&self) -> &EventEmitter {
        &self.inner.events
    }

    fn update(&self) {
        Card::update(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::AreaProps;
    use crate::layout::PlacementStrategy;
    use proptest::prelude::*;

    fn card() -> Card {
        Card::new(CardProps::new(0.6, 1.0, 0.001, "front.jpg", "back.jpg"))
    }

    #[test]
    fn test_new_card_is_face_down_at_origin() {
        let card = card();
        assert_eq!(card.visibility(), Visibility::FaceDown);
        assert_eq!(card.transform(), Transform3D::identity());
        assert!(card.area().is_none());
    }

    #[test]
    fn test_flip_toggles_visibility() {
        let card = card();
        card.flip();
        assert!(card.is_face_up());
        card.flip();
        assert_eq!(card.visibility(), Visibility::FaceDown);
        card.set_visibility(Visibility::FaceUp);
        assert!(card.is_face_up());
    }

    #[test]
    fn test_flip_animation_lands_on_pi_in_eight_frames() {
        let card = card();
        card.flip();

        for _ in 0..7 {
            card.update();
            assert!(card.transform().rotation.y < PI);
        }
        card.update();
        assert_eq!(card.transform().rotation.y, PI);

        card.update();
        assert_eq!(card.transform().rotation.y, PI);
    }

    #[test]
    fn test_flip_back_lands_on_zero() {
        let card = card();
        card.flip();
        for _ in 0..8 {
            card.update();
        }
        card.flip();
        for _ in 0..8 {
            card.update();
        }
        assert_eq!(card.transform().rotation.y, 0.0);
    }

    #[test]
    fn test_flip_reversed_mid_animation_lands_on_zero() {
        let card = card();
        card.flip();
        for _ in 0..3 {
            card.update();
        }
        assert!(card.transform().rotation.y > 0.0);

        card.flip();
        for _ in 0..8 {
            card.update();
        }
        assert_eq!(card.transform().rotation.y, 0.0);
    }

    #[test]
    fn test_spin_eases_to_target() {
        let card = card();
        card.rotate(0.5);

        let mut previous = 0.5;
        for _ in 0..100 {
            card.update();
            let remaining = (0.5 - card.transform().rotation.z).abs();
            assert!(remaining < previous);
            previous = remaining;
        }
        assert!(previous < 1e-4);
        assert_eq!(card.transform().rotation.y, 0.0);
    }

    #[test]
    fn test_self_referencing_handler_does_not_keep_card_alive() {
        let card = card();
        let weak = card.downgrade();
        let this = card.downgrade();
        card.on(EventKind::Click, move |_| {
            if let Some(card) = this.upgrade() {
                card.flip();
            }
        });

        card.dispatch(&GameEvent::Click);
        assert!(card.is_face_up());

        drop(card);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_move_and_rotate_only_set_targets() {
        let card = card();
        card.move_to(Vec3::new(1.0, 2.0, 3.0));
        card.rotate(0.5);

        assert_eq!(card.target_position(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(card.target_rotation(), 0.5);
        assert_eq!(card.transform().position, Vec3::ZERO);

        card.update();
        let position = card.transform().position;
        assert!((position.x - 0.1).abs() < 1e-6);
        assert!((position.y - 0.2).abs() < 1e-6);
        assert!((position.z - 0.3).abs() < 1e-6);
        assert!((card.transform().rotation.z - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_visual_puts_back_on_positive_z() {
        let visual = GameObject::visual(&card());
        assert_eq!(visual.textures.len(), 6);
        assert_eq!(visual.textures[4], "back.jpg");
        assert_eq!(visual.textures[5], "front.jpg");
        assert_eq!(visual.textures[0], DEFAULT_BORDER_TEXTURE);
    }

    #[test]
    fn test_place_on_twice_keeps_single_membership() {
        let area = Area::new(AreaProps::new(1.0, 1.4, "deck.jpg"));
        let card = card();

        card.place_on(&area);
        card.place_on(&area);

        assert_eq!(area.len(), 1);
        assert_eq!(card.area().map(|a| a.id()), Some(area.id()));
    }

    #[test]
    fn test_place_on_moves_between_areas() {
        let deck = Area::new(
            AreaProps::new(1.0, 1.4, "deck.jpg").with_position(Vec3::new(-4.0, -2.5, 0.001)),
        );
        let hand = Area::new(
            AreaProps::new(6.0, 2.0, "hand.jpg")
                .with_position(Vec3::new(0.0, -2.5, 0.001))
                .with_placement(PlacementStrategy::Fan),
        );
        let first = card();
        let second = card();
        first.place_on(&deck);
        second.place_on(&deck);

        first.place_on(&hand);

        assert_eq!(deck.cards(), vec![second.clone()]);
        assert_eq!(hand.cards(), vec![first.clone()]);
        assert_eq!(first.area().map(|a| a.id()), Some(hand.id()));
        // The remaining deck card was restacked at the bottom slot.
        assert!((second.target_position().z - 0.001).abs() < 1e-6);
        assert!((first.target_position() - Vec3::new(0.0, -2.5, 0.001)).length() < 1e-4);
    }

    proptest! {
        #[test]
        fn prop_position_converges_without_overshoot(
            tx in -10.0f32..10.0,
            ty in -10.0f32..10.0,
            tz in -1.0f32..1.0,
        ) {
            let card = card();
            let target = Vec3::new(tx, ty, tz);
            card.move_to(target);

            let mut previous = (target - card.transform().position).abs();
            for _ in 0..200 {
                card.update();
                let remaining = (target - card.transform().position).abs();
                prop_assert!(remaining.x <= previous.x + 1e-6);
                prop_assert!(remaining.y <= previous.y + 1e-6);
                prop_assert!(remaining.z <= previous.z + 1e-6);
                previous = remaining;
            }
            prop_assert!(previous.max_element() < 1e-3);
        }
    }
}
