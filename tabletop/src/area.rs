//! Placement zones that own an ordered list of cards and lay them out.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use glam::Vec3;

use crate::card::Card;
use crate::events::{EventEmitter, EventKind, GameEvent, Subscription};
use crate::layout::{self, AreaFrame, CardSize, PlacementStrategy};
use crate::math::Transform3D;
use crate::object::{GameObject, Geometry, ObjectId, VisualDesc};

/// Construction parameters for an area.
#[derive(Clone, Debug, PartialEq)]
pub struct AreaProps {
    pub width: f32,
    pub height: f32,
    pub texture: String,
    pub position: Vec3,
    pub placement: PlacementStrategy,
}

impl AreaProps {
    pub fn new(width: f32, height: f32, texture: impl Into<String>) -> Self {
        Self {
            width,
            height,
            texture: texture.into(),
            position: Vec3::ZERO,
            placement: PlacementStrategy::default(),
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_placement(mut self, placement: PlacementStrategy) -> Self {
        self.placement = placement;
        self
    }
}

pub(crate) struct AreaInner {
    id: ObjectId,
    props: AreaProps,
    members: RefCell<Vec<Card>>,
    events: EventEmitter,
}

/// Shared handle to an area. Clones refer to the same area.
#[derive(Clone)]
pub struct Area {
    inner: Rc<AreaInner>,
}

impl Area {
    pub fn new(props: AreaProps) -> Self {
        Self {
            inner: Rc::new(AreaInner {
                id: ObjectId::next(),
                props,
                members: RefCell::new(Vec::new()),
                events: EventEmitter::new(),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Rc<AreaInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn downgrade(&self) -> Weak<AreaInner> {
        Rc::downgrade(&self.inner)
    }

    pub fn ptr_eq(&self, other: &Area) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn id(&self) -> ObjectId {
        self.inner.id
    }

    pub fn placement(&self) -> PlacementStrategy {
        self.inner.props.placement
    }

    pub fn position(&self) -> Vec3 {
        self.inner.props.position
    }

    /// Footprint as `(width, height)`.
    pub fn size(&self) -> (f32, f32) {
        (self.inner.props.width, self.inner.props.height)
    }

    /// Members in layout order.
    pub fn cards(&self) -> Vec<Card> {
        self.inner.members.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.members.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.members.borrow().is_empty()
    }

    pub fn contains(&self, card: &Card) -> bool {
        self.inner
            .members
            .borrow()
            .iter()
            .any(|member| member.id() == card.id())
    }

    /// Append `card` and lay out every member again.
    ///
    /// A card still owned by another area is taken out of it first; a card
    /// already in this area moves to the end.
    pub fn add(&self, card: &Card) {
        if let Some(owner) = card.area() {
            if !owner.ptr_eq(self) {
                owner.remove(card);
            }
        }

        {
            let mut members = self.inner.members.borrow_mut();
            members.retain(|member| member.id() != card.id());
            members.push(card.clone());
        }
        card.set_area(Some(self));
        self.relayout();
    }

    /// Drop `card` from the members and lay out the rest. Non-members are ignored.
    pub fn remove(&self, card: &Card) {
        self.inner
            .members
            .borrow_mut()
            .retain(|member| member.id() != card.id());

        if card.area().is_some_and(|owner| owner.ptr_eq(self)) {
            card.set_area(None);
        }
        self.relayout();
    }

    /// Reorder the members randomly, going through `remove`/`add`.
    pub fn shuffle(&self, rng: &mut fastrand::Rng) {
        let mut cards = self.cards();
        for card in &cards {
            self.remove(card);
        }
        rng.shuffle(&mut cards);
        for card in &cards {
            self.add(card);
        }
    }

    fn frame(&self) -> AreaFrame {
        AreaFrame {
            position: self.inner.props.position,
            width: self.inner.props.width,
            height: self.inner.props.height,
        }
    }

    /// Recompute and assign target transforms for all current members.
    fn relayout(&self) {
        let members = self.cards();
        let sizes: Vec<CardSize> = members
            .iter()
            .map(|card| CardSize {
                width: card.width(),
                height: card.height(),
            })
            .collect();

        let slots = layout::arrange(self.placement(), &self.frame(), &sizes);
        for (card, slot) in members.iter().zip(slots) {
            card.move_to(slot.position);
            card.rotate(slot.rotation);
        }

        log::debug!(
            "area {} laid out {} cards ({:?})",
            self.id(),
            members.len(),
            self.placement()
        );
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
}

impl PartialEq for Area {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Area {}

impl fmt::Debug for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Area")
            .field("id", &self.id())
            .field("placement", &self.placement())
            .field("members", &self.len())
            .finish()
    }
}

impl GameObject for Area {
    fn id(&self) -> ObjectId {
        self.inner.id
    }

    fn visual(&self) -> VisualDesc {
        VisualDesc {
            geometry: Geometry::Plane {
                width: self.inner.props.width,
                height: self.inner.props.height,
            },
            textures: vec![self.inner.props.texture.clone()],
        }
    }

    fn transform(&self) -> Transform3D {
        Transform3D::from_position(self.inner.props.position)
    }

    fn events(&self) -> &EventEmitter {
        &self.inner.events
    }

    fn update(&self) {}
}
