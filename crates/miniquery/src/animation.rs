//! Frame-driven tweens with cancellable handles
//!
//! Every animation operation returns an [`Animation`]. Each animated node
//! gets its own frame loop; each (node, property) pair it writes is a
//! track with a liveness flag. Claiming a pair in the registry kills the
//! track that held it before, so two animations never fight over the same
//! property: the newer one wins and the older one stops writing.

use ahash::AHashMap;
use dom::{FrameId, NodeId, Window};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;
use uuid::Uuid;

use crate::selection::Selection;

/// Registry key used for tweens of the window scroll offset
pub(crate) const WINDOW_SCROLL: &str = "window-scroll";

/// Runs once a node's loop reaches progress 1 (never after cancellation)
pub(crate) type OnComplete = Box<dyn FnOnce(&Window, NodeId)>;

/// One value interpolated from `from` to `to`
#[derive(Debug, Clone)]
pub(crate) enum Tween {
    /// Numeric style property written as `{value}{unit}`
    Style {
        property: String,
        from: f64,
        to: f64,
        unit: String,
    },
    /// Color property written as `rgb(r,g,b)`, channels rounded
    Color {
        property: String,
        from: [u8; 3],
        to: [u8; 3],
    },
    /// Vertical window scroll offset
    WindowScroll { from: f64, to: f64 },
}

impl Tween {
    fn key(&self) -> &str {
        match self {
            Tween::Style { property, .. } | Tween::Color { property, .. } => property,
            Tween::WindowScroll { .. } => WINDOW_SCROLL,
        }
    }

    fn apply(&self, window: &Window, node: NodeId, progress: f64) {
        let lerp = |from: f64, to: f64| from + (to - from) * progress;
        let (property, value) = match self {
            Tween::Style {
                property,
                from,
                to,
                unit,
            } => (property, format!("{}{}", lerp(*from, *to), unit)),
            Tween::Color { property, from, to } => {
                let channel = |i: usize| lerp(from[i] as f64, to[i] as f64).round() as u8;
                (
                    property,
                    format!("rgb({},{},{})", channel(0), channel(1), channel(2)),
                )
            }
            Tween::WindowScroll { from, to } => {
                window.scroll_to(0.0, lerp(*from, *to));
                return;
            }
        };

        let mut document = window.document_mut();
        match document.arena_mut().get_mut(node) {
            Ok(element) => element.set_style_property(property, &value),
            Err(e) => tracing::trace!("Tween target vanished: {}", e),
        }
    }
}

/// Which animation currently owns each (node, property) pair
#[derive(Debug, Default)]
pub(crate) struct AnimationRegistry {
    tracks: AHashMap<(NodeId, String), Rc<Cell<bool>>>,
}

impl AnimationRegistry {
    /// Take ownership of a pair, stopping the track that held it
    pub(crate) fn claim(&mut self, node: NodeId, property: &str) -> Rc<Cell<bool>> {
        let flag = Rc::new(Cell::new(true));
        if let Some(previous) = self
            .tracks
            .insert((node, property.to_string()), Rc::clone(&flag))
        {
            if previous.replace(false) {
                tracing::debug!("Superseding '{}' animation on node {}", property, node);
            }
        }
        flag
    }

    /// Forget a pair if `flag` still owns it
    pub(crate) fn release(&mut self, node: NodeId, property: &str, flag: &Rc<Cell<bool>>) {
        let key = (node, property.to_string());
        if self
            .tracks
            .get(&key)
            .map(|owner| Rc::ptr_eq(owner, flag))
            .unwrap_or(false)
        {
            self.tracks.remove(&key);
        }
    }

    /// Number of pairs currently being animated
    pub(crate) fn active(&self) -> usize {
        self.tracks.values().filter(|flag| flag.get()).count()
    }
}

struct Track {
    node: NodeId,
    property: String,
    alive: Rc<Cell<bool>>,
}

struct AnimationState {
    id: Uuid,
    cancelled: Cell<bool>,
    running: Cell<usize>,
    loops: RefCell<Vec<FrameId>>,
    tracks: RefCell<Vec<Track>>,
}

impl AnimationState {
    fn loop_finished(&self) {
        self.running.set(self.running.get().saturating_sub(1));
    }
}

/// Handle to a running animation
#[derive(Clone)]
pub struct Animation {
    state: Rc<AnimationState>,
    selection: Selection,
}

impl Animation {
    pub(crate) fn new(selection: Selection) -> Self {
        Self {
            state: Rc::new(AnimationState {
                id: Uuid::now_v7(),
                cancelled: Cell::new(false),
                running: Cell::new(0),
                loops: RefCell::new(Vec::new()),
                tracks: RefCell::new(Vec::new()),
            }),
            selection,
        }
    }

    pub fn id(&self) -> Uuid {
        self.state.id
    }

    /// The selection the animation was started on
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Whether any node's loop is still running
    pub fn is_active(&self) -> bool {
        !self.state.cancelled.get() && self.state.running.get() > 0
    }

    /// Stop every loop now, leaving styles at their last written value
    pub fn cancel(&self) {
        if self.state.cancelled.replace(true) {
            return;
        }
        let window = self.selection.window();
        for id in self.state.loops.borrow_mut().drain(..) {
            window.cancel_animation_frame(id);
        }
        let context = self.selection.context();
        let mut registry = context.animations.borrow_mut();
        for track in self.state.tracks.borrow_mut().drain(..) {
            track.alive.set(false);
            registry.release(track.node, &track.property, &track.alive);
        }
        self.state.running.set(0);
        tracing::debug!("Cancelled animation {}", self.state.id);
    }

    /// Start one node's loop. Progress is `(now - start) / duration`
    /// clamped to `[0, 1]`; the loop ends on the frame that reaches 1.
    pub(crate) fn run(
        &self,
        node: NodeId,
        tweens: Vec<Tween>,
        duration: Duration,
        on_complete: Option<OnComplete>,
    ) {
        if tweens.is_empty() || self.state.cancelled.get() {
            return;
        }
        let window = self.selection.window().clone();
        let context = Rc::clone(self.selection.context());

        let tracks: Vec<(Tween, Rc<Cell<bool>>)> = {
            let mut registry = context.animations.borrow_mut();
            let mut owned = self.state.tracks.borrow_mut();
            tweens
                .into_iter()
                .map(|tween| {
                    let alive = registry.claim(node, tween.key());
                    owned.push(Track {
                        node,
                        property: tween.key().to_string(),
                        alive: Rc::clone(&alive),
                    });
                    (tween, alive)
                })
                .collect()
        };

        let start = window.now();
        let duration_ms = duration.as_secs_f64() * 1000.0;
        let state = Rc::clone(&self.state);
        let loop_window = window.clone();
        let mut on_complete = on_complete;

        self.state.running.set(self.state.running.get() + 1);
        let frame_id = window.start_frame_loop(move |now| {
            let progress = if duration_ms <= 0.0 {
                1.0
            } else {
                ((now - start) / duration_ms).clamp(0.0, 1.0)
            };

            let mut live = 0;
            for (tween, alive) in &tracks {
                if alive.get() {
                    tween.apply(&loop_window, node, progress);
                    live += 1;
                }
            }
            if live == 0 {
                state.loop_finished();
                return false;
            }
            tracing::trace!("Animation {} node {} at {:.3}", state.id, node, progress);
            if progress < 1.0 {
                return true;
            }

            {
                let mut registry = context.animations.borrow_mut();
                for (tween, alive) in &tracks {
                    registry.release(node, tween.key(), alive);
                    alive.set(false);
                }
            }
            state.loop_finished();
            if let Some(done) = on_complete.take() {
                done(&loop_window, node);
            }
            false
        });
        self.state.loops.borrow_mut().push(frame_id);
    }
}

impl std::fmt::Debug for Animation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Animation")
            .field("id", &self.state.id)
            .field("active", &self.is_active())
            .field("nodes", &self.selection.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_supersedes_previous_owner() {
        let mut registry = AnimationRegistry::default();
        let first = registry.claim(7, "opacity");
        let second = registry.claim(7, "opacity");
        let other = registry.claim(7, "width");

        assert!(!first.get());
        assert!(second.get() && other.get());
        assert_eq!(registry.active(), 2);

        registry.release(7, "opacity", &first);
        assert_eq!(registry.active(), 2);
        registry.release(7, "opacity", &second);
        assert_eq!(registry.active(), 1);
    }
}
