//! Pointer and touch input normalized to one vocabulary

/// Screen-space pointer position in pixels, origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerPosition {
    pub x: f32,
    pub y: f32,
}

impl PointerPosition {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(PointerPosition),
    Move(PointerPosition),
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

impl PointerEvent {
    /// Map a touch event onto pointer events, tracking only the first touch.
    ///
    /// `touches` are the points still in contact. Start and move events
    /// without one carry nothing to track and yield `None`; an end event
    /// releases only once no contact remains.
    pub fn from_touch(phase: TouchPhase, touches: &[PointerPosition]) -> Option<Self> {
        match phase {
            TouchPhase::Start => touches.first().copied().map(Self::Down),
            TouchPhase::Move => touches.first().copied().map(Self::Move),
            TouchPhase::End => touches.is_empty().then_some(Self::Up),
            TouchPhase::Cancel => Some(Self::Up),
        }
    }
}

/// One contact point of a touch event, as hosts that know touch identities report it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub id: i32,
    pub position: PointerPosition,
}

impl TouchPoint {
    pub fn new(id: i32, position: PointerPosition) -> Self {
        Self { id, position }
    }
}

/// Follows the finger that started a gesture by identity.
///
/// Extra fingers neither move nor release the drag, and the drag keeps
/// following its finger when an earlier contact lifts and the list shifts.
#[derive(Debug, Clone, Default)]
pub struct TouchTracker {
    tracked: Option<i32>,
}

impl TouchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tracked(&self) -> Option<i32> {
        self.tracked
    }

    /// `touches` are the contacts still down, `changed` the ones this event is about
    pub fn event(
        &mut self,
        phase: TouchPhase,
        touches: &[TouchPoint],
        changed: &[TouchPoint],
    ) -> Option<PointerEvent> {
        match (phase, self.tracked) {
            (TouchPhase::Start, None) => {
                let first = touches.first()?;
                self.tracked = Some(first.id);
                Some(PointerEvent::Down(first.position))
            }
            (TouchPhase::Move, Some(id)) => touches
                .iter()
                .find(|touch| touch.id == id)
                .map(|touch| PointerEvent::Move(touch.position)),
            (TouchPhase::End | TouchPhase::Cancel, Some(id)) => {
                if changed.iter().any(|touch| touch.id == id) {
                    self.tracked = None;
                    Some(PointerEvent::Up)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}
