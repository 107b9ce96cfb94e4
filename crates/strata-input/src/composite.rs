//! Composite gesture state machines.
//!
//! An axis combines a negative and a positive action into one signed value.
//! A vector combines a horizontal and a vertical axis. Both report a
//! start/update/end lifecycle:
//!
//! - start fires once when the first underlying action becomes active
//! - update fires whenever the combined value changes
//! - end fires once when the last underlying action releases
//!
//! The types here are pure state; the router attaches callbacks.

use strata_core::math::{Vec2, approx_eq, approx_eq_vec2};

/// Lifecycle stage a composite callback subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositeState {
    Start,
    Update,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisSide {
    Negative,
    Positive,
}

/// Component of a vector gesture. Vertical positive is up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VectorAxis {
    Horizontal,
    Vertical,
}

/// What an axis did in response to one press or release.
///
/// When several flags are set they apply in the order start, update, end.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AxisTransition {
    pub started: bool,
    pub updated: bool,
    pub ended: bool,
    /// Axis value after the transition.
    pub value: f32,
}

impl AxisTransition {
    pub fn is_empty(&self) -> bool {
        !(self.started || self.updated || self.ended)
    }
}

#[derive(Debug, Clone)]
pub struct AxisState {
    negative_pressed: bool,
    positive_pressed: bool,
    negative: f32,
    positive: f32,
    last_reported: f32,
}

impl Default for AxisState {
    fn default() -> Self {
        Self::new()
    }
}

impl AxisState {
    pub fn new() -> Self {
        Self {
            negative_pressed: false,
            positive_pressed: false,
            negative: 0.0,
            positive: 0.0,
            last_reported: f32::NAN,
        }
    }

    /// `positive magnitude - negative magnitude`.
    pub fn value(&self) -> f32 {
        self.positive - self.negative
    }

    pub fn is_active(&self) -> bool {
        self.negative_pressed || self.positive_pressed
    }

    pub fn is_pressed(&self, side: AxisSide) -> bool {
        match side {
            AxisSide::Negative => self.negative_pressed,
            AxisSide::Positive => self.positive_pressed,
        }
    }

    pub fn handle(&mut self, side: AxisSide, pressed: bool, magnitude: f32) -> AxisTransition {
        if pressed {
            self.press(side, magnitude)
        } else {
            self.release(side)
        }
    }

    /// Presses `side` with `magnitude`. Pressing a held side again only
    /// updates its magnitude.
    pub fn press(&mut self, side: AxisSide, magnitude: f32) -> AxisTransition {
        let was_active = self.is_active();
        let (flag, slot) = self.side_mut(side);
        *flag = true;
        *slot = magnitude;
        AxisTransition {
            started: !was_active,
            updated: self.report(),
            ended: false,
            value: self.value(),
        }
    }

    /// Releases `side`. Releasing a side that is not held is ignored.
    pub fn release(&mut self, side: AxisSide) -> AxisTransition {
        if !self.is_pressed(side) {
            return AxisTransition {
                value: self.value(),
                ..AxisTransition::default()
            };
        }
        let (flag, slot) = self.side_mut(side);
        *flag = false;
        *slot = 0.0;
        AxisTransition {
            started: false,
            updated: self.report(),
            ended: !self.is_active(),
            value: self.value(),
        }
    }

    /// Clears pressed state without reporting anything.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn side_mut(&mut self, side: AxisSide) -> (&mut bool, &mut f32) {
        match side {
            AxisSide::Negative => (&mut self.negative_pressed, &mut self.negative),
            AxisSide::Positive => (&mut self.positive_pressed, &mut self.positive),
        }
    }

    fn report(&mut self) -> bool {
        let value = self.value();
        if approx_eq(value, self.last_reported) {
            return false;
        }
        self.last_reported = value;
        true
    }
}

/// What a vector did in response to one underlying press or release.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VectorTransition {
    pub started: bool,
    pub updated: bool,
    pub ended: bool,
    pub value: Vec2,
}

#[derive(Debug, Clone)]
pub struct VectorState {
    horizontal: AxisState,
    vertical: AxisState,
    last_reported: Vec2,
}

impl Default for VectorState {
    fn default() -> Self {
        Self::new()
    }
}

impl VectorState {
    pub fn new() -> Self {
        Self {
            horizontal: AxisState::new(),
            vertical: AxisState::new(),
            last_reported: Vec2::NAN,
        }
    }

    pub fn value(&self) -> Vec2 {
        Vec2::new(self.horizontal.value(), self.vertical.value())
    }

    pub fn is_active(&self) -> bool {
        self.horizontal.is_active() || self.vertical.is_active()
    }

    pub fn handle(
        &mut self,
        axis: VectorAxis,
        side: AxisSide,
        pressed: bool,
        magnitude: f32,
    ) -> VectorTransition {
        let (target, other) = match axis {
            VectorAxis::Horizontal => (&mut self.horizontal, &self.vertical),
            VectorAxis::Vertical => (&mut self.vertical, &self.horizontal),
        };
        let other_active = other.is_active();
        let inner = target.handle(side, pressed, magnitude);

        let updated = !inner.is_empty() && self.report();
        VectorTransition {
            started: inner.started && !other_active,
            updated,
            ended: inner.ended && !other_active,
            value: self.value(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn report(&mut self) -> bool {
        let value = self.value();
        if approx_eq_vec2(value, self.last_reported) {
            return false;
        }
        self.last_reported = value;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_single_side() {
        let mut axis = AxisState::new();
        let t = axis.press(AxisSide::Positive, 1.0);
        assert!(t.started && t.updated && !t.ended);
        assert_eq!(t.value, 1.0);

        let t = axis.release(AxisSide::Positive);
        assert!(!t.started && t.updated && t.ended);
        assert_eq!(t.value, 0.0);
    }

    #[test]
    fn test_axis_overlapping_sides() {
        let mut axis = AxisState::new();
        let steps = [
            axis.press(AxisSide::Negative, 1.0),
            axis.press(AxisSide::Positive, 1.0),
            axis.release(AxisSide::Negative),
            axis.release(AxisSide::Positive),
        ];

        let starts = steps.iter().filter(|t| t.started).count();
        let ends = steps.iter().filter(|t| t.ended).count();
        let updates: Vec<f32> = steps.iter().filter(|t| t.updated).map(|t| t.value).collect();

        assert_eq!(starts, 1);
        assert!(steps[0].started);
        assert_eq!(ends, 1);
        assert!(steps[3].ended);
        assert_eq!(updates, vec![-1.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_axis_repeat_press_does_not_restart() {
        let mut axis = AxisState::new();
        axis.press(AxisSide::Positive, 0.6);
        let t = axis.press(AxisSide::Positive, 0.6);
        assert!(t.is_empty());
        let t = axis.press(AxisSide::Positive, 0.9);
        assert!(!t.started && t.updated);
    }

    #[test]
    fn test_axis_release_unpressed_side_is_ignored() {
        let mut axis = AxisState::new();
        assert!(axis.release(AxisSide::Negative).is_empty());
        axis.press(AxisSide::Positive, 1.0);
        assert!(axis.release(AxisSide::Negative).is_empty());
        assert!(axis.is_active());
    }

    #[test]
    fn test_vector_start_and_end_once() {
        use AxisSide::*;
        use VectorAxis::*;

        let mut vector = VectorState::new();
        let t = vector.handle(Vertical, Positive, true, 1.0);
        assert!(t.started && t.updated);
        assert_eq!(t.value, Vec2::new(0.0, 1.0));

        let t = vector.handle(Horizontal, Positive, true, 1.0);
        assert!(!t.started);
        assert_eq!(t.value, Vec2::new(1.0, 1.0));

        let t = vector.handle(Vertical, Positive, false, 0.0);
        assert!(!t.ended && t.updated);
        assert_eq!(t.value, Vec2::new(1.0, 0.0));

        let t = vector.handle(Horizontal, Positive, false, 0.0);
        assert!(t.ended && t.updated);
        assert_eq!(t.value, Vec2::ZERO);
        assert!(!vector.is_active());
    }
}
