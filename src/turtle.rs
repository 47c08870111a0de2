//! The turtle interpreter turns a program string into line segments.

use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_3;

use crate::types::{Point, Segment, Symbol};

/// Cursor state while a program is being interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TurtleState {
    pub position: Point,
    /// Heading in radians; 0 points along the positive x axis.
    pub heading: f64,
}

impl TurtleState {
    fn forward(&self, distance: f64) -> Point {
        Point::new(
            self.position.x + self.heading.cos() * distance,
            self.position.y + self.heading.sin() * distance,
        )
    }
}

/// Interprets programs with a fixed step length and turn angle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Turtle {
    step_length: f64,
    turn_angle: f64,
}

impl Default for Turtle {
    fn default() -> Self {
        Self::new(10.0, FRAC_PI_3)
    }
}

impl Turtle {
    /// Creates a turtle. `turn_angle` is in radians.
    pub fn new(step_length: f64, turn_angle: f64) -> Self {
        Self {
            step_length,
            turn_angle,
        }
    }

    pub fn step_length(&self) -> f64 {
        self.step_length
    }

    pub fn turn_angle(&self) -> f64 {
        self.turn_angle
    }

    /// Returns the segments drawn by `program`, in traversal order.
    pub fn interpret(&self, program: &str) -> Vec<Segment> {
        self.trace(program).0
    }

    /// Interprets `program` from a fresh state at the origin, heading 0, and returns the
    /// drawn segments along with the final cursor state.
    pub fn trace(&self, program: &str) -> (Vec<Segment>, TurtleState) {
        let mut state = TurtleState::default();
        let mut segments = Vec::new();

        for symbol in program.chars().filter_map(Symbol::from_char) {
            match symbol {
                Symbol::Draw => {
                    let end = state.forward(self.step_length);
                    segments.push(Segment {
                        start: state.position,
                        end,
                    });
                    state.position = end;
                }
                Symbol::Move => state.position = state.forward(self.step_length),
                Symbol::Left => state.heading += self.turn_angle,
                Symbol::Right => state.heading -= self.turn_angle,
                Symbol::Inert(_) => {}
            }
        }

        (segments, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn assert_point(actual: Point, x: f64, y: f64) {
        assert!(
            (actual.x - x).abs() < EPSILON && (actual.y - y).abs() < EPSILON,
            "expected ({x}, {y}), got ({}, {})",
            actual.x,
            actual.y
        );
    }

    #[test]
    fn test_single_draw() {
        let segments = Turtle::default().interpret("f");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start, Point::new(0.0, 0.0));
        assert_eq!(segments[0].end, Point::new(10.0, 0.0));
    }

    #[test]
    fn test_draw_turn_draw() {
        let segments = Turtle::default().interpret("f+f");
        assert_eq!(segments.len(), 2);
        assert_point(segments[0].start, 0.0, 0.0);
        assert_point(segments[0].end, 10.0, 0.0);
        assert_point(segments[1].start, 10.0, 0.0);
        assert_point(segments[1].end, 15.0, 8.660254037844386);
    }

    #[test]
    fn test_right_turn() {
        let segments = Turtle::default().interpret("-f");
        assert_point(segments[0].end, 5.0, -8.660254037844386);
    }

    #[test]
    fn test_move_does_not_draw() {
        let segments = Turtle::default().interpret("gf");
        assert_eq!(segments.len(), 1);
        assert_point(segments[0].start, 10.0, 0.0);
        assert_point(segments[0].end, 20.0, 0.0);
    }

    #[test]
    fn test_inert_symbols_draw_nothing() {
        let (segments, state) = Turtle::default().trace("xyyxxy");
        assert!(segments.is_empty());
        assert_eq!(state, TurtleState::default());
    }

    #[test]
    fn test_unknown_characters_are_ignored() {
        let segments = Turtle::default().interpret("f?f");
        assert_eq!(segments.len(), 2);
    }

    #[test]
    fn test_interpret_is_pure() {
        let turtle = Turtle::default();
        let program = "f+f--ff+g-fxy";
        assert_eq!(turtle.interpret(program), turtle.interpret(program));
    }

    #[test]
    fn test_trace_reports_final_state() {
        let (_, state) = Turtle::new(1.0, std::f64::consts::FRAC_PI_2).trace("f+f+");
        assert_point(state.position, 1.0, 1.0);
        assert!((state.heading - std::f64::consts::PI).abs() < EPSILON);
    }

    #[test]
    fn test_hexagon_closes() {
        let segments = Turtle::default().interpret("f+f+f+f+f+f+");
        assert_eq!(segments.len(), 6);
        assert_point(segments[5].end, 0.0, 0.0);
    }
}
