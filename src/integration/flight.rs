//! Flight-command interface consumed by the tracker's callers.
//!
//! Translating a [`TrackingResult`](crate::TrackingResult) into commands is
//! left to the caller; this module only fixes the command vocabulary and a
//! way to replay fixed command sequences.

use std::convert::Infallible;
use std::fmt;

use log::info;

/// Horizontal movement direction relative to the drone's heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    Forward,
    Back,
}

impl Direction {
    fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Forward => "forward",
            Direction::Back => "back",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Clockwise,
    CounterClockwise,
}

/// A discrete drone command.
///
/// `Display` renders the plain-text form used by common consumer drone SDKs
/// (`takeoff`, `left 100`, `ccw 90`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightCommand {
    TakeOff,
    Land,
    Move { direction: Direction, distance_cm: u32 },
    Rotate { rotation: Rotation, degrees: u32 },
}

impl fmt::Display for FlightCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlightCommand::TakeOff => write!(f, "takeoff"),
            FlightCommand::Land => write!(f, "land"),
            FlightCommand::Move {
                direction,
                distance_cm,
            } => write!(f, "{} {}", direction.as_str(), distance_cm),
            FlightCommand::Rotate { rotation, degrees } => {
                let name = match rotation {
                    Rotation::Clockwise => "cw",
                    Rotation::CounterClockwise => "ccw",
                };
                write!(f, "{} {}", name, degrees)
            }
        }
    }
}

/// Trait for drone flight controllers.
pub trait FlightController {
    /// Error type for command failures.
    type Error;

    /// Execute one command, blocking until the drone acknowledges it.
    fn execute(&mut self, command: FlightCommand) -> Result<(), Self::Error>;
}

/// Ordered list of commands executed one after another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mission {
    commands: Vec<FlightCommand>,
}

impl Mission {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command.
    pub fn then(mut self, command: FlightCommand) -> Self {
        self.commands.push(command);
        self
    }

    /// Take off, slide left, turn 90° counterclockwise, go forward and land.
    pub fn demo(distance_cm: u32) -> Self {
        Self::new()
            .then(FlightCommand::TakeOff)
            .then(FlightCommand::Move {
                direction: Direction::Left,
                distance_cm,
            })
            .then(FlightCommand::Rotate {
                rotation: Rotation::CounterClockwise,
                degrees: 90,
            })
            .then(FlightCommand::Move {
                direction: Direction::Forward,
                distance_cm,
            })
            .then(FlightCommand::Land)
    }

    pub fn commands(&self) -> &[FlightCommand] {
        &self.commands
    }

    /// Execute every command in order, stopping at the first failure.
    ///
    /// Returns the number of commands executed.
    pub fn run<C: FlightController>(&self, controller: &mut C) -> Result<usize, C::Error> {
        for command in &self.commands {
            controller.execute(*command)?;
        }
        Ok(self.commands.len())
    }
}

/// Controller that only logs and records commands; for dry runs.
#[derive(Debug, Clone, Default)]
pub struct RecordingController {
    executed: Vec<FlightCommand>,
}

impl RecordingController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn executed(&self) -> &[FlightCommand] {
        &self.executed
    }
}

impl FlightController for RecordingController {
    type Error = Infallible;

    fn execute(&mut self, command: FlightCommand) -> Result<(), Self::Error> {
        info!("flight command: {}", command);
        self.executed.push(command);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_text() {
        assert_eq!(FlightCommand::TakeOff.to_string(), "takeoff");
        assert_eq!(
            FlightCommand::Move {
                direction: Direction::Left,
                distance_cm: 100
            }
            .to_string(),
            "left 100"
        );
        assert_eq!(
            FlightCommand::Rotate {
                rotation: Rotation::CounterClockwise,
                degrees: 90
            }
            .to_string(),
            "ccw 90"
        );
    }

    #[test]
    fn test_demo_mission_runs_in_order() {
        let mut controller = RecordingController::new();
        let executed = Mission::demo(100).run(&mut controller).unwrap();
        assert_eq!(executed, 5);
        let text: Vec<String> = controller.executed().iter().map(|c| c.to_string()).collect();
        assert_eq!(text, ["takeoff", "left 100", "ccw 90", "forward 100", "land"]);
    }

    struct FlakyController {
        budget: usize,
    }

    impl FlightController for FlakyController {
        type Error = &'static str;

        fn execute(&mut self, _command: FlightCommand) -> Result<(), Self::Error> {
            if self.budget == 0 {
                return Err("no acknowledgement");
            }
            self.budget -= 1;
            Ok(())
        }
    }

    #[test]
    fn test_mission_stops_at_first_error() {
        let mut controller = FlakyController { budget: 2 };
        assert_eq!(Mission::demo(50).run(&mut controller), Err("no acknowledgement"));
        assert_eq!(controller.budget, 0);
    }
}
