//! Scripted pilot that stands in for a keyboard.
//!
//! The script is a list of timed commands. Each frame the latest command
//! whose start time has passed is written to the ship's [`FlightInput`].

use bevy_ecs::prelude::*;
use glam::Vec3;
use stellar_flight::{FlightInput, ShipFlightController};
use stellar_sim::SimTime;

/// One step of the script.
#[derive(Clone, Debug, PartialEq)]
pub struct PilotCommand {
    /// Simulated time (seconds) at which this command takes over.
    pub at: f64,
    /// Input held until the next command.
    pub input: FlightInput,
    /// Whether someone is in the pilot seat.
    pub piloting: bool,
}

impl PilotCommand {
    fn flying(at: f64, input: FlightInput) -> Self {
        Self {
            at,
            input,
            piloting: true,
        }
    }
}

/// Timed command list, sorted by start time.
#[derive(Component, Clone, Debug)]
pub struct Autopilot {
    commands: Vec<PilotCommand>,
    current: Option<usize>,
}

impl Autopilot {
    /// Build from commands in any order.
    pub fn new(mut commands: Vec<PilotCommand>) -> Self {
        commands.sort_by(|a, b| a.at.total_cmp(&b.at));
        Self {
            commands,
            current: None,
        }
    }

    /// Take off, turn, cruise, boost, brake, then leave the seat and let
    /// gravity take the ship.
    pub fn demo_flight() -> Self {
        let climb = FlightInput {
            thrust: Vec3::new(0.0, 1.0, 0.0),
            ..FlightInput::default()
        };
        let turn = FlightInput {
            thrust: Vec3::new(0.0, 0.3, 0.6),
            rotation: Vec3::new(0.0, 0.5, 0.2),
            ..FlightInput::default()
        };
        let boost = FlightInput {
            boost: true,
            ..FlightInput::forward(1.0)
        };
        let brake = FlightInput {
            brake: true,
            ..FlightInput::default()
        };

        Self::new(vec![
            PilotCommand::flying(0.0, FlightInput::default()),
            PilotCommand::flying(1.0, climb),
            PilotCommand::flying(4.0, turn),
            PilotCommand::flying(6.0, FlightInput::forward(1.0)),
            PilotCommand::flying(9.0, boost),
            PilotCommand::flying(11.0, brake),
            PilotCommand {
                at: 16.0,
                input: FlightInput::default(),
                piloting: false,
            },
        ])
    }

    /// Index of the command active at `elapsed`.
    pub fn command_index_at(&self, elapsed: f64) -> Option<usize> {
        self.commands.iter().rposition(|c| c.at <= elapsed)
    }

    /// The command active at `elapsed`.
    pub fn command_at(&self, elapsed: f64) -> Option<&PilotCommand> {
        self.command_index_at(elapsed).map(|i| &self.commands[i])
    }
}

/// Writes the active script command into each ship's input.
pub fn autopilot_system(
    time: Res<SimTime>,
    mut ships: Query<(&mut Autopilot, &mut FlightInput, &mut ShipFlightController)>,
) {
    for (mut autopilot, mut input, mut ship) in ships.iter_mut() {
        let index = autopilot.command_index_at(time.elapsed);
        if index == autopilot.current {
            continue;
        }
        autopilot.current = index;

        let Some(command) = index.map(|i| autopilot.commands[i].clone()) else {
            continue;
        };
        tracing::debug!(at = command.at, piloting = command.piloting, input = ?command.input, "autopilot command");
        ship.set_piloting(command.piloting);
        *input = command.input;
    }
}
