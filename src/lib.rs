pub mod app;
pub mod autosum;
pub mod camera;
pub mod camera3d;
pub mod camera_rig;
pub mod cell;
pub mod cli;
pub mod config;
pub mod controller;
pub mod edit;
pub mod formatting;
pub mod grid;
pub mod hyper;
pub mod input;
pub mod navigation;
pub mod persistence;
pub mod picking;
pub mod placement;
pub mod quantum;
pub mod renderer;
pub mod selection;
pub mod time;

pub use app::{run, run_with_overrides, App};
pub use controller::SheetController;

pub(crate) fn wrap_angle(mut radians: f32) -> f32 {
    let two_pi = 2.0 * std::f32::consts::PI;
    while radians > std::f32::consts::PI {
        radians -= two_pi;
    }
    while radians < -std::f32::consts::PI {
        radians += two_pi;
    }
    radians
}
