pub mod controller;

pub use controller::{
    AdaptiveController, ControlThresholds, ControllerStatus, DEFAULT_AVERAGING_WINDOW,
};
