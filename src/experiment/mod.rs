//! Experiment design: the searched parameter space and the loop that turns
//! design points into simulation outputs

mod design;
mod space;

pub use design::{apply_point, run_design, Evaluation, GridObjective, Objective, RandomDesign};
pub use space::{
    display_name, DesignPoint, Domain, NamedSpace, OfatVariant, Parameter, ParameterSpace, ACCEL,
    EDGE_LENGTH, EDGE_MAX_SPEED, GRID_SIZE, MAX_SPEED, NUMBER_OF_LANES,
};
