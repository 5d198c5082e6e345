mod model;
mod solver;

pub use self::{
    model::DispatchInput,
    solver::{DispatchSolution, DispatchStep, SolverStatus, solve},
};
