use std::time::Duration;

use good_lp::{
    ResolutionError,
    Solution,
    SolutionStatus,
    SolverModel,
    WithTimeLimit,
    solvers::highs::highs,
    variables,
};
use itertools::izip;

use crate::{
    error::Error,
    optimizer::model::{DispatchInput, Formulation},
    prelude::*,
};

/// Solver outcome, reduced to what the pipeline branches on.
#[derive(Clone, Debug, PartialEq, Eq, derive_more::Display)]
pub enum SolverStatus {
    #[display("optimal")]
    Optimal,

    /// An incumbent within the time limit, short of proven optimality.
    #[display("feasible")]
    Feasible,

    #[display("infeasible")]
    Infeasible,

    #[display("solver error: {_0}")]
    Error(String),
}

/// Extracted values of one horizon step, in kilowatts.
#[derive(Clone, Copy, Debug)]
pub struct DispatchStep {
    pub battery: f64,
    pub charge: f64,
    pub discharge: f64,
    pub grid_import: f64,
    pub grid_export: f64,
    pub soc_percent: f64,
    /// Net prosumption at the point of common coupling: load + PV + battery.
    pub prosumption: f64,
}

#[derive(Clone, Debug)]
pub struct DispatchSolution {
    pub status: SolverStatus,
    pub steps: Vec<DispatchStep>,
}

impl DispatchSolution {
    pub fn prosumption(&self) -> impl Iterator<Item = f64> + '_ {
        self.steps.iter().map(|step| step.prosumption)
    }

    pub fn trace(&self) {
        for (index, step) in self.steps.iter().enumerate() {
            debug!(
                index,
                battery = step.battery,
                grid_import = step.grid_import,
                grid_export = step.grid_export,
                soc_percent = step.soc_percent,
                prosumption = step.prosumption,
                "dispatch step",
            );
        }
    }
}

/// Validate, formulate and solve the dispatch problem within the given
/// wall-clock budget, then extract the per-step schedule quantities.
///
/// Exceeding the budget is reported by the solver as a termination
/// condition; nothing cancels the call externally.
#[instrument(skip_all, fields(n_steps = input.len(), time_limit = ?time_limit))]
pub fn solve(input: &DispatchInput<'_>, time_limit: Duration) -> Result<DispatchSolution, Error> {
    input.validate()?;

    let mut vars = variables!();
    let Formulation { objective, constraints, steps } = input.formulate(&mut vars);
    let mut model = vars.minimise(objective).using(highs).with_time_limit(time_limit.as_secs_f64());
    for constraint in constraints {
        model = model.with(constraint);
    }

    let solution = match model.solve() {
        Ok(solution) => solution,
        Err(ResolutionError::Infeasible) => {
            return Err(Error::Solver(SolverStatus::Infeasible));
        }
        Err(error) => return Err(Error::Solver(SolverStatus::Error(error.to_string()))),
    };

    let status = map_status(solution.status());
    let steps = izip!(&steps, input.load, input.pv)
        .map(|(variables, load, pv)| {
            let battery = solution.value(variables.battery);
            DispatchStep {
                battery,
                charge: solution.value(variables.charge),
                discharge: solution.value(variables.discharge),
                grid_import: solution.value(variables.grid_import),
                grid_export: solution.value(variables.grid_export),
                soc_percent: solution.value(variables.soc),
                prosumption: load + pv + battery,
            }
        })
        .collect();
    info!(n_steps = input.len(), %status, "Solved");
    Ok(DispatchSolution { status, steps })
}

/// A limit-terminated incumbent is usable but must not be reported as a
/// proven optimum.
const fn map_status(status: SolutionStatus) -> SolverStatus {
    match status {
        SolutionStatus::Optimal => SolverStatus::Optimal,
        SolutionStatus::TimeLimit | SolutionStatus::GapLimit => SolverStatus::Feasible,
    }
}
