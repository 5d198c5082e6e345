//! MILP formulation of the battery + grid dispatch problem.
//!
//! The charge/discharge and import/export pairs are physically exclusive,
//! so each pair carries true binary indicator variables. Relaxing them to
//! continuous would let the solver split power across both directions of a
//! pair at once and the cost objective would no longer mean anything.

use bon::Builder;
use chrono::TimeDelta;
use good_lp::{Constraint, Expression, ProblemVariables, Variable, constraint, variable};

use crate::{
    cli::{BatteryArgs, PccArgs},
    error::Error,
    units::Kilowatts,
};

/// Aligned per-step inputs and scalar parameters of one dispatch horizon.
///
/// `load`, `pv` and `prices` must be of equal length and aligned 1:1 with
/// the horizon grid; powers are kilowatts, prices per kilowatt-hour.
#[derive(Builder)]
pub struct DispatchInput<'a> {
    pub(crate) load: &'a [f64],
    pub(crate) pv: &'a [f64],
    pub(crate) prices: &'a [f64],
    pub(crate) step: TimeDelta,
    pub(crate) power_limit: Kilowatts,
    pub(crate) battery: BatteryArgs,
    pub(crate) pcc: PccArgs,
}

/// Decision variables of one horizon step.
pub(crate) struct StepVariables {
    pub charge: Variable,
    pub discharge: Variable,
    pub charging: Variable,
    pub discharging: Variable,
    pub grid_import: Variable,
    pub grid_export: Variable,
    pub importing: Variable,
    pub exporting: Variable,
    pub battery: Variable,
    pub soc: Variable,
}

pub(crate) struct Formulation {
    pub objective: Expression,
    pub constraints: Vec<Constraint>,
    pub steps: Vec<StepVariables>,
}

impl DispatchInput<'_> {
    pub(crate) fn len(&self) -> usize {
        self.load.len()
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        let validation = |message: &str| Err(Error::Validation(message.to_string()));
        if self.load.is_empty() {
            return validation("the dispatch horizon is empty");
        }
        if self.pv.len() != self.load.len() || self.prices.len() != self.load.len() {
            return validation("load, PV and price series must be of equal length");
        }
        if self.step <= TimeDelta::zero() {
            return validation("the grid step must be positive");
        }
        if self.battery.capacity.0 <= 0.0 {
            return validation("the battery capacity must be positive");
        }
        if self.power_limit.0 <= 0.0 {
            return validation("the battery power limit must be positive");
        }
        if self.battery.efficiency <= 0.0 || self.battery.efficiency > 1.0 {
            return validation("the battery efficiency must be within (0, 1]");
        }
        for soc in [self.battery.initial_soc_percent, self.battery.target_soc_percent] {
            if !(0.0..=100.0).contains(&soc) {
                return validation("the state of charge must be within [0, 100] percent");
            }
        }
        if self.pcc.import_limit.0 < 0.0 || self.pcc.export_limit.0 < 0.0 {
            return validation("the import and export limits must be non-negative");
        }
        Ok(())
    }

    /// Build the variables, constraints and objective over the horizon.
    ///
    /// Call [`DispatchInput::validate`] first: the formulation indexes the
    /// input slices and divides by the capacity.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn formulate(&self, vars: &mut ProblemVariables) -> Formulation {
        let pmax = self.power_limit.0;
        let import_limit = self.pcc.import_limit.0;
        let export_limit = self.pcc.export_limit.0;
        let step_hours = self.step.num_seconds() as f64 / 3600.0;
        // A kilowatt over one step moves this many SoC percent points.
        let soc_per_kilowatt = step_hours / self.battery.capacity.0 * 100.0;

        let steps: Vec<StepVariables> = (0..self.len())
            .map(|_| StepVariables {
                charge: vars.add(variable().min(0.0).max(pmax)),
                discharge: vars.add(variable().min(0.0).max(pmax)),
                charging: vars.add(variable().binary()),
                discharging: vars.add(variable().binary()),
                grid_import: vars.add(variable().min(0.0).max(import_limit)),
                grid_export: vars.add(variable().min(0.0).max(export_limit)),
                importing: vars.add(variable().binary()),
                exporting: vars.add(variable().binary()),
                battery: vars.add(variable().min(-pmax).max(pmax)),
                soc: vars.add(variable().min(0.0).max(100.0)),
            })
            .collect();

        let mut constraints = Vec::with_capacity(10 * steps.len() + 1);
        let mut objective = Expression::from(0.0);
        for (t, step) in steps.iter().enumerate() {
            // Mutual exclusion of the physically opposed directions.
            constraints.push(constraint!(step.charging + step.discharging <= 1.0));
            constraints.push(constraint!(step.importing + step.exporting <= 1.0));
            constraints.push(constraint!(step.charge <= pmax * step.charging));
            constraints.push(constraint!(step.discharge <= pmax * step.discharging));
            constraints.push(constraint!(step.grid_import <= import_limit * step.importing));
            constraints.push(constraint!(step.grid_export <= export_limit * step.exporting));
            constraints.push(constraint!(step.battery == step.charge - step.discharge));

            // Energy balance at the point of common coupling.
            constraints.push(constraint!(
                step.grid_import - step.grid_export == self.load[t] + self.pv[t] + step.battery
            ));

            if t == 0 {
                constraints
                    .push(constraint!(step.soc == self.battery.initial_soc_percent));
            } else {
                let previous = &steps[t - 1];
                constraints.push(constraint!(
                    step.soc == previous.soc + previous.battery * soc_per_kilowatt
                ));
            }

            objective += step.grid_import * (step_hours * (self.prices[t] + self.pcc.grid_tariff));
            objective += step.grid_export * (-step_hours * self.prices[t]);
            objective += step.charge * (step_hours * self.pcc.degradation_cost);
        }

        // The battery must hand the target state of charge to the next cycle.
        let last = &steps[steps.len() - 1];
        constraints.push(constraint!(
            last.soc + last.battery * soc_per_kilowatt == self.battery.target_soc_percent
        ));

        Formulation { objective, constraints, steps }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn battery() -> BatteryArgs {
        BatteryArgs {
            capacity: 10.0.into(),
            efficiency: 0.95,
            initial_soc_percent: 50.0,
            target_soc_percent: 50.0,
        }
    }

    pub(crate) fn pcc() -> PccArgs {
        PccArgs {
            import_limit: Kilowatts(100.0),
            export_limit: Kilowatts(100.0),
            grid_tariff: 0.05,
            degradation_cost: 0.05,
        }
    }

    fn input<'a>(load: &'a [f64], pv: &'a [f64], prices: &'a [f64]) -> DispatchInput<'a> {
        DispatchInput::builder()
            .load(load)
            .pv(pv)
            .prices(prices)
            .step(TimeDelta::seconds(900))
            .power_limit(Kilowatts(5.0))
            .battery(battery())
            .pcc(pcc())
            .build()
    }

    #[test]
    fn accepts_a_well_formed_horizon() {
        assert!(input(&[1.0, 1.0], &[0.0, 0.0], &[0.1, 0.1]).validate().is_ok());
    }

    #[test]
    fn rejects_an_empty_horizon() {
        let result = input(&[], &[], &[]).validate();
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn rejects_mismatched_series_lengths() {
        let result = input(&[1.0, 1.0], &[0.0], &[0.1, 0.1]).validate();
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn rejects_a_non_positive_power_limit() {
        let mut input = input(&[1.0], &[0.0], &[0.1]);
        input.power_limit = Kilowatts(0.0);
        assert!(matches!(input.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn rejects_an_out_of_range_efficiency() {
        for efficiency in [0.0, -0.1, 1.01] {
            let mut input = input(&[1.0], &[0.0], &[0.1]);
            input.battery.efficiency = efficiency;
            assert!(matches!(input.validate(), Err(Error::Validation(_))));
        }
    }

    #[test]
    fn rejects_an_out_of_range_state_of_charge() {
        let mut input = input(&[1.0], &[0.0], &[0.1]);
        input.battery.target_soc_percent = 150.0;
        assert!(matches!(input.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn formulates_the_expected_constraint_count() {
        let input = input(&[1.0, 1.0], &[0.0, 0.0], &[0.1, 0.1]);
        input.validate().unwrap();
        let mut vars = good_lp::variables!();
        let formulation = input.formulate(&mut vars);
        assert_eq!(formulation.steps.len(), 2);
        // 9 per-step constraints plus the terminal state-of-charge one.
        assert_eq!(formulation.constraints.len(), 2 * 9 + 1);
    }
}
