use std::time::Duration;

use chrono::TimeDelta;
use clap::Parser;
use reqwest::Url;

use crate::{
    prelude::*,
    units::{KilowattHours, Kilowatts},
};

#[derive(Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Do not publish the final schedule (dry run).
    #[clap(long)]
    pub scout: bool,

    #[clap(flatten)]
    pub api: ApiArgs,

    #[clap(flatten)]
    pub datapoints: DatapointArgs,

    #[clap(flatten)]
    pub horizon: HorizonArgs,

    #[clap(flatten)]
    pub battery: BatteryArgs,

    #[clap(flatten)]
    pub pcc: PccArgs,

    #[clap(flatten)]
    pub solver: SolverArgs,
}

#[derive(Parser)]
pub struct ApiArgs {
    /// Datapoint service base URL. For example: `http://localhost:8080/api`.
    #[clap(long = "api-base-url", env = "API_BASE_URL")]
    pub base_url: Url,

    /// Datapoint service access token.
    #[clap(long = "api-token", env = "API_TOKEN")]
    pub token: String,
}

/// Identifiers of the datapoints the scheduler reads from and writes to.
#[derive(Parser)]
pub struct DatapointArgs {
    /// Photovoltaic production forecast.
    #[clap(long = "production-datapoint", env = "PRODUCTION_DATAPOINT")]
    pub production: String,

    /// Site consumption forecast.
    #[clap(long = "consumption-datapoint", env = "CONSUMPTION_DATAPOINT")]
    pub consumption: String,

    /// Day-ahead energy price forecast.
    #[clap(long = "price-datapoint", env = "PRICE_DATAPOINT")]
    pub price: String,

    /// Battery power setpoint; its last reading caps the dispatch power.
    #[clap(long = "battery-power-datapoint", env = "BATTERY_POWER_DATAPOINT")]
    pub battery_power: String,

    /// Target datapoint the dispatch schedule is published to.
    #[clap(long = "result-datapoint", env = "RESULT_DATAPOINT")]
    pub result: String,
}

#[derive(Copy, Clone, Parser)]
pub struct HorizonArgs {
    /// Scheduling grid step in seconds.
    #[clap(long = "interval-seconds", default_value = "900", env = "INTERVAL_SECONDS")]
    pub interval_seconds: i64,

    /// Shortest forecast overlap worth scheduling, in seconds.
    #[clap(long = "min-period-seconds", default_value = "3600", env = "MIN_PERIOD_SECONDS")]
    pub min_period_seconds: i64,
}

impl HorizonArgs {
    pub fn validate(&self) -> Result {
        ensure!(self.interval_seconds > 0, "the grid interval must be positive");
        ensure!(self.min_period_seconds > 0, "the minimal period must be positive");
        Ok(())
    }

    #[must_use]
    pub fn interval(&self) -> TimeDelta {
        TimeDelta::seconds(self.interval_seconds)
    }

    #[must_use]
    pub fn min_period(&self) -> TimeDelta {
        TimeDelta::seconds(self.min_period_seconds)
    }
}

#[derive(Copy, Clone, Parser)]
pub struct BatteryArgs {
    /// Usable battery capacity in kilowatt-hours.
    #[clap(long = "battery-capacity-kwh", env = "BATTERY_CAPACITY_KWH")]
    pub capacity: KilowattHours,

    /// Round-trip battery efficiency.
    #[clap(long = "battery-efficiency", default_value = "0.95", env = "BATTERY_EFFICIENCY")]
    pub efficiency: f64,

    /// State of charge at the start of the horizon, in percent.
    #[clap(long = "initial-soc-percent", default_value = "50", env = "INITIAL_SOC_PERCENT")]
    pub initial_soc_percent: f64,

    /// State of charge to hand over at the end of the horizon, in percent.
    #[clap(long = "target-soc-percent", default_value = "50", env = "TARGET_SOC_PERCENT")]
    pub target_soc_percent: f64,
}

/// Point-of-common-coupling limits and cost parameters.
#[derive(Copy, Clone, Parser)]
pub struct PccArgs {
    /// Maximal grid import power in kilowatts.
    #[clap(long = "import-limit-kilowatts", env = "IMPORT_LIMIT_KILOWATTS")]
    pub import_limit: Kilowatts,

    /// Maximal grid export power in kilowatts.
    #[clap(long = "export-limit-kilowatts", env = "EXPORT_LIMIT_KILOWATTS")]
    pub export_limit: Kilowatts,

    /// Grid usage tariff per kilowatt-hour, added on top of the energy price.
    #[clap(long = "grid-tariff-per-kwh", default_value = "0.05", env = "GRID_TARIFF_PER_KWH")]
    pub grid_tariff: f64,

    /// Battery wear cost per charged kilowatt-hour.
    #[clap(
        long = "degradation-cost-per-kwh",
        default_value = "0.05",
        env = "DEGRADATION_COST_PER_KWH"
    )]
    pub degradation_cost: f64,
}

#[derive(Copy, Clone, Parser)]
pub struct SolverArgs {
    /// Wall-clock budget for the dispatch solver, in seconds.
    #[clap(long = "time-limit-seconds", default_value = "300", env = "TIME_LIMIT_SECONDS")]
    pub time_limit_seconds: u64,
}

impl SolverArgs {
    #[must_use]
    pub fn time_limit(&self) -> Duration {
        Duration::from_secs(self.time_limit_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_a_non_positive_interval() {
        let horizon = HorizonArgs { interval_seconds: 0, min_period_seconds: 3600 };
        assert!(horizon.validate().is_err());
    }

    #[test]
    fn converts_the_horizon_arguments() {
        let horizon = HorizonArgs { interval_seconds: 900, min_period_seconds: 3600 };
        horizon.validate().unwrap();
        assert_eq!(horizon.interval(), TimeDelta::minutes(15));
        assert_eq!(horizon.min_period(), TimeDelta::hours(1));
    }
}
