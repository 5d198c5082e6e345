mod api;
mod cli;
mod core;
mod error;
mod optimizer;
mod prelude;
mod units;

use chrono::{Timelike, Utc};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use crate::{
    api::Api,
    cli::Args,
    core::{
        Schedule,
        TimeGrid,
        align_lenient,
        align_strict,
        estimate_reading_count,
        find_common_time_range,
    },
    error::Error,
    optimizer::{DispatchInput, solve},
    prelude::*,
    units::Kilowatts,
};

#[tokio::main]
async fn main() -> Result {
    let _ = dotenvy::dotenv();
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args = Args::parse();
    args.horizon.validate()?;
    let api = Api::try_new(args.api.base_url.clone(), &args.api.token)?;
    run(&api, &args).await
}

/// One scheduling cycle: fetch, align, optimize, publish.
#[instrument(skip_all)]
async fn run(api: &Api, args: &Args) -> Result {
    let now = Utc::now();
    let now = now.with_nanosecond(0).unwrap_or(now);
    let interval = args.horizon.interval();

    let production = api
        .get_last_prognosis_readings(&args.datapoints.production)
        .await?
        .map_values(units::watts_to_kilowatts);
    let consumption = api
        .get_last_prognosis_readings(&args.datapoints.consumption)
        .await?
        .map_values(units::watts_to_kilowatts);
    info!(
        n_production = production.len(),
        n_consumption = consumption.len(),
        expected_production = estimate_reading_count(&production, now, interval),
        expected_consumption = estimate_reading_count(&consumption, now, interval),
        "Fetched forecasts",
    );

    let range = find_common_time_range([&production, &consumption])?;
    range.ensure_min_duration(args.horizon.min_period())?;
    let grid = TimeGrid::try_new(now, range.end, interval)?;
    info!(?range, n_steps = grid.len(), "Common horizon");

    let load = align_strict(&consumption, "consumption", now, range.end, interval)?.values();
    let pv = align_strict(&production, "production", now, range.end, interval)?.values();

    // The price forecast may lag: carry the datapoint's last known price
    // until its forecast kicks in.
    let last_price = api.get_last_reading_value(&args.datapoints.price).await?;
    let price_forecast =
        api.get_last_prognosis_readings(&args.datapoints.price).await?;
    let prices =
        align_lenient(&price_forecast, now, range.end, interval, last_price)?.values();

    let power_limit = Kilowatts::from_watts(
        api.get_last_reading_value(&args.datapoints.battery_power).await?,
    );
    let result_datapoint = api.get_datapoint(&args.datapoints.result).await?;
    info!(%power_limit, result_datapoint_id = result_datapoint.id, "Fetched parameters");

    let input = DispatchInput::builder()
        .load(&load)
        .pv(&pv)
        .prices(&prices)
        .step(interval)
        .power_limit(power_limit)
        .battery(args.battery)
        .pcc(args.pcc)
        .build();

    let schedule = match solve(&input, args.solver.time_limit()) {
        Ok(solution) => {
            info!(status = %solution.status, "Optimized");
            solution.trace();
            Schedule::from_grid(&grid, solution.prosumption().map(units::kilowatts_to_watts))
        }
        Err(error @ Error::Solver(_)) => {
            error!("optimization failed: {error}");
            let previous =
                api.get_last_prognosis_readings(&args.datapoints.result).await?;
            let Some(schedule) = Schedule::from_previous(&previous) else {
                bail!("optimization failed and there is no previous schedule to keep");
            };
            warn!(n_readings = schedule.len(), "Keeping the previous schedule");
            schedule
        }
        Err(error) => return Err(error.into()),
    };

    if args.scout {
        info!(n_readings = schedule.len(), "Scouting: not publishing");
        return Ok(());
    }
    api.publish_schedule(result_datapoint.id, now, &schedule).await?;
    Ok(())
}
