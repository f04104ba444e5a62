#![allow(clippy::cast_possible_truncation)]

mod input;
mod options;
mod progress;

use anyhow::Error as AnyError;
use clap::Parser;
use options::{Cli, Command as CliCmd};
use routeprof::{
    build_profile_with, FieldSource, GridSource, Measure, Profile, ProfileConfig, Route,
    StationModel, StepPolicy,
};
use serde::Serialize;
use textplots::{Chart, Plot, Shape};

fn main() -> Result<(), AnyError> {
    let cli = Cli::parse();
    env_logger::init();

    let route = input::load_route(&cli.route, cli.planar)?;
    let config = ProfileConfig {
        min_step_m: cli.min_step,
        max_samples: cli.max_samples,
        auto_limit: !cli.no_auto_limit,
        policy: cli
            .adaptive
            .map_or(StepPolicy::Fixed, |factor| StepPolicy::Adaptive { factor }),
        invert: cli.invert,
        side_slope_half_width_m: (cli.side_width > 0.0).then_some(cli.side_width),
        measure: (cli.haversine && route.is_geodetic()).then_some(Measure::Haversine),
        ..ProfileConfig::default()
    };

    let rasters = cli
        .rasters
        .iter()
        .map(|path| input::load_raster(path, cli.memmap, route.is_geodetic()))
        .collect::<Result<Vec<_>, _>>()?;
    let contours = if cli.contours.is_empty() {
        None
    } else {
        Some(input::load_contours(&cli.contours, &cli.value_fields)?)
    };
    let source = match &contours {
        Some(index) => FieldSource::Contours(index),
        None => FieldSource::Grid(rasters.iter().map(|r| r as &dyn GridSource).collect()),
    };

    let pb = progress::make_progress_bar("side slope", 0)?;
    let mut on_progress = |done: usize, total: usize| {
        pb.set_length(total as u64);
        pb.set_position(done as u64);
    };
    let profile = build_profile_with(&route, &source, &config, Some(&mut on_progress), None)?;
    pb.finish_and_clear();

    match cli.cmd {
        CliCmd::Json => print_json(&route, &config, &profile)?,
        CliCmd::Plot => plot_ascii(&profile),
        CliCmd::Summary => print_summary(&profile),
    };

    Ok(())
}

fn print_json(route: &Route, config: &ProfileConfig, profile: &Profile) -> Result<(), AnyError> {
    #[derive(Serialize)]
    struct JsonEntry {
        station_m: f64,
        kp: f64,
        location: [f64; 2],
        value: Option<f64>,
        along_slope_deg: Option<f64>,
        along_slope_pct: Option<f64>,
        side_slope_deg: Option<f64>,
        side_slope_pct: Option<f64>,
        port: Option<f64>,
        starboard: Option<f64>,
    }

    let measure = config
        .measure
        .unwrap_or_else(|| Measure::for_geodetic(route.is_geodetic()));
    let model = StationModel::new(route, &measure)?;
    let reshaped: Vec<JsonEntry> = (0..profile.len())
        .map(|idx| {
            let station_m = profile.stations[idx];
            let location = model.interpolate(station_m);
            JsonEntry {
                station_m,
                kp: station_m / 1000.0,
                location: [location.x, location.y],
                value: profile.values[idx],
                along_slope_deg: profile.along_slope_deg[idx],
                along_slope_pct: profile.along_slope_pct[idx],
                side_slope_deg: profile.side_slope_deg[idx],
                side_slope_pct: profile.side_slope_pct[idx],
                port: profile.port_values[idx],
                starboard: profile.starboard_values[idx],
            }
        })
        .collect();
    let json = serde_json::to_string(&reshaped)?;
    println!("{json}");
    Ok(())
}

/// `(kp, value)` pairs for the non-null entries of `series`.
fn kp_series(profile: &Profile, series: &[Option<f64>]) -> Vec<(f32, f32)> {
    profile
        .stations
        .iter()
        .zip(series)
        .filter_map(|(station_m, value)| value.map(|v| ((station_m / 1000.0) as f32, v as f32)))
        .collect()
}

fn plot_ascii(profile: &Profile) {
    let kp_max = (profile.total_length_m / 1000.0) as f32;

    let values = kp_series(profile, &profile.values);
    println!("value vs KP");
    Chart::new(300, 150, 0.0, kp_max)
        .lineplot(&Shape::Lines(&values))
        .display();

    let side = kp_series(profile, &profile.side_slope_deg);
    if !side.is_empty() {
        println!("side slope (°) vs KP");
        Chart::new(300, 100, 0.0, kp_max)
            .lineplot(&Shape::Points(&side))
            .display();
    }
}

fn print_summary(profile: &Profile) {
    let summary = profile.summary();
    let show = |v: Option<f64>| v.map_or_else(|| "-".to_owned(), |v| format!("{v:.3}"));

    println!("length:        {:.1} m", summary.total_length_m);
    println!("stations:      {} ({} valid, {} missing)", profile.len(), summary.valid, summary.missing);
    println!("step:          {} m", profile.min_step_m);
    if let Some(value) = summary.value {
        println!("value:         min {:.3}, max {:.3}, avg {:.3}", value.min, value.max, value.avg);
    }
    if let Some(slope) = summary.along_slope_deg {
        println!("along slope °: min {:.3}, max {:.3}, avg {:.3}", slope.min, slope.max, slope.avg);
    }
    println!(
        "               up max {}, down min {}",
        show(summary.slope_up_max_deg),
        show(summary.slope_down_min_deg)
    );
    if let Some(slope) = summary.side_slope_deg {
        println!("side slope °:  min {:.3}, max {:.3}, avg {:.3}", slope.min, slope.max, slope.avg);
        println!(
            "               starboard max {}, port min {}",
            show(summary.side_starboard_max_deg),
            show(summary.side_port_min_deg)
        );
    }
    println!("seabed length: {:.1} m", summary.seabed_length_m);
    println!("elongation:    {}", show(summary.elongation));
    if profile.underdetermined > 0 {
        println!("side slope skipped at {} stations", profile.underdetermined);
    }
    if !profile.completion.is_complete() {
        println!("incomplete: {:?}", profile.completion);
    }
    for warning in &profile.warnings {
        println!("warning: {warning}");
    }
}
