mod cli;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
use eventprint::config::{Config, OutputFormat};
use eventprint::datasources::{load_report_input, load_submission};
use eventprint::logic::{DistanceBreakdown, EmissionFactorTable, Evaluator};
use eventprint::models::{
    AggregateResult, Event, FactorBasis, Submission, TravelerCategory, VehicleType,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize logging
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Commands::Init { path, force } = &cli.command {
        let path = match path {
            Some(p) => p.clone(),
            None => Config::default_config_path()?,
        };
        Config::write_default(&path, *force)?;
        println!("Configuration saved to {}", path.display());
        return Ok(());
    }

    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    let format = if cli.json {
        OutputFormat::Json
    } else {
        config.output.format
    };
    let precision = config.output.precision;
    let evaluator = Evaluator::new(&config.factors);

    match &cli.command {
        Commands::Estimate { file } => estimate(&evaluator, file, format, precision),
        Commands::Report { file } => report(&evaluator, file, format, precision),
        Commands::Factors => factors(&config.factors, format),
        Commands::Init { .. } => Ok(()),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Estimate {
    submission_id: i64,
    user_type: TravelerCategory,
    segments: Vec<SegmentEstimate>,
    transport_footprint: f64,
    hotel_footprint: f64,
    total_footprint: f64,
    trees_equivalent: u64,
    distance: DistanceBreakdown,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SegmentEstimate {
    vehicle_type: Option<VehicleType>,
    distance: f64,
    footprint: f64,
}

fn build_estimate(evaluator: &Evaluator<'_>, submission: &Submission) -> Estimate {
    let segments: Vec<SegmentEstimate> = submission
        .segments
        .iter()
        .map(|segment| SegmentEstimate {
            vehicle_type: segment.vehicle_type,
            distance: segment.distance_km(),
            footprint: evaluator.segment_footprint(segment),
        })
        .collect();

    let transport_footprint: f64 = segments.iter().map(|s| s.footprint).sum();
    let hotel_footprint = evaluator.hotel_footprint(submission.hotel_nights.unwrap_or(0));
    let total_footprint = evaluator.submission_footprint(submission);

    Estimate {
        submission_id: submission.id,
        user_type: submission.user_type,
        segments,
        transport_footprint,
        hotel_footprint,
        total_footprint,
        trees_equivalent: evaluator.trees_equivalent(total_footprint),
        distance: evaluator.distance_breakdown(&submission.segments),
    }
}

fn estimate(
    evaluator: &Evaluator<'_>,
    file: &Path,
    format: OutputFormat,
    precision: usize,
) -> anyhow::Result<()> {
    let submission = load_submission(file)
        .with_context(|| format!("reading submission from {}", file.display()))?;

    if submission.missing_accommodation() {
        tracing::warn!(
            id = submission.id,
            user_type = %submission.user_type,
            "Submission reports no hotel nights although its category is asked for them"
        );
    }

    let estimate = build_estimate(evaluator, &submission);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&estimate)?),
        OutputFormat::Text => {
            println!(
                "Submission {} ({})",
                estimate.submission_id, estimate.user_type
            );
            for (i, segment) in estimate.segments.iter().enumerate() {
                let vehicle = segment
                    .vehicle_type
                    .map(|v| v.as_str())
                    .unwrap_or("unspecified");
                println!(
                    "  {:>2}. {:<11} {:>10.p$} km {:>10.p$} kg CO2e",
                    i + 1,
                    vehicle,
                    segment.distance,
                    segment.footprint,
                    p = precision
                );
            }
            println!(
                "Transport:   {:.p$} kg CO2e",
                estimate.transport_footprint,
                p = precision
            );
            println!(
                "Hotel:       {:.p$} kg CO2e",
                estimate.hotel_footprint,
                p = precision
            );
            println!(
                "Total:       {:.p$} kg CO2e ({} trees/year)",
                estimate.total_footprint,
                estimate.trees_equivalent,
                p = precision
            );
            println!(
                "Distance:    {:.p$} km",
                estimate.distance.total_distance,
                p = precision
            );
            print_distance_by_type(&estimate.distance.by_vehicle_type, precision);
        }
    }

    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EventReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    event: Option<&'a Event>,
    factors_version: &'a str,
    trees_equivalent: u64,
    #[serde(flatten)]
    result: &'a AggregateResult,
}

fn report(
    evaluator: &Evaluator<'_>,
    file: &Path,
    format: OutputFormat,
    precision: usize,
) -> anyhow::Result<()> {
    let input = load_report_input(file)
        .with_context(|| format!("reading report input from {}", file.display()))?;

    let result = input.aggregate(evaluator);
    let report = EventReport {
        event: input.event(),
        factors_version: &evaluator.factors().version,
        trees_equivalent: result.trees_equivalent(evaluator.factors()),
        result: &result,
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_report(&report, precision),
    }

    Ok(())
}

fn print_report(report: &EventReport<'_>, precision: usize) {
    let result = report.result;

    if let Some(event) = report.event {
        println!(
            "{} ({} to {}, {} days)",
            event.name,
            event.start_date,
            event.end_date,
            event.duration_days()
        );
    }

    if result.is_empty() {
        println!("No travel data reported yet.");
        return;
    }

    println!(
        "Total footprint:   {:.p$} kg CO2e ({} trees/year)",
        result.total_carbon_footprint,
        report.trees_equivalent,
        p = precision
    );
    println!(
        "Total distance:    {:.p$} km",
        result.total_distance,
        p = precision
    );
    println!("Hotel nights:      {}", result.total_hotel_nights);
    println!(
        "Submissions:       {} with transport, {} with accommodation",
        result.transport_submissions_count, result.accommodation_submissions_count
    );

    if !result.by_user_type.is_empty() {
        println!("By traveler category:");
        for (category, totals) in &result.by_user_type {
            println!(
                "  {:<32} {:>12.p$} kg CO2e {:>12.p$} km",
                category.as_str(),
                totals.carbon_footprint,
                totals.distance,
                p = precision
            );
        }
    }

    if !result.by_transport_type.is_empty() {
        println!("By transport:");
        for (vehicle_type, totals) in &result.by_transport_type {
            println!(
                "  {:<11} {:>12.p$} km {:>6} trips",
                vehicle_type.as_str(),
                totals.distance,
                totals.trips,
                p = precision
            );
        }
    }
}

fn print_distance_by_type(by_type: &BTreeMap<VehicleType, f64>, precision: usize) {
    for (vehicle_type, distance) in by_type {
        println!(
            "  {:<11} {:>10.p$} km",
            vehicle_type.as_str(),
            distance,
            p = precision
        );
    }
}

fn factors(table: &EmissionFactorTable, format: OutputFormat) -> anyhow::Result<()> {
    let entries = table.entries();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Text => {
            println!("Emission factors (version {})", table.version);
            for entry in &entries {
                let basis = match entry.basis {
                    FactorBasis::PerVehicleKm => "per vehicle-km",
                    FactorBasis::PerPassengerKm => "per passenger-km",
                };
                println!(
                    "  {:<11} {:<13} {:>6.3} kg CO2e {}",
                    entry.vehicle_type.as_str(),
                    entry.variant.unwrap_or("-"),
                    entry.kg_per_km,
                    basis
                );
            }
            println!("  hotel       per night     {:>6.1} kg CO2e", table.hotel_per_night);
            println!(
                "  tree absorption             {:>6.1} kg CO2e/year",
                table.tree_absorption_per_year
            );
        }
    }

    Ok(())
}
