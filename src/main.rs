//! Dispatch simulator entry point: CLI wiring and config-driven runs.

use std::path::Path;
use std::process;

use hres_sim::config::ScenarioConfig;
use hres_sim::io::{export_records_csv, export_sweep_csv};
use hres_sim::logging::init_logging;
use hres_sim::profile::build_series;
use hres_sim::series::TimeSeries;
use hres_sim::sim::SimulationRunner;
use hres_sim::sweep::run_battery_sweep_over;

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    series_path: Option<String>,
    preset: Option<String>,
    seed_override: Option<u64>,
    records_out: Option<String>,
    sweep: Option<Vec<f64>>,
    sweep_out: Option<String>,
    verbose: bool,
}

fn print_help() {
    eprintln!("hres-sim - Hybrid renewable energy system dispatch simulator");
    eprintln!();
    eprintln!("Usage: hres-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>     Load scenario from TOML config file");
    eprintln!("  --series <path>       Load demand/solar series from CSV instead of generating it");
    eprintln!("  --preset <name>       Use a built-in preset (ccgt, ocgt, solar_battery_grid)");
    eprintln!("  --seed <u64>          Override random seed");
    eprintln!("  --out <path>          Export per-timestep records to CSV");
    eprintln!("  --sweep <list>        Run a battery sweep over comma-separated MWh capacities");
    eprintln!("  --sweep-out <path>    Export sweep summaries to CSV");
    eprintln!("  --verbose             Debug-level logging");
    eprintln!("  --help                Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the ccgt preset is used.");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        series_path: None,
        preset: None,
        seed_override: None,
        records_out: None,
        sweep: None,
        sweep_out: None,
        verbose: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --scenario requires a path argument");
                    process::exit(1);
                }
                cli.scenario_path = Some(args[i].clone());
            }
            "--series" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --series requires a path argument");
                    process::exit(1);
                }
                cli.series_path = Some(args[i].clone());
            }
            "--preset" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --preset requires a name argument");
                    process::exit(1);
                }
                cli.preset = Some(args[i].clone());
            }
            "--seed" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --seed requires a u64 argument");
                    process::exit(1);
                }
                if let Ok(s) = args[i].parse::<u64>() {
                    cli.seed_override = Some(s);
                } else {
                    eprintln!("error: --seed value \"{}\" is not a valid u64", args[i]);
                    process::exit(1);
                }
            }
            "--out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --out requires a path argument");
                    process::exit(1);
                }
                cli.records_out = Some(args[i].clone());
            }
            "--sweep" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --sweep requires a comma-separated list of capacities");
                    process::exit(1);
                }
                let mut capacities = Vec::new();
                for part in args[i].split(',') {
                    match part.trim().parse::<f64>() {
                        Ok(c) => capacities.push(c),
                        Err(_) => {
                            eprintln!("error: --sweep value \"{part}\" is not a valid number");
                            process::exit(1);
                        }
                    }
                }
                cli.sweep = Some(capacities);
            }
            "--sweep-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --sweep-out requires a path argument");
                    process::exit(1);
                }
                cli.sweep_out = Some(args[i].clone());
            }
            "--verbose" => {
                cli.verbose = true;
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn main() {
    let cli = parse_args();
    init_logging(cli.verbose);

    // Load config: --scenario takes priority, then --preset, then the
    // ccgt default.
    let mut scenario = if let Some(ref path) = cli.scenario_path {
        match ScenarioConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.preset {
        match ScenarioConfig::from_preset(name) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        ScenarioConfig::ccgt()
    };

    if let Some(seed) = cli.seed_override {
        scenario.simulation.seed = seed;
    }

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let series = if let Some(ref path) = cli.series_path {
        match TimeSeries::from_csv_path(Path::new(path)) {
            Ok(series) => series,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        build_series(&scenario)
    };

    // Sweep mode replaces the single run.
    if let Some(ref capacities) = cli.sweep {
        let cases = match run_battery_sweep_over(&scenario, capacities, &series) {
            Ok(cases) => cases,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        };
        for case in &cases {
            println!(
                "battery {:>8.2} MWh: LCOE {:.4} $/kWh, curtailed {:.2} %, deficit {:.2} % of time",
                case.capacity_mwh,
                case.summary.lcoe_per_kwh,
                case.summary.solar_curtail_pct,
                case.summary.deficit_pct_time
            );
        }
        if let Some(ref path) = cli.sweep_out {
            if let Err(e) = export_sweep_csv(&cases, Path::new(path)) {
                eprintln!("error: failed to write CSV: {e}");
                process::exit(1);
            }
            eprintln!("Sweep results written to {path}");
        }
        return;
    }

    let mut runner = match SimulationRunner::from_config(&scenario) {
        Ok(runner) => runner,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };
    let output = match runner.run(&series) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    println!("{}", output.summary);

    if let Some(ref path) = cli.records_out {
        if let Err(e) = export_records_csv(&output.records, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Records written to {path}");
    }
}
