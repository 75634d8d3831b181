// Entry point and interactive year selector.
//
// - The pipeline is built once from the configured source files; a load
//   failure is reported before anything is shown.
// - `--year` prints a single view and exits. Without it the user picks
//   years from a prompt until they quit.
use clap::Parser;
use ncs_production::config::Cli;
use ncs_production::output;
use ncs_production::util::format_int;
use ncs_production::{Dashboard, PipelineError};
use std::io::{self, Write};
use std::process::ExitCode;

/// Read a single line after printing the year prompt. `None` on end of
/// input.
fn read_choice(years: &[i32]) -> Option<String> {
    let labels: Vec<String> = years.iter().map(|y| y.to_string()).collect();
    print!("Select a year [{}] or q to quit: ", labels.join(", "));
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

fn show_year(dashboard: &Dashboard, year: i32) {
    match dashboard.view(year) {
        Ok(view) => output::print_view(&view),
        Err(e) => println!("{}\n", e),
    }
}

fn print_summary(dashboard: &Dashboard) {
    let report = dashboard.load_report();
    println!(
        "Processing dataset... ({} production rows, {} skipped, {} negative values set to zero)",
        format_int(report.total_rows),
        format_int(report.parse_errors),
        format_int(report.clamped_values)
    );
    println!(
        "{} fields with production and geometry (CRS {})\n",
        format_int(dashboard.merged().len()),
        dashboard.crs().name
    );
    for warning in dashboard.warnings() {
        println!("Warning: {}\n", warning);
    }

    println!("{} share of national production\n", dashboard.config().region.label());
    let rows = dashboard.share_rows();
    output::preview_table_rows(&rows, rows.len());
}

fn run(cli: Cli) -> Result<(), PipelineError> {
    let selected = cli.year;
    let geojson_out = cli.geojson_out.clone();
    let wide_csv_out = cli.wide_csv_out.clone();
    let config = cli.into_config()?;

    let dashboard = Dashboard::build(&config)?;
    print_summary(&dashboard);

    if let Some(path) = geojson_out {
        match output::write_geojson(&path, dashboard.merged(), dashboard.years()) {
            Ok(()) => println!("(Merged fields exported to {})\n", path.display()),
            Err(e) => eprintln!("Write error: {}", e),
        }
    }
    if let Some(path) = wide_csv_out {
        match output::write_wide_csv(&path, dashboard.wide_rows(), dashboard.years()) {
            Ok(()) => println!("(Wide table exported to {})\n", path.display()),
            Err(e) => eprintln!("Write error: {}", e),
        }
    }

    if let Some(year) = selected {
        return dashboard.view(year).map(|view| output::print_view(&view));
    }

    loop {
        let Some(choice) = read_choice(dashboard.years()) else {
            break;
        };
        match choice.as_str() {
            "q" | "Q" => break,
            "" => {
                // Same as the slider's starting position: the latest year.
                if let Some(latest) = dashboard.years().last() {
                    show_year(&dashboard, *latest);
                }
            }
            s => match s.parse::<i32>() {
                Ok(year) => show_year(&dashboard, year),
                Err(_) => println!("Invalid choice. Please enter one of the listed years.\n"),
            },
        }
    }
    println!("Exiting the program.");
    Ok(())
}

fn main() -> ExitCode {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Failed to prepare the dashboard: {}", e);
            ExitCode::FAILURE
        }
    }
}
