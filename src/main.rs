use chrono::NaiveDate;
use log::{debug, error, info};
use std::path::PathBuf;
use std::process;
use structopt::{clap, StructOpt};

use flightfinder::date;
use flightfinder::{find_cheapest_flights, Dataset, DatasetError, SearchRequest, TripFormatter};

#[derive(StructOpt, Debug)]
#[structopt(
    name = "flightfinder",
    about = "Find cheapest round-trip flights from selected airport."
)]
struct Opt {
    /// Verbose mode (-v, -vv, -vvv, etc.)
    #[structopt(short, long, parse(from_occurrences))]
    verbose: usize,

    /// Id of the starting airport
    origin: String,

    /// Path to flight data. By default `flights_<origin>.json` in the working directory
    #[structopt(long, parse(from_os_str))]
    data: Option<PathBuf>,

    /// Maximal number of round trips to show. By default shows all of them
    #[structopt(short = "n", long)]
    limit: Option<i64>,

    /// Minimal number of days a round trip should last
    #[structopt(long, parse(try_from_str = date::parse_days_from_str))]
    min_days: Option<i64>,

    /// Maximal number of days a round trip may last
    #[structopt(long, parse(try_from_str = date::parse_days_from_str))]
    max_days: Option<i64>,

    /// Earliest date of departure. By default the earliest flight in the data
    #[structopt(long, value_name = "YYYY-MM-DD", parse(try_from_str = date::parse_date_from_str))]
    min_date: Option<NaiveDate>,

    /// Latest date of return. By default the latest flight in the data
    #[structopt(long, value_name = "YYYY-MM-DD", parse(try_from_str = date::parse_date_from_str))]
    max_date: Option<NaiveDate>,

    /// Max price of both flights together
    #[structopt(short, long)]
    max_price: Option<f64>,

    /// Consider only these destinations (comma-separated airport ids)
    #[structopt(long, use_delimiter = true)]
    selected_destinations: Option<Vec<String>>,

    /// Never consider these destinations (comma-separated airport ids)
    #[structopt(long, use_delimiter = true)]
    excluded_destinations: Option<Vec<String>>,

    /// Maximal number of round trips shown per destination airport
    #[structopt(long)]
    max_flights_per_airport: Option<i64>,

    /// Show results as a table
    #[structopt(long)]
    table: bool,
}

fn main() {
    let opt = Opt::from_args();
    setup_logging(opt.verbose);

    debug!("Parsed opts: {:#?}", opt);

    let path = opt
        .data
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("flights_{}.json", opt.origin)));

    let dataset = match Dataset::load(&path) {
        Ok(res) => res,
        Err(DatasetError::Io(err)) if opt.data.is_none() => {
            error!(
                "Failed to automatically find flight data at {} ({}). Please use --data to specify the path to flight data.",
                path.display(),
                err
            );
            process::exit(1);
        }
        Err(err) => {
            error!("Failed to load flight data from {}: {}", path.display(), err);
            process::exit(1);
        }
    };

    if dataset.airport(&opt.origin).is_none() {
        error!(
            "{} not found in the airport list. Available airport ids: {}",
            opt.origin,
            dataset.airport_ids().collect::<Vec<_>>().join(",")
        );
        process::exit(1);
    }

    let request = SearchRequest {
        limit: opt.limit,
        min_days: opt.min_days,
        max_days: opt.max_days,
        min_date: opt.min_date,
        max_date: opt.max_date,
        max_price: opt.max_price,
        selected_destinations: opt.selected_destinations.clone(),
        excluded_destinations: opt.excluded_destinations.clone(),
        max_flights_per_airport: opt.max_flights_per_airport,
    };

    let trips = match find_cheapest_flights(&dataset, &opt.origin, &request) {
        Ok(res) => res,
        Err(err) => clap::Error::value_validation_auto(err.to_string()).exit(),
    };

    let formatter = TripFormatter::new(&dataset);
    let found = if opt.table {
        let trips: Vec<_> = trips.collect();
        if !trips.is_empty() {
            formatter.table(&trips).printstd();
        }
        trips.len()
    } else {
        let mut found = 0;
        for trip in trips {
            println!("{}", formatter.format(trip.outbound, trip.inbound));
            found += 1;
        }
        found
    };

    if found == 0 {
        println!("There was no round trip matching supplied criteria :(")
    } else {
        info!("Found {} round trips matching criteria.", found);
    }
}

fn setup_logging(level: usize) {
    if let Err(err) = stderrlog::new()
        .module(module_path!())
        .verbosity(level)
        .timestamp(stderrlog::Timestamp::Off)
        .init()
    {
        eprintln!("Failed to set up logging: {}", err);
    }
}
