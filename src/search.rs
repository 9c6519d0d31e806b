use chrono::NaiveDate;
use log::debug;
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::fmt;

use crate::date::{days_between, format_date};
use crate::model::{Dataset, Flight};

/// Constraints of a round-trip search. `Default` leaves everything unconstrained.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchRequest {
    /// Maximal number of yielded round trips, all of them when unset.
    pub limit: Option<i64>,
    pub min_days: Option<i64>,
    pub max_days: Option<i64>,
    /// Earliest departure date.
    pub min_date: Option<NaiveDate>,
    /// Latest return date.
    pub max_date: Option<NaiveDate>,
    /// Maximal price of both flights together.
    pub max_price: Option<f64>,
    pub selected_destinations: Option<Vec<String>>,
    pub excluded_destinations: Option<Vec<String>>,
    pub max_flights_per_airport: Option<i64>,
}

#[derive(Debug, PartialEq)]
pub enum SearchError {
    InvalidParameter { name: &'static str, reason: String },
    UnknownAirport(String),
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SearchError::InvalidParameter { name, reason } => {
                write!(f, "Invalid `{}`: {}", name, reason)
            }
            SearchError::UnknownAirport(id) => write!(f, "{} is not in the airport list", id),
        }
    }
}

impl std::error::Error for SearchError {}

fn invalid(name: &'static str, reason: &str) -> SearchError {
    SearchError::InvalidParameter {
        name,
        reason: reason.to_string(),
    }
}

impl SearchRequest {
    pub fn validate(&self) -> Result<(), SearchError> {
        if matches!(self.limit, Some(n) if n < 0) {
            return Err(invalid("limit", "must not be negative"));
        }
        if matches!(self.min_days, Some(days) if days <= 0) {
            return Err(invalid("min_days", "must be larger than 0"));
        }
        if matches!(self.max_days, Some(days) if days <= 0) {
            return Err(invalid("max_days", "must be larger than 0"));
        }
        if let (Some(min), Some(max)) = (self.min_days, self.max_days) {
            if min > max {
                return Err(invalid("min_days", "must be smaller or equal `max_days`"));
            }
        }
        if let (Some(min), Some(max)) = (self.min_date, self.max_date) {
            if min > max {
                return Err(invalid("min_date", "must be smaller or equal `max_date`"));
            }
        }
        // NaN is rejected as well
        if matches!(self.max_price, Some(price) if !(price > 0.0)) {
            return Err(invalid("max_price", "must be larger than 0"));
        }
        if self.selected_destinations.is_some() && self.excluded_destinations.is_some() {
            return Err(invalid(
                "selected_destinations",
                "cannot be combined with `excluded_destinations`",
            ));
        }
        if matches!(self.max_flights_per_airport, Some(n) if n <= 0) {
            return Err(invalid("max_flights_per_airport", "must be larger than 0"));
        }
        Ok(())
    }
}

/// Outbound flight to a destination paired with the flight back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundTrip<'a> {
    pub outbound: &'a Flight,
    pub inbound: &'a Flight,
}

impl<'a> RoundTrip<'a> {
    pub fn price(&self) -> f64 {
        self.outbound.price + self.inbound.price
    }

    pub fn days(&self) -> i64 {
        days_between(self.outbound.date, self.inbound.date)
    }

    pub fn destination(&self) -> &'a str {
        &self.outbound.destination
    }
}

/// Flights bucketed by (day offset, origin, destination).
struct FlightIndex<'a> {
    buckets: HashMap<(i64, &'a str, &'a str), Vec<&'a Flight>>,
}

impl<'a> FlightIndex<'a> {
    fn build(
        flights: &'a [Flight],
        airports: &HashSet<&'a str>,
        min_date: NaiveDate,
        max_date: NaiveDate,
    ) -> FlightIndex<'a> {
        let mut buckets: HashMap<_, Vec<&Flight>> = HashMap::new();
        for flight in flights.iter() {
            if flight.date < min_date || flight.date > max_date {
                continue;
            }
            let origin = match airports.get(flight.origin.as_str()) {
                Some(id) => *id,
                None => continue,
            };
            let destination = match airports.get(flight.destination.as_str()) {
                Some(id) => *id,
                None => continue,
            };
            let day = days_between(min_date, flight.date);
            buckets
                .entry((day, origin, destination))
                .or_default()
                .push(flight);
        }
        FlightIndex { buckets }
    }

    fn get(&self, day: i64, origin: &'a str, destination: &'a str) -> &[&'a Flight] {
        self.buckets
            .get(&(day, origin, destination))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Heap entry ordered by price, ties broken by discovery order.
struct Candidate<'a> {
    price: f64,
    seq: u64,
    trip: RoundTrip<'a>,
}

impl PartialEq for Candidate<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate<'_> {}

impl PartialOrd for Candidate<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.price
            .total_cmp(&other.price)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Round trips in ascending price order. Ranking is done up front, trips are handed
/// out one by one.
pub struct RoundTrips<'a> {
    queue: BinaryHeap<Reverse<Candidate<'a>>>,
    remaining: usize,
    per_airport: Option<(usize, HashMap<&'a str, usize>)>,
}

impl<'a> RoundTrips<'a> {
    fn empty() -> RoundTrips<'a> {
        RoundTrips {
            queue: BinaryHeap::new(),
            remaining: 0,
            per_airport: None,
        }
    }
}

impl<'a> Iterator for RoundTrips<'a> {
    type Item = RoundTrip<'a>;

    fn next(&mut self) -> Option<RoundTrip<'a>> {
        if self.remaining == 0 {
            return None;
        }
        while let Some(Reverse(candidate)) = self.queue.pop() {
            if let Some((cap, visited)) = self.per_airport.as_mut() {
                let count = visited.entry(candidate.trip.destination()).or_insert(0);
                if *count >= *cap {
                    continue;
                }
                *count += 1;
            }
            self.remaining -= 1;
            return Some(candidate.trip);
        }
        self.remaining = 0;
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining.min(self.queue.len())))
    }
}

/// Finds the cheapest round trips from `origin` meeting the constraints of `request`.
///
/// Dates and durations out of the range covered by the dataset are narrowed to it
/// rather than rejected. Only invalid parameters and an unknown origin are errors, and
/// both are reported before any flight is looked at.
pub fn find_cheapest_flights<'a>(
    dataset: &'a Dataset,
    origin: &str,
    request: &SearchRequest,
) -> Result<RoundTrips<'a>, SearchError> {
    request.validate()?;

    let origin = match dataset.airport(origin) {
        Some(airport) => airport.id.as_str(),
        None => return Err(SearchError::UnknownAirport(origin.to_string())),
    };

    let mut seen = HashSet::new();
    let destinations: Vec<&str> = dataset
        .airport_ids()
        .filter(|id| *id != origin)
        .filter(|id| seen.insert(*id))
        .filter(|id| match &request.selected_destinations {
            Some(selected) => selected.iter().any(|s| s == id),
            None => true,
        })
        .filter(|id| match &request.excluded_destinations {
            Some(excluded) => !excluded.iter().any(|e| e == id),
            None => true,
        })
        .collect();
    debug!("Destination airports: {:?}", destinations);

    let (first_date, last_date) = match dataset.date_range() {
        Some(range) => range,
        None => {
            debug!("No flights in the dataset");
            return Ok(RoundTrips::empty());
        }
    };

    let min_date = request
        .min_date
        .map_or(first_date, |date| date.min(last_date).max(first_date));
    let max_date = request
        .max_date
        .map_or(last_date, |date| date.max(first_date).min(last_date));
    debug!("min_date: {}", format_date(min_date));
    debug!("max_date: {}", format_date(max_date));

    let span_days = days_between(min_date, max_date);
    let min_days = request
        .min_days
        .map_or(1, |days| days.min(span_days).max(1));
    let max_days = request
        .max_days
        .map_or(span_days, |days| days.max(1).min(span_days));
    debug!("min_days: {}", min_days);
    debug!("max_days: {}", max_days);

    let mut airports: HashSet<&str> = destinations.iter().copied().collect();
    airports.insert(origin);
    let index = FlightIndex::build(&dataset.flights, &airports, min_date, max_date);

    let mut queue = BinaryHeap::new();
    let mut seq = 0u64;
    for departure_day in 0..=(span_days - min_days) {
        let last_return_day = (departure_day + max_days).min(span_days);
        for return_day in (departure_day + min_days)..=last_return_day {
            for &destination in destinations.iter() {
                let inbound_flights = index.get(return_day, destination, origin);
                if inbound_flights.is_empty() {
                    continue;
                }
                for &outbound in index.get(departure_day, origin, destination) {
                    for &inbound in inbound_flights {
                        let trip = RoundTrip { outbound, inbound };
                        let price = trip.price();
                        if matches!(request.max_price, Some(max) if !(price <= max)) {
                            continue;
                        }
                        queue.push(Reverse(Candidate { price, seq, trip }));
                        seq += 1;
                    }
                }
            }
        }
    }
    debug!(
        "Found {} round trips between {} and {}",
        queue.len(),
        format_date(min_date),
        format_date(max_date)
    );

    let remaining = match request.limit {
        Some(n) => (n as usize).min(queue.len()),
        None => queue.len(),
    };
    debug!("Yielding at most {} round trips", remaining);

    let per_airport = request
        .max_flights_per_airport
        .map(|cap| (cap as usize, HashMap::new()));

    Ok(RoundTrips {
        queue,
        remaining,
        per_airport,
    })
}
