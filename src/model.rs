use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use crate::date;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Airport {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iata: Option<String>,
}

/// A single one-way leg.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Flight {
    pub origin: String,
    pub destination: String,
    #[serde(with = "date::naive_date")]
    pub date: NaiveDate,
    pub price: f64,
    pub currency: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub airports: Vec<Airport>,
    pub flights: Vec<Flight>,
}

#[derive(Debug)]
pub enum DatasetError {
    Io(io::Error),
    JsonParseError(String),
    DuplicateAirport(String),
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DatasetError::Io(err) => write!(f, "{}", err),
            DatasetError::JsonParseError(msg) => write!(f, "{}", msg),
            DatasetError::DuplicateAirport(id) => {
                write!(f, "Airport {} is listed more than once", id)
            }
        }
    }
}

impl std::error::Error for DatasetError {}

impl Dataset {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Dataset, DatasetError> {
        let file = File::open(path.as_ref()).map_err(DatasetError::Io)?;
        debug!("Loading flight data from {}", path.as_ref().display());
        Dataset::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Dataset, DatasetError> {
        let dataset: Dataset = serde_json::from_reader(reader).map_err(|err| {
            DatasetError::JsonParseError(format!("Error while parsing JSON: {:?}", err))
        })?;
        dataset.check()?;
        Ok(dataset)
    }

    pub fn from_json_str(text: &str) -> Result<Dataset, DatasetError> {
        let dataset: Dataset = serde_json::from_str(text).map_err(|err| {
            DatasetError::JsonParseError(format!("Error while parsing JSON: {:?}", err))
        })?;
        dataset.check()?;
        Ok(dataset)
    }

    /// Rejects duplicate airport ids. Flights pointing at unknown airports are only
    /// reported; the search ignores them.
    fn check(&self) -> Result<(), DatasetError> {
        let mut seen = HashSet::new();
        for airport in self.airports.iter() {
            if !seen.insert(airport.id.as_str()) {
                return Err(DatasetError::DuplicateAirport(airport.id.clone()));
            }
        }

        let dangling = self
            .flights
            .iter()
            .filter(|f| {
                !seen.contains(f.origin.as_str()) || !seen.contains(f.destination.as_str())
            })
            .count();
        if dangling > 0 {
            warn!(
                "{} flights reference airports missing from the airport list",
                dangling
            );
        }

        debug!(
            "Loaded {} airports and {} flights",
            self.airports.len(),
            self.flights.len()
        );
        Ok(())
    }

    pub fn airport(&self, id: &str) -> Option<&Airport> {
        self.airports.iter().find(|airport| airport.id == id)
    }

    pub fn airport_ids(&self) -> impl Iterator<Item = &str> {
        self.airports.iter().map(|airport| airport.id.as_str())
    }

    /// Earliest and latest flight date, `None` when there are no flights.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.flights.iter().fold(None, |range, flight| match range {
            None => Some((flight.date, flight.date)),
            Some((min, max)) => Some((min.min(flight.date), max.max(flight.date))),
        })
    }
}
