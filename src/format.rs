use prettytable::{format, row, Table};
use std::collections::HashMap;

use crate::date::format_date;
use crate::model::{Airport, Dataset, Flight};
use crate::search::RoundTrip;

pub struct TripFormatter<'a> {
    airports: HashMap<&'a str, &'a Airport>,
}

impl<'a> TripFormatter<'a> {
    pub fn new(dataset: &'a Dataset) -> TripFormatter<'a> {
        TripFormatter {
            airports: dataset
                .airports
                .iter()
                .map(|airport| (airport.id.as_str(), airport))
                .collect(),
        }
    }

    /// Name padded to a fixed width with the IATA code, or the bare id for airports
    /// without a name.
    pub fn airport_label(&self, id: &str) -> String {
        match self.airports.get(id) {
            Some(Airport {
                name: Some(name),
                iata: Some(iata),
                ..
            }) => format!("{:<20.20} ({})", name, iata),
            Some(Airport {
                name: Some(name), ..
            }) => format!("{:<20.20}", name),
            _ => id.to_string(),
        }
    }

    pub fn format(&self, outbound: &Flight, inbound: &Flight) -> String {
        let trip = RoundTrip { outbound, inbound };
        format!(
            "round-trip to {} {:02} days ({} - {}) for {:.2} {}",
            self.airport_label(&outbound.destination),
            trip.days(),
            format_date(outbound.date),
            format_date(inbound.date),
            trip.price(),
            outbound.currency
        )
    }

    pub fn table(&self, trips: &[RoundTrip]) -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row!["Destination", "Days", "Outbound", "Inbound", "Price"]);

        for trip in trips.iter() {
            table.add_row(row![
                self.airport_label(trip.destination()),
                format!("{:02}", trip.days()),
                format_date(trip.outbound.date),
                format_date(trip.inbound.date),
                format!("{:.2} {}", trip.price(), trip.outbound.currency)
            ]);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{find_cheapest_flights, SearchRequest};
    use chrono::NaiveDate;

    fn dataset() -> Dataset {
        Dataset::from_json_str(include_str!("test_resources/flights.json")).unwrap()
    }

    fn flight(origin: &str, destination: &str, date: NaiveDate, price: f64) -> Flight {
        Flight {
            origin: origin.to_string(),
            destination: destination.to_string(),
            date,
            price,
            currency: "PLN".to_string(),
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_format_with_name_and_iata() {
        let dataset = dataset();
        let formatter = TripFormatter::new(&dataset);

        assert_eq!(
            formatter.format(&dataset.flights[0], &dataset.flights[1]),
            "round-trip to Paris Beauvais       (BVA) 02 days (2018-10-01 - 2018-10-03) for 70.00 PLN"
        );
    }

    #[test]
    fn test_format_truncates_long_names() {
        let dataset = dataset();
        let formatter = TripFormatter::new(&dataset);

        assert_eq!(
            formatter.format(
                &flight("WMI", "BGY", ymd(2018, 10, 4), 60.0),
                &flight("BGY", "WMI", ymd(2018, 10, 18), 39.999),
            ),
            "round-trip to Milan Bergamo Orio a 14 days (2018-10-04 - 2018-10-18) for 100.00 PLN"
        );
    }

    #[test]
    fn test_format_falls_back_to_id() {
        let dataset =
            Dataset::from_json_str(r#"{"airports": [{"id": "A"}, {"id": "B"}], "flights": []}"#)
                .unwrap();
        let formatter = TripFormatter::new(&dataset);

        assert_eq!(
            formatter.format(
                &flight("A", "B", ymd(2018, 10, 1), 5.5),
                &flight("B", "A", ymd(2018, 10, 2), 4.25),
            ),
            "round-trip to B 01 days (2018-10-01 - 2018-10-02) for 9.75 PLN"
        );
        assert_eq!(formatter.airport_label("unknown"), "unknown");
    }

    #[test]
    fn test_table() {
        let dataset = dataset();
        let formatter = TripFormatter::new(&dataset);
        let trips: Vec<_> = find_cheapest_flights(&dataset, "WMI", &SearchRequest::default())
            .unwrap()
            .collect();

        let table = formatter.table(&trips);

        assert_eq!(table.len(), 5);
        let rendered = table.to_string();
        assert!(rendered.contains("London Stansted      (STN)"));
        assert!(rendered.contains("20.00 PLN"));
    }
}
