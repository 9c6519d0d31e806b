pub mod date;
pub mod format;
pub mod model;
pub mod search;

pub use format::TripFormatter;
pub use model::{Airport, Dataset, DatasetError, Flight};
pub use search::{find_cheapest_flights, RoundTrip, RoundTrips, SearchError, SearchRequest};
