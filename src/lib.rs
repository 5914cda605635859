pub mod sdk;

pub use sdk::batch::BatchRunner;
pub use sdk::config::RunConfig;
pub use sdk::input::{read_rows, InputRow};
pub use sdk::output::write_results;
pub use sdk::routing::route::{BatchResult, PointSequence, RouteSummary};
pub use sdk::routing::RoutingError;
