mod breakdown;
mod metrics;
mod money;
mod period;
mod records;
mod timeseries;

pub use breakdown::*;
pub use metrics::*;
pub use money::*;
pub use period::*;
pub use records::*;
pub use timeseries::*;
