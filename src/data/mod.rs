//! Dataset shapes and the file loader that feeds the chart assemblers.

mod load;
mod records;
mod suits;

pub use load::{Dataset, DatasetFile, load_dataset};
pub use records::{
    CyclistRecord, EducationRecord, GdpSeries, Hierarchy, HierarchyValue, MonthlyVariance,
    SuitLink, TemperatureData,
};
pub use suits::builtin_suits;
