pub mod catalogue;

pub use catalogue::{format_duration, ProcedureCatalogue};
