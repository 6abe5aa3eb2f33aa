pub mod models;
pub mod policy;
pub mod services;

pub use models::*;
pub use policy::*;
pub use services::*;
