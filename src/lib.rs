pub mod admission;
pub mod colors;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod quota;
pub mod routes;
pub mod search;

pub use errors::{AnalysisError, ColorLookupError, GatewayError};
pub use models::{Admission, AppState, ClientWindow, Consumption, UsageCounter, UsageReport};
