mod error;
mod listing;
mod registry;

pub use error::RegistryError;
pub use listing::{AppListing, AppRow};
pub use registry::{AppPlugin, Registry};
