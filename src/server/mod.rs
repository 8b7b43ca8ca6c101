mod accounts;
mod bundles;
pub mod dto;
mod plans;
mod purchases;
pub mod response;
mod router;
mod subscriptions;
pub mod validation;
mod videos;

pub use router::{AppState, create_router};
