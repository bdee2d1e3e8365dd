pub mod endpoints;
pub mod fixtures;
pub mod replies;
