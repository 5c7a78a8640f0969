pub mod client;
pub mod renderer;
pub mod request_builder;
pub mod session;

pub use client::MatcherClient;
pub use renderer::render;
pub use request_builder::build_request;
pub use session::{CompareSession, Phase, Status};
