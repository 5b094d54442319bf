pub mod handlers;
pub mod rate_limit;
pub mod translator;

pub use handlers::{AppState, router};
pub use translator::{LoadStatus, Translation, Translator, UNAVAILABLE_MESSAGE};
