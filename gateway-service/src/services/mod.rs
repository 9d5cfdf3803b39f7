pub mod extract;
pub mod providers;

pub use extract::extract_text;
