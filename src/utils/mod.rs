pub mod debounce;
pub mod trimmed_string;

pub use debounce::Debouncer;
pub use trimmed_string::TrimmedString;
