//! Track discovery in a music folder

pub mod scanner;

pub use scanner::scan;
