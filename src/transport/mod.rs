/// Local filesystem scanning, reading, and output writing.
pub mod fs;
