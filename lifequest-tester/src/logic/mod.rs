pub mod reports;
pub mod seeds;
pub mod tester;

pub use seeds::resolve_seeds;
pub use tester::*;
