mod linspace;
mod ols;

pub(crate) use linspace::linspace;
pub use ols::{median, Regression};
