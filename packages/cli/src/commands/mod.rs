pub mod check;
pub mod eval;

pub use check::{check, CheckArgs};
pub use eval::{eval, EvalArgs};
