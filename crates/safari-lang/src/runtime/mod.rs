pub mod env;
pub mod interpreter;
pub mod natives;
pub mod value;
