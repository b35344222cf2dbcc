pub mod env;
pub mod gc;
pub mod interpreter;
pub mod stack;
pub mod value;
