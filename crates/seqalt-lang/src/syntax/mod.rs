pub mod lexer;
pub mod node;
pub mod parser;
pub mod token;
