pub mod cli;
pub mod resolver;
