pub mod commands;
pub mod http;
pub mod package;
pub mod registry;
pub mod resolver;
