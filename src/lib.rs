pub mod config;
pub mod constants;
pub mod corpus;
pub mod emitter;
pub mod error;
pub mod input;
pub mod logging;
pub mod pipeline;
pub mod resolver;
