pub mod arg_parser;
pub mod commands;
pub mod device;
pub mod errors;
pub mod logger;
pub mod pstate;
