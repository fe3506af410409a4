#![allow(dead_code)]

pub mod config_env;
pub mod server;
pub mod wav;
