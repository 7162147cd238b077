pub mod action;
pub mod export;
pub mod game_log;
pub mod game_state;
pub mod persistence;
pub mod player;
pub mod rule_engine;
pub mod rule_helper;
pub mod setup;
