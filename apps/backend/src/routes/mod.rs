pub mod auth;
pub mod cards;
pub mod game;
pub mod stats;
pub mod subjects;
