pub mod config;
pub mod data;
pub mod goal;
pub mod helpers;
pub mod track;
pub mod workout;
