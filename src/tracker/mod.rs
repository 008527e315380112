pub mod engine;
pub mod events;
pub mod model;
pub mod steps;
pub mod view;
