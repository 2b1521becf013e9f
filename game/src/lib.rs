pub mod best_score;
pub mod detector;
pub mod gesture;
pub mod gesture_worker;
pub mod input_adapter;
pub mod intent;
pub mod landmark_feed;
pub mod playtest;
pub mod runner_core;
pub mod settings;
pub mod spawner;
pub mod state;
pub mod tuning;
pub mod view;
