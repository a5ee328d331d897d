pub mod cursor;
pub mod gamepad;
pub mod input;
pub mod presenter;
pub mod renderer;
pub mod sound;
