pub mod animation;
pub mod input;
pub mod mask;
pub mod rect;
pub mod time;
