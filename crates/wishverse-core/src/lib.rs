pub mod card;
pub mod color;
pub mod config;
pub mod constants;
pub mod creator;
pub mod data_uri;
pub mod generate;
pub mod imaging;
pub mod manipulate;
pub mod mesh;
pub mod outline;
pub mod scene;
pub mod state;
pub mod wizard;
pub static CAKE_WGSL: &str = include_str!("../shaders/cake.wgsl");

pub use color::*;
pub use config::*;
pub use constants::*;
pub use manipulate::*;
pub use state::*;
pub use wizard::*;
