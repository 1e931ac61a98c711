pub mod bot_config;
pub mod post;
