pub mod caption_dto;
pub mod config_dto;
pub mod post_dto;
pub mod scheduler_dto;
