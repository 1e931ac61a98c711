pub mod caption_service;
pub mod config_service;
pub mod dispatch_service;
pub mod exif_service;
pub mod post_service;
pub mod telegram_service;
pub mod vision_service;
