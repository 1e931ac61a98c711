pub mod caption;
pub mod cron;
pub mod health;
pub mod posts;
pub mod scheduler;
pub mod settings;
