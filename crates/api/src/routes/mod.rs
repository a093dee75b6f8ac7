//! HTTP route handlers

pub mod cron;
pub mod groups;
pub mod health;
pub mod leaderboard;
pub mod repos;
pub mod users;
pub mod webhooks;
