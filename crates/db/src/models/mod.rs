//! Database models, one module per table.

pub mod benefit;
pub mod bot_message;
pub mod career_application;
pub mod client;
pub mod dashboard;
pub mod faq;
pub mod message;
pub mod project;
pub mod service_offering;
pub mod social_link;
pub mod step;
pub mod task;
pub mod technology;
pub mod time_log;
pub mod translation;
pub mod whatsapp;
