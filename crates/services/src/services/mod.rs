pub mod admin_token;
pub mod ai_chat;
pub mod config;
pub mod language;
pub mod onboarding;
pub mod pricing;
pub mod schedule;
pub mod timer;
pub mod whatsapp;
