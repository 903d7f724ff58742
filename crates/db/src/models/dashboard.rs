use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use ts_rs::TS;

use super::{
    career_application::CareerApplication, message::Message, project::Project, task::Task,
    whatsapp::WhatsAppChat,
};

/// Row counts shown on the admin landing page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct DashboardCounts {
    pub clients: i64,
    pub active_projects: i64,
    pub open_tasks: i64,
    pub unread_messages: i64,
    pub new_applications: i64,
    pub unread_chats: i64,
}

impl DashboardCounts {
    pub async fn fetch(pool: &SqlitePool) -> Result<Self, sqlx::Error> {
        let clients: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clients")
            .fetch_one(pool)
            .await?;

        Ok(Self {
            clients,
            active_projects: Project::count_active(pool).await?,
            open_tasks: Task::count_open(pool).await?,
            unread_messages: Message::count_unread(pool).await?,
            new_applications: CareerApplication::count_new(pool).await?,
            unread_chats: WhatsAppChat::count_unread(pool).await?,
        })
    }
}
