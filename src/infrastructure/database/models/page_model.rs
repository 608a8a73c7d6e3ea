use chrono::{DateTime, Utc};
use diesel::prelude::*;
use pgvector::Vector;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::PageChunk;
use crate::infrastructure::database::schema::pages;

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Identifiable)]
#[diesel(table_name = pages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PageModel {
    pub id: Uuid,
    pub project: String,
    pub path: String,
    pub title: String,
    pub content: String,
    pub checksum: String,
    pub chunk_index: i32,
    pub embedding: Option<Vector>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = pages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewPageModel {
    pub id: Uuid,
    pub project: String,
    pub path: String,
    pub title: String,
    pub content: String,
    pub checksum: String,
    pub chunk_index: i32,
    pub embedding: Option<Vector>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&PageChunk> for NewPageModel {
    fn from(chunk: &PageChunk) -> Self {
        Self {
            id: chunk.id(),
            project: chunk.project().to_string(),
            path: chunk.path().to_string(),
            title: chunk.title().to_string(),
            content: chunk.content().to_string(),
            checksum: chunk.checksum().to_string(),
            chunk_index: chunk.chunk_index(),
            embedding: chunk.embedding().map(|v| Vector::from(v.to_vec())),
            created_at: chunk.created_at(),
            updated_at: chunk.updated_at(),
        }
    }
}

impl From<PageModel> for PageChunk {
    fn from(model: PageModel) -> Self {
        PageChunk::restore(
            model.id,
            model.project,
            model.path,
            model.title,
            model.content,
            model.checksum,
            model.chunk_index,
            model.embedding.map(|v| v.to_vec()),
            model.created_at,
            model.updated_at,
        )
    }
}
