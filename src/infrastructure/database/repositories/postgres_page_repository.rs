use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use pgvector::Vector;
use uuid::Uuid;

use crate::domain::entities::PageChunk;
use crate::domain::repositories::{PageRepository, PageRepositoryError};
use crate::infrastructure::database::models::{NewPageModel, PageModel};
use crate::infrastructure::database::schema::pages::dsl::*;
use crate::infrastructure::database::{DbPool, get_connection_from_pool};

pub struct PostgresPageRepository {
    pool: DbPool,
}

impl PostgresPageRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PageRepository for PostgresPageRepository {
    async fn upsert(&self, chunk: &PageChunk) -> Result<(), PageRepositoryError> {
        let mut conn = get_connection_from_pool(&self.pool)
            .map_err(|e| PageRepositoryError::DatabaseError(e.to_string()))?;

        let new_page = NewPageModel::from(chunk);

        diesel::insert_into(pages)
            .values(&new_page)
            .on_conflict((project, path, chunk_index))
            .do_update()
            .set(&new_page)
            .execute(&mut conn)
            .map_err(|e| PageRepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn get_by_project(
        &self,
        project_param: &str,
    ) -> Result<Vec<PageChunk>, PageRepositoryError> {
        let mut conn = get_connection_from_pool(&self.pool)
            .map_err(|e| PageRepositoryError::DatabaseError(e.to_string()))?;

        let models = pages
            .filter(project.eq(project_param))
            .order((path.asc(), chunk_index.asc()))
            .load::<PageModel>(&mut conn)
            .map_err(|e| PageRepositoryError::DatabaseError(e.to_string()))?;

        Ok(models.into_iter().map(PageChunk::from).collect())
    }

    async fn get_by_path(
        &self,
        project_param: &str,
        path_param: &str,
    ) -> Result<Vec<PageChunk>, PageRepositoryError> {
        let mut conn = get_connection_from_pool(&self.pool)
            .map_err(|e| PageRepositoryError::DatabaseError(e.to_string()))?;

        let models = pages
            .filter(project.eq(project_param))
            .filter(path.eq(path_param))
            .order(chunk_index.asc())
            .load::<PageModel>(&mut conn)
            .map_err(|e| PageRepositoryError::DatabaseError(e.to_string()))?;

        Ok(models.into_iter().map(PageChunk::from).collect())
    }

    async fn delete_by_project(&self, project_param: &str) -> Result<usize, PageRepositoryError> {
        let mut conn = get_connection_from_pool(&self.pool)
            .map_err(|e| PageRepositoryError::DatabaseError(e.to_string()))?;

        diesel::delete(pages.filter(project.eq(project_param)))
            .execute(&mut conn)
            .map_err(|e| PageRepositoryError::DatabaseError(e.to_string()))
    }

    async fn delete_by_path(
        &self,
        project_param: &str,
        path_param: &str,
    ) -> Result<usize, PageRepositoryError> {
        let mut conn = get_connection_from_pool(&self.pool)
            .map_err(|e| PageRepositoryError::DatabaseError(e.to_string()))?;

        diesel::delete(
            pages
                .filter(project.eq(project_param))
                .filter(path.eq(path_param)),
        )
        .execute(&mut conn)
        .map_err(|e| PageRepositoryError::DatabaseError(e.to_string()))
    }

    async fn get_without_embedding(
        &self,
        project_param: &str,
    ) -> Result<Vec<PageChunk>, PageRepositoryError> {
        let mut conn = get_connection_from_pool(&self.pool)
            .map_err(|e| PageRepositoryError::DatabaseError(e.to_string()))?;

        let models = pages
            .filter(project.eq(project_param))
            .filter(embedding.is_null())
            .order((path.asc(), chunk_index.asc()))
            .load::<PageModel>(&mut conn)
            .map_err(|e| PageRepositoryError::DatabaseError(e.to_string()))?;

        Ok(models.into_iter().map(PageChunk::from).collect())
    }

    async fn set_embedding(
        &self,
        chunk_id: Uuid,
        vector: Vec<f32>,
    ) -> Result<(), PageRepositoryError> {
        let mut conn = get_connection_from_pool(&self.pool)
            .map_err(|e| PageRepositoryError::DatabaseError(e.to_string()))?;

        let updated = diesel::update(pages.find(chunk_id))
            .set((
                embedding.eq(Some(Vector::from(vector))),
                updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .map_err(|e| PageRepositoryError::DatabaseError(e.to_string()))?;

        if updated == 0 {
            return Err(PageRepositoryError::NotFound(chunk_id));
        }

        Ok(())
    }
}
