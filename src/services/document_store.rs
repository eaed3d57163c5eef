use async_trait::async_trait;

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::{Document, NewDocument};

/// Metadata store for document records
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a record and return it with its assigned id.
    async fn insert(&self, doc: NewDocument) -> Result<Document>;

    /// All records, newest first. Ties on `uploaded_at` go to the later id.
    async fn list(&self) -> Result<Vec<Document>>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Document>>;

    /// Fails with `NotFound` if no record has this id.
    async fn delete_by_id(&self, id: i64) -> Result<()>;
}

/// SQLite-backed document store
#[derive(Clone)]
pub struct SqliteDocumentStore {
    db: Database,
}

impl SqliteDocumentStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn insert(&self, doc: NewDocument) -> Result<Document> {
        let result = sqlx::query(
            r#"
            INSERT INTO documents (filename, filepath, filesize, uploaded_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&doc.filename)
        .bind(&doc.filepath)
        .bind(doc.filesize)
        .bind(&doc.uploaded_at)
        .execute(self.db.pool())
        .await?;

        Ok(Document {
            id: result.last_insert_rowid(),
            filename: doc.filename,
            filepath: doc.filepath,
            filesize: doc.filesize,
            uploaded_at: doc.uploaded_at,
        })
    }

    async fn list(&self) -> Result<Vec<Document>> {
        let docs: Vec<Document> =
            sqlx::query_as("SELECT * FROM documents ORDER BY uploaded_at DESC, id DESC")
                .fetch_all(self.db.pool())
                .await?;
        Ok(docs)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Document>> {
        let doc: Option<Document> = sqlx::query_as("SELECT * FROM documents WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(doc)
    }

    async fn delete_by_id(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM documents WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Document not found".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> SqliteDocumentStore {
        let db = Database::in_memory().await.unwrap();
        db.run_migrations().await.unwrap();
        SqliteDocumentStore::new(db)
    }

    fn draft(name: &str, uploaded_at: &str) -> NewDocument {
        NewDocument {
            filename: name.to_string(),
            filepath: format!("1700000000000-00000000-{}", name),
            filesize: 1024,
            uploaded_at: uploaded_at.to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let store = test_store().await;
        let a = store.insert(draft("a.pdf", "2024-01-01T00:00:00.000Z")).await.unwrap();
        let b = store.insert(draft("b.pdf", "2024-01-01T00:00:01.000Z")).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);

        let fetched = store.get_by_id(a.id).await.unwrap().unwrap();
        assert_eq!(fetched, a);
    }

    #[tokio::test]
    async fn test_list_newest_first_with_id_tiebreak() {
        let store = test_store().await;
        assert!(store.list().await.unwrap().is_empty());

        store.insert(draft("old.pdf", "2024-01-01T00:00:00.000Z")).await.unwrap();
        store.insert(draft("new.pdf", "2024-03-01T00:00:00.000Z")).await.unwrap();
        store.insert(draft("tie.pdf", "2024-03-01T00:00:00.000Z")).await.unwrap();

        let names: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.filename)
            .collect();
        assert_eq!(names, vec!["tie.pdf", "new.pdf", "old.pdf"]);
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let store = test_store().await;
        assert!(store.get_by_id(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_by_id() {
        let store = test_store().await;
        let doc = store.insert(draft("a.pdf", "2024-01-01T00:00:00.000Z")).await.unwrap();

        store.delete_by_id(doc.id).await.unwrap();
        assert!(store.get_by_id(doc.id).await.unwrap().is_none());

        let err = store.delete_by_id(doc.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
