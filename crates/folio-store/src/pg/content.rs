//! Content tables: projects, skills, contacts, posts

use async_trait::async_trait;
use folio_core::{Contact, ContentRepository, Post, Project, Result, Skill};
use sqlx::FromRow;

use super::{db_error, expect_affected, PgStore};

#[derive(Debug, FromRow)]
struct ProjectRow {
    id: String,
    title: String,
    description: String,
    tags: Vec<String>,
    url: String,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Project {
            id: row.id,
            title: row.title,
            description: row.description,
            tags: row.tags,
            url: row.url,
        }
    }
}

#[async_trait]
impl ContentRepository<Project> for PgStore {
    async fn list(&self) -> Result<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            "SELECT id, title, description, tags, url FROM projects",
        )
        .fetch_all(self.pool())
        .await
        .map_err(|e| db_error("Failed to list projects", e))?;

        Ok(rows.into_iter().map(Project::from).collect())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Project>> {
        let row = sqlx::query_as::<_, ProjectRow>(
            "SELECT id, title, description, tags, url FROM projects WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| db_error("Failed to fetch project", e))?;

        Ok(row.map(Project::from))
    }

    async fn create(&self, item: &Project) -> Result<()> {
        sqlx::query(
            "INSERT INTO projects (id, title, description, tags, url) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&item.id)
        .bind(&item.title)
        .bind(&item.description)
        .bind(&item.tags)
        .bind(&item.url)
        .execute(self.pool())
        .await
        .map_err(|e| db_error("Failed to create project", e))?;

        Ok(())
    }

    async fn update(&self, item: &Project) -> Result<()> {
        let result = sqlx::query(
            "UPDATE projects SET title = $2, description = $3, tags = $4, url = $5 WHERE id = $1",
        )
        .bind(&item.id)
        .bind(&item.title)
        .bind(&item.description)
        .bind(&item.tags)
        .bind(&item.url)
        .execute(self.pool())
        .await
        .map_err(|e| db_error("Failed to update project", e))?;

        expect_affected(result.rows_affected(), "projects", &item.id)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(|e| db_error("Failed to delete project", e))?;

        expect_affected(result.rows_affected(), "projects", id)
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

#[derive(Debug, FromRow)]
struct SkillRow {
    id: String,
    name: String,
    level: i32,
    category: String,
}

impl From<SkillRow> for Skill {
    fn from(row: SkillRow) -> Self {
        Skill {
            id: row.id,
            name: row.name,
            level: row.level,
            category: row.category,
        }
    }
}

#[async_trait]
impl ContentRepository<Skill> for PgStore {
    async fn list(&self) -> Result<Vec<Skill>> {
        let rows = sqlx::query_as::<_, SkillRow>("SELECT id, name, level, category FROM skills")
            .fetch_all(self.pool())
            .await
            .map_err(|e| db_error("Failed to list skills", e))?;

        Ok(rows.into_iter().map(Skill::from).collect())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Skill>> {
        let row = sqlx::query_as::<_, SkillRow>(
            "SELECT id, name, level, category FROM skills WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| db_error("Failed to fetch skill", e))?;

        Ok(row.map(Skill::from))
    }

    async fn create(&self, item: &Skill) -> Result<()> {
        sqlx::query("INSERT INTO skills (id, name, level, category) VALUES ($1, $2, $3, $4)")
            .bind(&item.id)
            .bind(&item.name)
            .bind(item.level)
            .bind(&item.category)
            .execute(self.pool())
            .await
            .map_err(|e| db_error("Failed to create skill", e))?;

        Ok(())
    }

    async fn update(&self, item: &Skill) -> Result<()> {
        let result =
            sqlx::query("UPDATE skills SET name = $2, level = $3, category = $4 WHERE id = $1")
                .bind(&item.id)
                .bind(&item.name)
                .bind(item.level)
                .bind(&item.category)
                .execute(self.pool())
                .await
                .map_err(|e| db_error("Failed to update skill", e))?;

        expect_affected(result.rows_affected(), "skills", &item.id)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM skills WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(|e| db_error("Failed to delete skill", e))?;

        expect_affected(result.rows_affected(), "skills", id)
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

#[derive(Debug, FromRow)]
struct ContactRow {
    id: String,
    email: String,
    telegram: String,
    linkedin: String,
    github: String,
}

impl From<ContactRow> for Contact {
    fn from(row: ContactRow) -> Self {
        Contact {
            id: row.id,
            email: row.email,
            telegram: row.telegram,
            linkedin: row.linkedin,
            github: row.github,
        }
    }
}

#[async_trait]
impl ContentRepository<Contact> for PgStore {
    async fn list(&self) -> Result<Vec<Contact>> {
        let rows = sqlx::query_as::<_, ContactRow>(
            "SELECT id, email, telegram, linkedin, github FROM contacts",
        )
        .fetch_all(self.pool())
        .await
        .map_err(|e| db_error("Failed to list contacts", e))?;

        Ok(rows.into_iter().map(Contact::from).collect())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Contact>> {
        let row = sqlx::query_as::<_, ContactRow>(
            "SELECT id, email, telegram, linkedin, github FROM contacts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| db_error("Failed to fetch contact", e))?;

        Ok(row.map(Contact::from))
    }

    async fn create(&self, item: &Contact) -> Result<()> {
        sqlx::query(
            "INSERT INTO contacts (id, email, telegram, linkedin, github) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&item.id)
        .bind(&item.email)
        .bind(&item.telegram)
        .bind(&item.linkedin)
        .bind(&item.github)
        .execute(self.pool())
        .await
        .map_err(|e| db_error("Failed to create contact", e))?;

        Ok(())
    }

    async fn update(&self, item: &Contact) -> Result<()> {
        let result = sqlx::query(
            "UPDATE contacts SET email = $2, telegram = $3, linkedin = $4, github = $5 WHERE id = $1",
        )
        .bind(&item.id)
        .bind(&item.email)
        .bind(&item.telegram)
        .bind(&item.linkedin)
        .bind(&item.github)
        .execute(self.pool())
        .await
        .map_err(|e| db_error("Failed to update contact", e))?;

        expect_affected(result.rows_affected(), "contacts", &item.id)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(|e| db_error("Failed to delete contact", e))?;

        expect_affected(result.rows_affected(), "contacts", id)
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

#[derive(Debug, FromRow)]
struct PostRow {
    id: String,
    title: String,
    content: String,
    tags: Vec<String>,
    published_at: String,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: row.id,
            title: row.title,
            content: row.content,
            tags: row.tags,
            published_at: row.published_at,
        }
    }
}

#[async_trait]
impl ContentRepository<Post> for PgStore {
    async fn list(&self) -> Result<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(
            "SELECT id, title, content, tags, published_at FROM posts",
        )
        .fetch_all(self.pool())
        .await
        .map_err(|e| db_error("Failed to list posts", e))?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>(
            "SELECT id, title, content, tags, published_at FROM posts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| db_error("Failed to fetch post", e))?;

        Ok(row.map(Post::from))
    }

    async fn create(&self, item: &Post) -> Result<()> {
        sqlx::query(
            "INSERT INTO posts (id, title, content, tags, published_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&item.id)
        .bind(&item.title)
        .bind(&item.content)
        .bind(&item.tags)
        .bind(&item.published_at)
        .execute(self.pool())
        .await
        .map_err(|e| db_error("Failed to create post", e))?;

        Ok(())
    }

    async fn update(&self, item: &Post) -> Result<()> {
        let result = sqlx::query(
            "UPDATE posts SET title = $2, content = $3, tags = $4, published_at = $5 WHERE id = $1",
        )
        .bind(&item.id)
        .bind(&item.title)
        .bind(&item.content)
        .bind(&item.tags)
        .bind(&item.published_at)
        .execute(self.pool())
        .await
        .map_err(|e| db_error("Failed to update post", e))?;

        expect_affected(result.rows_affected(), "posts", &item.id)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(|e| db_error("Failed to delete post", e))?;

        expect_affected(result.rows_affected(), "posts", id)
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
