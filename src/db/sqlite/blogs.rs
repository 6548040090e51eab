//! Blog posts and their extracted images

use crate::db::sqlite::models::{Blog, BlogSummary, InlineImage, StoredImage};
use crate::error::Result;
use rusqlite::{params, Connection, OptionalExtension, Transaction};

/// URL under which a stored image is served
pub fn image_url(image_id: i64) -> String {
    format!("/api/images/{}", image_id)
}

/// Insert images for a blog and rewrite their `data:` URLs in the content
fn store_images(
    tx: &Transaction<'_>,
    blog_id: i64,
    content: &str,
    images: &[InlineImage],
) -> Result<String> {
    let mut content = content.to_string();
    let mut stmt = tx.prepare("INSERT INTO images (blog_id, mime_type, data) VALUES (?1, ?2, ?3)")?;

    for image in images {
        stmt.execute(params![blog_id, image.mime_type, image.data])?;
        let url = image_url(tx.last_insert_rowid());
        content = content.replacen(&image.data_url, &url, 1);
    }

    Ok(content)
}

/// Create a blog post, returning its ID
pub fn create_blog(
    conn: &mut Connection,
    title: &str,
    content: &str,
    images: &[InlineImage],
) -> Result<i64> {
    let tx = conn.transaction()?;

    tx.execute(
        "INSERT INTO blogs (title, content) VALUES (?1, ?2)",
        params![title, content],
    )?;
    let blog_id = tx.last_insert_rowid();

    if !images.is_empty() {
        let rewritten = store_images(&tx, blog_id, content, images)?;
        tx.execute(
            "UPDATE blogs SET content = ?1 WHERE id = ?2",
            params![rewritten, blog_id],
        )?;
    }

    tx.commit()?;

    tracing::info!("Created blog {} with {} image(s)", blog_id, images.len());
    Ok(blog_id)
}

/// Replace a blog's title, content and images. Returns false if the blog
/// does not exist.
pub fn update_blog(
    conn: &mut Connection,
    blog_id: i64,
    title: &str,
    content: &str,
    images: &[InlineImage],
) -> Result<bool> {
    let tx = conn.transaction()?;

    let exists: bool = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM blogs WHERE id = ?)",
        [blog_id],
        |row| row.get(0),
    )?;
    if !exists {
        return Ok(false);
    }

    tx.execute("DELETE FROM images WHERE blog_id = ?", [blog_id])?;
    let rewritten = store_images(&tx, blog_id, content, images)?;
    tx.execute(
        "UPDATE blogs SET title = ?1, content = ?2 WHERE id = ?3",
        params![title, rewritten, blog_id],
    )?;

    tx.commit()?;

    tracing::info!("Updated blog {} with {} image(s)", blog_id, images.len());
    Ok(true)
}

/// All blogs, newest first
pub fn list_blogs(conn: &Connection) -> Result<Vec<BlogSummary>> {
    let mut stmt =
        conn.prepare("SELECT id, title, created_at FROM blogs ORDER BY created_at DESC, id DESC")?;

    let blogs = stmt
        .query_map([], |row| {
            Ok(BlogSummary {
                id: row.get(0)?,
                title: row.get(1)?,
                created_at: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(blogs)
}

pub fn get_blog(conn: &Connection, blog_id: i64) -> Result<Option<Blog>> {
    let blog = conn
        .query_row(
            "SELECT id, title, content, created_at FROM blogs WHERE id = ?",
            [blog_id],
            |row| {
                Ok(Blog {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    content: row.get(2)?,
                    created_at: row.get(3)?,
                })
            },
        )
        .optional()?;

    Ok(blog)
}

/// Delete a blog and, through the foreign key, its images
pub fn delete_blog(conn: &Connection, blog_id: i64) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM blogs WHERE id = ?", [blog_id])?;
    Ok(deleted > 0)
}

pub fn get_image(conn: &Connection, image_id: i64) -> Result<Option<StoredImage>> {
    let image = conn
        .query_row(
            "SELECT mime_type, data FROM images WHERE id = ?",
            [image_id],
            |row| {
                Ok(StoredImage {
                    mime_type: row.get(0)?,
                    data: row.get(1)?,
                })
            },
        )
        .optional()?;

    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::migrations::run_migrations;

    fn create_test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys=ON;").unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn png(data_url: &str) -> InlineImage {
        InlineImage {
            mime_type: "image/png".to_string(),
            data: vec![0x89, b'P', b'N', b'G'],
            data_url: data_url.to_string(),
        }
    }

    fn image_count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM images", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_create_rewrites_image_urls() {
        let mut conn = create_test_db();
        let content = r#"<p>chart</p><img src="data:image/png;base64,AAAA">"#;

        let id = create_blog(&mut conn, "Setup", content, &[png("data:image/png;base64,AAAA")]).unwrap();

        let blog = get_blog(&conn, id).unwrap().unwrap();
        assert_eq!(blog.title, "Setup");
        assert!(!blog.content.contains("data:image"));
        assert!(blog.content.contains("/api/images/"));

        let image_id: i64 = conn
            .query_row("SELECT id FROM images WHERE blog_id = ?", [id], |row| row.get(0))
            .unwrap();
        assert!(blog.content.contains(&image_url(image_id)));

        let image = get_image(&conn, image_id).unwrap().unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.data, vec![0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn test_update_replaces_images() {
        let mut conn = create_test_db();
        let first = r#"<img src="data:image/png;base64,AAAA">"#;
        let id = create_blog(&mut conn, "A", first, &[png("data:image/png;base64,AAAA")]).unwrap();
        assert_eq!(image_count(&conn), 1);

        assert!(update_blog(&mut conn, id, "B", "<p>text only</p>", &[]).unwrap());
        assert_eq!(image_count(&conn), 0);

        let blog = get_blog(&conn, id).unwrap().unwrap();
        assert_eq!(blog.title, "B");
        assert_eq!(blog.content, "<p>text only</p>");

        assert!(!update_blog(&mut conn, 999, "x", "y", &[]).unwrap());
    }

    #[test]
    fn test_delete_cascades_to_images() {
        let mut conn = create_test_db();
        let content = r#"<img src="data:image/png;base64,AAAA">"#;
        let id = create_blog(&mut conn, "A", content, &[png("data:image/png;base64,AAAA")]).unwrap();

        assert!(delete_blog(&conn, id).unwrap());
        assert_eq!(image_count(&conn), 0);
        assert!(get_blog(&conn, id).unwrap().is_none());
        assert!(!delete_blog(&conn, id).unwrap());
    }

    #[test]
    fn test_list_newest_first() {
        let mut conn = create_test_db();
        let a = create_blog(&mut conn, "A", "a", &[]).unwrap();
        let b = create_blog(&mut conn, "B", "b", &[]).unwrap();

        let ids: Vec<i64> = list_blogs(&conn).unwrap().iter().map(|b| b.id).collect();
        assert_eq!(ids, [b, a]);
    }
}
