//! Blog Service
//!
//! Blog CRUD. Inline base64 images are moved out of the HTML into their
//! own table and referenced by URL.

use crate::api::types::{
    BlogListResponse, BlogRequest, BlogResponse, BlogSavedResponse, MessageResponse,
};
use crate::db::sqlite::models::{InlineImage, StoredImage};
use crate::error::{AppError, Result};
use crate::state::AppState;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use regex::Regex;
use tracing::{info, warn};

const INLINE_IMAGE_PATTERN: &str = r#"src="data:(image/[^;]+);base64,([^"]+)""#;

/// Blog service for business logic
pub struct BlogService;

impl BlogService {
    /// Find every `src="data:image/...;base64,..."` attribute in the HTML.
    ///
    /// Images whose payload is not valid base64 are left in place.
    pub fn extract_images(content: &str) -> Result<Vec<InlineImage>> {
        let pattern = Regex::new(INLINE_IMAGE_PATTERN)
            .map_err(|e| AppError::Internal(format!("Invalid image pattern: {}", e)))?;

        let mut images = Vec::new();
        for caps in pattern.captures_iter(content) {
            let mime_type = &caps[1];
            let encoded = &caps[2];

            match STANDARD.decode(encoded) {
                Ok(data) => images.push(InlineImage {
                    mime_type: mime_type.to_string(),
                    data,
                    data_url: format!("data:{};base64,{}", mime_type, encoded),
                }),
                Err(e) => warn!("Skipping inline {} image: {}", mime_type, e),
            }
        }

        Ok(images)
    }

    fn required_fields(request: &BlogRequest) -> Result<(&str, &str)> {
        match (request.title.as_deref(), request.content.as_deref()) {
            (Some(title), Some(content)) if !title.is_empty() && !content.is_empty() => {
                Ok((title, content))
            }
            _ => Err(AppError::Validation(
                "Title and content are required".to_string(),
            )),
        }
    }

    pub fn create(state: &AppState, request: &BlogRequest) -> Result<BlogSavedResponse> {
        let (title, content) = Self::required_fields(request)?;
        let images = Self::extract_images(content)?;

        info!("BlogService::create - {:?}, {} image(s)", title, images.len());
        let blog_id = state.sqlite.create_blog(title, content, &images)?;

        Ok(BlogSavedResponse {
            success: true,
            blog_id,
        })
    }

    /// Replace a blog's title and content; its old images are dropped
    pub fn update(state: &AppState, id: i64, request: &BlogRequest) -> Result<BlogSavedResponse> {
        let (title, content) = Self::required_fields(request)?;
        let images = Self::extract_images(content)?;

        info!("BlogService::update - blog {}, {} image(s)", id, images.len());
        if !state.sqlite.update_blog(id, title, content, &images)? {
            return Err(AppError::NotFound("Blog not found".to_string()));
        }

        Ok(BlogSavedResponse {
            success: true,
            blog_id: id,
        })
    }

    pub fn list(state: &AppState) -> Result<BlogListResponse> {
        Ok(BlogListResponse {
            success: true,
            blogs: state.sqlite.list_blogs()?,
        })
    }

    pub fn get(state: &AppState, id: i64) -> Result<BlogResponse> {
        let blog = state
            .sqlite
            .get_blog(id)?
            .ok_or_else(|| AppError::NotFound("Blog not found".to_string()))?;

        Ok(BlogResponse {
            success: true,
            blog,
        })
    }

    pub fn delete(state: &AppState, id: i64) -> Result<MessageResponse> {
        info!("BlogService::delete - blog {}", id);
        if !state.sqlite.delete_blog(id)? {
            return Err(AppError::NotFound("Blog not found".to_string()));
        }
        Ok(MessageResponse::ok("Blog deleted"))
    }

    pub fn image(state: &AppState, id: i64) -> Result<StoredImage> {
        state
            .sqlite
            .get_image(id)?
            .ok_or_else(|| AppError::NotFound("Image not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::db::sqlite::SqliteDb;

    fn test_state() -> AppState {
        AppState::with_database(SqliteDb::open_in_memory().unwrap(), ServerConfig::default())
    }

    fn request(title: &str, content: &str) -> BlogRequest {
        BlogRequest {
            title: Some(title.to_string()),
            content: Some(content.to_string()),
        }
    }

    #[test]
    fn test_extract_images() {
        let html = concat!(
            r#"<p>a</p><img src="data:image/png;base64,aGVsbG8=">"#,
            r#"<img src="data:image/jpeg;base64,!!not-base64!!">"#,
        );

        let images = BlogService::extract_images(html).unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].mime_type, "image/png");
        assert_eq!(images[0].data, b"hello");
        assert_eq!(images[0].data_url, "data:image/png;base64,aGVsbG8=");
    }

    #[test]
    fn test_create_requires_title_and_content() {
        let state = test_state();

        for bad in [request("", "body"), request("title", ""), BlogRequest::default()] {
            let err = BlogService::create(&state, &bad).unwrap_err();
            assert_eq!(err.client_message(), "Title and content are required");
        }
    }

    #[test]
    fn test_blog_lifecycle() {
        let state = test_state();
        let html = r#"<h2>Plan</h2><img src="data:image/png;base64,aGVsbG8=">"#;

        let created = BlogService::create(&state, &request("Plan", html)).unwrap();
        let blog = BlogService::get(&state, created.blog_id).unwrap().blog;
        assert!(blog.content.contains(r#"src="/api/images/"#));

        let image_id: i64 = blog
            .content
            .split("/api/images/")
            .nth(1)
            .and_then(|rest| rest.split('"').next())
            .unwrap()
            .parse()
            .unwrap();
        let image = BlogService::image(&state, image_id).unwrap();
        assert_eq!(image.data, b"hello");

        BlogService::update(&state, created.blog_id, &request("Plan v2", "<p>no images</p>")).unwrap();
        assert!(matches!(
            BlogService::image(&state, image_id),
            Err(AppError::NotFound(_))
        ));

        assert_eq!(BlogService::list(&state).unwrap().blogs.len(), 1);
        assert_eq!(
            BlogService::delete(&state, created.blog_id).unwrap().message,
            "Blog deleted"
        );
        assert!(matches!(
            BlogService::get(&state, created.blog_id),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_update_missing_blog() {
        let state = test_state();
        let err = BlogService::update(&state, 42, &request("t", "c")).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
