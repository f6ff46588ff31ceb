use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Publication status of a post.
///
/// Only `Published` posts are visible to readers; everything reader-facing
/// (list, detail, sitemap) filters on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Post entity - a blog post.
///
/// The slug is unique per publish *date* (not globally), which is what makes
/// the date-based canonical URL unambiguous.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub slug: String,
    pub body: String,
    pub published_at: DateTime<Utc>,
    pub status: PostStatus,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new draft. The publish timestamp defaults to creation time;
    /// when no slug is given one is derived from the title.
    pub fn new(author_id: Uuid, title: String, slug: Option<String>, body: String) -> Self {
        let now = Utc::now();
        let slug = slug.unwrap_or_else(|| slug::slugify(&title));
        Self {
            id: Uuid::new_v4(),
            author_id,
            title,
            slug,
            body,
            published_at: now,
            status: PostStatus::Draft,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Draft -> published transition. Idempotent on already-published posts.
    pub fn publish(&mut self) {
        if self.status == PostStatus::Published {
            return;
        }
        self.status = PostStatus::Published;
        self.updated_at = Utc::now();
    }

    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    /// The UTC calendar date the slug uniqueness is scoped to.
    pub fn publish_date(&self) -> NaiveDate {
        self.published_at.date_naive()
    }

    /// Canonical URL path: `/blog/<year>/<month>/<day>/<slug>/`.
    ///
    /// Month and day are unpadded, matching the route patterns.
    pub fn canonical_path(&self) -> String {
        let d = self.publish_date();
        format!(
            "/blog/{}/{}/{}/{}/",
            d.format("%Y"),
            d.format("%-m"),
            d.format("%-d"),
            self.slug
        )
    }
}
