use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "articles")]
pub struct Model {
    /// UUID v4, assigned at creation
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub slug: String,

    pub title: String,

    pub excerpt: String,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    pub author: String,

    pub category: String,

    /// JSON array of strings
    pub tags: String,

    pub image_url: Option<String>,

    pub video_url: Option<String>,

    pub featured: bool,

    /// "draft" | "published"
    pub status: String,

    pub read_time: i32,

    /// Set once at creation; behaves as the creation timestamp.
    pub published_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
