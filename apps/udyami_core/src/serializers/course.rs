use sea_orm::prelude::DateTimeUtc;
use serde::{Deserialize, Serialize};

use crate::models::{
    course::{self, Category, Level},
    lesson, user,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseListQuery {
    pub category: Option<Category>,
    pub level: Option<Level>,
    pub keyword: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonIn {
    pub title: String,
    pub description: String,
    pub content: String,
    pub video_url: Option<String>,
    #[serde(default)]
    pub duration: i32,
    pub position: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonOut {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub content: String,
    pub video_url: Option<String>,
    pub duration: i32,
    pub position: i32,
}

impl From<lesson::Model> for LessonOut {
    fn from(l: lesson::Model) -> Self {
        Self {
            id: l.id,
            title: l.title,
            description: l.description,
            content: l.content,
            video_url: l.video_url,
            duration: l.duration,
            position: l.position,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseReq {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub level: Option<Level>,
    pub thumbnail: Option<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub lessons: Vec<LessonIn>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseReq {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub level: Option<Level>,
    pub thumbnail: Option<String>,
    pub language: Option<String>,
    /// When present, replaces the full lesson list.
    pub lessons: Option<Vec<LessonIn>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructorBrief {
    pub id: i64,
    pub name: String,
}

impl From<user::Model> for InstructorBrief {
    fn from(u: user::Model) -> Self {
        Self { id: u.id, name: u.name }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseOut {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub level: Level,
    pub thumbnail: String,
    pub language: String,
    pub instructor: Option<InstructorBrief>,
    pub created_at: DateTimeUtc,
}

impl CourseOut {
    pub fn from_model(c: course::Model, instructor: Option<user::Model>) -> Self {
        Self {
            id: c.id,
            title: c.title,
            description: c.description,
            category: c.category,
            level: c.level,
            thumbnail: c.thumbnail,
            language: c.language,
            instructor: instructor.map(InstructorBrief::from),
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetailOut {
    #[serde(flatten)]
    pub course: CourseOut,
    pub lessons: Vec<LessonOut>,
    pub enrolled_count: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressOut {
    pub user_id: i64,
    pub course_id: i64,
    pub completed_lessons: Vec<i64>,
    pub progress_percentage: u32,
    pub last_accessed_at: Option<DateTimeUtc>,
}
