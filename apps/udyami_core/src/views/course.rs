use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoActiveModel, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::errors::{is_unique_violation, ApiError};
use crate::models::{
    course::{self, Entity as Course, Level},
    enrollment::{self, Entity as Enrollment},
    lesson::{self, Entity as Lesson},
    lesson_completion::{self, Entity as Completion},
    user::Entity as User,
    user_progress::{self, Entity as Progress},
};
use crate::serializers::common::{DataResp, MessageResp, Paginated};
use crate::serializers::course::{
    CourseDetailOut, CourseListQuery, CourseOut, CreateCourseReq, LessonIn, ProgressOut,
    UpdateCourseReq,
};
use crate::views::{like_pattern, page_offset, require_owner_or_admin, user_auth::current_user};
use crate::AppState;

const MAX_PAGE_SIZE: u64 = 100;

// ---------- catalogue ----------

fn list_filter(q: &CourseListQuery) -> Condition {
    let mut cond = Condition::all();
    if let Some(cat) = q.category {
        cond = cond.add(course::Column::Category.eq(cat));
    }
    if let Some(level) = q.level {
        cond = cond.add(course::Column::Level.eq(level));
    }
    if let Some(kw) = q.keyword.as_deref().filter(|s| !s.trim().is_empty()) {
        let needle = like_pattern(kw.trim());
        cond = cond.add(
            Condition::any()
                .add(
                    Expr::expr(Func::lower(Expr::col(course::Column::Title)))
                        .like(needle.clone()),
                )
                .add(
                    Expr::expr(Func::lower(Expr::col(course::Column::Description))).like(needle),
                ),
        );
    }
    cond
}

pub async fn list(
    State(state): State<AppState>,
    Query(q): Query<CourseListQuery>,
) -> Result<Json<Paginated<CourseOut>>, ApiError> {
    let page = q.page.unwrap_or(1).max(1);
    let limit = q.limit.unwrap_or(10).clamp(1, MAX_PAGE_SIZE);
    let cond = list_filter(&q);

    let total = Course::find().filter(cond.clone()).count(&state.db).await?;

    let rows = Course::find()
        .filter(cond)
        .find_also_related(User)
        .order_by(course::Column::CreatedAt, Order::Desc)
        .offset(page_offset(page, limit))
        .limit(limit)
        .all(&state.db)
        .await?;

    let data = rows
        .into_iter()
        .map(|(c, instructor)| CourseOut::from_model(c, instructor))
        .collect();

    Ok(Json(Paginated::new(data, total, page, limit)))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DataResp<CourseDetailOut>>, ApiError> {
    let Some((found, instructor)) = Course::find_by_id(id)
        .find_also_related(User)
        .one(&state.db)
        .await?
    else {
        return Err(ApiError::not_found("Course not found"));
    };

    let lessons = Lesson::find()
        .filter(lesson::Column::CourseId.eq(id))
        .order_by(lesson::Column::Position, Order::Asc)
        .all(&state.db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let enrolled_count = Enrollment::find()
        .filter(enrollment::Column::CourseId.eq(id))
        .count(&state.db)
        .await?;

    Ok(Json(DataResp::new(CourseDetailOut {
        course: CourseOut::from_model(found, instructor),
        lessons,
        enrolled_count,
    })))
}

async fn insert_lessons(
    state: &AppState,
    course_id: i64,
    lessons: Vec<LessonIn>,
) -> Result<(), ApiError> {
    for (idx, l) in lessons.into_iter().enumerate() {
        lesson::ActiveModel {
            id: NotSet,
            course_id: Set(course_id),
            title: Set(l.title),
            description: Set(l.description),
            content: Set(l.content),
            video_url: Set(l.video_url),
            duration: Set(l.duration.max(0)),
            position: Set(l.position.unwrap_or(idx as i32)),
        }
        .insert(&state.db)
        .await?;
    }
    Ok(())
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateCourseReq>,
) -> Result<(StatusCode, Json<DataResp<CourseOut>>), ApiError> {
    let requester = current_user(&state, &headers).await?;

    let title = req.title.trim();
    if title.is_empty() || title.len() > 100 {
        return Err(ApiError::validation("Title must be 1-100 characters"));
    }
    if req.description.trim().is_empty() {
        return Err(ApiError::validation("Description is required"));
    }

    let now = Utc::now();
    let created = course::ActiveModel {
        id: NotSet,
        title: Set(title.to_string()),
        description: Set(req.description),
        category: Set(req.category),
        level: Set(req.level.unwrap_or(Level::Beginner)),
        thumbnail: Set(req.thumbnail.unwrap_or_default()),
        language: Set(req.language.unwrap_or_else(|| "en".to_string())),
        instructor_id: Set(requester.id),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await?;

    insert_lessons(&state, created.id, req.lessons).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResp::new(CourseOut::from_model(created, Some(requester)))),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(req): Json<UpdateCourseReq>,
) -> Result<Json<DataResp<CourseOut>>, ApiError> {
    let requester = current_user(&state, &headers).await?;
    let found = Course::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Course not found"))?;
    require_owner_or_admin(&requester, found.instructor_id, "course")?;

    let mut am = found.into_active_model();
    if let Some(title) = req.title {
        let title = title.trim().to_string();
        if title.is_empty() || title.len() > 100 {
            return Err(ApiError::validation("Title must be 1-100 characters"));
        }
        am.title = Set(title);
    }
    if let Some(description) = req.description {
        am.description = Set(description);
    }
    if let Some(category) = req.category {
        am.category = Set(category);
    }
    if let Some(level) = req.level {
        am.level = Set(level);
    }
    if let Some(thumbnail) = req.thumbnail {
        am.thumbnail = Set(thumbnail);
    }
    if let Some(language) = req.language {
        am.language = Set(language);
    }
    am.updated_at = Set(Utc::now());
    let updated = am.update(&state.db).await?;

    if let Some(lessons) = req.lessons {
        Lesson::delete_many()
            .filter(lesson::Column::CourseId.eq(id))
            .exec(&state.db)
            .await?;
        insert_lessons(&state, id, lessons).await?;
    }

    let instructor = User::find_by_id(updated.instructor_id).one(&state.db).await?;
    Ok(Json(DataResp::new(CourseOut::from_model(updated, instructor))))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<DataResp<serde_json::Value>>, ApiError> {
    let requester = current_user(&state, &headers).await?;
    let found = Course::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Course not found"))?;
    require_owner_or_admin(&requester, found.instructor_id, "course")?;

    Course::delete_by_id(id).exec(&state.db).await?;
    Ok(Json(DataResp::new(serde_json::json!({}))))
}

// ---------- enrollment & progress ----------

pub async fn enroll(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<MessageResp>, ApiError> {
    let requester = current_user(&state, &headers).await?;
    Course::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Course not found"))?;

    let res = enrollment::ActiveModel {
        id: NotSet,
        course_id: Set(id),
        user_id: Set(requester.id),
        joined_at: Set(Utc::now()),
    }
    .insert(&state.db)
    .await;

    // enrolling twice is a no-op
    match res {
        Ok(_) => {}
        Err(e) if is_unique_violation(&e) => {}
        Err(e) => return Err(e.into()),
    }

    Ok(Json(MessageResp::new("Enrolled")))
}

/// Rounded completion percentage; a course with no lessons reads as 0.
pub(crate) fn completion_percentage(completed: usize, total: usize) -> u32 {
    if total == 0 {
        0
    } else {
        (completed as f64 / total as f64 * 100.0).round() as u32
    }
}

async fn progress_out(
    state: &AppState,
    user_id: i64,
    course_id: i64,
    row: Option<user_progress::Model>,
) -> Result<ProgressOut, ApiError> {
    let total = Lesson::find()
        .filter(lesson::Column::CourseId.eq(course_id))
        .count(&state.db)
        .await? as usize;

    let (completed_lessons, last_accessed_at) = match row {
        Some(p) => {
            let done: Vec<i64> = Completion::find()
                .filter(lesson_completion::Column::ProgressId.eq(p.id))
                .all(&state.db)
                .await?
                .into_iter()
                .map(|c| c.lesson_id)
                .collect();
            (done, Some(p.last_accessed_at))
        }
        None => (Vec::new(), None),
    };

    Ok(ProgressOut {
        user_id,
        course_id,
        progress_percentage: completion_percentage(completed_lessons.len(), total),
        completed_lessons,
        last_accessed_at,
    })
}

pub async fn progress(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<DataResp<ProgressOut>>, ApiError> {
    let requester = current_user(&state, &headers).await?;
    Course::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Course not found"))?;

    let row = Progress::find()
        .filter(user_progress::Column::UserId.eq(requester.id))
        .filter(user_progress::Column::CourseId.eq(id))
        .one(&state.db)
        .await?;

    let out = progress_out(&state, requester.id, id, row).await?;
    Ok(Json(DataResp::new(out)))
}

async fn find_or_create_progress(
    state: &AppState,
    user_id: i64,
    course_id: i64,
) -> Result<user_progress::Model, ApiError> {
    if let Some(existing) = Progress::find()
        .filter(user_progress::Column::UserId.eq(user_id))
        .filter(user_progress::Column::CourseId.eq(course_id))
        .one(&state.db)
        .await?
    {
        return Ok(existing);
    }

    let now = Utc::now();
    let res = user_progress::ActiveModel {
        id: NotSet,
        user_id: Set(user_id),
        course_id: Set(course_id),
        last_accessed_at: Set(now),
        created_at: Set(now),
    }
    .insert(&state.db)
    .await;

    match res {
        Ok(created) => Ok(created),
        // a concurrent request won the insert; read their row back
        Err(e) if is_unique_violation(&e) => Progress::find()
            .filter(user_progress::Column::UserId.eq(user_id))
            .filter(user_progress::Column::CourseId.eq(course_id))
            .one(&state.db)
            .await?
            .ok_or_else(|| ApiError::Db(e)),
        Err(e) => Err(e.into()),
    }
}

pub async fn complete_lesson(
    State(state): State<AppState>,
    Path((id, lesson_id)): Path<(i64, i64)>,
    headers: HeaderMap,
) -> Result<Json<DataResp<ProgressOut>>, ApiError> {
    let requester = current_user(&state, &headers).await?;

    let found = Lesson::find_by_id(lesson_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Lesson not found"))?;
    if found.course_id != id {
        return Err(ApiError::not_found("Lesson not found"));
    }

    let row = find_or_create_progress(&state, requester.id, id).await?;

    let res = lesson_completion::ActiveModel {
        id: NotSet,
        progress_id: Set(row.id),
        lesson_id: Set(lesson_id),
        completed_at: Set(Utc::now()),
    }
    .insert(&state.db)
    .await;

    match res {
        Ok(_) => {}
        Err(e) if is_unique_violation(&e) => {}
        Err(e) => return Err(e.into()),
    }

    let mut am = row.clone().into_active_model();
    am.last_accessed_at = Set(Utc::now());
    let row = am.update(&state.db).await?;

    let out = progress_out(&state, requester.id, id, Some(row)).await?;
    Ok(Json(DataResp::new(out)))
}

#[cfg(test)]
mod tests {
    use super::completion_percentage;

    #[test]
    fn percentage_rounds_to_nearest() {
        assert_eq!(completion_percentage(1, 3), 33);
        assert_eq!(completion_percentage(2, 3), 67);
        assert_eq!(completion_percentage(3, 3), 100);
    }

    #[test]
    fn no_lessons_means_zero() {
        assert_eq!(completion_percentage(0, 0), 0);
    }
}
