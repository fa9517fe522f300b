pub mod comment;
pub mod course;
pub mod enrollment;
pub mod lesson;
pub mod lesson_completion;
pub mod post;
pub mod post_like;
pub mod product;
pub mod review;
pub mod user;
pub mod user_progress;
