pub mod admin_model;
pub mod blog_model;
