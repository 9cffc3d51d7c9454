// Task resource: ownership-scoped CRUD over to-do items

pub mod handlers;
pub mod models;

pub use models::{CreateTask, Task, UpdateTask};
