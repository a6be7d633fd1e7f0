//! OpenAPI document (utoipa metadata), served at `/api-docs/openapi.json`.

use utoipa::OpenApi;

use crate::handlers::projects::{CreateProjectBody, StatusBody};
use crate::handlers::tasks::{AttachmentBody, CreateTaskBody};
use taskdeck_core::{
    Attachment, DeletedTasks, Project, ProjectDetail, ProjectStatus, Task, TaskDetail, TaskStatus,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Taskdeck API",
        description = "Projects, tasks, subtasks and attachment metadata"
    ),
    tags(
        (name = "Projects", description = "Project CRUD and status workflow"),
        (name = "Tasks", description = "Task CRUD, subtasks, attachments and cascade delete"),
        (name = "Events", description = "Server-Sent Events stream")
    ),
    components(schemas(
        Project,
        ProjectStatus,
        ProjectDetail,
        Task,
        TaskStatus,
        TaskDetail,
        Attachment,
        DeletedTasks,
        CreateProjectBody,
        CreateTaskBody,
        AttachmentBody,
        StatusBody
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_models() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let schemas = &doc["components"]["schemas"];
        for name in ["Project", "Task", "Attachment", "TaskStatus", "ProjectStatus"] {
            assert!(schemas.get(name).is_some(), "missing schema {}", name);
        }
        assert_eq!(doc["info"]["title"], "Taskdeck API");
    }
}
