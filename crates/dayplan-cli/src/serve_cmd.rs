use std::net::SocketAddr;

use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use dayplan_core::ScheduleError;
use dayplan_core::error::parse_list_id;
use dayplan_core::schedule::{ScheduleService, ScheduledTask, TaskDraft};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }
}

impl From<ScheduleError> for AppError {
    fn from(err: ScheduleError) -> Self {
        let message = err.to_string();
        if err.is_client_error() {
            tracing::warn!(error = %message, "request rejected");
        } else {
            tracing::error!(error = %message, "request failed");
        }

        match err {
            ScheduleError::InvalidIdentifier(_) => Self::bad_request(message),
            ScheduleError::NotFound(_) => Self::not_found(message),
            ScheduleError::Parse(_) | ScheduleError::Validation(_) | ScheduleError::Service(_) => {
                Self::internal(message)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "detail": self.message });
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct PlanRequest {
    pub description: String,
    pub start_time: String,
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub tasks: Vec<TaskDraft>,
    pub list_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct TasksResponse {
    pub tasks: Vec<ScheduledTask>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub completed: bool,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// `list_id` stays a string so a malformed id gets the JSON 400 rather than
/// the extractor's plain-text rejection.
#[derive(Debug, Deserialize)]
pub struct ReplanRequest {
    pub list_id: String,
    pub tweak_feedback: String,
    #[serde(default)]
    pub tasks: Vec<ScheduledTask>,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(service: ScheduleService) -> Router {
    Router::new()
        .route("/api/plan", post(plan_handler))
        .route("/api/tasks/{list_id}", get(get_tasks))
        .route("/api/tasks/{list_id}/{task_index}", put(update_task))
        .route("/api/replan", post(replan_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(service: ScheduleService, bind: &str, port: u16) -> Result<()> {
    let app = build_router(service);
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("dayplan serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("dayplan serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn plan_handler(
    State(service): State<ScheduleService>,
    Json(req): Json<PlanRequest>,
) -> Result<Json<PlanResponse>, AppError> {
    let (tasks, list_id) = service.plan(&req.description, &req.start_time).await?;
    Ok(Json(PlanResponse { tasks, list_id }))
}

async fn get_tasks(
    State(service): State<ScheduleService>,
    Path(list_id): Path<String>,
) -> Result<Json<TasksResponse>, AppError> {
    let list_id = parse_list_id(&list_id)?;
    let tasks = service.tasks(list_id).await?;
    Ok(Json(TasksResponse {
        tasks: tasks.into_iter().map(ScheduledTask::from).collect(),
    }))
}

async fn update_task(
    State(service): State<ScheduleService>,
    Path((list_id, task_index)): Path<(String, String)>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    let list_id = parse_list_id(&list_id)?;
    let task_index: i64 = task_index.parse().map_err(|_| {
        tracing::warn!(task_index = %task_index, "request rejected");
        AppError::bad_request(format!("invalid task index: {task_index:?}"))
    })?;

    service
        .set_completed(list_id, task_index, req.completed)
        .await?;
    Ok(Json(SuccessResponse { success: true }))
}

async fn replan_handler(
    State(service): State<ScheduleService>,
    Json(req): Json<ReplanRequest>,
) -> Result<Json<PlanResponse>, AppError> {
    let list_id = parse_list_id(&req.list_id)?;
    let (tasks, list_id) = service
        .replan(list_id, &req.tweak_feedback, &req.tasks)
        .await?;
    Ok(Json(PlanResponse { tasks, list_id }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use sqlx::PgPool;
    use tower::ServiceExt;

    use dayplan_core::model::LanguageModel;
    use dayplan_core::schedule::{ScheduleConfig, ScheduleService};
    use dayplan_test_utils::{create_test_db, drop_test_db};

    const TWO_TASKS: &str = r#"[{"start_time":"09:00","end_time":"09:45","description":"write report"},{"start_time":"09:45","end_time":"10:00","description":"call mom"}]"#;

    /// Answers every prompt with the same text.
    struct FixedModel(&'static str);

    #[async_trait]
    impl LanguageModel for FixedModel {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn prompt(&self, _user_text: &str, _system: &str) -> anyhow::Result<String> {
            Ok(self.0.to_owned())
        }
    }

    // -----------------------------------------------------------------------
    // HTTP helpers
    // -----------------------------------------------------------------------

    fn app(pool: &PgPool, reply: &'static str) -> axum::Router {
        let service = ScheduleService::new(
            pool.clone(),
            Arc::new(FixedModel(reply)),
            ScheduleConfig::default(),
        );
        super::build_router(service)
    }

    async fn send(
        app: axum::Router,
        method: Method,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> axum::response::Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        app.oneshot(request).await.unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1_048_576)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn plan_two_tasks(pool: &PgPool) -> String {
        let resp = send(
            app(pool, TWO_TASKS),
            Method::POST,
            "/api/plan",
            Some(serde_json::json!({
                "description": "write report, call mom",
                "start_time": "09:00",
            })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        json["list_id"].as_str().unwrap().to_owned()
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_plan_then_get_tasks() {
        let (pool, db_name) = create_test_db().await;

        let resp = send(
            app(&pool, TWO_TASKS),
            Method::POST,
            "/api/plan",
            Some(serde_json::json!({
                "description": "write report, call mom",
                "start_time": "09:00",
            })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        let tasks = json["tasks"].as_array().expect("tasks should be an array");
        assert_eq!(tasks.len(), 2);
        assert!(
            tasks[0].get("completed").is_none(),
            "plan response tasks carry no completion flag"
        );
        let list_id = json["list_id"].as_str().expect("list_id should be a string");

        let resp = send(
            app(&pool, TWO_TASKS),
            Method::GET,
            &format!("/api/tasks/{list_id}"),
            None,
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(
            json,
            serde_json::json!({
                "tasks": [
                    {"start_time": "09:00", "end_time": "09:45", "description": "write report", "completed": false},
                    {"start_time": "09:45", "end_time": "10:00", "description": "call mom", "completed": false},
                ]
            })
        );

        pool.close().await;
        drop_test_db(&db_name).await;
    }

    #[tokio::test]
    async fn test_get_tasks_invalid_id() {
        let (pool, db_name) = create_test_db().await;

        let resp = send(app(&pool, TWO_TASKS), Method::GET, "/api/tasks/not-a-uuid", None).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert!(json["detail"].as_str().is_some(), "got: {json}");

        pool.close().await;
        drop_test_db(&db_name).await;
    }

    #[tokio::test]
    async fn test_get_tasks_unknown_list() {
        let (pool, db_name) = create_test_db().await;

        let random_id = uuid::Uuid::new_v4();
        let resp = send(
            app(&pool, TWO_TASKS),
            Method::GET,
            &format!("/api/tasks/{random_id}"),
            None,
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let json = body_json(resp).await;
        assert!(
            json["detail"].as_str().unwrap().contains("not found"),
            "got: {json}"
        );

        pool.close().await;
        drop_test_db(&db_name).await;
    }

    #[tokio::test]
    async fn test_update_task() {
        let (pool, db_name) = create_test_db().await;
        let list_id = plan_two_tasks(&pool).await;

        let resp = send(
            app(&pool, TWO_TASKS),
            Method::PUT,
            &format!("/api/tasks/{list_id}/1"),
            Some(serde_json::json!({"completed": true})),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, serde_json::json!({"success": true}));

        let resp = send(
            app(&pool, TWO_TASKS),
            Method::GET,
            &format!("/api/tasks/{list_id}"),
            None,
        )
        .await;
        let json = body_json(resp).await;
        assert_eq!(json["tasks"][0]["completed"], false);
        assert_eq!(json["tasks"][1]["completed"], true);

        pool.close().await;
        drop_test_db(&db_name).await;
    }

    #[tokio::test]
    async fn test_update_task_out_of_range() {
        let (pool, db_name) = create_test_db().await;
        let list_id = plan_two_tasks(&pool).await;

        for index in ["2", "-1"] {
            let resp = send(
                app(&pool, TWO_TASKS),
                Method::PUT,
                &format!("/api/tasks/{list_id}/{index}"),
                Some(serde_json::json!({"completed": true})),
            )
            .await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "index {index}");
        }

        pool.close().await;
        drop_test_db(&db_name).await;
    }

    #[tokio::test]
    async fn test_update_task_bad_path() {
        let (pool, db_name) = create_test_db().await;
        let list_id = plan_two_tasks(&pool).await;

        let resp = send(
            app(&pool, TWO_TASKS),
            Method::PUT,
            &format!("/api/tasks/{list_id}/first"),
            Some(serde_json::json!({"completed": true})),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = send(
            app(&pool, TWO_TASKS),
            Method::PUT,
            "/api/tasks/not-a-uuid/0",
            Some(serde_json::json!({"completed": true})),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let random_id = uuid::Uuid::new_v4();
        let resp = send(
            app(&pool, TWO_TASKS),
            Method::PUT,
            &format!("/api/tasks/{random_id}/0"),
            Some(serde_json::json!({"completed": true})),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        pool.close().await;
        drop_test_db(&db_name).await;
    }

    #[tokio::test]
    async fn test_replan_carries_completion() {
        let (pool, db_name) = create_test_db().await;
        let list_id = plan_two_tasks(&pool).await;

        let resp = send(
            app(
                &pool,
                r#"[{"start_time":"09:00","end_time":"09:45","description":"write report"},{"start_time":"11:00","end_time":"11:15","description":"call mom"}]"#,
            ),
            Method::POST,
            "/api/replan",
            Some(serde_json::json!({
                "list_id": list_id,
                "tweak_feedback": "call mom later",
                "tasks": [
                    {"start_time": "09:00", "end_time": "09:45", "description": "write report", "completed": true},
                    {"start_time": "09:45", "end_time": "10:00", "description": "call mom"},
                ],
            })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["list_id"], list_id.as_str());
        assert_eq!(json["tasks"][1]["start_time"], "11:00");

        let resp = send(
            app(&pool, TWO_TASKS),
            Method::GET,
            &format!("/api/tasks/{list_id}"),
            None,
        )
        .await;
        let json = body_json(resp).await;
        assert_eq!(json["tasks"][0]["completed"], true);
        assert_eq!(json["tasks"][1]["completed"], false);
        assert_eq!(json["tasks"][1]["start_time"], "11:00");

        pool.close().await;
        drop_test_db(&db_name).await;
    }

    #[tokio::test]
    async fn test_replan_invalid_and_unknown_list() {
        let (pool, db_name) = create_test_db().await;

        let resp = send(
            app(&pool, TWO_TASKS),
            Method::POST,
            "/api/replan",
            Some(serde_json::json!({
                "list_id": "nope",
                "tweak_feedback": "more breaks",
                "tasks": [],
            })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = send(
            app(&pool, TWO_TASKS),
            Method::POST,
            "/api/replan",
            Some(serde_json::json!({
                "list_id": uuid::Uuid::new_v4().to_string(),
                "tweak_feedback": "more breaks",
                "tasks": [],
            })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        pool.close().await;
        drop_test_db(&db_name).await;
    }

    #[tokio::test]
    async fn test_plan_with_unusable_reply_is_server_error() {
        let (pool, db_name) = create_test_db().await;

        let resp = send(
            app(&pool, "I'd be happy to help you plan your day!"),
            Method::POST,
            "/api/plan",
            Some(serde_json::json!({
                "description": "anything",
                "start_time": "09:00",
            })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(resp).await;
        assert!(
            json["detail"].as_str().unwrap().contains("JSON"),
            "got: {json}"
        );

        pool.close().await;
        drop_test_db(&db_name).await;
    }

    #[test]
    fn test_error_status_mapping() {
        use super::AppError;
        use dayplan_core::ScheduleError;

        let cases = [
            (ScheduleError::InvalidIdentifier("x".into()), StatusCode::BAD_REQUEST),
            (ScheduleError::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (ScheduleError::Validation("bad".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (
                ScheduleError::Service(anyhow::anyhow!("down")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(AppError::from(err).status, expected);
        }
    }
}
