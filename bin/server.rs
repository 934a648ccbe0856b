// Head of State Ledger - Web Server
// Rankings table + add form over HTTP, JSON API alongside

use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use clap::Parser;
use hos_ledger::config::AppConfig;
use hos_ledger::editor::{
    EditorSession, HeadOfStateRecord, HeadOfStateStore, HeadOfStateTable, RawHeadOfStateForm,
    COLUMNS,
};
use hos_ledger::{logging, ObjectStore};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

type Session = EditorSession<Box<dyn ObjectStore>>;

#[derive(Parser)]
#[command(name = "hos-server", version, about = "Head of State rankings over HTTP")]
struct Args {
    /// Secrets file ([aws], [storage] tables)
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value = "0.0.0.0:3000")]
    bind: String,
}

/// Shared application state: one editor session, re-read from storage on every visit
#[derive(Clone)]
struct AppState {
    session: Arc<Mutex<Session>>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

#[derive(Debug)]
enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::Internal(m) => {
                error!(error = %m, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, m)
            }
        };
        let body = ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(message),
        };
        (status, Json(body)).into_response()
    }
}

/// Run `f` against the session on the blocking pool (storage calls are blocking I/O)
async fn with_session<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&mut Session) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let session = state.session.clone();
    tokio::task::spawn_blocking(move || {
        let mut guard = session
            .lock()
            .map_err(|_| ApiError::Internal("session lock poisoned".to_string()))?;
        f(&mut guard)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?
}

async fn add_record(state: &AppState, raw: RawHeadOfStateForm) -> Result<HeadOfStateRecord, ApiError> {
    let form = raw.parse().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    with_session(state, move |session| {
        reload(session)?;
        session
            .submit(form)
            .map_err(|e| ApiError::Internal(format!("Failed to save: {}", e)))
    })
    .await
}

fn reload(session: &mut Session) -> Result<(), ApiError> {
    session
        .reload()
        .map_err(|e| ApiError::Internal(format!("Failed to load: {}", e)))
}

/// Table as currently stored, so rows saved by other writers show up
async fn fresh_table(state: &AppState) -> Result<HeadOfStateTable, ApiError> {
    with_session(state, |session| {
        reload(session)?;
        Ok(session.table().clone())
    })
    .await
}

/// Table as the session holds it right after its own save
async fn snapshot(state: &AppState) -> Result<HeadOfStateTable, ApiError> {
    with_session(state, |session| Ok(session.table().clone())).await
}

// ============================================================================
// HTML
// ============================================================================

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn table_html(rows: &[&HeadOfStateRecord]) -> String {
    let mut html = String::from("<table><thead><tr>");
    for column in COLUMNS {
        html.push_str(&format!("<th>{}</th>", column));
    }
    html.push_str("</tr></thead><tbody>");
    for row in rows {
        html.push_str("<tr>");
        for cell in row.cells() {
            html.push_str(&format!("<td>{}</td>", escape_html(&cell)));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
    html
}

fn render_page(
    table: &HeadOfStateTable,
    added: Option<&HeadOfStateRecord>,
    form_error: Option<&str>,
) -> String {
    let mut body = String::new();
    body.push_str("<h1>🏛️ Head of State Rankings</h1>");
    body.push_str(
        "<p>This app allows you to rank heads of state based on their tenure and GDP performance. \
         You can view the rankings or add a new head of state.</p>",
    );

    if let Some(record) = added {
        body.push_str("<p class=\"ok\">Head of State added! Here are the details:</p>");
        body.push_str(&table_html(&[record]));
    }
    if let Some(message) = form_error {
        body.push_str(&format!("<p class=\"err\">{}</p>", escape_html(message)));
    }

    body.push_str("<h2>Head of State Rankings</h2>");
    body.push_str(&format!("<p>Number of records: <code>{}</code></p>", table.len()));
    body.push_str(&table_html(&table.ranked()));

    body.push_str(
        "<details><summary>Add a New Head of State</summary>\
         <form method=\"post\" action=\"/heads\">\
         <label>Name of Head of State <input name=\"name\"></label>\
         <label>Start Date <input type=\"date\" name=\"start_date\" required></label>\
         <label>End Date <input type=\"date\" name=\"end_date\" required></label>\
         <label>GDP at Start (in billions) <input type=\"number\" name=\"gdp_start\" min=\"0\" step=\"0.01\" value=\"0.00\"></label>\
         <label>GDP at End (in billions) <input type=\"number\" name=\"gdp_end\" min=\"0\" step=\"0.01\" value=\"0.00\"></label>\
         <button type=\"submit\">Submit</button>\
         </form></details>",
    );

    format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>Head of State Rankings</title>\
         <style>body{{font-family:sans-serif;max-width:960px;margin:2rem auto}}\
         table{{border-collapse:collapse;width:100%}}td,th{{border:1px solid #ccc;padding:4px 8px}}\
         label{{display:block;margin:.5rem 0}}.ok{{color:green}}.err{{color:#b00}}</style>\
         </head><body>{}</body></html>",
        body
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// GET / - Rankings page with the add form
async fn serve_index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let table = fresh_table(&state).await?;
    Ok(Html(render_page(&table, None, None)))
}

/// POST /heads - HTML form submission
async fn submit_form(
    State(state): State<AppState>,
    Form(raw): Form<RawHeadOfStateForm>,
) -> Result<(StatusCode, Html<String>), ApiError> {
    match add_record(&state, raw).await {
        Ok(record) => {
            let table = snapshot(&state).await?;
            Ok((StatusCode::OK, Html(render_page(&table, Some(&record), None))))
        }
        Err(ApiError::BadRequest(message)) => {
            let table = fresh_table(&state).await?;
            Ok((
                StatusCode::BAD_REQUEST,
                Html(render_page(&table, None, Some(&message))),
            ))
        }
        Err(e) => Err(e),
    }
}

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/heads - Ranked records
async fn list_heads(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<HeadOfStateRecord>>>, ApiError> {
    let table = fresh_table(&state).await?;
    let ranked = table.ranked().into_iter().cloned().collect();
    Ok(Json(ApiResponse::ok(ranked)))
}

/// POST /api/heads - JSON submission
async fn create_head(
    State(state): State<AppState>,
    Json(raw): Json<RawHeadOfStateForm>,
) -> Result<(StatusCode, Json<ApiResponse<HeadOfStateRecord>>), ApiError> {
    let record = add_record(&state, raw).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(record))))
}

fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/heads", get(list_heads).post(create_head))
        .with_state(state.clone());

    Router::new()
        .route("/", get(serve_index))
        .route("/heads", axum::routing::post(submit_form))
        .with_state(state)
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging();
    let args = Args::parse();

    let config = AppConfig::load(args.config.as_deref())?;
    let object_key = config.storage.object_key.clone();

    let session = tokio::task::spawn_blocking(move || -> anyhow::Result<Session> {
        let bucket = config.open_bucket()?;
        let store = HeadOfStateStore::new(bucket, object_key);
        Ok(EditorSession::open(store)?)
    })
    .await??;
    info!(rows = session.table().len(), "session loaded");

    let state = AppState {
        session: Arc::new(Mutex::new(session)),
    };

    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    info!(addr = %args.bind, "🚀 server running");

    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hos_ledger::editor::DEFAULT_OBJECT_KEY;
    use hos_ledger::MemoryBucket;

    fn state_with(bucket: &MemoryBucket) -> AppState {
        let boxed: Box<dyn ObjectStore> = Box::new(bucket.clone());
        let session = EditorSession::open(HeadOfStateStore::new(boxed, DEFAULT_OBJECT_KEY)).unwrap();
        AppState {
            session: Arc::new(Mutex::new(session)),
        }
    }

    fn raw(name: &str, start: &str) -> RawHeadOfStateForm {
        RawHeadOfStateForm {
            name: name.to_string(),
            start_date: start.to_string(),
            end_date: "2021-01-01".to_string(),
            gdp_start: "10.00".to_string(),
            gdp_end: "12.50".to_string(),
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>\"A&B\"</b>"), "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;");
    }

    #[test]
    fn test_page_lists_ranked_rows_and_form() {
        let table = HeadOfStateTable::new()
            .with_prepended(raw("Low", "2020-01-01").parse().unwrap().into_record());
        let page = render_page(&table, None, None);

        assert!(page.contains("Number of records: <code>1</code>"));
        assert!(page.contains("<td>Low</td>"));
        assert!(page.contains("name=\"gdp_end\""));
    }

    #[tokio::test]
    async fn test_form_post_saves_and_shows_record() {
        let bucket = MemoryBucket::new();
        let state = state_with(&bucket);

        let (status, Html(page)) = submit_form(State(state.clone()), Form(raw("A", "2020-01-01")))
            .await
            .unwrap();

        assert_eq!(status, StatusCode::OK);
        assert!(page.contains("Head of State added!"));
        assert!(page.contains("<td>2.50</td>"));
        assert!(bucket
            .object_text(DEFAULT_OBJECT_KEY)
            .unwrap()
            .contains("A,2020-01-01,2021-01-01,10.00,12.50,2.50"));
    }

    #[tokio::test]
    async fn test_invalid_form_post_is_bad_request() {
        let bucket = MemoryBucket::new();
        let state = state_with(&bucket);

        let (status, Html(page)) = submit_form(State(state), Form(raw("A", "someday")))
            .await
            .unwrap();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(page.contains("someday"));
        assert!(bucket.is_empty());
    }

    #[tokio::test]
    async fn test_json_api_create_then_list() {
        let bucket = MemoryBucket::new();
        let state = state_with(&bucket);

        let (status, Json(created)) = create_head(State(state.clone()), Json(raw("A", "2020-01-01")))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert!(created.success);

        let Json(listed) = list_heads(State(state)).await.unwrap();
        assert_eq!(listed.data.unwrap().len(), 1);
    }

    /// A second writer, as `hos-ledger add` would be
    fn save_elsewhere(bucket: &MemoryBucket, name: &str) {
        let mut other =
            EditorSession::open(HeadOfStateStore::new(bucket.clone(), DEFAULT_OBJECT_KEY)).unwrap();
        other.submit(raw(name, "2019-01-01").parse().unwrap()).unwrap();
    }

    #[tokio::test]
    async fn test_page_visit_sees_rows_saved_by_other_writers() {
        let bucket = MemoryBucket::new();
        let state = state_with(&bucket);
        save_elsewhere(&bucket, "CliRow");

        let Html(page) = serve_index(State(state.clone())).await.unwrap();
        assert!(page.contains("<td>CliRow</td>"));

        let Json(listed) = list_heads(State(state)).await.unwrap();
        assert_eq!(listed.data.unwrap()[0].name, "CliRow");
    }

    #[tokio::test]
    async fn test_web_submit_keeps_rows_saved_by_other_writers() {
        let bucket = MemoryBucket::new();
        let state = state_with(&bucket);
        save_elsewhere(&bucket, "CliRow");

        submit_form(State(state.clone()), Form(raw("WebRow", "2020-01-01")))
            .await
            .unwrap();

        let stored = bucket.object_text(DEFAULT_OBJECT_KEY).unwrap();
        let names: Vec<&str> = stored
            .lines()
            .skip(1)
            .filter_map(|line| line.split(',').next())
            .collect();
        assert_eq!(names, vec!["WebRow", "CliRow"]);
    }
}
