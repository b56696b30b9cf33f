use std::sync::Arc;

use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use courses_service::config::{ServiceConfig, StoreBackend};
use courses_service::domain::course::NewCourse;
use courses_service::domain::module::{ModuleChanges, ModuleData, ModuleDataResource};
use courses_service::metrics::{self, Metrics};
use courses_service::repository::{CourseRepository, ModuleRepository};
use courses_service::service::{CreateModuleRequest, ModuleService};
use courses_service::store::{CourseStore, InMemoryCourseStore, ScyllaCourseStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Structured logging, overridable with RUST_LOG
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,courses_service=debug"))
        )
        .init();

    let config = ServiceConfig::from_env()?;
    tracing::info!(?config, "🚀 Starting courses service");

    // === 1. Course store ===
    let store: Arc<dyn CourseStore> = match &config.store {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory course store");
            Arc::new(InMemoryCourseStore::new())
        }
        StoreBackend::Scylla { node, keyspace } => {
            tracing::info!(node = %node, keyspace = %keyspace, "Connecting to ScyllaDB...");
            let session: Session = SessionBuilder::new().known_node(node).build().await?;

            session
                .query_unpaged(
                    format!(
                        "CREATE KEYSPACE IF NOT EXISTS {} WITH REPLICATION = \
                         {{'class': 'SimpleStrategy', 'replication_factor': 1}}",
                        keyspace
                    ),
                    &[],
                )
                .await?;
            session.use_keyspace(keyspace, false).await?;

            let store = ScyllaCourseStore::new(Arc::new(session));
            store.ensure_schema().await?;
            Arc::new(store)
        }
    };

    // === 2. Prometheus metrics ===
    let metrics = Arc::new(Metrics::new()?);
    if let Some(port) = config.metrics_port {
        let registry = metrics.registry().clone();
        let probe_store = store.clone();
        std::thread::spawn(move || {
            let system = actix_web::rt::System::new();
            if let Err(e) = system.block_on(metrics::start_metrics_server(registry, probe_store, port)) {
                tracing::error!("Metrics server error: {}", e);
            }
        });
    }

    // === 3. Repositories and service ===
    let courses = CourseRepository::new(store);
    let modules = ModuleRepository::new(courses.clone())
        .with_retry(config.retry.clone())
        .with_metrics(metrics.clone());
    let service = ModuleService::new(modules.clone());

    // === 4. Demonstrate the module lifecycle ===
    let now = chrono::Utc::now();
    let course = courses
        .create_course(NewCourse {
            title: "Systems Programming".to_string(),
            description: "Memory, concurrency and I/O".to_string(),
            teacher_uuid: uuid::Uuid::new_v4().to_string(),
            teacher_name: "Demo Teacher".to_string(),
            capacity: 30,
            start_date: now,
            end_date: now + chrono::Duration::days(90),
        })
        .await?;
    let course_id = course.id.to_string();

    let mut created = Vec::new();
    for title in ["Ownership", "Traits", "Async", "Unsafe", "FFI"] {
        let module = service
            .create_module(CreateModuleRequest {
                course_id: course_id.clone(),
                title: title.to_string(),
                description: format!("{} in depth", title),
            })
            .await?;
        created.push(module);
    }

    // Move the last module to second place and attach material
    let moved = modules
        .update_module(
            &created[4].id.to_string(),
            ModuleChanges::default().order(2).data(vec![ModuleData {
                title: "Reading".to_string(),
                description: "Calling C from Rust".to_string(),
                resources: vec![ModuleDataResource {
                    id: "ffi-1".to_string(),
                    name: "The Rustonomicon, FFI".to_string(),
                    url: "https://doc.rust-lang.org/nomicon/ffi.html".to_string(),
                }],
            }]),
        )
        .await?;
    tracing::info!(module = %moved.title, order = moved.order, "✅ Module moved");

    modules.delete_module(&created[2].id.to_string()).await?;
    tracing::info!(module = %created[2].title, "✅ Module deleted");

    for module in modules.get_modules_by_course_id(&course_id).await? {
        tracing::info!(order = module.order, title = %module.title, "📚 Module");
    }

    tracing::info!("🎉 Demo complete!");

    // Keep /metrics and /health reachable until the process is stopped
    if let Some(port) = config.metrics_port {
        tracing::info!(port = port, "Serving metrics, press Ctrl+C to stop");
        tokio::signal::ctrl_c().await?;
        tracing::info!("Shutting down");
    }
    Ok(())
}
