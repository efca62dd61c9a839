use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryRoommateDirectory};
use crate::routes::with_matching_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use roommate_match::config::AppConfig;
use roommate_match::error::AppError;
use roommate_match::roommates::{CandidateImporter, MatchingService, Questionnaire};
use roommate_match::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let questionnaire = Arc::new(Questionnaire::standard());
    let directory = Arc::new(InMemoryRoommateDirectory::new(questionnaire.clone()));
    if let Some(path) = args.pool.take() {
        let candidates = CandidateImporter::from_path(&path, &questionnaire)?;
        match directory.enroll(candidates) {
            Ok(count) => info!(count, pool = %path.display(), "candidate pool enrolled"),
            Err(error) => warn!(%error, "candidate pool could not be enrolled"),
        }
    }

    let scoring = config.matching.scoring()?;
    let service = MatchingService::new(directory.clone(), directory, scoring)?;

    let app = with_matching_routes(Arc::new(service), config.matching.limits())
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "roommate matching service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
