use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryApplicationRepository, InMemoryPartnerRepository};
use crate::routes::with_workflow_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use subscription_intake::config::AppConfig;
use subscription_intake::error::AppError;
use subscription_intake::telemetry;
use subscription_intake::workflows::financing::{ApplicationService, RosterImporter};
use subscription_intake::workflows::partners::{PartnerRosterImporter, PartnerService};
use tracing::info;

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

    let repository = match &config.store.roster_csv {
        Some(path) => {
            let applications = RosterImporter::from_path(path)?;
            let count = applications.len();
            let repository = InMemoryApplicationRepository::seeded(applications)?;
            info!(path = %path.display(), count, "seeded applications from roster export");
            repository
        }
        None => InMemoryApplicationRepository::default(),
    };
    let application_service = ApplicationService::new(Arc::new(repository));
    let resumed_from = application_service.resume_sequence()?;
    info!(resumed_from, "lead numbering resumed");

    let partner_repository = match &config.store.partner_csv {
        Some(path) => {
            let partners = PartnerRosterImporter::from_path(path)?;
            let count = partners.len();
            let repository = InMemoryPartnerRepository::seeded(partners)?;
            info!(path = %path.display(), count, "seeded partners from roster export");
            repository
        }
        None => InMemoryPartnerRepository::default(),
    };
    let partner_service = PartnerService::new(Arc::new(partner_repository));

    let app = with_workflow_routes(Arc::new(application_service), Arc::new(partner_service))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "subscription intake service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
