use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pesona_api::{app, AppState};
use pesona_booking::BookingLedger;
use pesona_review::ReviewGate;
use pesona_session::{SessionAuthority, SessionSettings};
use pesona_store::{
    app_config::Config, DbClient, PgBookingRepository, PgListingRepository, PgReviewRepository,
    PgUserRepository,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pesona_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().expect("Failed to load config");
    tracing::info!("Starting Pesona API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to database");
    db.migrate().await.expect("Failed to run migrations");

    let bookings = Arc::new(PgBookingRepository::new(db.pool.clone()));
    let listings = Arc::new(PgListingRepository::new(db.pool.clone()));
    let reviews = Arc::new(PgReviewRepository::new(db.pool.clone()));
    let users = Arc::new(PgUserRepository::new(db.pool.clone()));

    let sessions = SessionAuthority::new(SessionSettings {
        secret: config.session.jwt_secret.clone(),
        admin_cookie_name: config.session.admin_cookie_name.clone(),
        user_cookie_name: config.session.user_cookie_name.clone(),
        admin_max_age_seconds: config.session.admin_max_age_seconds,
        user_max_age_seconds: config.session.user_max_age_seconds,
    });

    let state = AppState {
        ledger: Arc::new(BookingLedger::new(bookings.clone(), listings)),
        reviews: Arc::new(ReviewGate::new(reviews, bookings)),
        sessions: Arc::new(sessions),
        users,
    };

    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");
}
