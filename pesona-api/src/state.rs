use std::sync::Arc;

use pesona_booking::BookingLedger;
use pesona_core::repository::UserRepository;
use pesona_review::ReviewGate;
use pesona_session::SessionAuthority;

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<BookingLedger>,
    pub reviews: Arc<ReviewGate>,
    pub sessions: Arc<SessionAuthority>,
    pub users: Arc<dyn UserRepository>,
}
