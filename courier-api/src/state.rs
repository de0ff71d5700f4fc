use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;

use courier_booking::repository::{BookingRepository, RequestRepository, TripRepository};
use courier_engine::{BookingEngine, ChannelDispatcher};
use courier_shared::events::NotificationEvent;
use courier_store::app_config::BusinessRules;
use courier_store::memory::MemStore;
use courier_wallet::repository::WalletRepository;

#[derive(Clone)]
pub struct AuthSettings {
    pub secret: String,
    pub expiration_seconds: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<BookingEngine>,
    pub trip_repo: Arc<dyn TripRepository>,
    pub request_repo: Arc<dyn RequestRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub wallet_repo: Arc<dyn WalletRepository>,
    pub auth: AuthSettings,
}

impl AppState {
    /// Wire up the store, engine and notification channel. The caller hands
    /// the receiver to the notification worker.
    pub fn build(
        rules: &BusinessRules,
        auth: AuthSettings,
    ) -> (Self, UnboundedReceiver<NotificationEvent>) {
        let store = MemStore::new(rules);
        let (dispatcher, rx) = ChannelDispatcher::new();
        let engine = Arc::new(BookingEngine::new(store.clone(), rules, Arc::new(dispatcher)));
        let state = Self {
            engine,
            trip_repo: Arc::new(store.clone()),
            request_repo: Arc::new(store.clone()),
            booking_repo: Arc::new(store.clone()),
            wallet_repo: Arc::new(store),
            auth,
        };
        (state, rx)
    }
}
