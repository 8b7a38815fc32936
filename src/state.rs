use crate::config::Config;
use crate::errors::GatewayError;
use crate::gateway::{HttpMonthRemote, MonthRemote, SaveScheduler};
use crate::models::MonthView;
use crate::reconcile::{MonthKey, from_wire_format, to_wire_format};
use crate::stats::build_stats;
use crate::store::HabitStore;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<HabitStore>>,
    pub remote: Arc<HttpMonthRemote>,
    pub saver: Arc<SaveScheduler>,
}

impl AppState {
    pub fn new(config: &Config, store: HabitStore) -> Result<Self, GatewayError> {
        let remote = Arc::new(HttpMonthRemote::from_config(config)?);
        let saver = SaveScheduler::spawn(Arc::clone(&remote), config.save_debounce);
        Ok(Self::from_parts(remote, saver, store))
    }

    pub fn from_parts(remote: Arc<HttpMonthRemote>, saver: SaveScheduler, store: HabitStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            remote,
            saver: Arc::new(saver),
        }
    }

    /// Runs one store operation as a single event. A change is queued for a
    /// debounced save.
    pub async fn apply(&self, operation: impl FnOnce(&mut HabitStore) -> bool) -> MonthView {
        let mut store = self.store.lock().await;
        let changed = operation(&mut *store);
        if changed {
            self.saver
                .schedule(to_wire_format(store.state(), MonthKey::current()));
        }
        self.view(&store, changed)
    }

    pub async fn current(&self) -> MonthView {
        let store = self.store.lock().await;
        self.view(&store, false)
    }

    /// Sends the current month right away, bypassing the debounce window.
    pub async fn save_now(&self) -> Result<MonthView, GatewayError> {
        {
            // Queue under the lock so a concurrent edit can only land after it.
            let store = self.store.lock().await;
            self.saver
                .schedule(to_wire_format(store.state(), MonthKey::current()));
        }
        self.saver.flush().await?;
        Ok(self.current().await)
    }

    /// Clears everything and persists the empty month immediately. A failed
    /// save is only reflected in the save status.
    pub async fn reset_all(&self) -> MonthView {
        {
            let mut store = self.store.lock().await;
            store.reset_all();
            self.saver
                .schedule(to_wire_format(store.state(), MonthKey::current()));
        }
        if let Err(err) = self.saver.flush().await {
            warn!("failed to persist reset: {err}");
        }
        let store = self.store.lock().await;
        self.view(&store, true)
    }

    /// Pulls the month for the current period and rehydrates the store.
    /// Returns `false` when the service has nothing stored yet; errors leave
    /// the store untouched.
    pub async fn load_remote(&self) -> Result<bool, GatewayError> {
        load_into(self.remote.as_ref(), &self.store, MonthKey::current()).await
    }

    fn view(&self, store: &HabitStore, changed: bool) -> MonthView {
        let month = store.state().clone();
        let stats = build_stats(&month);
        MonthView {
            month,
            stats,
            changed,
            save_status: self.saver.status(),
        }
    }
}

pub async fn load_into<R: MonthRemote>(
    remote: &R,
    store: &Mutex<HabitStore>,
    key: MonthKey,
) -> Result<bool, GatewayError> {
    let Some(document) = remote.load(key).await? else {
        info!("no stored month for {key}; keeping current month");
        return Ok(false);
    };

    let mut store = store.lock().await;
    let previous = store.state();
    let loaded = from_wire_format(document, &previous.month_name, previous.month_length);
    info!(habits = loaded.habits.len(), "loaded month {key}");
    store.replace(loaded);
    Ok(true)
}
