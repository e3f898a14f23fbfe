use derive_new::new;

use crate::config::Config;
use crate::database::Database;
use crate::service::{Dashboard, PageViewLedger, ViewCounter, ViewDedup};

#[derive(Debug, Clone, new)]
pub struct App {
    pub counter: ViewCounter,
    pub ledger: PageViewLedger,
    pub dashboard: Dashboard,
    pub database: Database,
}

impl<'a> From<&'a App> for &'a Database {
    fn from(app: &'a App) -> Self {
        &app.database
    }
}

pub fn create_app(config: &Config, database: Database) -> App {
    let dedup = ViewDedup::new(config.counting.window(), config.counting.high_water);
    let ledger = PageViewLedger::new(database.clone());
    let counter = ViewCounter::new(database.clone(), dedup, ledger.clone());
    let dashboard = Dashboard::new(database.clone());

    App::new(counter, ledger, dashboard, database)
}
