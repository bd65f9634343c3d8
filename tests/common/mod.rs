#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use clubgrid::{
    clock::{Clock, ManualClock},
    config::Settings,
    domain::{Club, CreateClubRequest, Identity, Role},
    error::{AppError, Result},
    mail::{Mailer, OutgoingMail},
    repository::{ClubRepository, MembershipRepository, SqliteClubRepository, SqliteMembershipRepository},
    service::ServiceContext,
    storage::LocalObjectStore,
};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

pub const BASE_URL: &str = "https://clubgrid.test";

/// Keeps every message instead of sending it. Can be told to fail.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutgoingMail>>,
    pub fail: AtomicBool,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<String> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Mail("smtp unavailable".to_string()));
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(mail.clone());
        Ok(format!("<test-{}@clubgrid.test>", sent.len()))
    }
}

pub struct TestContext {
    pub pool: SqlitePool,
    pub clock: Arc<ManualClock>,
    pub mailer: Arc<RecordingMailer>,
    pub services: Arc<ServiceContext>,
    pub settings: Settings,
}

pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");

    pool
}

/// A database file of its own, so several connections really run side by side.
pub async fn file_pool(max_connections: u32) -> SqlitePool {
    let path = std::env::temp_dir().join(format!("clubgrid-test-{}.db", uuid::Uuid::new_v4()));
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(&format!("sqlite://{}?mode=rwc", path.display()))
        .await
        .expect("file database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");

    pool
}

pub async fn setup() -> TestContext {
    setup_with(|_| {}).await
}

pub async fn setup_with(configure: impl FnOnce(&mut Settings)) -> TestContext {
    setup_on(test_pool().await, configure).await
}

pub async fn setup_on(pool: SqlitePool, configure: impl FnOnce(&mut Settings)) -> TestContext {
    let mut settings = Settings::default();
    settings.server.base_url = BASE_URL.to_string();
    settings.storage.root_dir = std::env::temp_dir()
        .join(format!("clubgrid-test-{}", uuid::Uuid::new_v4()))
        .to_string_lossy()
        .into_owned();
    settings.storage.public_url_prefix = format!("{}/storage", BASE_URL);
    configure(&mut settings);

    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap()));
    let mailer = Arc::new(RecordingMailer::default());
    let store = Arc::new(LocalObjectStore::new(
        &settings.storage.root_dir,
        &settings.storage.public_url_prefix,
    ));

    let outbound: Arc<dyn Mailer> = mailer.clone();

    let services = Arc::new(ServiceContext::new(
        pool.clone(),
        &settings,
        clock.clone(),
        Some(outbound),
        store,
    ));

    TestContext {
        pool,
        clock,
        mailer,
        services,
        settings,
    }
}

impl TestContext {
    pub fn clock_now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub async fn create_club(&self, name: &str) -> Club {
        SqliteClubRepository::new(self.pool.clone())
            .create(CreateClubRequest {
                name: name.to_string(),
                description: None,
                primary_color: None,
            })
            .await
            .expect("club")
    }

    /// Signs up an account and places it in `club` with `role`.
    pub async fn member(&self, club: &Club, role: Role, email: &str) -> Identity {
        let (identity, _) = self
            .services
            .auth_service
            .sign_up(email, "correct-horse", &format!("{} member", role.label()))
            .await
            .expect("sign up");

        SqliteMembershipRepository::new(self.pool.clone())
            .join_club(identity.id, club.id, role)
            .await
            .expect("join club");

        identity
    }
}
