use std::sync::Arc;

use clap::Parser;
use clubgrid::{
    auth::AuthService,
    clock::SystemClock,
    config::Settings,
    domain::{CreateClubRequest, Role, TeamRequest},
    repository::{ClubRepository, SqliteClubRepository, SqliteTeamRepository, TeamRepository},
};
use sqlx::sqlite::SqlitePoolOptions;

/// Creates a club and its first administrator.
#[derive(Parser, Debug)]
#[command(name = "seed")]
struct Args {
    /// Club name
    #[arg(long, default_value = "FC ClubGrid")]
    club: String,

    /// Administrator email
    #[arg(long, default_value = "admin@clubgrid.local")]
    email: String,

    /// Administrator password
    #[arg(long, default_value = "admin12345")]
    password: String,

    /// Administrator display name
    #[arg(long, default_value = "Club Admin")]
    name: String,

    /// Also create a first team with this name
    #[arg(long)]
    team: Option<String>,

    /// Database URL (defaults to the configured one)
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let settings = Settings::new().unwrap_or_default();

    println!("🌱 Starting database seeding...");

    let database_url = args
        .database_url
        .clone()
        .unwrap_or_else(|| settings.database.url.clone());

    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    // Run migrations first
    println!("📋 Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await?;

    let club_repo = SqliteClubRepository::new(db_pool.clone());
    let auth_service = AuthService::new(db_pool.clone(), Arc::new(SystemClock), &settings.auth);

    let club = club_repo
        .create(CreateClubRequest {
            name: args.club.clone(),
            description: None,
            primary_color: Some("#d9f99d".to_string()),
        })
        .await?;
    println!("  ✅ Created club {} ({})", club.name, club.id);

    let (identity, _) = auth_service
        .sign_up_into_club(
            &args.email.trim().to_lowercase(),
            &args.password,
            &args.name,
            club.id,
            Role::Admin,
        )
        .await?;
    println!("  ✅ Created admin {} / {}", identity.email, args.password);

    if let Some(team_name) = args.team {
        let team = SqliteTeamRepository::new(db_pool.clone())
            .create(
                club.id,
                TeamRequest {
                    name: team_name,
                    league: None,
                },
            )
            .await?;
        println!("  ✅ Created team {}", team.name);
    }

    println!("\n🎉 Seeding complete! Set CLUBGRID__AUTH__DEFAULT_CLUB_ID={} to open registration.", club.id);

    Ok(())
}
