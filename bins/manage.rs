//! Administrative commands run against the configured database.
use std::sync::Arc;

use clap::{Parser, Subcommand};
use configs::AppConfig;
use migration::MigratorTrait;
use models::user::Role;
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::AuthService;
use service::users::{self, CreateUser};
use tracing::info;

#[derive(Parser)]
#[command(name = "manage")]
#[command(about = "CRAS Digital administration")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "Create a staff account with a password")]
    CreateStaff {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        email: Option<String>,
    },

    #[command(about = "Assign a role to an existing user")]
    SetRole {
        #[arg(long)]
        username: String,
        #[arg(long, value_parser = parse_role, help = "citizen | professional | staff")]
        role: Role,
    },

    #[command(about = "Set or reset a user's password")]
    SetPassword {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
}

fn parse_role(s: &str) -> Result<Role, String> {
    s.parse::<Role>()
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let cfg = AppConfig::load_or_env()?;
    let db = models::db::connect_with_config(&cfg.database).await?;

    match cli.command {
        Commands::Migrate => {
            migration::Migrator::up(&db, None).await?;
            info!(event = "migrations_applied");
        }
        Commands::CreateStaff { username, password, email } => {
            let created = users::create(
                &db,
                CreateUser {
                    username: Some(username),
                    email,
                    password: Some(password),
                    ..CreateUser::default()
                },
            )
            .await?;
            let staff = users::set_role(&db, created.user.id, Role::Staff).await?;
            println!("created staff user {} ({})", staff.username, staff.id);
        }
        Commands::SetRole { username, role } => {
            let user = users::find_by_username(&db, &username)
                .await?
                .ok_or_else(|| anyhow::anyhow!("no user named {username}"))?;
            let updated = users::set_role(&db, user.id, role).await?;
            println!("{} is now {:?}", updated.username, updated.role);
        }
        Commands::SetPassword { username, password } => {
            let user = users::find_by_username(&db, &username)
                .await?
                .ok_or_else(|| anyhow::anyhow!("no user named {username}"))?;
            let repo = Arc::new(SeaOrmAuthRepository::new(db.clone()));
            let auth = AuthService::new(repo, (&cfg.auth).into());
            auth.set_password(user.id, &password).await?;
            println!("password updated for {}", user.username);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    common::utils::logging::init_logging_default();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        match std::env::var("CLI_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => eprintln!("Error: {e:?}"),
            _ => eprintln!("Error: {e}"),
        }
        std::process::exit(1);
    }
    Ok(())
}
