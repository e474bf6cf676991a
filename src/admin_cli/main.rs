use clap::{Parser, Subcommand};
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use uuid::Uuid;

use jobmatch::config::{Config, DatabaseSettings};
use jobmatch::database::{self, models::ApprovalStatus, schema};
use jobmatch::services::{
    accounts::{self, RegisterAdmin},
    approvals::{self, ApprovalDecision, DecisionOutcome},
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, verbatim_doc_comment)]
/// Command line administration for the job matching backend.
/// Creates the schema, bootstraps admins and processes registrations.
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Schema management.
    Db {
        #[command(subcommand)]
        db_command: DbCommand,
    },
    /// Admin accounts.
    Admin {
        #[command(subcommand)]
        admin_command: AdminCommand,
    },
    /// Registration approvals.
    Approvals {
        #[command(subcommand)]
        approvals_command: ApprovalsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum DbCommand {
    /// Creates every missing table from the entity definitions.
    Init,
    /// Drops ALL tables in the public schema. Use with care!
    Wipe {
        /// Required confirmation flag.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum AdminCommand {
    /// Creates an admin account that can log in immediately.
    Create {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
}

#[derive(Subcommand, Debug)]
enum ApprovalsCommand {
    /// Prints approvals as JSON, optionally filtered by status.
    List {
        /// UNAPPROVED, ACCEPTED or DENIED.
        #[arg(short, long)]
        status: Option<String>,
    },
    /// Approves or rejects a pending registration.
    Decide {
        #[arg(long)]
        id: Uuid,

        /// APPROVED, UNAPPROVED or DENIED.
        #[arg(short, long)]
        status: String,
    },
}

fn parse_status(value: &str) -> Result<ApprovalStatus, Box<dyn std::error::Error>> {
    match value.to_ascii_uppercase().as_str() {
        "UNAPPROVED" => Ok(ApprovalStatus::Unapproved),
        "ACCEPTED" => Ok(ApprovalStatus::Accepted),
        "DENIED" => Ok(ApprovalStatus::Denied),
        other => Err(format!("Unknown approval status: {}", other).into()),
    }
}

fn parse_decision(value: &str) -> Result<ApprovalDecision, Box<dyn std::error::Error>> {
    match value.to_ascii_uppercase().as_str() {
        "APPROVED" => Ok(ApprovalDecision::Approved),
        "UNAPPROVED" => Ok(ApprovalDecision::Unapproved),
        "DENIED" => Ok(ApprovalDecision::Denied),
        other => Err(format!("Unknown decision: {}", other).into()),
    }
}

async fn wipe(db: &DatabaseConnection) -> Result<(), Box<dyn std::error::Error>> {
    let backend = db.get_database_backend();
    let tables: Vec<String> = db
        .query_all(Statement::from_string(
            backend,
            "SELECT tablename FROM pg_tables WHERE schemaname = 'public'".to_string(),
        ))
        .await?
        .into_iter()
        .filter_map(|row| row.try_get::<String>("", "tablename").ok())
        .collect();

    if tables.is_empty() {
        println!("No tables found. The database is already empty.");
        return Ok(());
    }
    for table in tables {
        db.execute(Statement::from_string(
            backend,
            format!("DROP TABLE IF EXISTS \"{}\" CASCADE;", table),
        ))
        .await?;
        println!("Dropped table: {}", table);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("warn"));

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let db_url = std::env::var("DATABASE_URL")?;
    let db = database::connect_with_settings(&DatabaseSettings::default_from_url(db_url)).await?;

    match cli.command {
        Commands::Db { db_command } => match db_command {
            DbCommand::Init => {
                schema::create_all(&db).await?;
                println!("Schema created.");
            }
            DbCommand::Wipe { yes } => {
                if !yes {
                    return Err("Refusing to wipe without --yes".into());
                }
                wipe(&db).await?;
                println!("Database wiped.");
            }
        },
        Commands::Admin { admin_command } => match admin_command {
            AdminCommand::Create {
                username,
                email,
                password,
            } => {
                let admin = accounts::register_admin(
                    &db,
                    RegisterAdmin {
                        username,
                        email,
                        confirm_password: password.clone(),
                        password,
                    },
                    config.effective_bcrypt_cost(),
                )
                .await?;
                println!("Created admin {} ({})", admin.username, admin.id);
            }
        },
        Commands::Approvals { approvals_command } => match approvals_command {
            ApprovalsCommand::List { status } => {
                let status = status.as_deref().map(parse_status).transpose()?;
                let views = approvals::list(&db, status).await?;
                println!("{}", serde_json::to_string_pretty(&views)?);
            }
            ApprovalsCommand::Decide { id, status } => {
                match approvals::decide(&db, id, parse_decision(&status)?).await? {
                    DecisionOutcome::Accepted(approval) => {
                        println!("Approval {} accepted.", approval.id)
                    }
                    DecisionOutcome::Removed(account) => {
                        println!("Removed {} {}.", account.kind(), account.id())
                    }
                }
            }
        },
    }

    Ok(())
}
