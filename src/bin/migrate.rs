use anyhow::{anyhow, Result};
use calendar_chat_bot::config::{database_url_from_env, MEMORY_DATABASE_URL};
use calendar_chat_bot::database::connection::DatabaseManager;
use calendar_chat_bot::database::models::kv_entry::KvEntry;
use calendar_chat_bot::services::correlation::CORRELATION_PREFIX;
use calendar_chat_bot::services::session_store::SESSION_PREFIX;
use std::env;
use std::io;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    dotenvy::dotenv().ok();

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("migrate");

    match command {
        "migrate" | "up" => run_migrations().await,
        "check" => check_database().await,
        "reset" => reset_database().await,
        "purge-sessions" => purge_sessions().await,
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        _ => {
            eprintln!("Unknown command: {command}");
            print_help();
            std::process::exit(1);
        }
    }
}

fn sqlite_url() -> Result<String> {
    let database_url = database_url_from_env();
    if database_url.trim() == MEMORY_DATABASE_URL {
        return Err(anyhow!(
            "DATABASE_URL selects the in-memory store; there is nothing to migrate"
        ));
    }
    Ok(database_url)
}

async fn connect(database_url: &str) -> Result<DatabaseManager> {
    DatabaseManager::new(database_url)
        .await
        .map_err(|e| anyhow!("Failed to connect to database: {}", e))
}

async fn run_migrations() -> Result<()> {
    println!("📅 Calendar Chat Bot - Database Migration Tool");
    println!("==============================================");

    let database_url = sqlite_url()?;
    println!("📊 Database URL: {}", mask_url(&database_url));

    println!("🚀 Running database migrations...");
    let db_manager = connect(&database_url).await?;

    match db_manager.run_migrations().await {
        Ok(_) => println!("✅ Migrations completed successfully!"),
        Err(e) => {
            eprintln!("❌ Migration failed: {e}");
            std::process::exit(1);
        }
    }

    Ok(())
}

async fn check_database() -> Result<()> {
    println!("🔍 Checking database connection and schema...");

    let database_url = sqlite_url()?;
    println!("📊 Database URL: {}", mask_url(&database_url));

    let db_manager = connect(&database_url).await?;

    match check_tables(&db_manager).await {
        Ok(tables) => {
            println!("✅ Database connection successful!");
            println!("📋 Found tables:");
            for table in tables {
                println!("  • {table}");
            }
        }
        Err(e) => {
            println!("⚠️  Database check failed: {e}");
            println!("💡 Try running 'migrate up' to create the schema");
            return Ok(());
        }
    }

    match (
        KvEntry::count_with_prefix(&db_manager.pool, SESSION_PREFIX).await,
        KvEntry::count_with_prefix(&db_manager.pool, CORRELATION_PREFIX).await,
    ) {
        (Ok(sessions), Ok(correlations)) => {
            println!("👤 Sessions: {sessions}");
            println!("🔗 Correlation entries: {correlations}");
        }
        (Err(e), _) | (_, Err(e)) => println!("⚠️  Could not count records: {e}"),
    }

    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    println!("{prompt}");
    println!("🤔 Are you sure you want to continue? (yes/no)");

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("yes"))
}

async fn reset_database() -> Result<()> {
    if !confirm("⚠️  WARNING: This will delete ALL sessions and correlation entries!")? {
        println!("❌ Reset cancelled.");
        return Ok(());
    }

    let database_url = sqlite_url()?;
    let db_path = database_url
        .strip_prefix("sqlite:")
        .map(|path| path.trim_start_matches("//"))
        .ok_or_else(|| anyhow!("Reset is only supported for SQLite databases"))?;

    if Path::new(db_path).exists() {
        std::fs::remove_file(db_path)?;
        println!("🗑️  Deleted database file: {db_path}");
    }

    println!("🔄 Recreating database schema...");
    run_migrations().await?;

    println!("✅ Database reset completed!");
    Ok(())
}

/// Drops every stored dialog; users start over with no dialog active.
async fn purge_sessions() -> Result<()> {
    if !confirm("⚠️  WARNING: This will abort every dialog in progress!")? {
        println!("❌ Purge cancelled.");
        return Ok(());
    }

    let database_url = sqlite_url()?;
    let db_manager = connect(&database_url).await?;
    let removed = KvEntry::delete_with_prefix(&db_manager.pool, SESSION_PREFIX).await?;

    println!("🧹 Removed {removed} sessions");
    Ok(())
}

async fn check_tables(db_manager: &DatabaseManager) -> Result<Vec<String>> {
    let tables = sqlx::query_scalar::<_, String>(
        "SELECT name FROM sqlite_master WHERE type='table' ORDER BY name",
    )
    .fetch_all(&db_manager.pool)
    .await?;

    Ok(tables)
}

fn mask_url(url: &str) -> String {
    if let Some(path) = url.strip_prefix("sqlite:") {
        if let Some(filename) = Path::new(path).file_name() {
            return format!("sqlite:.../{}", filename.to_string_lossy());
        }
    }
    url.to_string()
}

fn print_help() {
    println!("📅 Calendar Chat Bot - Database Migration Tool");
    println!();
    println!("USAGE:");
    println!("    migrate [COMMAND]");
    println!();
    println!("COMMANDS:");
    println!("    migrate, up      Run database migrations (default)");
    println!("    check            Check database connection, schema and record counts");
    println!("    reset            Reset database (SQLite only) - DESTRUCTIVE!");
    println!("    purge-sessions   Delete every stored session - aborts open dialogs");
    println!("    help             Show this help message");
    println!();
    println!("ENVIRONMENT:");
    println!("    DATABASE_URL     Database connection string (default: sqlite:./data/calendar_bot.db)");
    println!();
}
