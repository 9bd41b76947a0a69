use game_catalog::infra::config::{self, Backend, Settings};
use game_catalog::PostgresCatalogStore;

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight\n\
         \n\
         Requires env vars:\n\
           DATABASE_URL\n\
         Optional:\n\
           DB_MAX_CONNECTIONS, MISSING_PLATFORM_POLICY, EXPOSE_STORE_ERRORS\n"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }

    // Force-read config (nice error messages if missing)
    let settings = Settings::from_env()?;
    if settings.backend == Backend::Memory {
        println!("> CATALOG_BACKEND=memory: nothing to check.");
        return Ok(());
    }
    let url = config::database_url()?;

    println!("> Preflight:");
    println!("  BIND_ADDR={}", settings.bind_addr);
    println!("  DB_MAX_CONNECTIONS={}", settings.max_connections);
    println!("  MISSING_PLATFORM_POLICY={:?}", settings.missing_platforms);

    // Connecting also applies pending migrations.
    let store = PostgresCatalogStore::connect(&url, settings.max_connections)
        .await
        .map_err(|e| anyhow::anyhow!("Could not connect/migrate: {}", e))?;
    println!("  Database reachable, migrations applied.");

    for table in ["genres", "platforms", "games", "game_platforms"] {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(store.pool())
            .await?;
        println!("  {}: {} row(s)", table, count);
    }

    println!("> Preflight OK.");
    Ok(())
}
