use carstore::infra::config::{self, StorageBackend};
use carstore::storage::postgres::CARS_TABLE;
use carstore::{CarCollection, PostgresCarCollection};

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight -- [--create-schema]\n\
         \n\
         Requires env vars:\n\
           DATABASE_URL\n\
         Optional:\n\
           STORAGE_BACKEND, DB_MAX_CONNECTIONS, BIND_ADDR, CORS_ALLOWED_ORIGINS, STORAGE_TIMEOUT_SECS\n"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }

    let create_schema = args.iter().any(|a| a == "--create-schema");

    // Force-read config (nice error messages if missing or malformed)
    let backend = config::storage_backend()?;
    let timeout = config::storage_timeout()?;
    let max_connections = config::db_max_connections()?;
    let database_url = config::database_url()?;

    println!("> Preflight:");
    println!("  STORAGE_BACKEND={:?}", backend);
    println!("  STORAGE_TIMEOUT_SECS={}", timeout.as_secs());
    println!("  DB_MAX_CONNECTIONS={}", max_connections);
    println!("  BIND_ADDR={}", config::bind_addr());
    println!("  CORS_ALLOWED_ORIGINS={}", config::cors_allowed_origins().join(","));
    if backend == StorageBackend::Memory {
        eprintln!("  Warning: STORAGE_BACKEND=memory; the server will not use this database.");
    }

    // Connect without touching the schema, so a missing table is reported.
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to DATABASE_URL: {}", e))?;
    let collection = PostgresCarCollection::new(pool);

    collection.ping().await?;
    println!("  Database reachable.");

    if !collection.schema_exists().await? {
        if create_schema {
            println!("  Table '{}' missing -> creating...", CARS_TABLE);
            collection.ensure_schema().await?;
            println!("  Table '{}' created.", CARS_TABLE);
        } else {
            return Err(anyhow::anyhow!(
                "Table '{}' does not exist. Re-run with --create-schema",
                CARS_TABLE
            ));
        }
    } else {
        println!("  Table '{}' exists.", CARS_TABLE);
    }

    println!("  Stored cars: {}", collection.count().await?);
    println!("> Preflight OK.");
    Ok(())
}
