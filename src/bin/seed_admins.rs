//! Seed Admins CLI
//!
//! Creates the default superadmin and clerk accounts. Accounts that already
//! exist are left untouched.
//!
//! Usage:
//!   cargo run --bin seed_admins
//!   cargo run --bin seed_admins -- --db /path/to/ecf_court.db --superadmin-password s3cret-pass

use anyhow::{Context, Result};
use clap::Parser;
use ecf_backend::{
    auth::{AccountStore, AdminRole},
    config::{load_env, resolve_data_path},
};

#[derive(Parser, Debug)]
#[command(name = "seed_admins")]
#[command(about = "Create the default ECF admin accounts")]
struct Args {
    /// Path to the SQLite database (defaults to ECF_DB_PATH)
    #[arg(long, env = "ECF_DB_PATH")]
    db: Option<String>,

    #[arg(long, env = "SEED_SUPERADMIN_PASSWORD", default_value = "superadmin123")]
    superadmin_password: String,

    #[arg(long, env = "SEED_CLERK_PASSWORD", default_value = "clerk123")]
    clerk_password: String,
}

struct Seed<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
    role: AdminRole,
}

fn main() -> Result<()> {
    load_env();
    let args = Args::parse();

    let db_path = resolve_data_path(args.db, "ecf_court.db");
    println!("=== Seed Admins ===");
    println!("Database: {}", db_path);
    println!();

    let store = AccountStore::open(&db_path)
        .with_context(|| format!("Failed to open account store at {}", db_path))?;

    let seeds = [
        Seed {
            name: "Super Admin",
            email: "superadmin@court.com",
            password: &args.superadmin_password,
            role: AdminRole::SuperAdmin,
        },
        Seed {
            name: "Clerk Admin",
            email: "clerk@court.com",
            password: &args.clerk_password,
            role: AdminRole::Clerk,
        },
    ];

    for seed in &seeds {
        if store
            .get_by_email(seed.email)
            .context("Failed to look up account")?
            .is_some()
        {
            println!("⚠️  {} already exists: {}", seed.role.as_str(), seed.email);
            continue;
        }

        store
            .create_account(seed.name, seed.email, seed.password, seed.role.as_str())
            .with_context(|| format!("Failed to create {}", seed.email))?;
        println!("✅ {} created: {}", seed.role.as_str(), seed.email);
    }

    println!();
    println!(
        "Accounts in store: {}",
        store.count().context("Failed to count accounts")?
    );
    Ok(())
}
