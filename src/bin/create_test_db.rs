use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;

use budget_planner::{
    CategoryData, CategoryName, Email, NewBudgetPlan, PasswordHash, create_budget_plan,
    create_category, initialize_db, register_user,
};

/// A utility for creating a test database for the REST API server of budget_planner.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The email of the test user.
    #[arg(long, default_value = "test@example.com")]
    email: String,

    /// The password of the test user.
    #[arg(long, default_value = "averystrongandsecurepassword")]
    password: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user {}...", args.email);
    let email = Email::new(&args.email)?;
    register_user(
        "Test User",
        email.clone(),
        &args.password,
        PasswordHash::DEFAULT_COST,
        &conn,
    )?;

    println!("Creating categories...");
    for name in ["Groceries", "Rent", "Transport"] {
        create_category(
            CategoryData {
                name: CategoryName::new(name)?,
                description: String::new(),
                color: String::new(),
            },
            &conn,
        )?;
    }

    println!("Creating budget plan...");
    create_budget_plan(
        NewBudgetPlan {
            name: "Monthly".to_owned(),
            description: "Everyday spending".to_owned(),
        },
        &email,
        &conn,
    )?;

    println!("Success!");

    Ok(())
}
