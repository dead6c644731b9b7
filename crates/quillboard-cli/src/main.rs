use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use quillboard_cli::seeder::{self, SeedConfig};
use quillboard_config::DatabaseConfig;
use quillboard_core::hash_password;
use quillboard_db::{PgPool, init_db_pool};

#[derive(Parser)]
#[command(name = "quillboard-cli")]
#[command(about = "Quillboard CLI - Administrative tools for Quillboard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account holding the superadmin role
    CreateSuperadmin {
        /// Display name
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Seed roles, permissions, lookups and fake blogs
    Seed {
        /// Number of blogs to create
        #[arg(short = 'b', long, default_value = "50")]
        blogs: usize,

        /// Email of the account that authors seeded blogs
        #[arg(long, default_value = seeder::models::DEFAULT_AUTHOR_EMAIL)]
        author: String,
    },
    /// Seed only permissions and roles
    SeedRbac,
    /// Seed only categories, locations and courses
    SeedLookups,
    /// Append fake blogs using existing categories and locations
    SeedBlogs {
        /// Number of blogs to create
        #[arg(short = 'b', long, default_value = "50")]
        blogs: usize,

        #[arg(long, default_value = seeder::models::DEFAULT_AUTHOR_EMAIL)]
        author: String,
    },
    /// Delete every blog
    ClearBlogs,
}

fn fail(context: &str, error: impl std::fmt::Display) -> ! {
    eprintln!("\n❌ {}: {}", context, error);
    std::process::exit(1);
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();

    let config = DatabaseConfig::from_env().unwrap_or_else(|e| fail("DATABASE_URL must be set", e));
    let pool = init_db_pool(&config)
        .await
        .unwrap_or_else(|e| fail("Failed to connect to database", e));

    match cli.command {
        Commands::CreateSuperadmin {
            name,
            email,
            password,
        } => handle_create_superadmin(&pool, name, email, password).await,
        Commands::Seed { blogs, author } => {
            if let Err(e) = seeder::seed_all(&pool, SeedConfig::new(blogs).with_author(author)).await {
                fail("Error seeding database", e);
            }
        }
        Commands::SeedRbac => {
            if let Err(e) = seeder::rbac::seed_rbac(&pool).await {
                fail("Error seeding roles", e);
            }
        }
        Commands::SeedLookups => match seeder::seed_lookups(&pool).await {
            Ok((categories, locations)) => println!(
                "✅ Seeded {} categories and {} cities",
                categories.len(),
                locations.len()
            ),
            Err(e) => fail("Error seeding lookups", e),
        },
        Commands::SeedBlogs { blogs, author } => {
            match seeder::seed_blogs_only(&pool, SeedConfig::new(blogs).with_author(author)).await {
                Ok(count) => println!("✅ Created {} blogs", count),
                Err(e) => fail("Error seeding blogs", e),
            }
        }
        Commands::ClearBlogs => {
            if let Err(e) = seeder::clear_all(&pool).await {
                fail("Error clearing blogs", e);
            }
        }
    }
}

fn prompt(label: &str) -> String {
    Input::new()
        .with_prompt(label)
        .interact_text()
        .unwrap_or_else(|e| fail(&format!("Failed to read {}", label.to_lowercase()), e))
}

async fn handle_create_superadmin(
    pool: &PgPool,
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
) {
    let name = name.unwrap_or_else(|| prompt("Name"));
    let email = email.unwrap_or_else(|| prompt("Email address"));
    let password = password.unwrap_or_else(|| {
        Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()
            .unwrap_or_else(|e| fail("Failed to read password", e))
    });

    let hashed = hash_password(&password).unwrap_or_else(|e| fail("Failed to hash password", e.error));

    match seeder::rbac::create_superadmin(pool, &name, &email, &hashed).await {
        Ok(id) => {
            println!("\n✅ Superadmin created successfully!");
            println!("   Id: {}", id);
            println!("   Email: {}", email);
            println!("   Name: {}", name);
        }
        Err(e) => fail("Error creating superadmin", e),
    }
}
