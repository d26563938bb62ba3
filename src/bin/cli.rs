use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use trustwork::{
    catalog::{sample_jobs, sample_services, ListingFilter, ALL_CATEGORIES},
    client::HttpAuthApi,
    error::FlowError,
    flow::{
        dashboard::{dashboard_view, request_restricted_action},
        offer_service::{submit_offer, OfferServiceForm},
        role::{role_option, select_role},
        signin::{submit_signin, SigninForm},
        signup::{submit_signup, SignupForm},
        verification::{submit_verification, VerificationForm, VerificationOutcome},
    },
    models::Role,
    session::{FileStorage, SessionStore},
    ui::RestrictedActionGate,
};

#[derive(Parser)]
#[command(name = "trustwork-cli")]
#[command(about = "Terminal client for the TrustWork marketplace", long_about = None)]
struct Cli {
    /// Base URL of the proxy server
    #[arg(long, env = "TRUSTWORK_API_URL", default_value = "http://127.0.0.1:3000")]
    api_url: String,

    /// Session storage file (defaults to ~/.trustwork/storage.json)
    #[arg(long, env = "TRUSTWORK_STORAGE")]
    storage: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a registration
    Signup {
        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        #[arg(short, long)]
        email: String,

        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Choose how you will use the marketplace
    ChooseRole {
        /// freelancer or client
        role: Option<Role>,
    },

    /// Submit the registration for verification
    Verify {
        /// Comma or newline separated
        #[arg(long, default_value = "")]
        skills: String,

        #[arg(long, default_value = "")]
        github_profile: String,

        /// Comma or newline separated
        #[arg(long, default_value = "")]
        portfolio_links: String,

        #[arg(long, default_value = "")]
        experience_description: String,

        #[arg(long, default_value = "")]
        education: String,

        #[arg(long, default_value = "")]
        company_name: String,

        #[arg(long, default_value = "")]
        location: String,
    },

    /// Sign in to an existing account
    Signin {
        #[arg(short, long)]
        email: String,

        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Sign out and forget the local session
    Signout,

    /// Show the current session and any registration in progress
    Status,

    /// Show the dashboard
    Dashboard {
        /// Try the gated action for your account type
        #[arg(long)]
        attempt: bool,
    },

    /// Create a service offer (verified freelancers only)
    OfferService {
        #[arg(long)]
        title: String,

        #[arg(long)]
        category: String,

        #[arg(long)]
        description: String,

        #[arg(long)]
        price: String,

        #[arg(long)]
        delivery_time: String,

        /// Comma separated
        #[arg(long)]
        tags: String,

        /// Repeat for each feature
        #[arg(long = "feature")]
        features: Vec<String>,

        #[arg(long, default_value = "")]
        requirements: String,
    },

    /// Browse services and jobs
    Explore {
        #[arg(short, long, default_value = "")]
        search: String,

        #[arg(short, long, default_value = ALL_CATEGORIES)]
        category: String,

        /// List jobs instead of services
        #[arg(long)]
        jobs: bool,
    },
}

fn default_storage_path() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set; pass --storage")?;
    Ok(PathBuf::from(home).join(".trustwork").join("storage.json"))
}

async fn get_password(prompt: &str) -> Result<String, Box<dyn std::error::Error>> {
    use std::io::{self, Write};
    print!("{}: ", prompt);
    io::stdout().flush()?;

    Ok(rpassword::read_password()?)
}

fn report(err: FlowError) -> ! {
    match err {
        FlowError::Invalid(errors) => {
            for (field, message) in errors {
                eprintln!("❌ {}: {}", field, message);
            }
        }
        other => eprintln!("❌ {}", other),
    }
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trustwork=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::Explore {
        search,
        category,
        jobs,
    } = &cli.command
    {
        let filter = ListingFilter {
            search: search.clone(),
            category: category.clone(),
        };
        if *jobs {
            let all = sample_jobs();
            let found = filter.jobs(&all);
            println!("{} job(s) found", found.len());
            for job in found {
                println!("  [{}] {} ({}) {} / {}", job.id, job.title, job.client, job.budget, job.timeline);
            }
        } else {
            let all = sample_services();
            let found = filter.services(&all);
            println!("{} service(s) found", found.len());
            for service in found {
                println!(
                    "  [{}] {} by {} from ₦{} ({} ★, {} reviews)",
                    service.id,
                    service.title,
                    service.freelancer,
                    service.price,
                    service.rating,
                    service.reviews
                );
            }
        }
        return Ok(());
    }

    let storage_path = match cli.storage.clone() {
        Some(path) => path,
        None => default_storage_path()?,
    };

    let session = SessionStore::new(
        Arc::new(HttpAuthApi::new(cli.api_url.clone())),
        Arc::new(FileStorage::new(storage_path)),
    );
    session.bootstrap().await?;

    match cli.command {
        Commands::Signup {
            first_name,
            last_name,
            email,
            password,
        } => {
            let (password, confirm_password) = match password {
                Some(pw) => (pw.clone(), pw),
                None => (get_password("Password").await?, get_password("Confirm password").await?),
            };

            let form = SignupForm {
                first_name,
                last_name,
                email,
                password,
                confirm_password,
            };
            match submit_signup(&session, &form).await {
                Ok(_) => {
                    println!("✅ Details saved. Next: trustwork-cli choose-role <freelancer|client>");
                }
                Err(err) => report(err),
            }
        }

        Commands::ChooseRole { role } => match select_role(&session, role).await {
            Ok(payload) => {
                if let Some(role) = payload.role {
                    let option = role_option(role);
                    println!("✅ Selected role: {}", option.subtitle);
                    for feature in option.features {
                        println!("  • {}", feature);
                    }
                    println!("Next: trustwork-cli verify ...");
                }
            }
            Err(err) => report(err),
        },

        Commands::Verify {
            skills,
            github_profile,
            portfolio_links,
            experience_description,
            education,
            company_name,
            location,
        } => {
            let form = VerificationForm {
                skills,
                github_profile,
                portfolio_links,
                experience_description,
                education,
                company_name,
                location,
            };
            match submit_verification(&session, &form).await {
                Ok(VerificationOutcome::PendingReview { role, .. }) => {
                    println!("✅ {} registration submitted for review.", role_option(role).subtitle);
                    println!("Our team will review your information within 24-48 hours.");
                    println!("Sign in once you receive the confirmation email.");
                }
                Err(err) => report(err),
            }
        }

        Commands::Signin { email, password } => {
            let password = match password {
                Some(pw) => pw,
                None => get_password("Password").await?,
            };

            match submit_signin(&session, &SigninForm { email, password }).await {
                Ok(user) => {
                    println!("✅ Signed in as {} ({})", user.full_name(), user.email);
                    println!("  Status: {}", user.verification_status().label());
                }
                Err(err) => report(err),
            }
        }

        Commands::Signout => {
            session.sign_out().await?;
            println!("✅ Signed out");
        }

        Commands::Status => {
            let snapshot = session.snapshot().await;
            match &snapshot.user {
                Some(user) => {
                    println!("Signed in as {} ({})", user.full_name(), user.email);
                    println!("  Account type: {}", user.user_type);
                    println!("  Status: {}", user.verification_status().label());
                }
                None => println!("Not signed in."),
            }
            if let Some(payload) = &snapshot.signup_payload {
                let role = payload.role.map(|r| r.to_string()).unwrap_or_else(|| "not chosen".into());
                println!("Registration in progress (role: {})", role);
            }
        }

        Commands::Dashboard { attempt } => {
            let Some(user) = session.user().await else {
                eprintln!("❌ Sign in to view your dashboard");
                std::process::exit(1);
            };

            let view = dashboard_view(&user);
            println!("{}", view.greeting);
            println!("{}", view.subtitle);
            println!("Status: {}", view.status.label());
            for tile in &view.stats {
                println!("  {:<16} {}", tile.title, tile.value);
            }
            if let Some(prompt) = view.verification_prompt {
                println!("{}", prompt);
            }

            if attempt {
                let mut gate = RestrictedActionGate::new();
                if request_restricted_action(Some(&user), &mut gate, view.primary_action) {
                    println!("✅ You can go ahead with {}.", view.primary_action);
                } else if let Some(message) = gate.message() {
                    eprintln!("🔒 {}", message);
                    gate.hide();
                }
            }
        }

        Commands::OfferService {
            title,
            category,
            description,
            price,
            delivery_time,
            tags,
            features,
            requirements,
        } => {
            let user = session.user().await;
            let mut gate = RestrictedActionGate::new();
            let form = OfferServiceForm {
                title,
                category,
                description,
                price,
                delivery_time,
                tags,
                features,
                requirements,
            };

            match submit_offer(user.as_ref(), &mut gate, &form) {
                Ok(offer) => {
                    println!("✅ Service created: {}", offer.title);
                    println!("{}", serde_json::to_string_pretty(&offer)?);
                }
                Err(FlowError::Restricted(_)) => {
                    if let Some(message) = gate.message() {
                        eprintln!("🔒 {}", message);
                    }
                    std::process::exit(1);
                }
                Err(err) => report(err),
            }
        }

        Commands::Explore { .. } => {}
    }

    Ok(())
}
