use crate::adapters::http::PetFriendsClient;
use crate::app::settings::{DEFAULT_BASE_URL, Settings};
use crate::app::suite::{Outcome, Suite, SuiteContext, SuiteReport};
use crate::domain::pet::{AuthKey, Credentials, Pet, PetDraft, PetFilter, PetList};
use crate::domain::ports::PetService;
use crate::domain::response::{ApiResponse, ResponseBody};
use crate::server::http::{FakePetService, serve};
use anyhow::{Context as _, Result, bail};
use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(
    name = "pfcheck",
    version,
    about = "Exercise the PetFriends API and run the end-to-end scenario suite"
)]
pub struct Cli {
    /// Service root URL
    #[arg(long, global = true, env = "PETFRIENDS_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(long, global = true, env = "PETFRIENDS_EMAIL")]
    pub email: Option<String>,

    #[arg(long, global = true, env = "PETFRIENDS_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Per-request timeout; waits indefinitely when unset
    #[arg(long, global = true, env = "PETFRIENDS_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Log requests and scenario progress to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Obtain an auth key for the configured account
    Key,
    /// List pets
    List {
        /// Only the account's own pets
        #[arg(long)]
        mine: bool,
    },
    /// Create a pet, with a photo when one is given
    Add {
        #[command(flatten)]
        pet: PetArgs,
        #[arg(long)]
        photo: Option<PathBuf>,
    },
    /// Change a pet's name, type and age
    Update {
        pet_id: String,
        #[command(flatten)]
        pet: PetArgs,
    },
    /// Delete a pet
    Delete { pet_id: String },
    /// Upload a photo for an existing pet
    SetPhoto { pet_id: String, photo: PathBuf },
    /// Run the scenario suite against the service
    Suite {
        /// Image uploaded by scenarios that need one
        #[arg(long, env = "PETFRIENDS_PHOTO")]
        photo: Option<PathBuf>,
        /// Run only these scenarios (repeatable)
        #[arg(long = "only", value_name = "SCENARIO")]
        only: Vec<String>,
    },
    /// List the scenarios of the suite
    Scenarios,
    /// Run the in-memory fake service
    ServeFake {
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: SocketAddr,
        /// Account the fake accepts, as EMAIL:PASSWORD (repeatable)
        #[arg(long = "account", value_name = "EMAIL:PASSWORD", value_parser = parse_account)]
        accounts: Vec<Credentials>,
    },
}

#[derive(Debug, Clone, Args)]
pub struct PetArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub animal_type: String,
    /// Free text; the service does not check that it is a number
    #[arg(long)]
    pub age: String,
}

impl PetArgs {
    fn draft(&self) -> PetDraft {
        PetDraft::new(self.name.clone(), self.animal_type.clone(), self.age.as_str())
    }
}

fn parse_account(raw: &str) -> Result<Credentials, String> {
    raw.split_once(':')
        .map(|(email, password)| Credentials::new(email, password))
        .ok_or_else(|| format!("expected EMAIL:PASSWORD, got {raw:?}"))
}

impl Cli {
    pub fn settings(&self, photo: Option<PathBuf>) -> Settings {
        let credentials = match (&self.email, &self.password) {
            (Some(email), Some(password)) => Some(Credentials::new(email.as_str(), password.as_str())),
            _ => None,
        };
        Settings {
            base_url: self.base_url.clone(),
            credentials,
            photo,
            timeout: self.timeout_secs.map(Duration::from_secs),
        }
    }
}

pub fn run(cli: Cli) -> Result<ExitCode> {
    match &cli.command {
        Command::Scenarios => {
            list_scenarios();
            Ok(ExitCode::SUCCESS)
        }
        Command::ServeFake { addr, accounts } => {
            serve_fake(*addr, accounts)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Suite { photo, only } => run_suite(&cli.settings(photo.clone()), only),
        command => {
            let settings = cli.settings(None);
            let client = PetFriendsClient::new(settings.client_config())?;
            let credentials = settings.require_credentials()?;
            run_operation(&client, credentials, command)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn run_operation(client: &dyn PetService, credentials: &Credentials, command: &Command) -> Result<()> {
    match command {
        Command::Key => {
            let response = client.get_api_key(credentials)?;
            println!("Status: {}", response.status);
            match &response.body {
                ResponseBody::Parsed(body) => println!("Key: {}", body.key.as_str()),
                ResponseBody::Unparsed { raw, .. } => println!("{raw}"),
            }
        }
        Command::List { mine } => {
            let key = obtain_key(client, credentials)?;
            let filter = if *mine { PetFilter::MyPets } else { PetFilter::All };
            print_list(&client.get_list_of_pets(&key, filter)?);
        }
        Command::Add { pet, photo } => {
            let key = obtain_key(client, credentials)?;
            let response = match photo {
                Some(photo) => client.add_new_pet(&key, &pet.draft(), photo)?,
                None => client.add_new_pet_without_photo(&key, &pet.draft())?,
            };
            print_pet(&response);
        }
        Command::Update { pet_id, pet } => {
            let key = obtain_key(client, credentials)?;
            print_pet(&client.update_pet_info(&key, pet_id, &pet.draft())?);
        }
        Command::Delete { pet_id } => {
            let key = obtain_key(client, credentials)?;
            println!("Status: {}", client.delete_pet(&key, pet_id)?);
        }
        Command::SetPhoto { pet_id, photo } => {
            let key = obtain_key(client, credentials)?;
            print_pet(&client.set_pet_photo(&key, pet_id, photo)?);
        }
        Command::Suite { .. } | Command::Scenarios | Command::ServeFake { .. } => {
            bail!("not a single API operation")
        }
    }
    Ok(())
}

fn obtain_key(client: &dyn PetService, credentials: &Credentials) -> Result<AuthKey> {
    let response = client.get_api_key(credentials)?;
    let status = response.status;
    match response.into_parsed() {
        Some(body) if status == 200 => Ok(body.key),
        _ => bail!("could not obtain an auth key: service answered {status}"),
    }
}

fn print_list(response: &ApiResponse<PetList>) {
    println!("Status: {}", response.status);
    match &response.body {
        ResponseBody::Parsed(list) => {
            println!("Pets: {}", list.len());
            println!("{}", "=".repeat(80));
            for pet in &list.pets {
                println!(
                    "{}  {} / {} / {}{}",
                    pet.id,
                    pet.name,
                    pet.animal_type,
                    pet.age,
                    if pet.has_photo() { "  [photo]" } else { "" }
                );
            }
        }
        ResponseBody::Unparsed { raw, .. } => println!("{raw}"),
    }
}

fn print_pet(response: &ApiResponse<Pet>) {
    println!("Status: {}", response.status);
    match &response.body {
        ResponseBody::Parsed(pet) => {
            println!("  id:          {}", pet.id);
            println!("  name:        {}", pet.name);
            println!("  animal_type: {}", pet.animal_type);
            println!("  age:         {}", pet.age);
            println!("  photo:       {}", if pet.has_photo() { "yes" } else { "no" });
        }
        ResponseBody::Unparsed { raw, .. } => println!("{raw}"),
    }
}

fn list_scenarios() {
    let suite = Suite::standard();
    for scenario in suite.scenarios() {
        println!("{:<32} {}", scenario.name, scenario.description);
    }
}

fn run_suite(settings: &Settings, only: &[String]) -> Result<ExitCode> {
    let suite = Suite::standard().only(only)?;
    let client = PetFriendsClient::new(settings.client_config())?;
    let credentials = settings.require_credentials()?.clone();

    let mut ctx = SuiteContext::new(&client, credentials);
    if let Some(photo) = &settings.photo {
        ctx = ctx.with_photo(photo.clone());
    }

    println!(
        "Running {} scenario(s) against {}",
        suite.scenarios().len(),
        client.base_url()
    );
    println!("{}", "=".repeat(80));
    let report = suite.run(&ctx);
    print_report(&report);

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_report(report: &SuiteReport) {
    for result in &report.results {
        let (label, detail) = match &result.outcome {
            Outcome::Passed => ("PASS", None),
            Outcome::Failed(reason) => ("FAIL", Some(reason)),
            Outcome::Unrunnable(reason) => ("SKIP", Some(reason)),
        };
        println!(
            "  {label}  {} ({} ms)",
            result.name,
            result.elapsed.as_millis()
        );
        if let Some(detail) = detail {
            println!("        {detail}");
        }
    }
    println!("{}", "=".repeat(80));
    println!(
        "{} passed, {} failed, {} unrunnable",
        report.passed(),
        report.failed(),
        report.unrunnable()
    );
}

fn serve_fake(addr: SocketAddr, accounts: &[Credentials]) -> Result<()> {
    if accounts.is_empty() {
        bail!("the fake service needs at least one --account EMAIL:PASSWORD");
    }
    let service = FakePetService::new();
    for account in accounts {
        service.register(&account.email, &account.password);
    }
    println!("Fake PetFriends service on http://{addr} ({} account(s))", accounts.len());

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(serve(service, addr))
}
