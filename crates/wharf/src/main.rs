mod commands;

use clap::{Args, Parser, Subcommand};
use wharf_core::{EventSink, JsonlSink, Options, split_trim};

#[derive(Parser)]
#[command(name = "wharf")]
#[command(
    about = "Docker Compose provider for AWS-backed services (RDS, S3)",
    long_about = "wharf is a Docker Compose provider plugin that wires AWS services \
                  (RDS and S3) into Compose applications by emitting JSONL events and \
                  environment variables on stdout."
)]
struct Cli {
    /// Compose project name
    #[arg(long = "project-name", global = true)]
    project_name: Option<String>,

    /// Compose service logical name
    #[arg(long, global = true)]
    name: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Provision AWS resources for this Compose service
    Up(ProviderArgs),
    /// Tear down AWS resources for this Compose service
    Down(ProviderArgs),
    /// Entry point used when invoked by docker compose
    #[command(subcommand)]
    Compose(ComposeCommands),
}

#[derive(Subcommand)]
enum ComposeCommands {
    /// Provision AWS resources for this Compose service
    Up(ProviderArgs),
    /// Tear down AWS resources for this Compose service
    Down(ProviderArgs),
}

/// Flags Docker Compose forwards from the service declaration.
///
/// Flag names use underscores to match the x-provider option keys as
/// Compose passes them through.
#[derive(Args, Debug, Clone)]
struct ProviderArgs {
    /// AWS service to manage (rds|s3)
    #[arg(long)]
    service: Option<String>,

    /// AWS region
    #[arg(long, default_value = "ap-southeast-1")]
    region: String,

    /// Database engine
    #[arg(long, default_value = "postgres")]
    engine: String,

    /// Database engine version
    #[arg(long = "engine_version")]
    engine_version: Option<String>,

    /// RDS instance class
    #[arg(long = "instance_class", default_value = "db.t3.micro")]
    instance_class: String,

    /// Allocated storage (GiB)
    #[arg(long = "allocated_storage", default_value_t = 20)]
    allocated_storage: i32,

    /// Database name
    #[arg(long = "db_name", default_value = "app")]
    db_name: String,

    /// Master username
    #[arg(long, default_value = "admin")]
    username: String,

    /// Master password
    #[arg(long, default_value = "password")]
    password: String,

    /// Comma-separated subnet IDs
    #[arg(long = "subnet_ids")]
    subnet_ids: Option<String>,

    /// Comma-separated security group IDs
    #[arg(long = "security_group_ids")]
    security_group_ids: Option<String>,

    /// Make the RDS instance publicly accessible
    #[arg(long = "publicly_accessible")]
    publicly_accessible: bool,

    /// Enable Multi-AZ deployment
    #[arg(long = "multi_az")]
    multi_az: bool,

    /// S3 bucket name (derived from project/name/region when empty)
    #[arg(long = "bucket_name")]
    bucket_name: Option<String>,

    /// Treat missing required fields as hard errors
    #[arg(long)]
    strict: bool,
}

impl ProviderArgs {
    fn into_options(self, project: Option<String>, name: Option<String>) -> Options {
        Options {
            project: project.unwrap_or_default(),
            name: name.unwrap_or_default(),
            service: self.service.unwrap_or_default(),
            region: self.region,
            engine: self.engine,
            engine_version: self.engine_version.unwrap_or_default(),
            instance_class: self.instance_class,
            allocated_storage: self.allocated_storage,
            db_name: self.db_name,
            username: self.username,
            password: self.password,
            subnet_ids: split_trim(self.subnet_ids.as_deref().unwrap_or_default()),
            security_group_ids: split_trim(self.security_group_ids.as_deref().unwrap_or_default()),
            publicly_accessible: self.publicly_accessible,
            multi_az: self.multi_az,
            bucket_name: self.bucket_name.unwrap_or_default(),
            strict: self.strict,
        }
    }
}

#[tokio::main]
async fn main() {
    // stdout carries the JSONL provider protocol; all logging goes to
    // stderr.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let events = JsonlSink::new();

    let result = match cli.command {
        Commands::Up(args) | Commands::Compose(ComposeCommands::Up(args)) => {
            commands::up::handle(&args.into_options(cli.project_name, cli.name), &events).await
        }
        Commands::Down(args) | Commands::Compose(ComposeCommands::Down(args)) => {
            commands::down::handle(&args.into_options(cli.project_name, cli.name), &events).await
        }
    };

    if let Err(err) = result {
        // The drivers have already reported the specific cause; this is
        // the final error event tied to the non-zero exit.
        events.error(&format!("command failed: {err}"));
        std::process::exit(1);
    }
}
