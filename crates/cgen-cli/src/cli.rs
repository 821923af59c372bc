use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "cgen",
    about = "Inspect installed components and code generation extensions",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Target platform (overrides the configuration)
    #[arg(long, global = true)]
    pub target: Option<String>,

    /// Descriptor directory, searched in order (overrides the configuration)
    #[arg(long = "search-path", global = true)]
    pub search_paths: Vec<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Scan the descriptors and report what was registered
    Rebuild,
    /// Check whether a typekit is installed
    HasTypekit(NameArgs),
    /// Print the specification text of a project
    ProjectModel(NameArgs),
    /// Print the type registry and type list of a typekit
    TypekitModel(NameArgs),
    /// Show the task library defining a task model
    TaskLibrary(ModelArgs),
    /// Show the project defining a deployment
    DeploymentProject(NameArgs),
    /// List the deployments instantiating a task
    Deployments(TaskArgs),
    /// List marshaller plugins in registration order
    Plugins,
    /// List global initializers in registration order
    Initializers,
    /// Render global initializers for a deployment
    Compose(ComposeArgs),
}

#[derive(Args)]
pub struct NameArgs {
    pub name: String,
}

#[derive(Args)]
pub struct ModelArgs {
    pub model: String,
}

#[derive(Args)]
pub struct TaskArgs {
    pub task: String,
}

#[derive(Args)]
pub struct ComposeArgs {
    #[arg(long)]
    pub project: String,
    #[arg(long)]
    pub deployment: String,
    pub initializers: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_overrides_parse() {
        let cli = Cli::try_parse_from([
            "cgen",
            "task-library",
            "camera::Driver",
            "--target",
            "xenomai",
            "--search-path",
            "/a",
            "--search-path",
            "/b",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.target.as_deref(), Some("xenomai"));
        assert_eq!(cli.search_paths, vec![PathBuf::from("/a"), PathBuf::from("/b")]);
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Command::TaskLibrary(ModelArgs { ref model }) if model == "camera::Driver"));
    }

    #[test]
    fn compose_takes_initializer_list() {
        let cli = Cli::try_parse_from([
            "cgen", "compose", "--project", "camera", "--deployment", "camera_test", "qt", "qt5",
        ])
        .unwrap();
        match cli.command {
            Command::Compose(args) => assert_eq!(args.initializers, vec!["qt", "qt5"]),
            _ => panic!("expected compose"),
        }
    }
}
