use std::sync::Arc;

use colored::Colorize;
use serde::Serialize;
use serde_json::json;

use cgen_compose::{DeploymentContext, Extensions};
use cgen_registry::{MetadataRegistry, RebuildReport};

use crate::cli::*;
use crate::config::CliConfig;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    let config = CliConfig::resolve(cli.config.as_deref(), cli.target.as_deref(), &cli.search_paths)?;
    match cli.command {
        Command::Rebuild => cmd_rebuild(&config, format),
        Command::HasTypekit(args) => cmd_has_typekit(&open(&config)?, &args.name, format),
        Command::ProjectModel(args) => cmd_project_model(&open(&config)?, &args.name, format),
        Command::TypekitModel(args) => cmd_typekit_model(&open(&config)?, &args.name, format),
        Command::TaskLibrary(args) => {
            let registry = open(&config)?;
            lookup(format, "task_library", &args.model, registry.task_library_owning(&args.model))
        }
        Command::DeploymentProject(args) => {
            let registry = open(&config)?;
            lookup(format, "project", &args.name, registry.project_owning(&args.name))
        }
        Command::Deployments(args) => cmd_deployments(&open(&config)?, &args.task, format),
        Command::Plugins => cmd_plugins(format),
        Command::Initializers => cmd_initializers(format),
        Command::Compose(args) => cmd_compose(args, format),
    }
}

fn open(config: &CliConfig) -> anyhow::Result<MetadataRegistry> {
    Ok(MetadataRegistry::open(
        config.registry.clone(),
        Arc::new(config.store()),
    )?)
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_rebuild(config: &CliConfig, format: OutputFormat) -> anyhow::Result<()> {
    let registry = MetadataRegistry::new(config.registry.clone(), Arc::new(config.store()))?;
    let report = registry.rebuild()?;
    match format {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Text => {
            print_report(registry.target(), &report);
            Ok(())
        }
    }
}

fn print_report(target: &str, report: &RebuildReport) {
    println!(
        "{} Registry rebuilt for {} in {:.1?}",
        "✓".green().bold(),
        target.yellow(),
        report.elapsed
    );
    println!("  Projects:       {}", report.projects.to_string().bold());
    println!("  Task libraries: {}", report.task_libraries.to_string().bold());
    println!("  Deployments:    {}", report.deployments.to_string().bold());
    println!("  Typekits:       {}", report.typekits.to_string().bold());
    println!("  Types:          {}", report.types.to_string().bold());
    println!("  Fingerprint:    {}", report.fingerprint.short_hex().cyan());
    if !report.diagnostics.is_empty() {
        println!("\n{} diagnostic(s):", report.diagnostics.len().to_string().yellow());
        for d in &report.diagnostics {
            println!("  {} {}", "!".yellow(), d);
        }
    }
}

fn cmd_has_typekit(registry: &MetadataRegistry, name: &str, format: OutputFormat) -> anyhow::Result<()> {
    let installed = registry.has_typekit(name);
    match format {
        OutputFormat::Json => print_json(&json!({ "typekit": name, "installed": installed })),
        OutputFormat::Text => {
            if installed {
                println!("{} typekit {} is installed", "✓".green(), name.yellow());
            } else {
                println!("{} typekit {} is not installed", "✗".red(), name.yellow());
            }
            Ok(())
        }
    }
}

fn cmd_project_model(registry: &MetadataRegistry, name: &str, format: OutputFormat) -> anyhow::Result<()> {
    let (text, path) = registry.project_model_text(name)?;
    match format {
        OutputFormat::Json => print_json(&json!({ "project": name, "path": path, "text": text })),
        OutputFormat::Text => {
            println!("{} {}", "#".dimmed(), path.display().to_string().dimmed());
            print!("{text}");
            Ok(())
        }
    }
}

fn cmd_typekit_model(registry: &MetadataRegistry, name: &str, format: OutputFormat) -> anyhow::Result<()> {
    let (registry_text, typelist) = registry.typekit_model_text(name)?;
    match format {
        OutputFormat::Json => print_json(&json!({
            "typekit": name,
            "registry": registry_text,
            "typelist": typelist,
        })),
        OutputFormat::Text => {
            println!("{}", "Type registry:".bold());
            print!("{registry_text}");
            println!("{}", "Type list:".bold());
            print!("{typelist}");
            Ok(())
        }
    }
}

fn lookup(format: OutputFormat, field: &str, key: &str, owner: Option<String>) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let mut object = serde_json::Map::new();
            object.insert("name".into(), json!(key));
            object.insert(field.into(), json!(owner));
            print_json(&object)
        }
        OutputFormat::Text => {
            match owner {
                Some(owner) => println!("{} -> {}", key.yellow(), owner.green().bold()),
                None => println!("{} -> {}", key.yellow(), "(none)".dimmed()),
            }
            Ok(())
        }
    }
}

fn cmd_deployments(registry: &MetadataRegistry, task: &str, format: OutputFormat) -> anyhow::Result<()> {
    let deployments = registry.deployments_containing(task);
    match format {
        OutputFormat::Json => print_json(&json!({ "task": task, "deployments": deployments })),
        OutputFormat::Text => {
            if deployments.is_empty() {
                println!("No deployment instantiates {}.", task.yellow());
            }
            for name in &deployments {
                println!("  {name}");
            }
            Ok(())
        }
    }
}

fn print_names(format: OutputFormat, heading: &str, names: &[&str]) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(&names),
        OutputFormat::Text => {
            println!("{}", heading.bold());
            for (i, name) in names.iter().enumerate() {
                println!("  {}. {}", i + 1, name.cyan());
            }
            Ok(())
        }
    }
}

fn cmd_plugins(format: OutputFormat) -> anyhow::Result<()> {
    let extensions = Extensions::builtin()?;
    print_names(format, "Marshaller plugins:", &extensions.plugins.names())
}

fn cmd_initializers(format: OutputFormat) -> anyhow::Result<()> {
    let extensions = Extensions::builtin()?;
    print_names(format, "Global initializers:", &extensions.initializers.names())
}

fn cmd_compose(args: ComposeArgs, format: OutputFormat) -> anyhow::Result<()> {
    let extensions = Extensions::builtin()?;
    let context = DeploymentContext::new(args.project, args.deployment);
    let composed = extensions.initializers.compose(&args.initializers, &context)?;
    match format {
        OutputFormat::Json => print_json(&composed),
        OutputFormat::Text => {
            if composed.is_empty() {
                println!("No initializers selected.");
                return Ok(());
            }
            println!("Initializers: {}", composed.initializers.join(", ").cyan());
            section("global scope", &composed.global_scope);
            section("init", &composed.init);
            section("exit", &composed.exit);
            for (target, text) in &composed.build {
                section(&format!("build: {target}"), text);
            }
            Ok(())
        }
    }
}

fn section(title: &str, text: &str) {
    if text.is_empty() {
        return;
    }
    println!("\n{}", format!("== {title} ==").bold());
    print!("{text}");
    if !text.ends_with('\n') {
        println!();
    }
}
