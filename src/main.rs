mod cli;

use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use serde::Serialize;

use cli::{Cli, Commands};
use dexviewer::{
    config::ViewerConfig,
    dex::DexParser,
    session::{PackageSource, Session, Status, ViewState},
};

#[derive(Serialize)]
struct ClassEntry<'a> {
    name: &'a str,
    methods: &'a [String],
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_module("dexviewer", level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .format_target(false)
        .init();

    let mut config = ViewerConfig::from_env();
    if let Some(sample) = cli.sample.clone() {
        config.sample_package = Some(sample);
    }
    config.app_classes_only = !cli.all_classes;
    let session = Session::new(Arc::new(DexParser), config.clone());

    match cli.command {
        Commands::List { apk, query, json } => {
            open(&session, &config, apk.as_deref())?;
            let state = session.set_query(query.as_deref().unwrap_or_default());
            list(&state, json)?;
        }
        Commands::Show {
            class_name,
            apk,
            json,
        } => {
            open(&session, &config, apk.as_deref())?;
            select(&session, &class_name)?;
            let state = session.snapshot();
            let class = state
                .selected_class()
                .with_context(|| format!("{class_name} vanished from the index"))?;
            if json {
                println!("{}", serde_json::to_string_pretty(class)?);
            } else {
                println!("{}", class.body);
            }
        }
        Commands::Refs { class_name, apk } => {
            open(&session, &config, apk.as_deref())?;
            select(&session, &class_name)?;
            let state = session.snapshot();
            let class = state
                .selected_class()
                .with_context(|| format!("{class_name} vanished from the index"))?;
            for reference in &class.references {
                let target = &reference.target;
                let location = if state.index.resolve_by_name(&target.defining_class).is_some() {
                    "in package"
                } else {
                    "external"
                };
                println!(
                    "{:>5}  {}->{}  ({location})",
                    reference.line + 1,
                    target.defining_class,
                    target.name
                );
            }
        }
    }

    Ok(())
}

fn open(session: &Session, config: &ViewerConfig, apk: Option<&Path>) -> Result<Arc<ViewState>> {
    let (path, kind) = config
        .resolve_package(apk)
        .context("No APK given and no sample package configured (--sample or DEXVIEWER_SAMPLE_APK)")?;
    let state = session
        .open_package(PackageSource::Path(path.clone()), kind)
        .wait()
        .map_err(|_| anyhow!("Loading {} panicked", path.display()))?;
    if let Some(error) = &state.error {
        bail!("{}: {error}", path.display());
    }
    eprintln!("{}", state.summary);
    Ok(state)
}

fn select(session: &Session, class_name: &str) -> Result<()> {
    if !session.select_class(class_name) {
        bail!("Class {class_name} not found");
    }
    Ok(())
}

fn list(state: &ViewState, json: bool) -> Result<()> {
    let classes = state.classes();
    if json {
        let entries: Vec<_> = classes
            .iter()
            .map(|c| ClassEntry {
                name: &c.class_name,
                methods: &c.method_names,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    match state.status() {
        Status::NoClasses => eprintln!("No classes found (the package may not contain any DEX)"),
        Status::NoMatches => eprintln!("No class or method matches \"{}\"", state.query.trim()),
        Status::Showing(n) => {
            if state.query.trim().is_empty() {
                eprintln!("Showing all {n} classes");
            }
            for class in classes {
                println!("{}", class.class_name);
            }
        }
        Status::Loading | Status::Failed(_) => (),
    }
    Ok(())
}
