//! SagaForge Engine - command-line entry point.
//!
//! ```text
//! sagaforge-engine replay <history.json> [--json]
//! sagaforge-engine verify <history.json>
//! ```
//!
//! `replay` rebuilds a character from its history and prints the sheet (or
//! the record as JSON). `verify` applies the history intent by intent through
//! the store, then checks that a replay reproduces the stored record.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use sagaforge_domain::{CharacterId, CharacterSheet, ProgressionHistory};
use sagaforge_engine::infrastructure::settings::{load_dotenv_from, EngineSettings};
use sagaforge_engine::App;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: sagaforge-engine <replay|verify> <history.json> [--json]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (cargo run executes from `crates/engine`).
    let dotenv_failures =
        load_dotenv_from(&Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join(".."));
    let settings = EngineSettings::from_env();

    // Initialize logging; stdout is reserved for command output.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(&settings.log_filter))
                .unwrap_or_else(|_| "sagaforge_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    for (path, error) in &dotenv_failures {
        tracing::warn!(path = %path.display(), error = %error, "Ignoring unreadable env file");
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let as_json = args.iter().any(|arg| arg == "--json");
    let positional: Vec<&str> = args
        .iter()
        .filter(|arg| !arg.starts_with("--"))
        .map(String::as_str)
        .collect();
    let (command, path) = match positional.as_slice() {
        [command, path] => (*command, PathBuf::from(path)),
        _ => bail!(USAGE),
    };

    let app = App::from_settings(&settings)
        .await
        .context("Failed to load rule content")?;
    let history = read_history(&path).await?;

    match command {
        "replay" => replay(&app, &history, as_json).await,
        "verify" => verify(&app, &history).await,
        other => bail!("unknown command '{other}'\n{USAGE}"),
    }
}

async fn read_history(path: &Path) -> anyhow::Result<ProgressionHistory> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid history in {}", path.display()))
}

async fn replay(app: &App, history: &ProgressionHistory, as_json: bool) -> anyhow::Result<()> {
    let report = app
        .use_cases
        .progression
        .rebuild
        .execute(CharacterId::new(), history)
        .await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report.record)?);
    } else {
        print!("{}", CharacterSheet::project(&report.record, &app.rules)?.render());
    }
    Ok(())
}

async fn verify(app: &App, history: &ProgressionHistory) -> anyhow::Result<()> {
    let progression = &app.use_cases.progression;
    let created = progression
        .create
        .execute(history.name.clone(), history.actor_kind, history.ability_scores)
        .await?;

    for (step, intent) in history.intents.iter().enumerate() {
        let applied = progression
            .apply
            .execute(created.id(), intent.clone())
            .await
            .with_context(|| format!("Step {step} ({intent}) failed"))?;
        for warning in &applied.warnings {
            tracing::warn!(step, intent = %intent, "{warning}");
        }
    }

    let report = progression.rebuild.execute(created.id(), history).await?;
    if report.matches_stored != Some(true) {
        bail!("Replaying the history did not reproduce the stored record");
    }

    let sheet = progression.sheet.execute(created.id()).await?;
    print!("{}", sheet.render());
    println!(
        "Verified: {} intents replay to revision {}",
        history.intents.len(),
        sheet.revision
    );
    Ok(())
}
