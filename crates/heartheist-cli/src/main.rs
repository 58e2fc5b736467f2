//! `heartheist` CLI: build Heart Heist pages and invites without the server.
//!
//! Renders the same stage templates the server serves, straight to files,
//! and exposes the calendar builder, the raw placeholder injector and the
//! compatibility score as standalone commands.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};

use heartheist_core::asset::{self, Photo, PhotoSlot};
use heartheist_core::calendar;
use heartheist_core::compat;
use heartheist_core::render::Renderer;
use heartheist_core::scenes::SceneLibrary;
use heartheist_core::session::{self, SessionInput};
use heartheist_core::stage::{Stage, StageCursor};
use heartheist_core::template;
use heartheist_storage::FsBackend;

// ── ANSI color helpers ───────────────────────────────────────────────

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const MAGENTA: &str = "\x1b[35m";

const BANNER_SMALL: &str = "♥ Heart Heist";

/// Vault backdrop used for offline renders (`#071024`).
const OFFLINE_BACKGROUND_RGB: [u8; 3] = [0x07, 0x10, 0x24];

// ── CLI structure ────────────────────────────────────────────────────

/// Heart Heist: a four-stage Valentine surprise.
#[derive(Parser)]
#[command(
    name = "heartheist",
    version,
    about = "Heart Heist CLI — render Valentine pages and calendar invites offline",
    long_about = None,
    after_help = format!(
        "{DIM}Environment variables:{RESET}\n  \
         HEARTHEIST_STAGES_DIR   Stage template directory (default: ./stages)\n\n\
         {DIM}Examples:{RESET}\n  \
         heartheist stages init\n  \
         heartheist generate --sender Parth --recipient Sneha --bundle\n  \
         heartheist invite --sender Parth --recipient Sneha --date 2026-02-14\n  \
         heartheist score Parth Sneha"
    ),
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a stage (or the whole bundle) plus its .ics invite to files.
    Generate(GenerateArgs),
    /// Print a Valentine calendar invite to stdout.
    Invite {
        /// Who is asking.
        #[arg(long)]
        sender: Option<String>,
        /// Who is being asked.
        #[arg(long)]
        recipient: Option<String>,
        /// Date of the date night (YYYY-MM-DD). Defaults to the next February 14.
        #[arg(long)]
        date: Option<String>,
        /// Event length in minutes.
        #[arg(long, default_value = "120")]
        duration: u32,
        /// Event location. Defaults to "To Be Announced".
        #[arg(long)]
        location: Option<String>,
    },
    /// Manage the stage template directory.
    Stages {
        #[command(subcommand)]
        action: StagesCommands,
    },
    /// Substitute raw TOKEN=VALUE pairs into a template file (no escaping).
    Render {
        /// Template file to read.
        #[arg(long)]
        template: PathBuf,
        /// `TOKEN=VALUE` pair; `TOKEN` may be given with or without braces.
        #[arg(long = "set", value_name = "TOKEN=VALUE")]
        set: Vec<String>,
        /// Write to this file instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the compatibility score for two names.
    Score {
        /// First name.
        a: String,
        /// Second name.
        b: String,
    },
}

#[derive(clap::Args)]
struct GenerateArgs {
    #[arg(long)]
    sender: Option<String>,
    #[arg(long)]
    recipient: Option<String>,
    /// Accent color, `#rgb` or `#rrggbb`.
    #[arg(long)]
    accent: Option<String>,
    /// Date of the date night (YYYY-MM-DD).
    #[arg(long)]
    date: Option<String>,
    /// Free-text line used for the poem puzzle.
    #[arg(long)]
    line: Option<String>,
    /// Photo shown in the compliment rain (png/jpg/jpeg).
    #[arg(long)]
    photo_a: Option<PathBuf>,
    /// Photo shown on the finale ticket (png/jpg/jpeg).
    #[arg(long)]
    photo_b: Option<PathBuf>,
    /// Stage to render: vault, puzzle, rain or finale.
    #[arg(long, default_value = "vault")]
    stage: String,
    /// Output directory.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
    /// Stage template directory; missing templates are created.
    #[arg(long, env = "HEARTHEIST_STAGES_DIR", default_value = "./stages")]
    stages_dir: PathBuf,
    /// Render all four stages into one self-contained page.
    #[arg(long)]
    bundle: bool,
}

#[derive(Subcommand)]
enum StagesCommands {
    /// Write the built-in template for every missing stage.
    Init {
        #[arg(long, env = "HEARTHEIST_STAGES_DIR", default_value = "./stages")]
        dir: PathBuf,
    },
    /// List installed stage templates.
    List {
        #[arg(long, env = "HEARTHEIST_STAGES_DIR", default_value = "./stages")]
        dir: PathBuf,
    },
}

// ── Command dispatch ─────────────────────────────────────────────────

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!();
            eprintln!("  {RED}{BOLD}✗ Error:{RESET} {e:#}");
            eprintln!();
            ExitCode::FAILURE
        }
    }
}

async fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Generate(args) => cmd_generate(args).await,
        Commands::Invite {
            sender,
            recipient,
            date,
            duration,
            location,
        } => cmd_invite(
            sender.as_deref(),
            recipient.as_deref(),
            date.as_deref(),
            duration,
            location.as_deref(),
        ),
        Commands::Stages { action } => match action {
            StagesCommands::Init { dir } => cmd_stages_init(&dir).await,
            StagesCommands::List { dir } => cmd_stages_list(&dir).await,
        },
        Commands::Render { template, set, out } => cmd_render(&template, &set, out.as_deref()),
        Commands::Score { a, b } => {
            cmd_score(&a, &b);
            Ok(())
        }
    }
}

// ── Generate ─────────────────────────────────────────────────────────

async fn cmd_generate(args: GenerateArgs) -> Result<()> {
    let mut input = SessionInput::with_defaults();
    if let Some(sender) = &args.sender {
        input.set_sender(sender);
    }
    if let Some(recipient) = &args.recipient {
        input.set_recipient(recipient);
    }
    if let Some(accent) = &args.accent {
        input.set_accent(accent);
    }
    if let Some(date) = &args.date {
        input.set_date(parse_date(date)?);
    }
    if let Some(line) = &args.line {
        input.set_line(line);
    }
    if let Some(path) = &args.photo_a {
        input.set_photo(PhotoSlot::A, Some(read_photo(path)?));
    }
    if let Some(path) = &args.photo_b {
        input.set_photo(PhotoSlot::B, Some(read_photo(path)?));
    }

    let stage: Stage = args.stage.parse().map_err(anyhow::Error::msg)?;
    let scenes = open_scenes(&args.stages_dir).await?;
    scenes
        .ensure_defaults()
        .await
        .context("failed to install default stage templates")?;

    let renderer = Renderer::new(scenes);
    let background = asset::blank_png_data_uri(64, 64, OFFLINE_BACKGROUND_RGB);
    let now = Utc::now();

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create {}", args.out_dir.display()))?;

    let (page_path, html, invite) = if args.bundle {
        let html = renderer.render_bundle(&input, &background, now).await?;
        (
            args.out_dir.join(input.bundle_filename()),
            html,
            input.invite_at(now),
        )
    } else {
        let page = renderer
            .render(&input, StageCursor::at(stage), &background, now)
            .await?;
        (args.out_dir.join(input.page_filename()), page.html, page.invite)
    };
    let ics_path = args.out_dir.join(input.ics_filename());

    write_file(&page_path, &html)?;
    write_file(&ics_path, &invite.text)?;

    println!();
    println!(
        "  {MAGENTA}{BOLD}{BANNER_SMALL}{RESET} for {BOLD}{}{RESET} from {BOLD}{}{RESET}",
        input.recipient(),
        input.sender()
    );
    println!("  {DIM}When:{RESET} {}", input.date_human());
    if !args.bundle {
        println!("  {DIM}Stage:{RESET} {stage}");
    }
    println!();
    println!("  {GREEN}✓{RESET} {}", page_path.display());
    println!("  {GREEN}✓{RESET} {}", ics_path.display());
    println!();
    Ok(())
}

fn read_photo(path: &Path) -> Result<Photo> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if !asset::is_supported_upload(&filename) {
        bail!(
            "unsupported photo '{}': use a .png, .jpg or .jpeg file",
            path.display()
        );
    }
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(Photo::new(filename, bytes))
}

// ── Invite ───────────────────────────────────────────────────────────

fn cmd_invite(
    sender: Option<&str>,
    recipient: Option<&str>,
    date: Option<&str>,
    duration: u32,
    location: Option<&str>,
) -> Result<()> {
    let mut input = SessionInput::with_defaults();
    if let Some(sender) = sender {
        input.set_sender(sender);
    }
    if let Some(recipient) = recipient {
        input.set_recipient(recipient);
    }
    if let Some(date) = date {
        input.set_date(parse_date(date)?);
    }

    let mut event = calendar::valentine_event(input.sender(), input.recipient(), input.date())
        .duration_minutes(duration);
    if let Some(location) = location {
        event = event.location(location);
    }
    print!("{}", event.build().to_ics());
    Ok(())
}

// ── Stages ───────────────────────────────────────────────────────────

async fn open_scenes(dir: &Path) -> Result<SceneLibrary> {
    let backend = FsBackend::open(dir)
        .with_context(|| format!("failed to open stages directory {}", dir.display()))?;
    Ok(SceneLibrary::new(Arc::new(backend)))
}

async fn cmd_stages_init(dir: &Path) -> Result<()> {
    let scenes = open_scenes(dir).await?;
    let created = scenes
        .ensure_defaults()
        .await
        .context("failed to install default stage templates")?;

    println!();
    if created.is_empty() {
        println!("  {DIM}All stage templates already present in{RESET} {}", dir.display());
    } else {
        for key in &created {
            println!("  {GREEN}✓{RESET} created {}", dir.join(key).display());
        }
    }
    println!();
    Ok(())
}

async fn cmd_stages_list(dir: &Path) -> Result<()> {
    let scenes = open_scenes(dir).await?;
    let installed = scenes.installed().await?;

    println!();
    for stage in Stage::ALL {
        let key = heartheist_core::scenes::key_for(stage);
        if installed.contains(&key) {
            println!("  {GREEN}✓{RESET} {key}");
        } else {
            println!("  {RED}✗{RESET} {key} {DIM}(missing){RESET}");
        }
    }
    for extra in installed
        .iter()
        .filter(|k| !Stage::ALL.iter().any(|s| heartheist_core::scenes::key_for(*s) == **k))
    {
        println!("  {DIM}·{RESET} {extra} {DIM}(unused){RESET}");
    }
    println!();
    Ok(())
}

// ── Render ───────────────────────────────────────────────────────────

fn cmd_render(path: &Path, set: &[String], out: Option<&Path>) -> Result<()> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let pairs = set
        .iter()
        .map(|pair| parse_pair(pair))
        .collect::<Result<Vec<_>>>()?;

    let html = template::inject(&source, pairs);
    match out {
        Some(out) => {
            write_file(out, &html)?;
            println!("  {GREEN}✓{RESET} {}", out.display());
        }
        None => print!("{html}"),
    }
    Ok(())
}

/// Split `TOKEN=VALUE`; a bare `TOKEN` is wrapped as `{{TOKEN}}`.
fn parse_pair(pair: &str) -> Result<(String, String)> {
    let Some((token, value)) = pair.split_once('=') else {
        bail!("invalid --set '{pair}': expected TOKEN=VALUE");
    };
    if token.is_empty() {
        bail!("invalid --set '{pair}': empty token");
    }
    let token = if token.starts_with("{{") {
        token.to_owned()
    } else {
        format!("{{{{{token}}}}}")
    };
    Ok((token, value.to_owned()))
}

// ── Score ────────────────────────────────────────────────────────────

fn cmd_score(a: &str, b: &str) {
    let score = compat::compatibility_score(a, b);
    println!("{score}");
}

// ── Helpers ──────────────────────────────────────────────────────────

fn parse_date(value: &str) -> Result<NaiveDate> {
    session::parse_date(value)
        .with_context(|| format!("invalid date '{value}', expected YYYY-MM-DD"))
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}
