use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tagwise::abbreviation::{AbbreviationEngine, BuiltinEngine};
use tagwise::config::{TrackerSettings, load_settings};
use tagwise::context::{ActivationConfig, MarkupContextOptions};
use tagwise::error::{TagwiseError, TagwiseResult};
use tagwise::scanner::ScannerOptions;
use tagwise::tracker::{Editor, MemoryEditor, Tracker, TrackingController};
use tagwise::{language, markup, stylesheet};

/// Context resolution and abbreviation tracking for markup and stylesheets
#[derive(Parser)]
#[command(name = "tagwise")]
#[command(version)]
#[command(about = "Context resolution and abbreviation tracking for markup and stylesheets")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Source document and position shared by the locator commands
#[derive(clap::Args)]
struct Input {
    /// Source file, or `-` for stdin
    file: PathBuf,

    /// Position as a UTF-16 code unit offset
    #[arg(long)]
    pos: usize,

    /// Dialect name (default: derived from the file extension)
    #[arg(long)]
    syntax: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the markup or stylesheet context at a position
    Context {
        #[command(flatten)]
        input: Input,

        /// Do not resolve embedded stylesheets
        #[arg(long)]
        skip_css: bool,
    },
    /// Print the tag straddling a position
    Tag {
        #[command(flatten)]
        input: Input,
    },
    /// Print the innermost open/close tag pair around a position
    Match {
        #[command(flatten)]
        input: Input,
    },
    /// Print the next (or previous) selectable item
    Select {
        #[command(flatten)]
        input: Input,

        #[arg(long)]
        previous: bool,
    },
    /// Print the rule block enclosing a position
    Section {
        #[command(flatten)]
        input: Input,

        /// Include the block's declarations
        #[arg(long)]
        properties: bool,
    },
    /// Expand an abbreviation
    Expand {
        abbreviation: String,

        #[arg(long, default_value = "html")]
        syntax: String,
    },
    /// Replay editing steps against the tracker and print every state.
    ///
    /// Steps: `type:<text>`, `bs` (backspace), `caret:<pos>`.
    Replay {
        #[arg(long, default_value = "html")]
        syntax: String,

        /// Initial document text; the caret starts at its end
        #[arg(long, default_value = "")]
        text: String,

        steps: Vec<String>,
    },
}

#[derive(Serialize)]
struct ReplayStep {
    step: String,
    text: String,
    caret: usize,
    tracker: Option<Tracker>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> TagwiseResult<()> {
    match cli.command {
        Commands::Context { input, skip_css } => {
            let (code, syntax) = read_input(&input)?;
            if language::is_css(&syntax) {
                print(&tagwise::get_css_context(&code, input.pos))
            } else {
                let options = MarkupContextOptions {
                    xml: language::is_xml(&syntax),
                    skip_css,
                };
                print(&tagwise::get_html_context(&code, input.pos, &options))
            }
        }
        Commands::Tag { input } => {
            let (code, _) = read_input(&input)?;
            print(&markup::get_tag(&code, input.pos))
        }
        Commands::Match { input } => {
            let (code, syntax) = read_input(&input)?;
            let options = if language::is_xml(&syntax) {
                ScannerOptions::xml()
            } else {
                ScannerOptions::default()
            };
            print(&markup::find_tag_match(&code, input.pos, &options))
        }
        Commands::Select { input, previous } => {
            let (code, syntax) = read_input(&input)?;
            if language::is_css(&syntax) {
                print(&stylesheet::select_item_css(&code, input.pos, previous))
            } else {
                print(&markup::select_item_html(&code, input.pos, previous))
            }
        }
        Commands::Section { input, properties } => {
            let (code, _) = read_input(&input)?;
            print(&stylesheet::get_css_section(&code, input.pos, properties))
        }
        Commands::Expand {
            abbreviation,
            syntax,
        } => {
            let settings = project_settings();
            let engine = BuiltinEngine::from_settings(&settings);
            let config = ActivationConfig::new(language::syntax_kind(&syntax), syntax);
            let parsed = engine
                .parse(&abbreviation, &config)
                .map_err(|e| TagwiseError::config(e.to_string()))?;
            println!("{}", engine.expand(&parsed, &config, &settings.output));
            Ok(())
        }
        Commands::Replay {
            syntax,
            text,
            steps,
        } => {
            let controller = TrackingController::new(project_settings());
            let mut editor = MemoryEditor::new(1, syntax, text);
            controller.handle_selection_change(&mut editor);

            let mut states = Vec::with_capacity(steps.len());
            for step in steps {
                let tracker = replay_step(&controller, &mut editor, &step)?;
                states.push(ReplayStep {
                    text: editor.text().into_owned(),
                    caret: editor.caret(),
                    step,
                    tracker,
                });
            }
            print(&states)
        }
    }
}

fn replay_step(
    controller: &TrackingController,
    editor: &mut MemoryEditor,
    step: &str,
) -> TagwiseResult<Option<Tracker>> {
    if step == "bs" {
        editor.backspace();
        return Ok(controller.handle_change(editor));
    }
    if let Some(text) = step.strip_prefix("type:") {
        let mut tracker = None;
        for ch in text.chars() {
            editor.type_text(&ch.to_string());
            tracker = controller.handle_change(editor);
        }
        return Ok(tracker);
    }
    if let Some(pos) = step.strip_prefix("caret:") {
        let pos = pos
            .parse()
            .map_err(|_| TagwiseError::config(format!("invalid caret position: {}", pos)))?;
        editor.set_caret(pos);
        return Ok(controller.handle_selection_change(editor));
    }
    Err(TagwiseError::config(format!("unknown replay step: {}", step)))
}

fn read_input(input: &Input) -> TagwiseResult<(String, String)> {
    let code = if input.file == Path::new("-") {
        let mut code = String::new();
        std::io::stdin().read_to_string(&mut code)?;
        code
    } else {
        std::fs::read_to_string(&input.file)?
    };

    let syntax = input.syntax.clone().unwrap_or_else(|| {
        input
            .file
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("html")
            .to_ascii_lowercase()
    });
    Ok((code, syntax))
}

/// Settings layered from the user config and `./tagwise.toml`
fn project_settings() -> TrackerSettings {
    let root = std::env::current_dir().ok();
    let outcome = load_settings(root.as_deref());
    for event in &outcome.events {
        event.log();
    }
    outcome.settings
}

fn print<T: Serialize>(value: &T) -> TagwiseResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
