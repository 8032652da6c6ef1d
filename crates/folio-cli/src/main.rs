use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use folio_common::telemetry::{self, TelemetryConfig};
use folio_common::{Config, FolioError, KdlFile, config_path};
use folio_editor_core::{DocumentSnapshot, FileStore, NoteEditor, NoteStore, PlatformServices};
use miette::{IntoDiagnostic, Result};

mod script;

use script::Script;

#[derive(Parser)]
#[command(version, about = "Folio - block-based notes from the terminal", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to a KDL config file (defaults to $FOLIO_CONFIG, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty note
    New {
        /// Note file to create
        file: PathBuf,

        /// Note title
        #[arg(long)]
        title: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the block outline of a note
    Show {
        /// Note file
        file: PathBuf,
    },
    /// Apply an edit script to a note and save it
    ///
    /// Script commands, one per line (blocks are numbered from 1):
    /// title <text>, focus <n|none>, type <text>, select <start> <end>,
    /// bold, italic, underline, strike, align <start|center|end|justify>,
    /// list, insert <kind>, insert image <ref>, delete <n>, move <from> <to>,
    /// check <n> [on|off], toggle <n>, expand <n>, radio <n> <option>,
    /// undo, redo, commit.
    #[command(verbatim_doc_comment)]
    Edit {
        /// Note file
        file: PathBuf,

        /// Script file, or `-` to read from stdin
        script: String,
    },
    /// Print the plain text of a note
    Export {
        /// Note file
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    init_miette()?;

    let cli = Cli::parse();
    let config = load_config(cli.config)?;
    telemetry::init(TelemetryConfig::from_env("folio").with_level(config.log_level));

    match cli.command {
        Commands::New { file, title, force } => new_note(&file, title, force),
        Commands::Show { file } => {
            let doc = load_note(&file)?;
            print!("{}", doc.outline());
            Ok(())
        }
        Commands::Edit { file, script } => edit_note(&file, &script, config),
        Commands::Export { file } => {
            let doc = load_note(&file)?;
            println!("{}", doc.plain_text());
            Ok(())
        }
    }
}

fn load_config(explicit: Option<PathBuf>) -> Result<Config> {
    let Some(path) = config_path(explicit) else {
        return Ok(Config::default());
    };
    Ok(Config::load(&KdlFile::new(path))?)
}

fn new_note(file: &Path, title: Option<String>, force: bool) -> Result<()> {
    if file.exists() && !force {
        return Err(miette::miette!(
            help = "pass --force to overwrite it",
            "{} already exists",
            file.display()
        ));
    }
    let mut doc = DocumentSnapshot::default();
    if let Some(title) = title {
        doc.title = title;
    }
    FileStore::new(file).save(&doc).map_err(FolioError::from)?;
    println!("✓ Created {}", file.display());
    Ok(())
}

fn load_note(file: &Path) -> Result<DocumentSnapshot> {
    if !file.exists() {
        return Err(miette::miette!("Note not found: {}", file.display()));
    }
    Ok(FileStore::new(file).load().map_err(FolioError::from)?)
}

fn edit_note(file: &Path, script_arg: &str, config: Config) -> Result<()> {
    let (name, source) = if script_arg == "-" {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .into_diagnostic()?;
        ("<stdin>".to_owned(), source)
    } else {
        let source = std::fs::read_to_string(script_arg)
            .map_err(|e| FolioError::io(script_arg, e))?;
        (script_arg.to_owned(), source)
    };
    let script = Script::parse(name, source)?;

    let doc = load_note(file)?;
    let services = PlatformServices::headless(media_dir(file));
    let mut editor = NoteEditor::with_document(doc, config.editor, services);
    let report = script.run(&mut editor)?;

    let mut store = FileStore::new(file);
    editor.save(&mut store).map_err(FolioError::from)?;

    print!("{}", editor.document().outline());
    println!(
        "✓ Applied {} line(s), {} unchanged",
        report.applied, report.unchanged
    );
    Ok(())
}

/// Recordings for `note.folio` would live in `note.media/` beside it.
fn media_dir(file: &Path) -> PathBuf {
    file.with_extension("media")
}

fn init_miette() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .color(true)
                .context_lines(2)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))?;
    miette::set_panic_hook();
    Ok(())
}
