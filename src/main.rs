use anyhow::{Context, Result as AnyhowResult};
use clap::Parser;
use crossterm::queue;
use crossterm::style::{Attribute, Color as TermColor, Print, ResetColor, SetAttribute, SetForegroundColor};
use ember::app::Editor;
use ember::config::Config;
use ember::config_io::DirectoryContext;
use ember::services::terminal::{ChunkKind, TerminalSession, TranscriptChunk};
use ember::services::tracing_setup;
use ember::view::theme::{chunk_style, highlight_style, Theme};
use ratatui::style::{Color, Modifier, Style};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Syntax-highlighting editor core with an embedded shell terminal
#[derive(Parser, Debug)]
#[command(name = "ember")]
#[command(about = "Print a file with syntax highlighting, or run the embedded terminal", long_about = None)]
#[command(version)]
struct Args {
    /// File to print with highlighting and line numbers
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Run an interactive terminal session on stdin/stdout
    #[arg(long)]
    shell: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Path to log file for diagnostics (default: system temp dir)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    dump_config: bool,

    /// Print the JSON schema of the configuration file and exit
    #[arg(long)]
    print_schema: bool,
}

fn main() -> AnyhowResult<()> {
    let args = Args::parse();

    if args.print_schema {
        println!("{}", Config::json_schema()?);
        return Ok(());
    }

    let dir_context = DirectoryContext::from_system()?;
    let log_path = args.log_file.clone().unwrap_or_else(|| dir_context.log_path());
    if !tracing_setup::init_global(&log_path) {
        eprintln!("Warning: could not open log file {}", log_path.display());
    }

    let config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config from {}: {}", path.display(), e))?,
        None => Config::load_for_user(&dir_context),
    };

    if args.dump_config {
        let json = serde_json::to_string_pretty(&config).context("Failed to serialize config")?;
        println!("{json}");
        return Ok(());
    }

    let theme = Theme::default();
    if let Some(path) = &args.file {
        print_file(path, &config, &theme)?;
    }
    if args.shell {
        run_shell(&config, &theme)?;
    } else if args.file.is_none() {
        anyhow::bail!("Nothing to do: pass a FILE or --shell (see --help)");
    }
    Ok(())
}

/// Load `path` into an editor and write it out highlighted, one line per row
fn print_file(path: &Path, config: &Config, theme: &Theme) -> AnyhowResult<()> {
    let mut editor = Editor::new(config);
    editor.load(path)?;

    let mut out = io::stdout().lock();
    for (index, line) in editor.document().lines().enumerate() {
        if config.editor.line_numbers {
            queue!(
                out,
                SetForegroundColor(term_color(theme.gutter_fg)),
                Print(editor.gutter().cell_text(index + 1)),
                Print(" "),
                ResetColor
            )?;
        }

        let chars: Vec<char> = line.text().chars().collect();
        let mut column = 0;
        for span in line.spans() {
            if span.start > column {
                write_segment(&mut out, &chars[column..span.start], None)?;
            }
            let style = highlight_style(span.category, theme);
            write_segment(&mut out, &chars[span.range()], Some(style))?;
            column = span.end();
        }
        write_segment(&mut out, &chars[column.min(chars.len())..], None)?;
        queue!(out, Print("\n"))?;
    }
    out.flush()?;
    Ok(())
}

fn write_segment(out: &mut impl Write, chars: &[char], style: Option<Style>) -> io::Result<()> {
    if chars.is_empty() {
        return Ok(());
    }
    let text: String = chars.iter().collect();
    match style {
        None => queue!(out, Print(text)),
        Some(style) => {
            if let Some(fg) = style.fg {
                queue!(out, SetForegroundColor(term_color(fg)))?;
            }
            if style.add_modifier.contains(Modifier::BOLD) {
                queue!(out, SetAttribute(Attribute::Bold))?;
            }
            if style.add_modifier.contains(Modifier::ITALIC) {
                queue!(out, SetAttribute(Attribute::Italic))?;
            }
            queue!(out, Print(text), SetAttribute(Attribute::Reset), ResetColor)
        }
    }
}

/// Read commands from stdin and stream the transcript to stdout until EOF or `exit`
fn run_shell(config: &Config, theme: &Theme) -> AnyhowResult<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let mut session = TerminalSession::new(config.terminal.clone(), runtime.handle().clone());
    if let Ok(cwd) = std::env::current_dir() {
        session.set_working_dir(cwd);
    }

    let mut printed = flush_transcript(&session, 0, theme)?;

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read stdin")?;
        if matches!(line.trim(), "exit" | "quit") {
            break;
        }
        session.set_input(line);
        session.submit_input();
        if session.transcript().len() < printed {
            // Cleared
            printed = 0;
        }

        printed = flush_transcript(&session, printed, theme)?;
        while session.is_running() {
            if session.poll() == 0 {
                std::thread::sleep(Duration::from_millis(10));
            }
            printed = flush_transcript(&session, printed, theme)?;
        }
    }
    Ok(())
}

/// Print transcript chunks from `printed` on; returns the new count
fn flush_transcript(session: &TerminalSession, printed: usize, theme: &Theme) -> io::Result<usize> {
    let mut out = io::stdout().lock();
    let chunks = session.transcript();
    for TranscriptChunk { kind, text } in chunks.iter().skip(printed) {
        let style = chunk_style(*kind, theme);
        let color = style.fg.map_or(TermColor::Reset, term_color);
        queue!(out, SetForegroundColor(color), Print(text), ResetColor)?;
        // Process output arrives in arbitrary pieces and carries its own newlines
        if !matches!(kind, ChunkKind::Stdout | ChunkKind::Stderr) && !text.ends_with('\n') {
            queue!(out, Print("\n"))?;
        }
    }
    out.flush()?;
    Ok(chunks.len())
}

/// Palette colors are RGB; anything else falls back to the terminal default
fn term_color(color: Color) -> TermColor {
    match color {
        Color::Rgb(r, g, b) => TermColor::Rgb { r, g, b },
        Color::Red => TermColor::DarkRed,
        Color::Gray => TermColor::Grey,
        Color::DarkGray => TermColor::DarkGrey,
        _ => TermColor::Reset,
    }
}
