mod api;
mod app;
mod config;
mod export;
mod review;
mod ui;

use anyhow::{Context, Result};
use api::{HttpReviewApi, ReviewApi, ReviewTarget};
use app::{App, InputMode};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use review::{Panel, ViewMode};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Terminal viewer for AI-generated reviews of GitHub repositories and users
#[derive(Parser)]
#[command(name = "ghr", version, about)]
struct Cli {
    /// Review service base URL (overrides config)
    #[arg(long, value_name = "URL")]
    server: Option<String>,

    /// Review a repository at start-up
    #[arg(long, value_name = "OWNER/REPO")]
    repo: Option<String>,

    /// Review a user at start-up
    #[arg(long, value_name = "NAME")]
    user: Option<String>,

    /// Tab to show first (repo or user)
    #[arg(long, value_name = "ID")]
    tab: Option<String>,

    /// Start panels in raw Markdown mode
    #[arg(long)]
    raw: bool,

    /// Fetch one review, print it to stdout and exit
    #[arg(long)]
    print: bool,

    /// With --print, output rendered HTML instead of Markdown
    #[arg(long, requires = "print")]
    html: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    // Before config loading, so invalid config files are reported
    init_logging(cli.print);

    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let mut config = config::load_config(&cwd);
    if let Some(ref server) = cli.server {
        config.server.base_url = server.clone();
    }
    if cli.raw {
        config.display.rendered = false;
    }

    let api = HttpReviewApi::new(&config.server.base_url, config.server.timeout())?;

    if cli.print {
        return print_review(&cli, &api);
    }

    let initial_mode = if config.display.rendered {
        ViewMode::Rendered
    } else {
        ViewMode::Raw
    };
    let download_dir = config
        .export
        .dir
        .clone()
        .unwrap_or_else(export::default_download_dir);

    let server_url = api.base_url().to_string();
    let sink = export::DirectorySink::new(download_dir);
    tracing::info!(server = %server_url, downloads = %sink.dir().display(), "starting");

    let mut app = App::new(
        Arc::new(api),
        Box::new(export::SystemClipboard::new()),
        Box::new(sink),
        initial_mode,
    );
    app.server_url = server_url;
    app.wrap_lines = config.display.wrap_lines;
    app.controller.set_standalone_html(config.export.standalone_html);

    // Prefill and start requested fetches, then settle on the requested tab
    if let Some(ref user) = cli.user {
        app.prefill_user(user);
        app.select_tab(Panel::User);
        app.fetch_active();
    }
    if let Some(ref spec) = cli.repo {
        if !app.prefill_repo(spec) {
            anyhow::bail!("Invalid --repo '{}': expected OWNER/REPO", spec);
        }
        app.select_tab(Panel::Repo);
        app.fetch_active();
    }
    if let Some(ref id) = cli.tab {
        app.open_tab(id);
    }

    let mut md = ui::markdown::MarkdownCache::new();

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run event loop
    let result = run_app(&mut terminal, &mut app, &mut md);

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

/// Logs go to a file under the cache dir while the TUI owns the terminal,
/// and to stderr in `--print` mode.
fn init_logging(to_stderr: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ghr=info"));

    if to_stderr {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .with(filter)
            .init();
        return;
    }

    let Some(dir) = dirs::cache_dir().map(|d| d.join("ghr")) else {
        return;
    };
    let file = std::fs::create_dir_all(&dir).and_then(|_| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("ghr.log"))
    });
    if let Ok(file) = file {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .with(filter)
            .init();
    }
}

/// Headless mode: fetch a single review and write it to stdout
fn print_review(cli: &Cli, api: &dyn ReviewApi) -> Result<()> {
    let target = print_target(cli)?;
    let mut stdout = io::stdout().lock();
    write_review(api, &target, cli.html, &mut stdout)
}

/// The one review `--print` asks for
fn print_target(cli: &Cli) -> Result<ReviewTarget> {
    match (&cli.repo, &cli.user) {
        (Some(spec), None) => {
            let (owner, repo) = api::parse_repo_spec(spec)
                .with_context(|| format!("Invalid --repo '{}': expected OWNER/REPO", spec))?;
            Ok(ReviewTarget::Repo { owner, repo })
        }
        (None, Some(user)) if !user.trim().is_empty() => Ok(ReviewTarget::User {
            username: user.trim().to_string(),
        }),
        (None, Some(_)) => anyhow::bail!("{}", review::ValidationError::MissingUsername),
        _ => anyhow::bail!("--print needs exactly one of --repo or --user"),
    }
}

fn write_review(
    api: &dyn ReviewApi,
    target: &ReviewTarget,
    html: bool,
    out: &mut impl Write,
) -> Result<()> {
    tracing::info!(subject = %target.subject(), "fetching review");
    let markdown = api
        .fetch_review(target)
        .with_context(|| format!("Error fetching review for {}", target.subject()))?;

    if html {
        writeln!(out, "{}", review::render::to_html(&markdown))?;
    } else {
        writeln!(out, "{}", markdown)?;
    }
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    md: &mut ui::markdown::MarkdownCache,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app, md))?;

        // Poll with a timeout so fetch results and the spinner keep moving
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match app.input_mode {
                        InputMode::Editing => handle_edit_input(app, key),
                        InputMode::Normal => handle_normal_input(app, key),
                    }
                }
            }
        }

        app.poll_outcomes();

        // Tick: spinner frames and notification auto-clear
        app.tick();

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_normal_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true
        }

        // Tabs
        KeyCode::Char('1') => app.select_tab(Panel::Repo),
        KeyCode::Char('2') => app.select_tab(Panel::User),
        KeyCode::Tab | KeyCode::BackTab => app.next_tab(),

        // Inputs and actions on the visible tab
        KeyCode::Char('i') | KeyCode::Enter => app.start_editing(),
        KeyCode::Char('f') | KeyCode::Char('r') => app.fetch_active(),
        KeyCode::Char('v') => app.toggle_view_mode(),
        KeyCode::Char('c') => app.copy_active(),
        KeyCode::Char('d') => app.download_active(),

        // Scrolling
        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(1),
        KeyCode::PageDown | KeyCode::Char(' ') => app.scroll_down(20),
        KeyCode::PageUp => app.scroll_up(20),
        KeyCode::Char('g') | KeyCode::Home => app.scroll_to_top(),

        _ => {}
    }
}

fn handle_edit_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.stop_editing(),
        KeyCode::Enter => app.fetch_active(),
        KeyCode::Tab | KeyCode::BackTab => app.focus_next_field(),
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => app.input_clear(),
        KeyCode::Char('q') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => app.input_push(c),
        KeyCode::Backspace => app.input_backspace(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api::RequestError;
    use std::path::PathBuf;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("ghr").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    struct StubApi(Result<String, RequestError>);

    impl ReviewApi for StubApi {
        fn fetch_review(&self, _target: &ReviewTarget) -> Result<String, RequestError> {
            self.0.clone()
        }
    }

    struct NoClipboard;

    impl review::Clipboard for NoClipboard {
        fn write_text(&mut self, _text: &str) -> Result<()> {
            Ok(())
        }
    }

    struct NoSink;

    impl review::FileSink for NoSink {
        fn save(&mut self, filename: &str, _mime: &str, _content: &[u8]) -> Result<PathBuf> {
            Ok(PathBuf::from(filename))
        }
    }

    fn render_to_string(api: &StubApi, target: &ReviewTarget, html: bool) -> Result<String> {
        let mut out = Vec::new();
        write_review(api, target, html, &mut out)?;
        Ok(String::from_utf8(out).expect("utf-8 output"))
    }

    #[test]
    fn print_target_accepts_repo_or_user() {
        let cli = parse(&["--print", "--repo", " pallets/flask "]);
        assert_eq!(
            print_target(&cli).expect("valid repo"),
            ReviewTarget::Repo {
                owner: "pallets".to_string(),
                repo: "flask".to_string()
            }
        );

        let cli = parse(&["--print", "--user", " octocat "]);
        assert_eq!(
            print_target(&cli).expect("valid user"),
            ReviewTarget::User {
                username: "octocat".to_string()
            }
        );
    }

    #[test]
    fn print_target_needs_exactly_one_subject() {
        let both = parse(&["--print", "--repo", "a/b", "--user", "octocat"]);
        let err = print_target(&both).expect_err("both flags");
        assert!(err.to_string().contains("exactly one"), "got {err}");

        let neither = parse(&["--print"]);
        let err = print_target(&neither).expect_err("no flags");
        assert!(err.to_string().contains("exactly one"), "got {err}");
    }

    #[test]
    fn print_target_rejects_blank_user_and_bad_repo() {
        let blank = parse(&["--print", "--user", "   "]);
        let err = print_target(&blank).expect_err("blank user");
        assert_eq!(err.to_string(), "Please enter a username.");

        for spec in ["a/b/c", "flask", "/flask", "pallets/"] {
            let cli = parse(&["--print", "--repo", spec]);
            let err = print_target(&cli).expect_err("malformed repo");
            assert!(err.to_string().contains("expected OWNER/REPO"), "{spec}: {err}");
        }
    }

    #[test]
    fn html_flag_requires_print() {
        assert!(Cli::try_parse_from(["ghr", "--html"]).is_err());
        assert!(parse(&["--print", "--html", "--user", "octocat"]).html);
    }

    #[test]
    fn write_review_prints_markdown_or_html() {
        let api = StubApi(Ok("# Title\n\n**bold**".to_string()));
        let target = ReviewTarget::User {
            username: "octocat".to_string(),
        };

        let markdown = render_to_string(&api, &target, false).expect("markdown");
        assert_eq!(markdown, "# Title\n\n**bold**\n");

        let html = render_to_string(&api, &target, true).expect("html");
        assert_eq!(html, format!("{}\n", review::render::to_html("# Title\n\n**bold**")));
        assert!(html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn write_review_fails_on_request_error() {
        let api = StubApi(Err(RequestError::Status(503)));
        let target = ReviewTarget::Repo {
            owner: "pallets".to_string(),
            repo: "flask".to_string(),
        };

        let err = render_to_string(&api, &target, false).expect_err("request failed");
        let message = format!("{:#}", err);
        assert!(message.contains("pallets/flask"), "got {message}");
        assert!(message.contains("503"), "got {message}");
    }

    #[test]
    fn control_chords_do_not_type_into_inputs() {
        let mut app = App::new(
            Arc::new(StubApi(Ok(String::new()))),
            Box::new(NoClipboard),
            Box::new(NoSink),
            ViewMode::Raw,
        );
        app.start_editing();

        handle_edit_input(&mut app, KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE));
        handle_edit_input(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        handle_edit_input(&mut app, KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL));
        handle_edit_input(&mut app, KeyEvent::new(KeyCode::Char('B'), KeyModifiers::SHIFT));

        assert_eq!(app.owner_input, "aB");
        assert_eq!(app.input_mode, InputMode::Editing);
    }
}
