use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use colored::Colorize;
use tome_repo::{Commit, Repository, VersionBackend, META_DIR};
use tome_wiki::{
    resolve_or_fail, resolve_page, resolve_tree_or_fail, ContentObject, Object, Page,
    TableMimeDetector, Tree, WikiConfig,
};
use tracing::debug;

use crate::cli::*;

const CONFIG_FILE: &str = "config.toml";

struct Context {
    backend: Arc<dyn VersionBackend>,
    config: WikiConfig,
}

impl Context {
    fn open(repo: &Path, config: Option<&Path>) -> anyhow::Result<Self> {
        let repository = Repository::open(repo)
            .with_context(|| format!("cannot open repository at {}", repo.display()))?;
        let config_path = config
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_config_path(repo));
        let config = WikiConfig::load(&config_path)
            .with_context(|| format!("cannot read config {}", config_path.display()))?;
        debug!(config = %config_path.display(), "loaded config");
        Ok(Self {
            backend: Arc::new(repository),
            config,
        })
    }
}

fn default_config_path(repo: &Path) -> PathBuf {
    repo.join(META_DIR).join(CONFIG_FILE)
}

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    if let Command::Init(args) = &cli.command {
        return cmd_init(args.path.as_deref().unwrap_or(cli.repo.as_path()));
    }

    let ctx = Context::open(&cli.repo, cli.config.as_deref())?;
    match cli.command {
        Command::Init(_) => Ok(()),
        Command::Show(args) => cmd_show(&ctx, args),
        Command::Ls(args) => cmd_ls(&ctx, args),
        Command::Write(args) => cmd_write(&ctx, args),
        Command::Log(args) => cmd_log(&ctx, args),
        Command::Diff(args) => cmd_diff(&ctx, args),
        Command::Archive(args) => cmd_archive(&ctx, args),
    }
}

fn cmd_init(path: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(path)?;
    Repository::init(path)?;
    let config = toml::to_string(&WikiConfig::default())?;
    std::fs::write(default_config_path(path), config)?;
    println!(
        "{} Initialized empty wiki in {}",
        "✓".green().bold(),
        path.display().to_string().bold()
    );
    Ok(())
}

fn cmd_show(ctx: &Context, args: ShowArgs) -> anyhow::Result<()> {
    let object = resolve_or_fail(&ctx.backend, &args.path, args.version.as_deref())?;
    if args.meta {
        return print_meta(ctx, &object);
    }
    match object {
        Object::Page(page) => {
            let content = page.content()?.unwrap_or_default();
            std::io::stdout().write_all(&content)?;
        }
        Object::Tree(tree) => print_listing(&tree)?,
    }
    Ok(())
}

fn print_meta(ctx: &Context, object: &Object) -> anyhow::Result<()> {
    let kind = if object.is_page() { "page" } else { "tree" };
    println!("{} {}", kind.bold(), object.pretty_name().bold());
    println!("  path:    {}", object.path());
    println!("  sha:     {}", object.sha().dimmed());
    if let Some(commit) = object.commit() {
        println!("  commit:  {} {}", commit.short_sha().yellow(), format_date(commit));
    }
    println!("  current: {}", object.is_current());
    if let Some(page) = object.as_page() {
        let detector = TableMimeDetector::from_config(&ctx.config);
        println!("  mime:    {}", page.mime(&detector)?);
    }
    let neighbours = [
        ("latest", object.latest_commit()?.cloned()),
        ("prev", object.prev_commit()?.cloned()),
        ("next", object.next_commit()?.cloned()),
    ];
    for (label, commit) in neighbours {
        let shown = commit.map_or_else(|| "-".dimmed().to_string(), |c| c.short_sha().yellow().to_string());
        println!("  {label:<7}  {shown}");
    }
    Ok(())
}

fn cmd_ls(ctx: &Context, args: LsArgs) -> anyhow::Result<()> {
    let tree = resolve_tree_or_fail(&ctx.backend, &args.path, args.version.as_deref())?;
    print_listing(&tree)
}

fn print_listing(tree: &Tree) -> anyhow::Result<()> {
    println!("{}", tree.pretty_name().bold());
    for child in tree.children()? {
        match child {
            Object::Tree(t) => println!("  {}/", t.name().blue().bold()),
            Object::Page(p) => println!("  {}", p.name()),
        }
    }
    Ok(())
}

fn cmd_write(ctx: &Context, args: WriteArgs) -> anyhow::Result<()> {
    let content = match &args.file {
        Some(file) => std::fs::read(file)
            .with_context(|| format!("cannot read {}", file.display()))?,
        None => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };

    let mut page = match resolve_page(&ctx.backend, &args.path, None)? {
        Some(page) => page,
        None => Page::new(&ctx.backend, &args.path)?,
    };
    let before = page.commit().map(|c| c.id);
    let author = ctx.config.default_author();
    page.write(content, &args.message, author.as_ref())?;

    match page.commit() {
        Some(commit) if Some(commit.id) != before => println!(
            "{} Saved {} ({})",
            "✓".green().bold(),
            page.path().bold(),
            commit.short_sha().yellow()
        ),
        _ => println!("No changes to {}.", page.path()),
    }
    Ok(())
}

fn cmd_log(ctx: &Context, args: LogArgs) -> anyhow::Result<()> {
    let object = resolve_or_fail(&ctx.backend, &args.path, None)?;
    for commit in object.history()?.iter().take(args.limit) {
        let author = commit
            .author
            .as_ref()
            .map(|a| a.to_string())
            .unwrap_or_default();
        println!(
            "{}  {}  {}",
            commit.short_sha().yellow().bold(),
            format_date(commit).dimmed(),
            author
        );
        println!("    {}", commit.summary());
    }
    Ok(())
}

fn cmd_diff(ctx: &Context, args: DiffArgs) -> anyhow::Result<()> {
    let object = resolve_or_fail(&ctx.backend, &args.path, None)?;
    let diff = object.diff(&args.from, &args.to)?;
    if diff.is_empty() {
        println!("No changes.");
        return Ok(());
    }
    for line in diff.render().lines() {
        let styled = if line.starts_with("+++") || line.starts_with("---") {
            line.bold()
        } else if line.starts_with('+') {
            line.green()
        } else if line.starts_with('-') {
            line.red()
        } else if line.starts_with("@@") {
            line.cyan()
        } else {
            line.normal()
        };
        println!("{styled}");
    }
    println!(
        "{} file(s), {} {}",
        diff.files.len(),
        format!("+{}", diff.additions()).green(),
        format!("-{}", diff.deletions()).red()
    );
    Ok(())
}

fn cmd_archive(ctx: &Context, args: ArchiveArgs) -> anyhow::Result<()> {
    let tree = resolve_tree_or_fail(&ctx.backend, &args.path, args.version.as_deref())?;
    let bytes = tree.archive()?;
    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(format!("{}.tar.gz", tree.safe_name())));
    std::fs::write(&output, &bytes)?;
    println!(
        "{} Wrote {} ({} bytes)",
        "✓".green().bold(),
        output.display().to_string().bold(),
        bytes.len()
    );
    Ok(())
}

fn format_date(commit: &Commit) -> String {
    let ms = commit.committer_date.physical_ms as i64;
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|d| d.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| commit.committer_date.to_string())
}
