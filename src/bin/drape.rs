use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use drape::ForegroundExtractor as _;

#[derive(Parser, Debug)]
#[command(name = "drape", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a composition record and print its layers in paint order.
    Show(ShowArgs),
    /// Apply an edit script to a composition record.
    Replay(ReplayArgs),
    /// Edit a composition in the file library through the catalog and save it.
    Save(SaveArgs),
    /// List compositions stored in a file library.
    List(ListArgs),
    /// Remove a plain backdrop from a garment photo.
    Extract(ExtractArgs),
}

#[derive(Parser, Debug)]
struct ShowArgs {
    /// Input composition record JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct ReplayArgs {
    /// Starting composition record; omitted means an empty composition.
    #[arg(long = "in")]
    in_path: Option<PathBuf>,

    /// JSON array of edit commands.
    #[arg(long)]
    script: PathBuf,

    /// Output composition record JSON.
    #[arg(long)]
    out: PathBuf,

    /// Name for a new composition (ignored with --in).
    #[arg(long, default_value = "Untitled")]
    name: String,

    /// Owner for a new composition (ignored with --in).
    #[arg(long, default_value = "local")]
    owner: String,
}

#[derive(Parser, Debug)]
struct SaveArgs {
    /// Config file naming the library root, owner and catalog.
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON array of edit commands.
    #[arg(long)]
    script: PathBuf,

    /// Existing composition id to edit; omitted starts a new one.
    #[arg(long)]
    id: Option<String>,

    /// Name for the saved composition.
    #[arg(long)]
    name: Option<String>,
}

#[derive(Parser, Debug)]
struct ListArgs {
    /// Config file naming the library root.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ExtractArgs {
    /// Source image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Per-channel backdrop tolerance; defaults to the config value.
    #[arg(long)]
    tolerance: Option<u8>,

    /// Config file supplying the default tolerance.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Show(args) => cmd_show(args),
        Command::Replay(args) => cmd_replay(args),
        Command::Save(args) => cmd_save(args).await,
        Command::List(args) => cmd_list(args).await,
        Command::Extract(args) => cmd_extract(args).await,
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> anyhow::Result<T> {
    let f = File::open(path).with_context(|| format!("open {what} '{}'", path.display()))?;
    let r = BufReader::new(f);
    serde_json::from_reader(r).with_context(|| format!("parse {what} JSON"))
}

fn cmd_show(args: ShowArgs) -> anyhow::Result<()> {
    let record: drape::CompositionRecord = read_json(&args.in_path, "composition")?;
    let comp = drape::Composition::from_record(&record)?;

    println!("{} ({})", comp.name, record.id);
    for e in comp.store.current_entries() {
        let t = e.transform;
        println!(
            "  z={:<3} {:<12} {:<24} x={:<8.1} y={:<8.1} scale={:<5.2} rot={:.1}",
            e.z_order,
            e.category.label(),
            e.item_id,
            t.translate.x,
            t.translate.y,
            t.scale,
            t.display_rotation(),
        );
    }
    Ok(())
}

fn cmd_replay(args: ReplayArgs) -> anyhow::Result<()> {
    let script: Vec<drape::EditCommand> = read_json(&args.script, "edit script")?;

    let (mut comp, mut record) = match &args.in_path {
        Some(p) => {
            let record: drape::CompositionRecord = read_json(p, "composition")?;
            (drape::Composition::from_record(&record)?, record)
        }
        None => {
            let record = drape::CompositionRecord {
                id: uuid::Uuid::new_v4().to_string(),
                owner_id: args.owner.clone(),
                name: args.name.clone(),
                thumbnail_ref: None,
                items: Vec::new(),
                created_at: None,
            };
            (drape::Composition::new(&args.name), record)
        }
    };

    drape::replay(&mut comp.store, &script);
    record.items = drape::serialize(&comp.store);
    record.validate()?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let f = File::create(&args.out)
        .with_context(|| format!("create '{}'", args.out.display()))?;
    serde_json::to_writer_pretty(f, &record).with_context(|| "write composition JSON")?;

    eprintln!("wrote {} ({} items)", args.out.display(), record.items.len());
    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<drape::DrapeConfig> {
    Ok(match path {
        Some(p) => drape::DrapeConfig::from_json_file(p)?,
        None => drape::DrapeConfig::default(),
    })
}

async fn cmd_save(args: SaveArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let script: Vec<drape::EditCommand> = read_json(&args.script, "edit script")?;

    let catalog = match &cfg.catalog_path {
        Some(p) => drape::InMemoryCatalog::from_json_file(p)?,
        None => drape::InMemoryCatalog::default(),
    };
    let catalog = Arc::new(catalog);
    let gateway = Arc::new(drape::FileGateway::new(&cfg.library_root));

    let mut session = match &args.id {
        Some(id) => drape::EditorSession::open(id, gateway, catalog).await?,
        None => drape::EditorSession::new("Untitled", &cfg.owner_id, gateway, catalog),
    };
    if let Some(name) = args.name {
        session.rename(name);
    }
    for (i, cmd) in script.iter().enumerate() {
        session
            .apply_command(cmd)
            .with_context(|| format!("edit command #{i}"))?;
    }

    let receipt = session.save(None).await?;
    eprintln!(
        "saved {} ({} items) to {}",
        receipt.id,
        session.store().len(),
        cfg.library_root.display()
    );
    Ok(())
}

async fn cmd_list(args: ListArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let gateway = drape::FileGateway::new(&cfg.library_root);
    for record in gateway.list().await? {
        let created = record
            .created_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}  {:<24} items={} created={}",
            record.id,
            record.name,
            record.items.len(),
            created
        );
    }
    Ok(())
}

async fn cmd_extract(args: ExtractArgs) -> anyhow::Result<()> {
    let source = args
        .in_path
        .to_str()
        .context("source path is not valid UTF-8")?;
    let cfg = load_config(args.config.as_deref())?;
    let tolerance = args.tolerance.unwrap_or(cfg.key_tolerance);
    let out = drape::BackdropKeyExtractor::new(tolerance)
        .extract(source)
        .await?;
    eprintln!("wrote {out}");
    Ok(())
}
