use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use vault_core::{
    config::max_upload_bytes_from_env_value, CatalogReader, CoreConfig, IngestService,
    MetadataFields, ProjectName, UploadedFile, DEFAULT_STORAGE_DIR,
};
use vault_files::FsStore;

#[derive(Parser)]
#[command(name = "vault")]
#[command(about = "Versioned upload vault CLI")]
struct Cli {
    /// Storage root (defaults to UPLOAD_DATA_DIR, then "uploads")
    #[arg(long, global = true)]
    root: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List every stored metadata record
    List,
    /// Upload a local file into the next version of a project
    Upload {
        /// Path of the file to upload
        path: PathBuf,
        /// Project name (default: "default")
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    /// Print the version the next upload to a project would receive
    NextVersion {
        /// Project name
        project: String,
    },
}

fn load_config(root: Option<PathBuf>) -> Result<Arc<CoreConfig>, Box<dyn std::error::Error>> {
    let root = root.unwrap_or_else(|| {
        PathBuf::from(
            std::env::var("UPLOAD_DATA_DIR").unwrap_or_else(|_| DEFAULT_STORAGE_DIR.into()),
        )
    });
    let max_upload_bytes =
        max_upload_bytes_from_env_value(std::env::var("VAULT_MAX_UPLOAD_BYTES").ok())?;
    Ok(Arc::new(CoreConfig::new(root, max_upload_bytes)?))
}

fn upload(
    service: &IngestService,
    path: &Path,
    fields: MetadataFields,
) -> Result<String, Box<dyn std::error::Error>> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| format!("Not a file path: {}", path.display()))?;
    let content = std::fs::File::open(path)?;

    let receipt = service.ingest(Some(UploadedFile::new(filename, content)), fields)?;
    let mut line = format!(
        "Stored {} in {}/{} ({} bytes)",
        receipt.artifact, receipt.project, receipt.version, receipt.size_bytes
    );
    if let Some(entries) = receipt.expanded_entries {
        line.push_str(&format!(", expanded {entries} entries"));
    }
    Ok(line)
}

fn list(catalog: &CatalogReader) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let entries = catalog.list_all()?;
    Ok(entries
        .into_iter()
        .map(|e| {
            format!(
                "{}/{}: {} (name: {}, status: {})",
                e.project,
                e.version,
                e.record.filename,
                e.record.name.as_deref().unwrap_or("-"),
                e.record.status.as_deref().unwrap_or("-"),
            )
        })
        .collect())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use 'vault --help' for commands");
        return Ok(());
    };

    let cfg = load_config(cli.root)?;
    let store = Arc::new(FsStore::open(cfg.storage_root())?);

    match command {
        Commands::List => {
            let lines = list(&CatalogReader::new(store))?;
            if lines.is_empty() {
                println!("No datasets found.");
            }
            for line in lines {
                println!("{line}");
            }
        }
        Commands::Upload {
            path,
            name,
            description,
            source,
            date,
            status,
        } => {
            let fields = MetadataFields {
                name,
                description,
                source,
                date,
                status,
            };
            let service = IngestService::new(cfg, store);
            match upload(&service, &path, fields) {
                Ok(line) => println!("{line}"),
                Err(e) => eprintln!("Error uploading {}: {}", path.display(), e),
            }
        }
        Commands::NextVersion { project } => {
            let project = ProjectName::new(project)?;
            let service = IngestService::new(cfg, store);
            let next = service.layout().resolve_next_version(&project)?;
            println!("{next}");
        }
    }

    Ok(())
}
