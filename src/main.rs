use anyhow::Result;
use bit_store::areas::repository::Repository;
use bit_store::commands::plumbing::hash_object::hash_file;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "bit",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "Plumbing for a Git-compatible object store",
    long_about = "Low-level commands over a Git-compatible object database and staging index. \
    They operate on an existing repository (for example one created by `git init`) \
    and read and write the same on-disk formats.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "hash-object",
        about = "Hash a file and optionally write it to the object database",
        long_about = "This command computes the object ID of a file's content \
        and, with --write, stores it in the object database."
    )]
    HashObject {
        #[arg(short, long, help = "Write the object to the object database")]
        write: bool,
        #[arg(short = 't', long = "type", default_value = "blob", help = "The object type")]
        kind: String,
        #[arg(index = 1)]
        file: PathBuf,
    },
    #[command(
        name = "cat-file",
        about = "Print the type or the raw content of an object"
    )]
    CatFile {
        #[arg(short = 't', conflicts_with = "print", help = "Show the object type")]
        show_type: bool,
        #[arg(short = 'p', required_unless_present = "show_type", help = "Print the object content")]
        print: bool,
        #[arg(index = 1, help = "The object SHA")]
        sha: String,
    },
    #[command(
        name = "update-index",
        about = "Stage files in the index",
        long_about = "This command stores the content of each path as a blob and records it in the index. \
        Directories are staged recursively; paths that do not exist are skipped."
    )]
    UpdateIndex {
        #[arg(index = 1, required = true, num_args = 1..)]
        paths: Vec<PathBuf>,
    },
    #[command(name = "ls-files", about = "List the staged files")]
    LsFiles {
        #[arg(short, long, help = "Show mode and object ID of each entry")]
        stage: bool,
    },
    #[command(name = "write-tree", about = "Create a tree object from the index")]
    WriteTree,
    #[command(
        name = "commit-tree",
        about = "Create a commit object for a tree",
        long_about = "This command wraps a tree in a commit object. The author is read from \
        GIT_AUTHOR_NAME, GIT_AUTHOR_EMAIL and, optionally, GIT_AUTHOR_DATE."
    )]
    CommitTree {
        #[arg(index = 1, help = "The tree SHA")]
        tree: String,
        #[arg(short, long, help = "The commit message")]
        message: String,
        #[arg(short, long, help = "The parent commit SHA")]
        parent: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // hashing without storing needs no repository
    if let Commands::HashObject {
        write: false,
        kind,
        file,
    } = &cli.command
    {
        let object_id = hash_file(file, kind)?;
        writeln!(std::io::stdout(), "{object_id}")?;
        return Ok(());
    }

    let pwd = std::env::current_dir()?.canonicalize()?;
    let repository = Repository::discover(&pwd, Box::new(std::io::stdout()))?;

    match &cli.command {
        Commands::HashObject { write, kind, file } => {
            repository.hash_object(file, kind, *write)?
        }
        Commands::CatFile { show_type, sha, .. } => repository.cat_file(sha, *show_type)?,
        Commands::UpdateIndex { paths } => {
            let paths = paths.iter().map(|path| pwd.join(path)).collect::<Vec<_>>();
            repository.update_index(&paths)?
        }
        Commands::LsFiles { stage } => repository.ls_files(*stage)?,
        Commands::WriteTree => {
            repository.write_tree()?;
        }
        Commands::CommitTree {
            tree,
            message,
            parent,
        } => {
            repository.commit_tree(tree, message, parent.as_deref())?;
        }
    }

    repository.writer().flush()?;

    Ok(())
}
