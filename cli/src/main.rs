use std::path::PathBuf;
use std::process::exit;

use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use anyhow::{anyhow, Result};

use versefinder_backend::app_data::{format_passages, AppData};
use versefinder_backend::app_settings::AppSettings;
use versefinder_backend::get_create_versefinder_dir;

fn print_blocks(blocks: &[String]) {
    if blocks.is_empty() {
        println!("No results.");
        return;
    }
    println!("{}", blocks.join("\n\n"));
}

fn resolve(app: &AppData, book: &str) -> Result<()> {
    let Some(code) = app.resolve_book(book) else {
        println!("No book found for: {}", book);
        return Ok(());
    };

    println!("{} (book id {})", code.code(), code.book_id());
    println!("Aliases: {}", app.aliases().aliases(code).join(", "));
    Ok(())
}

fn passage(app: &AppData, book: &str, chapter: &str, verse: &str, files: &[PathBuf]) -> Result<()> {
    let results = if files.is_empty() {
        app.search_corpus(book, chapter, verse)
    } else {
        app.search_corpus_files(files, book, chapter, verse)
    };

    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (path, passages) in results.iter() {
        println!("=== {}", path.display());
        println!("{}\n", format_passages(passages));
    }
    Ok(())
}

fn lexicon(app: &AppData, term: &str, dict: Option<&str>) -> Result<()> {
    let dicts: Vec<_> = app
        .dictionaries()
        .into_iter()
        .filter(|d| match dict {
            Some(name) => d.display_name.eq_ignore_ascii_case(name) || d.file_name.eq_ignore_ascii_case(name),
            None => true,
        })
        .collect();

    if dicts.is_empty() {
        return Err(match dict {
            Some(name) => anyhow!("Dictionary not found: {}", name),
            None => anyhow!("No dictionaries. Use --folder or set dictionary_folder in settings.json."),
        });
    }

    let mut found = false;
    for d in dicts.iter() {
        if let Some(entry) = app.lookup_term(&d.path, term) {
            println!("#### 📘 [{}]\n{}\n", d.display_name, entry.plain);
            found = true;
        }
    }

    if !found {
        println!("No results.");
        if let Some(d) = dicts.first() {
            let samples = app.dictionary_samples(&d.path, 5);
            if !samples.is_empty() {
                println!("Entries in {} look like: {}", d.display_name, samples.join(", "));
            }
        }
    }
    Ok(())
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Versefinder CLI", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Optional path to the application directory with settings.json and log.txt.
    /// If not provided, the VERSEFINDER_DIR environment variable will be used.
    #[arg(long, global = true, value_name = "DIRECTORY_PATH", env = "VERSEFINDER_DIR")]
    versefinder_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the canonical code, book id and aliases of a book name
    #[command(arg_required_else_help = true)]
    Resolve {
        /// Book name or alias, e.g. "John", "요" or "1Cor"
        book: String,
    },

    /// Extract passages for a reference from marked-up corpus files
    #[command(arg_required_else_help = true)]
    Passage {
        book: String,
        /// Chapter number, 0 for the book introduction
        chapter: String,
        /// Verse, a range such as 16-18, or 0 for the chapter introduction
        verse: String,

        /// Corpus files to search. The configured corpus folders are used if none are given.
        #[arg(long = "file", value_name = "FILE_PATH", num_args = 1..)]
        files: Vec<PathBuf>,

        /// Scan the markers for every lookup instead of using the tag index
        #[arg(long, default_value_t = false)]
        no_index: bool,
    },

    /// Commentary entries for a verse from commentary module files
    #[command(arg_required_else_help = true)]
    Commentary {
        book: String,
        chapter: String,
        verse: String,

        /// Folders to scan, instead of commentary_folders in settings.json
        #[arg(long = "folder", value_name = "DIRECTORY_PATH")]
        folders: Vec<PathBuf>,
    },

    /// Verse text from Bible module files
    #[command(arg_required_else_help = true)]
    Bible {
        book: String,
        chapter: String,
        verse: String,

        /// Folders to scan, instead of bible_folders in settings.json
        #[arg(long = "folder", value_name = "DIRECTORY_PATH")]
        folders: Vec<PathBuf>,
    },

    /// Look up a term, e.g. a Strong's number, in dictionary modules
    #[command(arg_required_else_help = true)]
    Lexicon {
        term: String,

        /// Dictionary display name or file name, e.g. krstrong
        #[arg(long, value_name = "NAME")]
        dict: Option<String>,

        /// Folder of *.dct.twm files, instead of dictionary_folder in settings.json
        #[arg(long, value_name = "DIRECTORY_PATH")]
        folder: Option<PathBuf>,
    },
}

fn main() {
    // Attempt to load .env file. This might define VERSEFINDER_DIR if it's not
    // already in the environment. Clap will pick it up via `env = "VERSEFINDER_DIR"`.
    dotenv().ok();

    // Usage errors exit with 1, --help and --version with 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            exit(if e.use_stderr() { 1 } else { 0 });
        }
    };

    // The backend reads VERSEFINDER_DIR for settings.json and log.txt.
    if let Some(dir) = &cli.versefinder_dir {
        if !dir.is_dir() {
            eprintln!("Error: Directory does not exist or is not a directory: {:?}", dir);
            exit(1);
        }
        unsafe { std::env::set_var("VERSEFINDER_DIR", dir); }
    }

    if let Err(e) = get_create_versefinder_dir() {
        eprintln!("Failed to get the application directory: {}", e);
        eprintln!("Use the --versefinder-dir option or set the VERSEFINDER_DIR environment variable.");
        exit(1);
    }

    let mut settings = AppSettings::load();

    // === Execute the requested command ===

    let command_result = match cli.command {
        Commands::Resolve { book } => {
            resolve(&AppData::new(settings), &book)
        }

        Commands::Passage { book, chapter, verse, files, no_index } => {
            if no_index {
                settings.use_tag_index = false;
            }
            passage(&AppData::new(settings), &book, &chapter, &verse, &files)
        }

        Commands::Commentary { book, chapter, verse, folders } => {
            if !folders.is_empty() {
                settings.commentary_folders = folders;
            }
            let app = AppData::new(settings);
            print_blocks(&app.commentaries(&book, &chapter, &verse));
            Ok(())
        }

        Commands::Bible { book, chapter, verse, folders } => {
            if !folders.is_empty() {
                settings.bible_folders = folders;
            }
            let app = AppData::new(settings);
            print_blocks(&app.bible_verses(&book, &chapter, &verse));
            Ok(())
        }

        Commands::Lexicon { term, dict, folder } => {
            if folder.is_some() {
                settings.dictionary_folder = folder;
            }
            lexicon(&AppData::new(settings), &term, dict.as_deref())
        }
    };

    if let Err(e) = command_result {
        eprintln!("Error executing command: {}", e);
        exit(1);
    }
}
