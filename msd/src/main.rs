mod args;
mod logger;

use anyhow::{Result, bail};
use args::Args;
use clap::Parser;
use colored::Colorize;
use log::{debug, error, info, warn};
use msd_drm::{Session, dispatch};
use rayon::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
    process,
};

fn run() -> Result<()> {
    let args = Args::parse();
    logger::init(args.verbose)?;

    let files = collect_files(&args)?;
    if files.is_empty() {
        bail!("no decryptable files were found");
    }

    if let Some(directory) = &args.output {
        fs::create_dir_all(directory)?;
    }

    #[cfg(feature = "online")]
    let online = match msd_drm::HttpOnlineClient::new() {
        Ok(client) => Some(client),
        Err(e) => {
            debug!("online client is unavailable: {}", e);
            None
        }
    };

    let batch = Batch {
        args,
        #[cfg(feature = "online")]
        online,
    };

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(batch.args.threads as usize)
        .build()?;
    let failed = pool.install(|| {
        files
            .par_iter()
            .filter(|path| {
                if let Err(e) = batch.decrypt_file(path) {
                    error!("{}: {:#}", path.display(), e);
                    true
                } else {
                    false
                }
            })
            .count()
    });

    if failed > 0 {
        bail!("{} of {} files could not be decrypted", failed, files.len());
    }

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".bold().red(), e);
        process::exit(1);
    }
}

struct Batch {
    args: Args,
    #[cfg(feature = "online")]
    online: Option<msd_drm::HttpOnlineClient>,
}

impl Batch {
    fn open_session(&self, data: Vec<u8>, name: &str) -> msd_drm::Result<Session> {
        let session = dispatch::open(data, name)?;
        #[cfg(feature = "online")]
        let session = match &self.online {
            Some(client) => session.with_online(Box::new(client.clone())),
            None => session,
        };
        Ok(session)
    }

    fn decrypt_file(&self, path: &Path) -> Result<()> {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let data = fs::read(path)?;

        let mut session = self.open_session(data, &name)?;
        debug!("{}: dispatched to the {} scheme", path.display(), session.vendor());

        let metadata = session.decrypt()?.clone();
        for warning in session.warnings() {
            warn!("{}: {}", path.display(), warning);
        }

        let directory = match &self.args.output {
            Some(directory) => directory.clone(),
            None => path.parent().unwrap_or(Path::new(".")).to_path_buf(),
        };
        let output = directory.join(&metadata.name);
        if output.exists() && !self.args.force {
            warn!(
                "{} already exists, use --force to overwrite it",
                output.display()
            );
            return Ok(());
        }

        fs::write(&output, session.into_payload())?;
        info!("{} -> {}", path.display(), output.display());
        Ok(())
    }
}

fn collect_files(args: &Args) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in &args.paths {
        let path = Path::new(path);

        if path.is_dir() {
            walk_directory(path, args, &mut files)?;
        } else if path.is_file() {
            // Explicitly named files always reach the dispatcher.
            files.push(path.to_path_buf());
        } else {
            for entry in glob::glob(&path.to_string_lossy())? {
                let entry = entry?;
                if entry.is_dir() {
                    walk_directory(&entry, args, &mut files)?;
                } else if admitted(&entry, args.extensive) {
                    files.push(entry);
                } else {
                    debug!("skipping {} (unknown extension)", entry.display());
                }
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

fn walk_directory(directory: &Path, args: &Args, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        if path.is_dir() {
            if args.recursive {
                walk_directory(&path, args, files)?;
            }
        } else if admitted(&path, args.extensive) {
            files.push(path);
        } else {
            debug!("skipping {} (unknown extension)", path.display());
        }
    }

    Ok(())
}

fn admitted(path: &Path, extensive: bool) -> bool {
    extensive
        || path
            .extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| {
                dispatch::KNOWN_EXTENSIONS.contains(&extension.to_ascii_lowercase().as_str())
            })
}
