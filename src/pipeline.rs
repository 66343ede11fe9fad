//! Batch driver: raw dataset directory in, organism-named artifact
//! directories out.
//!
//! Archives are unzipped, walked, and their destination directories and
//! artifact names chosen on the calling thread, so naming is deterministic.
//! Each sequence file then becomes an independent job for the worker pool; a
//! failing file is reported and the rest of the batch carries on.

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use tracing::{debug, info, warn};

use crate::error::PipelineError;
use crate::layout::{
    artifact_stem, claim_stem, list_archives, sequence_files, unique_destination, Archive,
};
use crate::normalize::normalize;
use crate::pack::pack;
use crate::seqio;
use crate::strip::strip_headers;

const JOB_QUEUE: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory of archives, zipped or already extracted.
    pub input_dir: PathBuf,
    /// Root of the organism-named output tree.
    pub output_dir: PathBuf,
    /// Remove and recreate `output_dir` before the run. Without it a
    /// non-empty `output_dir` is an error.
    pub overwrite: bool,
    /// Worker threads; each file is still processed by a single thread.
    pub threads: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            input_dir: PathBuf::from("genomes_raw"),
            output_dir: PathBuf::from("genomes"),
            overwrite: false,
            threads: 4,
        }
    }
}

/// Artifacts written for one sequence file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub source: PathBuf,
    pub stripped: PathBuf,
    pub packed: PathBuf,
    pub headers: u64,
    pub symbols: usize,
    pub packed_bytes: usize,
}

#[derive(Debug)]
pub struct Failure {
    /// The sequence file, or the archive when the failure happened before
    /// any of its files were reached.
    pub path: PathBuf,
    pub error: PipelineError,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub archives: usize,
    pub files: Vec<FileReport>,
    pub failures: Vec<Failure>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

struct FileJob {
    source: PathBuf,
    dest_dir: PathBuf,
    stem: String,
}

type JobOutcome = (PathBuf, Result<FileReport, PipelineError>);

/// Turn one sequence file into `<stem>.fna` (headers stripped) and
/// `<stem>.bin` (packed) inside `dest_dir`.
///
/// The input is fully normalized before anything is written, so a file with
/// an invalid symbol leaves no artifacts behind.
pub fn process_file(source: &Path, dest_dir: &Path) -> Result<FileReport, PipelineError> {
    process_file_as(source, dest_dir, &artifact_stem(source))
}

/// [`process_file`] with the artifact stem chosen by the caller.
pub fn process_file_as(
    source: &Path,
    dest_dir: &Path,
    stem: &str,
) -> Result<FileReport, PipelineError> {
    let text = seqio::read_all(source).map_err(PipelineError::io(source))?;
    let stream = normalize(&text)?;
    let packed = pack(&stream);

    let stripped_path = dest_dir.join(format!("{stem}.fna"));
    let packed_path = dest_dir.join(format!("{stem}.bin"));

    let writer = seqio::create_writer(&stripped_path).map_err(PipelineError::io(&stripped_path))?;
    let stats = strip_headers(text.as_slice(), writer).map_err(PipelineError::io(&stripped_path))?;
    seqio::write_all(&packed_path, &packed).map_err(PipelineError::io(&packed_path))?;

    Ok(FileReport {
        source: source.to_path_buf(),
        stripped: stripped_path,
        packed: packed_path,
        headers: stats.dropped,
        symbols: stream.len(),
        packed_bytes: packed.len(),
    })
}

fn prepare_destination(config: &Config) -> Result<(), PipelineError> {
    let out = &config.output_dir;
    if out.exists() {
        if config.overwrite {
            fs::remove_dir_all(out).map_err(PipelineError::io(out))?;
        } else {
            let mut entries = fs::read_dir(out).map_err(PipelineError::io(out))?;
            if entries.next().is_some() {
                return Err(PipelineError::DestinationNotEmpty(out.clone()));
            }
        }
    }
    fs::create_dir_all(out).map_err(PipelineError::io(out))
}

/// Queue every sequence file of `archive` under a fresh destination directory.
///
/// Files that would produce the same artifact name in that directory get
/// `_<i>` appended to the later stems.
fn queue_archive(
    archive: &Archive,
    scratch: &Path,
    output_dir: &Path,
    jobs: &Sender<FileJob>,
) -> Result<usize, PipelineError> {
    let extracted = archive.extract_to(scratch).map_err(|source| PipelineError::Extract {
        path: archive.root.clone(),
        source,
    })?;
    let archive = &extracted;
    let organism = archive
        .organism_name()
        .map_err(PipelineError::io(&archive.root))?;
    let dest_dir = unique_destination(output_dir, &organism).map_err(PipelineError::io(output_dir))?;
    info!(archive = %archive.name, organism = %organism, dest = %dest_dir.display(), "processing archive");

    let mut queued = 0;
    let mut stems = HashSet::new();
    for dir in archive.genome_dirs().map_err(PipelineError::io(&archive.root))? {
        for source in sequence_files(&dir).map_err(PipelineError::io(&dir))? {
            let natural = artifact_stem(&source);
            let stem = claim_stem(&mut stems, &natural);
            if stem != natural {
                warn!(source = %source.display(), stem = %stem, "artifact name already taken, renaming");
            }
            let job = FileJob {
                source,
                dest_dir: dest_dir.clone(),
                stem,
            };
            // Every worker is gone.
            if jobs.send(job).is_err() {
                return Ok(queued);
            }
            queued += 1;
        }
    }
    if queued == 0 {
        warn!(archive = %archive.name, "no sequence files found");
    }
    Ok(queued)
}

fn spawn_worker(jobs: Receiver<FileJob>, results: Sender<JobOutcome>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        while let Ok(job) = jobs.recv() {
            debug!(source = %job.source.display(), "encoding");
            let outcome = process_file_as(&job.source, &job.dest_dir, &job.stem);
            if results.send((job.source, outcome)).is_err() {
                break;
            }
        }
    })
}

/// Run the whole batch.
///
/// Only a missing input directory or an unusable output root abort the run;
/// everything else ends up in [`RunReport::failures`].
pub fn run(config: &Config) -> Result<RunReport, PipelineError> {
    if !config.input_dir.is_dir() {
        return Err(PipelineError::MissingInput(config.input_dir.clone()));
    }
    prepare_destination(config)?;
    let archives = list_archives(&config.input_dir).map_err(PipelineError::io(&config.input_dir))?;
    // Zipped archives are extracted here; removed once the workers are done.
    let scratch = tempfile::Builder::new()
        .prefix("genome-packer-")
        .tempdir()
        .map_err(PipelineError::io(std::env::temp_dir()))?;

    let (job_tx, job_rx) = bounded::<FileJob>(JOB_QUEUE);
    let (result_tx, result_rx) = unbounded::<JobOutcome>();
    let workers: Vec<_> = (0..config.threads.max(1))
        .map(|_| spawn_worker(job_rx.clone(), result_tx.clone()))
        .collect();
    drop(job_rx);
    drop(result_tx);

    let mut report = RunReport {
        archives: archives.len(),
        ..RunReport::default()
    };
    for archive in &archives {
        if let Err(error) = queue_archive(archive, scratch.path(), &config.output_dir, &job_tx) {
            warn!(archive = %archive.name, "skipping archive: {error}");
            report.failures.push(Failure {
                path: archive.root.clone(),
                error,
            });
        }
    }
    drop(job_tx);

    for handle in workers {
        if handle.join().is_err() {
            warn!("worker thread panicked");
        }
    }

    for (source, outcome) in result_rx.iter() {
        match outcome {
            Ok(file) => report.files.push(file),
            Err(error) => {
                warn!(source = %source.display(), "file failed: {error}");
                report.failures.push(Failure {
                    path: source,
                    error,
                });
            }
        }
    }
    report.files.sort_by(|a, b| a.source.cmp(&b.source));
    report.failures.sort_by(|a, b| a.path.cmp(&b.path));

    info!(
        archives = report.archives,
        files = report.files.len(),
        failures = report.failures.len(),
        "run finished"
    );
    Ok(report)
}
