//! Where things live in an extracted genome dataset and in the output tree.
//!
//! An archive is either a `.zip` file or a directory it was already
//! extracted to. Either way the contents are laid out like an NCBI datasets
//! download:
//!
//! ```text
//! <archive>/ncbi_dataset/data/assembly_data_report.jsonl
//! <archive>/ncbi_dataset/data/<accession>/<anything>.fna
//! ```

use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::warn;
use zip::result::ZipResult;
use zip::ZipArchive;

/// Organism name used when the dataset report is missing or has no name.
pub const DEFAULT_ORGANISM: &str = "default";

const DATA_DIR: [&str; 2] = ["ncbi_dataset", "data"];
const REPORT_FILE: &str = "assembly_data_report.jsonl";
const ORGANISM_KEY: &str = "organismName";

/// One archive under the raw input directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    pub root: PathBuf,
    /// File or directory name without a trailing `.zip`.
    pub name: String,
}

impl Archive {
    pub fn new(root: PathBuf) -> Self {
        let file_name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = file_name
            .strip_suffix(".zip")
            .unwrap_or(&file_name)
            .to_string();
        Archive { root, name }
    }

    /// True while `root` is still a zip file rather than a directory.
    pub fn is_zipped(&self) -> bool {
        self.root.is_file()
    }

    /// Unzip into `scratch/<name>` and return the extracted archive. An
    /// archive that is already a directory is returned unchanged.
    pub fn extract_to(&self, scratch: &Path) -> ZipResult<Archive> {
        if !self.is_zipped() {
            return Ok(self.clone());
        }
        let target = scratch.join(&self.name);
        let mut reader = ZipArchive::new(fs::File::open(&self.root)?)?;
        reader.extract(&target)?;
        Ok(Archive {
            root: target,
            name: self.name.clone(),
        })
    }

    fn data_dir(&self) -> PathBuf {
        DATA_DIR.iter().fold(self.root.clone(), |p, part| p.join(part))
    }

    /// Directories expected to hold this archive's sequence files.
    ///
    /// `data/<name>/` when present, otherwise every directory under `data/`,
    /// otherwise the archive root itself.
    pub fn genome_dirs(&self) -> io::Result<Vec<PathBuf>> {
        let data = self.data_dir();
        let named = data.join(&self.name);
        if named.is_dir() {
            return Ok(vec![named]);
        }
        if data.is_dir() {
            return sorted_entries(&data, |p| p.is_dir());
        }
        Ok(vec![self.root.clone()])
    }

    /// Organism name from the dataset report, made safe for use as a
    /// directory name. Falls back to [`DEFAULT_ORGANISM`].
    pub fn organism_name(&self) -> io::Result<String> {
        let report = self.data_dir().join(REPORT_FILE);
        let file = match fs::File::open(&report) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(DEFAULT_ORGANISM.to_string())
            }
            Err(e) => return Err(e),
        };

        let mut name = None;
        for line in BufReader::new(file).lines() {
            let line = line?;
            if !line.contains(ORGANISM_KEY) {
                continue;
            }
            match serde_json::from_str::<Value>(&line) {
                // Later records override earlier ones.
                Ok(value) => {
                    if let Some(found) = find_organism(&value) {
                        name = Some(sanitize(found));
                    }
                }
                Err(e) => warn!(report = %report.display(), "skipping malformed report line: {e}"),
            }
        }
        Ok(name.unwrap_or_else(|| DEFAULT_ORGANISM.to_string()))
    }
}

fn find_organism(value: &Value) -> Option<&str> {
    match value {
        Value::Object(map) => map
            .get(ORGANISM_KEY)
            .and_then(Value::as_str)
            .or_else(|| map.values().find_map(find_organism)),
        Value::Array(items) => items.iter().find_map(find_organism),
        _ => None,
    }
}

fn sanitize(name: &str) -> String {
    name.replace([' ', '/'], "_")
}

fn sorted_entries(dir: &Path, keep: impl Fn(&Path) -> bool) -> io::Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if keep(&path) {
            entries.push(path);
        }
    }
    entries.sort();
    Ok(entries)
}

fn is_zip_file(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|ext| ext == "zip")
}

/// Every archive directory and `.zip` file under `raw_dir`, sorted by name.
/// Anything else is skipped with a warning.
pub fn list_archives(raw_dir: &Path) -> io::Result<Vec<Archive>> {
    let mut archives = Vec::new();
    for path in sorted_entries(raw_dir, |_| true)? {
        if path.is_dir() || is_zip_file(&path) {
            archives.push(Archive::new(path));
        } else {
            warn!(path = %path.display(), "not an archive, skipping");
        }
    }
    Ok(archives)
}

/// True for `.fna` and `.fna.gz` files.
pub fn is_sequence_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let name = name.strip_suffix(".gz").unwrap_or(name);
    name.ends_with(".fna")
}

/// Sequence files directly inside `dir`, sorted.
pub fn sequence_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    sorted_entries(dir, |p| p.is_file() && is_sequence_file(p))
}

/// File name with `.gz` and `.fna` removed, used to name both artifacts.
pub fn artifact_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = name.strip_suffix(".gz").unwrap_or(&name);
    name.strip_suffix(".fna").unwrap_or(name).to_string()
}

/// `stem`, or `stem_<i>` for the smallest `i >= 1` not already in `claimed`.
/// The returned name is added to `claimed`.
pub fn claim_stem(claimed: &mut HashSet<String>, stem: &str) -> String {
    let mut candidate = stem.to_string();
    let mut suffix = 0usize;
    while claimed.contains(&candidate) {
        suffix += 1;
        candidate = format!("{stem}_{suffix}");
    }
    claimed.insert(candidate.clone());
    candidate
}

/// Create `root/<name>`, or `root/<name>_<i>` for the smallest free `i >= 1`.
pub fn unique_destination(root: &Path, name: &str) -> io::Result<PathBuf> {
    let mut candidate = root.join(name);
    let mut suffix = 0usize;
    loop {
        match fs::create_dir(&candidate) {
            Ok(()) => return Ok(candidate),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                suffix += 1;
                candidate = root.join(format!("{name}_{suffix}"));
            }
            Err(e) => return Err(e),
        }
    }
}
