// Assembles the processed ADS files into a single zip archive.

use std::collections::HashSet;
use std::io::{Cursor, Write};

use zip::write::FileOptions;
use zip::CompressionMethod;

use crate::ads::io_csv::write_table;
use crate::ads::*;

/// One ADS file with the factor table selected for it.
#[derive(PartialEq, Debug, Clone)]
pub struct BatchJob {
    /// The name of the source file, without directories. It drives the output name.
    pub file_name: String,
    pub dataset: Table,
    pub factors: Table,
}

/// Reported after each job has been written to the archive.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct BatchProgress<'a> {
    pub index: usize,
    pub total: usize,
    pub file_name: &'a str,
    pub entry: &'a str,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PackagedEntry {
    pub source: String,
    /// `<tag>/<new file name>`
    pub entry: String,
    pub tag: String,
    pub applied: usize,
    pub skipped: usize,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Package {
    pub bytes: Vec<u8>,
    pub entries: Vec<PackagedEntry>,
}

fn entry_options() -> FileOptions<'static, ()> {
    FileOptions::default().compression_method(CompressionMethod::Deflated)
}

/// Applies the factors of every job and writes the results to an in-memory zip archive.
///
/// Jobs are processed in order. Each output is stored under `<version tag>/<new name>`, the
/// name and tag coming from [`rename_file`]. The first failing job stops the batch and no
/// archive is returned.
pub fn package<F>(jobs: &[BatchJob], rules: &FactorRules, mut on_progress: F) -> AdsResult<Package>
where
    F: FnMut(&BatchProgress<'_>),
{
    let total = jobs.len();
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let mut seen: HashSet<String> = HashSet::new();
    let mut entries: Vec<PackagedEntry> = Vec::new();

    for (index, job) in jobs.iter().enumerate() {
        debug!("package: job {}/{}: {:?}", index + 1, total, job.file_name);
        let res = apply_factors(&job.dataset, &job.factors, rules).context(
            ApplyingFactorsSnafu {
                file_name: job.file_name.clone(),
            },
        )?;
        let versioned = rename_file(&job.file_name);
        let entry = format!("{}/{}", versioned.tag, versioned.file_name);
        ensure!(
            seen.insert(entry.clone()),
            DuplicateEntrySnafu {
                entry: entry.clone()
            }
        );

        let blob = write_table(&res.table, &versioned.file_name)?;
        zip.start_file(entry.as_str(), entry_options())
            .context(WritingArchiveSnafu {
                entry: entry.clone(),
            })?;
        zip.write_all(&blob).context(WritingArchiveDataSnafu {
            entry: entry.clone(),
        })?;

        on_progress(&BatchProgress {
            index,
            total,
            file_name: &job.file_name,
            entry: &entry,
        });
        entries.push(PackagedEntry {
            source: job.file_name.clone(),
            entry,
            tag: versioned.tag,
            applied: res.applied_count(),
            skipped: res.skipped_count(),
        });
    }

    let cursor = zip.finish().context(WritingArchiveSnafu {
        entry: "<central directory>",
    })?;
    info!("package: {} entries written", entries.len());
    Ok(Package {
        bytes: cursor.into_inner(),
        entries,
    })
}
