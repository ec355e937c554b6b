#![allow(dead_code)]

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use cbz::{CbzRead, CbzReader, CbzWrite, CbzWriter, Error};
use cbz_cover::{Outcome, Reporter, RunSummary, Step};
use tempfile::TempDir;

pub fn utf8_tempdir() -> (TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = Utf8Path::from_path(dir.path()).unwrap().to_path_buf();
    (dir, path)
}

pub fn write_cbz(path: &Utf8Path, entries: &[(&str, &str)]) {
    let mut writer = CbzWriter::default();
    for (name, content) in entries {
        writer.insert(*name, content.as_bytes()).unwrap();
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    writer.finish().unwrap().write_to_path(path).unwrap();
}

pub fn entry_names(path: &Utf8Path) -> Vec<String> {
    let reader = CbzReader::from_path(path).unwrap();
    let mut names = reader
        .file_names()
        .into_iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    names.sort();
    names
}

pub fn read_entry(path: &Utf8Path, name: &str) -> String {
    let mut reader = CbzReader::from_path(path).unwrap();
    let mut content = None;
    reader
        .try_for_each(|file| {
            let mut file = file?;
            if file.name() == name {
                content = Some(String::from_utf8(file.to_vec()?).unwrap());
            }
            Ok::<_, Error>(())
        })
        .unwrap();
    content.unwrap()
}

pub fn is_empty_dir(path: &Utf8Path) -> bool {
    fs::read_dir(path).unwrap().next().is_none()
}

/// Keeps track of everything reported during a run
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub total: Option<usize>,
    pub steps: Vec<(Utf8PathBuf, Step)>,
    pub processed: Vec<(Utf8PathBuf, Outcome)>,
    pub failed: Vec<(Utf8PathBuf, String)>,
    pub summary: Option<RunSummary>,
}

impl RecordingReporter {
    pub fn steps_of(&self, archive: &Utf8Path) -> Vec<Step> {
        self.steps
            .iter()
            .filter(|(path, _)| path.as_path() == archive)
            .map(|(_, step)| *step)
            .collect()
    }
}

impl Reporter for RecordingReporter {
    fn start(&mut self, total: usize) {
        self.total = Some(total);
    }

    fn step(&mut self, archive: &Utf8Path, step: Step) {
        self.steps.push((archive.to_path_buf(), step));
    }

    fn processed(&mut self, archive: &Utf8Path, outcome: Outcome, _summary: &RunSummary) {
        self.processed.push((archive.to_path_buf(), outcome));
    }

    fn failed(&mut self, archive: &Utf8Path, error: &cbz_cover::Error, _summary: &RunSummary) {
        self.failed.push((archive.to_path_buf(), error.to_string()));
    }

    fn finish(&mut self, summary: &RunSummary) {
        self.summary = Some(*summary);
    }
}
