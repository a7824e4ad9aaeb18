//! Interactive CSV picker.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the picker provides the "run `bct` and choose a measurement CSV" UX
//!
//! The picker searches for `*.csv` and workbook files under the current working directory,
//! skipping build output and previous exports under `debug/`.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// Default directory recursion depth for finding CSV files.
const DEFAULT_SEARCH_DEPTH: usize = 4;

/// Prompt the user to select a CSV file from the current directory tree.
///
/// Behavior:
/// - list discovered `*.csv` and workbook files
/// - accept either a number (from the list) or an explicit path
/// - `q` cancels
pub fn prompt_for_csv_path() -> Result<PathBuf, AppError> {
    let files = discover_csv_files();
    if files.is_empty() {
        return Err(AppError::invalid_input(
            "No .csv or workbook files found. Provide one with `bct process -f <file>`.",
        ));
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    choose_csv(&files, stdin.lock(), stdout.lock())
}

/// Selection loop over an arbitrary input/output pair.
pub fn choose_csv<R: BufRead, W: Write>(files: &[PathBuf], mut input: R, mut output: W) -> Result<PathBuf, AppError> {
    let io_err = |e: io::Error| AppError::invalid_input(format!("Failed to write prompt: {e}"));

    writeln!(output, "Found {} measurement file(s):", files.len()).map_err(io_err)?;
    for (idx, path) in files.iter().enumerate() {
        writeln!(output, "{:>3}) {}", idx + 1, pretty_path(path)).map_err(io_err)?;
    }

    loop {
        write!(output, "Select a file by number (1-{}) or type a path (q to quit): ", files.len()).map_err(io_err)?;
        output.flush().map_err(io_err)?;

        let mut line = String::new();
        let bytes = input
            .read_line(&mut line)
            .map_err(|e| AppError::invalid_input(format!("Failed to read input: {e}")))?;

        if bytes == 0 {
            return Err(AppError::invalid_input(
                "No input received. Provide a CSV path with `bct process -f <file.csv>`.",
            ));
        }

        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Err(AppError::invalid_input("Canceled."));
        }

        if let Ok(choice) = line.parse::<usize>() {
            if (1..=files.len()).contains(&choice) {
                return validate_csv_path(&files[choice - 1]);
            }
            writeln!(output, "Invalid choice: {choice}. Enter a number between 1 and {}.", files.len())
                .map_err(io_err)?;
            continue;
        }

        match validate_csv_path(Path::new(line)) {
            Ok(path) => return Ok(path),
            Err(err) => writeln!(output, "{err}").map_err(io_err)?,
        }
    }
}

/// Validate the provided path points to a `.csv` file or a workbook.
pub fn validate_csv_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::invalid_input(format!("CSV file not found: {}", path.display())));
    }
    if path.is_dir() {
        return Err(AppError::invalid_input(format!(
            "Expected a file, got a directory: {}",
            path.display()
        )));
    }
    if !has_csv_extension(path) && !crate::io::ingest::is_spreadsheet(path) {
        return Err(AppError::invalid_input(format!(
            "Expected a .csv, .xlsx, .xls, .xlsm or .ods file (got: {}).",
            path.display()
        )));
    }

    Ok(path.to_path_buf())
}

/// Discover CSV and workbook files under the current directory (deterministic order).
pub fn discover_csv_files() -> Vec<PathBuf> {
    find_csv_files(Path::new("."), DEFAULT_SEARCH_DEPTH)
}

pub fn find_csv_files(root: &Path, max_depth: usize) -> Vec<PathBuf> {
    let mut out = Vec::new();
    find_csv_files_inner(root, 0, max_depth, &mut out);
    out.sort_by_key(|p| pretty_path(p));
    out
}

fn find_csv_files_inner(root: &Path, depth: usize, max_depth: usize, out: &mut Vec<PathBuf>) {
    if depth > max_depth {
        return;
    }

    let Ok(entries) = fs::read_dir(root) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            if !should_skip_dir(&path) {
                find_csv_files_inner(&path, depth + 1, max_depth, out);
            }
        } else if file_type.is_file() && (has_csv_extension(&path) || crate::io::ingest::is_spreadsheet(&path)) {
            out.push(path);
        }
    }
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn should_skip_dir(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    matches!(name, ".git" | "target" | "node_modules" | "debug")
}

fn pretty_path(path: &Path) -> String {
    let stripped = path.strip_prefix("./").unwrap_or(path);
    stripped.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        fs::write(path, "date,weight,fat\n").unwrap();
    }

    #[test]
    fn finds_csv_files_sorted_and_skips_build_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("nested")).unwrap();
        fs::create_dir_all(root.join("target")).unwrap();
        touch(&root.join("b.csv"));
        touch(&root.join("nested/a.CSV"));
        touch(&root.join("target/skip.csv"));
        touch(&root.join("notes.txt"));
        touch(&root.join("scale.xlsx"));

        let found = find_csv_files(root, 2);
        let names: Vec<String> = found
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().display().to_string())
            .collect();
        assert_eq!(names, vec!["b.csv", "nested/a.CSV", "scale.xlsx"]);
    }

    #[test]
    fn choose_by_number_after_bad_choice() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.csv");
        touch(&a);

        let mut shown = Vec::new();
        let picked = choose_csv(&[a.clone()], "7\n1\n".as_bytes(), &mut shown).unwrap();
        assert_eq!(picked, a);
        assert!(String::from_utf8(shown).unwrap().contains("Invalid choice: 7"));
    }

    #[test]
    fn eof_and_quit_are_errors() {
        let files = [PathBuf::from("x.csv")];
        assert!(choose_csv(&files, "".as_bytes(), Vec::new()).is_err());
        assert_eq!(choose_csv(&files, "q\n".as_bytes(), Vec::new()).unwrap_err().message(), "Canceled.");
    }

    #[test]
    fn rejects_non_csv_paths() {
        let dir = tempfile::tempdir().unwrap();
        let txt = dir.path().join("data.txt");
        fs::write(&txt, "x").unwrap();
        assert!(validate_csv_path(&txt).is_err());
        assert!(validate_csv_path(dir.path()).is_err());
        assert!(validate_csv_path(&dir.path().join("missing.csv")).is_err());

        let book = dir.path().join("scale.xlsx");
        fs::write(&book, "x").unwrap();
        assert_eq!(validate_csv_path(&book).unwrap(), book);
    }
}
