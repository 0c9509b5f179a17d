use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use glob::{glob, Pattern};
use log::{debug, error, info, warn};
use serde_json::Value;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

const SOURCE_EXTENSIONS: [&str; 2] = ["json", "json.gz"];

/// Ticket records read from one source file.
#[derive(Debug)]
pub struct LoadedFile {
    pub path: PathBuf,
    pub records: Vec<Value>,
    pub lines_read: usize,
    pub parse_errors: usize,
}

/// Lists `*.json` and `*.json.gz` files directly inside `directory`, sorted by path.
///
/// `exclude` names a file that must never be treated as a source, typically the
/// merged output when it lives in the input directory.
pub fn find_input_files<P: AsRef<Path>>(directory: P, exclude: Option<&Path>) -> Result<Vec<PathBuf>> {
    let directory = directory.as_ref();
    if !directory.is_dir() {
        warn!("Input folder does not exist or is not a directory: {}", directory.display());
        return Ok(Vec::new());
    }

    let escaped_dir = Pattern::escape(&directory.to_string_lossy());
    let excluded = exclude.and_then(|p| fs::canonicalize(p).ok());

    let mut paths = Vec::new();
    for extension in SOURCE_EXTENSIONS {
        let pattern = format!("{}/*.{}", escaped_dir, extension);
        debug!("Searching for files matching pattern: {}", pattern);
        for path in glob(&pattern)
            .with_context(|| format!("Invalid search pattern: {}", pattern))?
            .filter_map(Result::ok)
        {
            if !path.is_file() {
                continue;
            }
            if excluded.is_some() && fs::canonicalize(&path).ok() == excluded {
                info!("Skipping merged output file found in input folder: {}", path.display());
                continue;
            }
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Reads a line-delimited JSON file. A line holding an array contributes each of
/// its elements; lines that fail to parse are logged and skipped. A file that
/// cannot be read to the end is an error.
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<LoadedFile> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;

    let reader: Box<dyn BufRead> = if is_gzip(path) {
        Box::new(BufReader::new(GzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    let mut loaded = LoadedFile {
        path: path.to_path_buf(),
        records: Vec::new(),
        lines_read: 0,
        parse_errors: 0,
    };

    // Byte lines: undecodable text surfaces as a JSON error on that line, so any
    // I/O error left is a truncated or corrupt source and fails the whole file.
    for (line_num, line_result) in reader.split(b'\n').enumerate() {
        let line = line_result
            .with_context(|| format!("Failed to read {} at line {}", path.display(), line_num + 1))?;
        loaded.lines_read += 1;

        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        match serde_json::from_slice::<Value>(&line) {
            Ok(Value::Array(items)) => loaded.records.extend(items),
            Ok(record) => loaded.records.push(record),
            Err(e) => {
                loaded.parse_errors += 1;
                error!("Error reading line {} in {}: {}", line_num + 1, path.display(), e);
            }
        }
    }

    debug!(
        "Finished reading {}: {} lines read, {} records, {} JSON errors.",
        path.display(),
        loaded.lines_read,
        loaded.records.len(),
        loaded.parse_errors
    );

    Ok(loaded)
}

/// File name without its `.json` / `.json.gz` suffix; used to name per-file reports.
pub fn source_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    name.strip_suffix(".json.gz")
        .or_else(|| name.strip_suffix(".json"))
        .unwrap_or(&name)
        .to_string()
}

fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn flattens_arrays_and_skips_bad_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tickets.json");
        fs::write(
            &path,
            "{\"id\": 1}\n[{\"id\": 2}, {\"id\": 3}]\nnot json at all\n\n   \n{\"id\": 4}\n",
        )
        .unwrap();

        let loaded = load_records(&path).unwrap();
        let ids: Vec<u64> = loaded
            .records
            .iter()
            .filter_map(|r| r.get("id").and_then(Value::as_u64))
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(loaded.parse_errors, 1);
        assert_eq!(loaded.lines_read, 6);
    }

    #[test]
    fn reads_gzip_sources() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tickets.json.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(b"{\"id\": 1}\n{\"id\": 2}\n").unwrap();
        encoder.finish().unwrap();

        assert_eq!(load_records(&path).unwrap().records.len(), 2);
    }

    #[test]
    fn truncated_gzip_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tickets.json.gz");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        for id in 0..2000 {
            writeln!(encoder, "{{\"id\": {}, \"tags\": [\"tag-{}\"]}}", id, id * 7919).unwrap();
        }
        let compressed = encoder.finish().unwrap();
        fs::write(&path, &compressed[..compressed.len() / 2]).unwrap();

        let err = load_records(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read"));
    }

    #[test]
    fn invalid_utf8_line_is_skipped_like_bad_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tickets.json");
        fs::write(&path, b"{\"id\": 1}\n{\"id\": \"\xff\xfe\"}\r\n{\"id\": 2}\r\n").unwrap();

        let loaded = load_records(&path).unwrap();
        assert_eq!(loaded.records.len(), 2);
        assert_eq!(loaded.parse_errors, 1);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(load_records(dir.path().join("absent.json")).is_err());
    }

    #[test]
    fn finds_only_json_sources_in_order() {
        let dir = TempDir::new().unwrap();
        for name in ["b.json", "a.json", "c.json.gz", "notes.txt", "a_analysis.xlsx"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        fs::create_dir(dir.path().join("nested.json")).unwrap();

        let files = find_input_files(dir.path(), None).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.json", "b.json", "c.json.gz"]);
    }

    #[test]
    fn excludes_merged_output() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.json"), "").unwrap();
        fs::write(dir.path().join("combined.json"), "[]").unwrap();

        let files = find_input_files(dir.path(), Some(dir.path().join("combined.json").as_path())).unwrap();
        assert_eq!(files, vec![dir.path().join("a.json")]);
    }

    #[test]
    fn missing_directory_has_no_files() {
        let dir = TempDir::new().unwrap();
        assert!(find_input_files(dir.path().join("nope"), None).unwrap().is_empty());
    }

    #[test]
    fn stems_strip_source_extensions() {
        assert_eq!(source_stem(Path::new("/x/split_1.json")), "split_1");
        assert_eq!(source_stem(Path::new("split_2.json.gz")), "split_2");
    }
}
