use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::env;

use crate::error::{Result, SampleError};

/// Reads a corpus file and returns its lines.
///
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`, line terminators are dropped
pub fn read_file<P: AsRef<Path>>(filename: P) -> Result<Vec<String>> {
	let contents = fs::read_to_string(filename)?;
	Ok(contents.lines().map(str::to_owned).collect())
}

/// Builds the cache path sitting next to a corpus file.
///
/// Example:
/// `data/shakespeare.txt` + `"bin"` → `data/shakespeare.bin`
pub fn build_output_path<P: AsRef<Path>>(input_path: P, output_extension: &str) -> Result<PathBuf> {
	let input_path = input_path.as_ref();

	let parent = input_path.parent().unwrap_or_else(|| Path::new("."));
	let file_stem = input_path
		.file_stem()
		.ok_or_else(|| SampleError::InvalidParameter(format!("{} has no file name", input_path.display())))?;

	let mut output = PathBuf::from(parent);
	output.push(file_stem);
	output.set_extension(output_extension);

	Ok(output)
}

/// Extracts the corpus name (file name without extension).
///
/// Examples:
/// - `"./data/nietzsche.txt"` → `"nietzsche"`
/// - `"nietzsche.txt"` → `"nietzsche"`
pub fn get_filename<P: AsRef<Path>>(input_path: P) -> Result<String> {
	let input_path = input_path.as_ref();
	let stem = input_path
		.file_stem()
		.ok_or_else(|| SampleError::InvalidParameter(format!("{} has no file name", input_path.display())))?;

	Ok(stem.to_string_lossy().to_string())
}

/// Normalize a folder path.
///
/// - `"."` or `"./"` resolves to the current working directory
/// - Other paths are returned as-is (not canonicalized)
pub fn normalize_folder(input: &str) -> PathBuf {
	if input == "." || input == "./" {
		env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
	} else {
		PathBuf::from(input)
	}
}

/// Lists the files of a directory carrying a given extension.
///
/// Returns sorted file names only (no paths), subdirectories are skipped.
pub fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<String>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let path = entry?.path();
		if path.is_file() && path.extension() == Some(OsStr::new(extension)) {
			if let Some(name) = path.file_name() {
				files.push(name.to_string_lossy().to_string());
			}
		}
	}

	files.sort();
	Ok(files)
}
