use std::path::{Path, PathBuf};

/// Derive the output path `<base-name>[_<suffix>]<extension>`.
///
/// The suffix is trimmed and omitted entirely when empty. The base name is
/// the file name up to its last `.` (a leading dot does not count), and the
/// extension falls back to `.csv` when the input has none. The output lands in
/// `output_dir` when given, otherwise next to the input.
pub fn output_path(input: &Path, suffix: &str, output_dir: Option<&Path>) -> PathBuf {
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let (base, ext) = match file_name.rfind('.') {
        Some(idx) if idx > 0 => (&file_name[..idx], &file_name[idx..]),
        _ => (file_name.as_str(), ".csv"),
    };

    let suffix = suffix.trim();
    let name = if suffix.is_empty() {
        format!("{base}{ext}")
    } else {
        format!("{base}_{suffix}{ext}")
    };

    let dir = match output_dir {
        Some(dir) => dir,
        None => input.parent().unwrap_or_else(|| Path::new("")),
    };
    dir.join(name)
}

/// Whether writing to `output` would replace `input`. Paths are compared as
/// given and, when both exist, after canonicalisation.
pub fn overwrites_input(input: &Path, output: &Path) -> bool {
    if input == output {
        return true;
    }
    match (input.canonicalize(), output.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Path of the JSON statistics report written next to `output`.
pub fn stats_report_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    output.with_file_name(format!("{stem}.stats.json"))
}
