//! Output directory helpers.

use std::fs;
use std::path::Path;

use super::Result;

/// Characters that are not allowed in file names on common platforms.
const INVALID_FILE_NAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Make sure `dir` exists and is empty.
///
/// Existing files and subdirectories are removed; the directory itself is kept.
pub fn create_and_clear_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
        return Ok(());
    }
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

/// Turn an arbitrary string into something usable as a file name.
///
/// Invalid and control characters become `_`, trailing dots and spaces are
/// trimmed, and an empty result becomes `_`.
pub fn to_valid_file_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if c.is_control() || INVALID_FILE_NAME_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect();
    let trimmed = replaced.trim_end_matches(['.', ' ']);
    if trimmed.is_empty() {
        "_".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Split a name at its last `.` into `(base, extension)`.
///
/// The extension keeps its leading dot; it is empty when there is none.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(pos) => (&name[..pos], &name[pos..]),
        None => (name, ""),
    }
}

/// File name for an embedded asset: sanitized base name plus its extension.
pub fn asset_file_name(name: &str) -> String {
    let (base, ext) = split_extension(name);
    if ext.is_empty() {
        return to_valid_file_name(base);
    }
    let ext: String = ext
        .chars()
        .map(|c| if c.is_control() || INVALID_FILE_NAME_CHARS.contains(&c) { '_' } else { c })
        .collect();
    format!("{}{}", to_valid_file_name(base), ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_file_name() {
        assert_eq!(to_valid_file_name("table:Rvt.Element"), "table_Rvt.Element");
        assert_eq!(to_valid_file_name("a/b\\c"), "a_b_c");
        assert_eq!(to_valid_file_name("name. "), "name");
        assert_eq!(to_valid_file_name(""), "_");
        assert_eq!(to_valid_file_name("tab\there"), "tab_here");
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("readme.txt"), ("readme", ".txt"));
        assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(split_extension("noext"), ("noext", ""));
    }

    #[test]
    fn test_asset_file_name() {
        assert_eq!(asset_file_name("readme.txt"), "readme.txt");
        assert_eq!(asset_file_name("textures/brick:1.png"), "textures_brick_1.png");
        assert_eq!(asset_file_name("LICENSE"), "LICENSE");
    }

    #[test]
    fn test_create_and_clear_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("out");
        create_and_clear_dir(&dir).unwrap();
        assert!(dir.is_dir());

        fs::write(dir.join("stale.txt"), b"x").unwrap();
        fs::create_dir(dir.join("sub")).unwrap();
        fs::write(dir.join("sub").join("deep.txt"), b"y").unwrap();

        create_and_clear_dir(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
    }
}
