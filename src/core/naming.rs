//! Filesystem-safe naming for groups and archives

/// Replace every character outside `[A-Za-z0-9_-]` with `_`
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Short hex digest of the archive URL, used to keep file names unique
pub fn url_hash(archive_url: &str) -> String {
    let digest = format!("{:x}", md5::compute(archive_url.as_bytes()));
    digest[..8].to_string()
}

/// Destination file name for a project's archive
pub fn archive_file_name(project_name: &str, archive_url: &str) -> String {
    format!(
        "{}_{}.zip",
        sanitize_name(project_name),
        url_hash(archive_url)
    )
}
