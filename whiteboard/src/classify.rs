/// Handling category for a shared file, decided from its declared MIME type
/// and file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCategory {
    Media,
    TextOrUrl,
    Other,
}

const MEDIA_PREFIXES: [&str; 3] = ["image/", "video/", "audio/"];

const TEXT_PREFIXES: [&str; 4] = [
    "text/",
    "application/json",
    "application/xml",
    "application/javascript",
];

const TEXT_EXTENSIONS: [&str; 7] = [".txt", ".json", ".xml", ".js", ".css", ".html", ".url"];

pub fn classify(mime_type: &str, file_name: &str) -> FileCategory {
    let mime = mime_type.to_ascii_lowercase();
    let name = file_name.to_ascii_lowercase();

    if MEDIA_PREFIXES.iter().any(|p| mime.starts_with(p)) || mime == "application/pdf" {
        FileCategory::Media
    } else if TEXT_PREFIXES.iter().any(|p| mime.starts_with(p))
        || TEXT_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
    {
        FileCategory::TextOrUrl
    } else {
        FileCategory::Other
    }
}
