/// A file received from a multipart form
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl UploadedFile {
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Extension of the original file name including the dot, e.g. ".mp4"
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.file_name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() || ext.contains(['/', '\\']) {
            return None;
        }
        Some(format!(".{}", ext.to_lowercase()))
    }
}
