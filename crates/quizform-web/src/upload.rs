use axum::extract::Multipart;

/// Name of the multipart field carrying the PDF.
pub const FILE_FIELD: &str = "file";

/// An uploaded PDF with its original filename.
pub struct UploadedPdf {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Parse a multipart form upload, keeping the first `file` field.
pub async fn parse_multipart(mut multipart: Multipart) -> Result<UploadedPdf, String> {
    let mut file: Option<UploadedPdf> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Failed to read form field: {}", e))?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == FILE_FIELD && file.is_none() {
            let filename = field.file_name().unwrap_or("").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| format!("Failed to read file data: {}", e))?
                .to_vec();
            file = Some(UploadedPdf { filename, data });
        } else {
            // Ignore unknown fields and extra files
            let _ = field.bytes().await;
        }
    }

    let file = file.ok_or("No file uploaded")?;
    check_filename(&file.filename)?;
    Ok(file)
}

/// Accept only names ending in `.pdf`, in any case.
pub fn check_filename(filename: &str) -> Result<(), String> {
    if filename.to_lowercase().ends_with(".pdf") {
        Ok(())
    } else {
        Err("Only PDF files allowed".to_string())
    }
}
