use tracing::{error, info};

use crate::errors::AppError;
use crate::models::resume::NewResume;
use crate::resumes::extract::extract_text;
use crate::resumes::staging::{ContactFields, StagedFile, StagedUpload};
use crate::resumes::sterilize::sterilize;
use crate::resumes::store::ResumeStore;
use crate::resumes::StoredResume;
use crate::storage::ObjectStore;

/// Stores staged files one after another. The first failure stops the loop:
/// earlier files stay stored, later ones are never attempted, and the error
/// names the failed file. Every temp file is deleted when its `StagedFile`
/// drops, whichever way this returns.
pub async fn store_resumes(
    resumes: &dyn ResumeStore,
    storage: &dyn ObjectStore,
    upload: StagedUpload,
) -> Result<Vec<StoredResume>, AppError> {
    let StagedUpload { files, contact } = upload;
    let mut stored = Vec::with_capacity(files.len());

    for file in files {
        match store_one(resumes, storage, &file, &contact).await {
            Ok(resume) => stored.push(resume),
            Err(cause) => {
                error!(
                    "Storing '{}' failed after {} stored file(s)",
                    file.original_name,
                    stored.len()
                );
                return Err(AppError::UploadAborted {
                    failed_file: file.original_name.clone(),
                    stored,
                    cause: Box::new(cause),
                });
            }
        }
    }

    Ok(stored)
}

async fn store_one(
    resumes: &dyn ResumeStore,
    storage: &dyn ObjectStore,
    file: &StagedFile,
    contact: &ContactFields,
) -> Result<StoredResume, AppError> {
    let content = extract_text(file.path(), &file.content_type).await;
    let content_sterilized = sterilize(&content);

    let key = storage
        .upload(file.path(), &file.original_name, &file.content_type)
        .await?;

    let row = resumes
        .create(&NewResume {
            original_name: file.original_name.clone(),
            original_file: key.clone(),
            pdf_file: key.clone(),
            content,
            content_sterilized,
            email: contact.email.clone(),
            phone: contact.phone.clone(),
            location: contact.location.clone(),
        })
        .await?;

    info!("Stored resume {} as '{key}'", row.id);
    Ok(StoredResume {
        original_name: file.original_name.clone(),
        stored_file_name: key,
    })
}
