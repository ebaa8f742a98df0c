//! src/services/publication_service.rs
//!
//! PublicationService: stores an uploaded file in the blob store, then records
//! a `publications` row pointing at its public URL. The steps run in order and
//! each depends on the previous one:
//!
//! 1. upload to `publications/{file name}` (never overwriting)
//! 2. resolve the object's public URL
//! 3. insert the row
//!
//! If step 3 is rejected the object written in step 1 is removed again so no
//! blob is left without a row referencing it. An insert the gateway accepted
//! but whose answer was unreadable keeps the object.

use super::{ServiceError, ServiceResult};
use crate::{
    gateway::Gateway,
    models::{
        publication::{NewPublication, Publication},
        upload::UploadedFile,
    },
};
use std::sync::Arc;
use tracing::{info, warn};

/// Storage prefix every publication file is written under.
pub const PUBLICATIONS_PREFIX: &str = "publications";

const MAX_FILE_NAME_LEN: usize = 255;

/// Text fields of the publication form.
#[derive(Debug, Clone, PartialEq)]
pub struct PublicationDraft {
    pub user_id: String,
    pub category: String,
    pub description: String,
}

#[derive(Clone)]
pub struct PublicationService {
    gateway: Arc<dyn Gateway>,
}

impl PublicationService {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    /// Run the upload → public URL → insert pipeline.
    ///
    /// Returns the rows the insert produced. Any failure stops the pipeline
    /// and carries the gateway's message unchanged.
    pub async fn publish(
        &self,
        draft: PublicationDraft,
        file: UploadedFile,
    ) -> ServiceResult<Vec<Publication>> {
        ensure_file_name_safe(&file.file_name)?;
        let object_path = storage_path(&file.file_name);

        self.gateway.upload_object(&object_path, &file).await?;
        info!(
            path = %object_path,
            size_bytes = file.content.len(),
            "stored publication file"
        );

        let public_url = match self.gateway.public_url(&object_path) {
            Ok(url) => url,
            Err(err) => {
                self.discard_object(&object_path).await;
                return Err(err.into());
            }
        };

        let row = NewPublication {
            user_id: draft.user_id,
            category: draft.category,
            description: draft.description,
            file_path: public_url,
        };

        match self.gateway.insert_publication(&row).await {
            Ok(rows) => {
                info!(user_id = %row.user_id, path = %object_path, "publication recorded");
                Ok(rows)
            }
            Err(err) if err.is_rejection() => {
                warn!(path = %object_path, "publication insert failed: {}", err);
                self.discard_object(&object_path).await;
                Err(err.into())
            }
            // the row references the object, so it has to stay
            Err(err) => {
                warn!(path = %object_path, "publication stored, keeping file: {}", err);
                Err(err.into())
            }
        }
    }

    /// All publications, newest first, each with its owner's username.
    pub async fn list(&self) -> ServiceResult<Vec<Publication>> {
        Ok(self.gateway.list_publications().await?)
    }

    /// Best-effort removal of an object whose row could not be written.
    async fn discard_object(&self, object_path: &str) {
        match self.gateway.remove_object(object_path).await {
            Ok(()) => info!(path = %object_path, "removed orphaned publication file"),
            Err(err) => warn!(
                path = %object_path,
                "could not remove orphaned publication file: {}", err
            ),
        }
    }
}

/// Storage path for an uploaded file name.
pub fn storage_path(file_name: &str) -> String {
    format!("{}/{}", PUBLICATIONS_PREFIX, file_name)
}

/// The file name becomes a single path segment, so it must not be able to
/// climb out of or nest below the publications prefix.
fn ensure_file_name_safe(name: &str) -> ServiceResult<()> {
    let invalid = |reason| {
        Err(ServiceError::InvalidFileName {
            name: name.to_string(),
            reason,
        })
    };

    if name.is_empty() {
        return invalid("must not be empty");
    }
    if name.len() > MAX_FILE_NAME_LEN {
        return invalid("too long");
    }
    if name == "." || name == ".." {
        return invalid("must not be `.` or `..`");
    }
    if name.contains('/') || name.contains('\\') {
        return invalid("must not contain path separators");
    }
    if name.chars().any(|c| c.is_control()) {
        return invalid("must not contain control characters");
    }
    Ok(())
}
