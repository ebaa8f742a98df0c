//! `POST /publication` (multipart upload) and `GET /publications`.

use super::required;
use crate::{
    errors::AppError,
    models::{publication::Publication, upload::UploadedFile},
    services::{
        ServiceError,
        publication_service::{PublicationDraft, PublicationService},
    },
};
use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use tracing::debug;

pub const PUBLISHED_MESSAGE: &str = "Colaboração publicada com sucesso!";

/// Multipart field carrying the uploaded file.
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct PublishResponse {
    pub message: &'static str,
    pub publication: Vec<Publication>,
}

/// Fields collected from the publication form before validation.
#[derive(Debug, Default)]
struct PublicationForm {
    user_id: Option<String>,
    category: Option<String>,
    description: Option<String>,
    file: Option<UploadedFile>,
}

impl PublicationForm {
    async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            match name.as_str() {
                FILE_FIELD => {
                    if form.file.is_some() {
                        return Err(ServiceError::UnexpectedFile(name).into());
                    }
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let content_type = field.content_type().map(str::to_owned);
                    let content = field.bytes().await?;
                    form.file = Some(UploadedFile {
                        file_name,
                        content_type,
                        content,
                    });
                }
                "user_id" => form.user_id = Some(field.text().await?),
                "category" => form.category = Some(field.text().await?),
                "description" => form.description = Some(field.text().await?),
                _ => debug!("ignoring form field `{}`", name),
            }
        }
        Ok(form)
    }

    fn validate(self) -> Result<(PublicationDraft, UploadedFile), ServiceError> {
        let draft = PublicationDraft {
            user_id: required(self.user_id, "user_id")?,
            category: required(self.category, "category")?,
            description: required(self.description, "description")?,
        };
        let file = self.file.ok_or(ServiceError::MissingField(FILE_FIELD))?;
        Ok((draft, file))
    }
}

pub async fn create_publication(
    State(publications): State<PublicationService>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AppError> {
    let (draft, file) = PublicationForm::read(multipart?).await?.validate()?;

    let rows = publications.publish(draft, file).await?;

    Ok((
        StatusCode::CREATED,
        Json(PublishResponse {
            message: PUBLISHED_MESSAGE,
            publication: rows,
        }),
    ))
}

pub async fn list_publications(
    State(publications): State<PublicationService>,
) -> Result<Json<Vec<Publication>>, AppError> {
    Ok(Json(publications.list().await?))
}
