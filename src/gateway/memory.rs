//! In-process gateway used by service and router tests.
//!
//! Mirrors the constraints the hosted project enforces: unique username and
//! email, no overwrite on upload, database-assigned ids and timestamps.

use super::{Gateway, GatewayError, GatewayResult};
use crate::models::{
    RowId,
    publication::{NewPublication, Owner, Publication},
    upload::UploadedFile,
    user::{NewUser, UserSummary},
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Map;
use std::{
    collections::BTreeMap,
    sync::{
        Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

pub const PUBLIC_BASE: &str = "http://gateway.test/storage/v1/object/public/uploads";

#[derive(Default)]
pub struct MemoryGateway {
    state: Mutex<State>,
    fail_publication_insert: AtomicBool,
    calls: AtomicUsize,
}

#[derive(Default)]
struct State {
    users: Vec<(i64, NewUser)>,
    objects: BTreeMap<String, UploadedFile>,
    publications: Vec<Publication>,
    next_id: i64,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Numeric text becomes an integer key, as an `int8` column would coerce it.
fn parse_row_id(raw: &str) -> RowId {
    raw.parse::<i64>()
        .map(RowId::Int)
        .unwrap_or_else(|_| RowId::Text(raw.to_string()))
}

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following publication insert fail like a rejected foreign key.
    pub fn fail_publication_inserts(&self) {
        self.fail_publication_insert.store(true, Ordering::SeqCst);
    }

    /// Number of gateway operations issued so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn user_count(&self) -> usize {
        self.state.lock().unwrap().users.len()
    }

    pub fn publication_count(&self) -> usize {
        self.state.lock().unwrap().publications.len()
    }

    pub fn object(&self, path: &str) -> Option<UploadedFile> {
        self.state.lock().unwrap().objects.get(path).cloned()
    }

    /// Seed a row with an explicit creation time.
    pub fn seed_publication(&self, user_id: i64, created_at: DateTime<Utc>) -> RowId {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.publications.push(Publication {
            id: RowId::Int(id),
            user_id: RowId::Int(user_id),
            category: Some("seed".into()),
            description: None,
            file_path: Some(format!("{}/publications/seed-{}", PUBLIC_BASE, id)),
            created_at: Some(created_at),
            users: None,
            extra: Map::new(),
        });
        RowId::Int(id)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn insert_user(&self, user: &NewUser) -> GatewayResult<()> {
        self.record_call();
        let mut state = self.state.lock().unwrap();
        if let Some((_, existing)) = state
            .users
            .iter()
            .find(|(_, u)| u.username == user.username || u.email == user.email)
        {
            let constraint = if existing.username == user.username {
                "users_username_key"
            } else {
                "users_email_key"
            };
            return Err(GatewayError::Conflict(format!(
                "duplicate key value violates unique constraint \"{}\"",
                constraint
            )));
        }
        let id = state.next_id();
        state.users.push((id, user.clone()));
        Ok(())
    }

    async fn find_users(
        &self,
        username: &str,
        password: &str,
    ) -> GatewayResult<Vec<UserSummary>> {
        self.record_call();
        let state = self.state.lock().unwrap();
        Ok(state
            .users
            .iter()
            .filter(|(_, u)| u.username == username && u.password == password)
            .map(|(id, u)| UserSummary {
                id: RowId::Int(*id),
                username: u.username.clone(),
            })
            .collect())
    }

    async fn upload_object(&self, path: &str, file: &UploadedFile) -> GatewayResult<()> {
        self.record_call();
        let mut state = self.state.lock().unwrap();
        if state.objects.contains_key(path) {
            return Err(GatewayError::Conflict("The resource already exists".into()));
        }
        state.objects.insert(path.to_string(), file.clone());
        Ok(())
    }

    fn public_url(&self, path: &str) -> GatewayResult<String> {
        Ok(format!("{}/{}", PUBLIC_BASE, path))
    }

    async fn remove_object(&self, path: &str) -> GatewayResult<()> {
        self.record_call();
        match self.state.lock().unwrap().objects.remove(path) {
            Some(_) => Ok(()),
            None => Err(GatewayError::Api {
                status: 404,
                message: "Object not found".into(),
            }),
        }
    }

    async fn insert_publication(
        &self,
        publication: &NewPublication,
    ) -> GatewayResult<Vec<Publication>> {
        self.record_call();
        if self.fail_publication_insert.load(Ordering::SeqCst) {
            return Err(GatewayError::Api {
                status: 409,
                message: "insert or update on table \"publications\" violates foreign key constraint \"publications_user_id_fkey\"".into(),
            });
        }
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        let row = Publication {
            id: RowId::Int(id),
            user_id: parse_row_id(&publication.user_id),
            category: Some(publication.category.clone()),
            description: Some(publication.description.clone()),
            file_path: Some(publication.file_path.clone()),
            created_at: Some(epoch() + Duration::seconds(id)),
            users: None,
            extra: Map::new(),
        };
        state.publications.push(row.clone());
        Ok(vec![row])
    }

    async fn list_publications(&self) -> GatewayResult<Vec<Publication>> {
        self.record_call();
        let state = self.state.lock().unwrap();
        let mut rows: Vec<Publication> = state
            .publications
            .iter()
            .cloned()
            .map(|mut row| {
                row.users = state
                    .users
                    .iter()
                    .find(|(id, _)| RowId::Int(*id) == row.user_id)
                    .map(|(_, u)| Owner {
                        username: u.username.clone(),
                    });
                row
            })
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn ping(&self) -> GatewayResult<()> {
        self.record_call();
        Ok(())
    }
}
