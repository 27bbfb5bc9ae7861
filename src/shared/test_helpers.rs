//! In-memory stand-ins for the database and object storage, with call counters so tests
//! can prove which operations never reached the network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{extract::Request, middleware::Next, response::Response, Router};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::core::error::{AppError, Result, REFERENTIAL_REMEDIATION};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::equipment::models::{
    EquipmentSafetyRow, SafetyUpdate, TrainingVideoRef, UploadedFile,
};
use crate::features::equipment::services::{
    AttachmentService, EquipmentStore, PreviewRegistry, SafetyCheckService, SafetyPanelService,
    SchemaReadinessService, TrainingVideoService, SAFETY_CHECK_COLUMNS,
};
use crate::features::equipment::EquipmentServices;
use crate::features::people::models::{Invitation, Profile};
use crate::features::people::services::{DirectoryStore, PeopleService};
use crate::modules::storage::{decode_key, encode_key, BucketProvision, BucketRules, ObjectStorage};

/// Public endpoint used by `InMemoryStorage` URLs
pub const TEST_STORAGE_ENDPOINT: &str = "http://storage.test";

const BASE_EQUIPMENT_COLUMNS: [&str; 5] = ["id", "name", "attachments", "created_at", "updated_at"];

// =============================================================================
// OBJECT STORAGE
// =============================================================================

pub struct InMemoryStorage {
    bucket: String,
    rules: BucketRules,
    objects: Mutex<HashMap<String, (String, Vec<u8>)>>,
    bucket_exists: AtomicBool,
    uploads: AtomicUsize,
    deletes: AtomicUsize,
    ensures: AtomicUsize,
    fail_uploads: AtomicBool,
    fail_deletes: AtomicBool,
}

impl InMemoryStorage {
    pub fn new(bucket: &str) -> Self {
        Self::with_rules(bucket, BucketRules::default())
    }

    pub fn with_rules(bucket: &str, rules: BucketRules) -> Self {
        Self {
            bucket: bucket.to_string(),
            rules,
            objects: Mutex::new(HashMap::new()),
            bucket_exists: AtomicBool::new(false),
            uploads: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
            ensures: AtomicUsize::new(0),
            fail_uploads: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
        }
    }

    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn upload_calls(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn ensure_calls(&self) -> usize {
        self.ensures.load(Ordering::SeqCst)
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    fn prefix(&self) -> String {
        format!("{}/{}/", TEST_STORAGE_ENDPOINT, self.bucket)
    }
}

#[async_trait]
impl ObjectStorage for InMemoryStorage {
    fn bucket_name(&self) -> String {
        self.bucket.clone()
    }

    async fn ensure_bucket(&self) -> Result<BucketProvision> {
        self.ensures.fetch_add(1, Ordering::SeqCst);
        if self.bucket_exists.swap(true, Ordering::SeqCst) {
            Ok(BucketProvision::AlreadyExists)
        } else {
            Ok(BucketProvision::Created)
        }
    }

    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<String> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(AppError::Storage(format!("Failed to upload file '{}'", key)));
        }
        self.rules.check(&self.bucket, content_type, data.len())?;
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (content_type.to_string(), data));
        Ok(key.to_string())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(AppError::Storage(format!("Failed to delete file '{}'", key)));
        }
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.contains(key))
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}{}", self.prefix(), encode_key(key))
    }

    fn extract_key_from_url(&self, url: &str) -> Option<String> {
        url.strip_prefix(self.prefix().as_str()).and_then(decode_key)
    }
}

// =============================================================================
// EQUIPMENT TABLE
// =============================================================================

struct EquipmentEntry {
    row: EquipmentSafetyRow,
    attachments: Value,
    writes: Vec<&'static str>,
}

pub struct InMemoryEquipmentStore {
    columns: Mutex<Vec<String>>,
    rows: Mutex<HashMap<Uuid, EquipmentEntry>>,
    /// Profile ids a manager may reference; `None` accepts any id
    people: Mutex<Option<Vec<Uuid>>>,
    probes: AtomicUsize,
    fetches: AtomicUsize,
    attachment_reads: AtomicUsize,
}

impl Default for InMemoryEquipmentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryEquipmentStore {
    /// Equipment table with the safety columns already provisioned
    pub fn new() -> Self {
        let store = Self::without_safety_columns();
        store
            .columns
            .lock()
            .unwrap()
            .extend(SAFETY_CHECK_COLUMNS.iter().map(|(name, _)| name.to_string()));
        store
    }

    pub fn without_safety_columns() -> Self {
        Self {
            columns: Mutex::new(BASE_EQUIPMENT_COLUMNS.iter().map(|c| c.to_string()).collect()),
            rows: Mutex::new(HashMap::new()),
            people: Mutex::new(None),
            probes: AtomicUsize::new(0),
            fetches: AtomicUsize::new(0),
            attachment_reads: AtomicUsize::new(0),
        }
    }

    pub fn drop_safety_columns(&self) {
        self.columns
            .lock()
            .unwrap()
            .retain(|c| !SAFETY_CHECK_COLUMNS.iter().any(|(name, _)| name == c));
    }

    pub fn insert_equipment(&self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        let row = EquipmentSafetyRow {
            id,
            name: name.to_string(),
            safety_frequency: None,
            safety_instructions: None,
            safety_manager_id: None,
            authorized_officers: None,
            training_video_url: None,
            training_video_name: None,
        };
        self.rows.lock().unwrap().insert(
            id,
            EquipmentEntry {
                row,
                attachments: Value::Null,
                writes: Vec::new(),
            },
        );
        id
    }

    pub fn row(&self, id: Uuid) -> EquipmentSafetyRow {
        self.rows.lock().unwrap()[&id].row.clone()
    }

    pub fn attachments(&self, id: Uuid) -> Value {
        self.rows.lock().unwrap()[&id].attachments.clone()
    }

    pub fn set_attachments(&self, id: Uuid, attachments: Value) {
        if let Some(entry) = self.rows.lock().unwrap().get_mut(&id) {
            entry.attachments = attachments;
        }
    }

    /// Order of the writes issued against one record
    pub fn write_log(&self, id: Uuid) -> Vec<&'static str> {
        self.rows.lock().unwrap()[&id].writes.clone()
    }

    pub fn restrict_people_to(&self, ids: Vec<Uuid>) {
        *self.people.lock().unwrap() = Some(ids);
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn attachment_reads(&self) -> usize {
        self.attachment_reads.load(Ordering::SeqCst)
    }

    fn require_safety_columns(&self) -> Result<()> {
        let columns = self.columns.lock().unwrap();
        match SAFETY_CHECK_COLUMNS
            .iter()
            .find(|(name, _)| !columns.iter().any(|c| c == name))
        {
            Some((name, _)) => Err(AppError::SetupRequired(format!(
                "column equipment.{} does not exist",
                name
            ))),
            None => Ok(()),
        }
    }

    fn with_entry<T>(&self, id: Uuid, f: impl FnOnce(&mut EquipmentEntry) -> T) -> Result<T> {
        self.rows
            .lock()
            .unwrap()
            .get_mut(&id)
            .map(f)
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }
}

#[async_trait]
impl EquipmentStore for InMemoryEquipmentStore {
    async fn column_names(&self) -> Result<Vec<String>> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        Ok(self.columns.lock().unwrap().clone())
    }

    async fn add_column(&self, name: &str, _definition: &str) -> Result<()> {
        let mut columns = self.columns.lock().unwrap();
        if columns.iter().any(|c| c == name) {
            return Err(AppError::Internal(format!(
                "column \"{}\" of relation \"equipment\" already exists",
                name
            )));
        }
        columns.push(name.to_string());
        Ok(())
    }

    async fn fetch_safety(&self, equipment_id: Uuid) -> Result<EquipmentSafetyRow> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.require_safety_columns()?;
        self.with_entry(equipment_id, |entry| entry.row.clone())
    }

    async fn update_safety(&self, equipment_id: Uuid, update: &SafetyUpdate) -> Result<()> {
        self.require_safety_columns()?;
        if let (Some(manager), Some(people)) = (update.manager_id, &*self.people.lock().unwrap()) {
            if !people.contains(&manager) {
                return Err(AppError::ReferentialIntegrity(
                    REFERENTIAL_REMEDIATION.to_string(),
                ));
            }
        }

        self.with_entry(equipment_id, |entry| {
            entry.row.safety_frequency = Some(update.frequency.clone());
            entry.row.safety_instructions = Some(json!(update.instructions));
            entry.row.safety_manager_id = update.manager_id;
            entry.row.authorized_officers = update
                .authorized_officers
                .as_ref()
                .map(|ids| json!(ids.iter().map(Uuid::to_string).collect::<Vec<_>>()));
            entry.writes.push("safety");
        })
    }

    async fn set_training_video(
        &self,
        equipment_id: Uuid,
        video: Option<&TrainingVideoRef>,
    ) -> Result<()> {
        self.require_safety_columns()?;
        self.with_entry(equipment_id, |entry| {
            entry.row.training_video_url = video.map(|v| v.url.clone());
            entry.row.training_video_name = video.map(|v| v.name.clone());
            entry.writes.push("training_video");
        })
    }

    async fn fetch_attachments(&self, equipment_id: Uuid) -> Result<Value> {
        self.attachment_reads.fetch_add(1, Ordering::SeqCst);
        self.with_entry(equipment_id, |entry| entry.attachments.clone())
    }

    async fn write_attachments(&self, equipment_id: Uuid, attachments: Value) -> Result<()> {
        self.with_entry(equipment_id, |entry| {
            entry.attachments = attachments;
            entry.writes.push("attachments");
        })
    }
}

// =============================================================================
// PEOPLE DIRECTORY
// =============================================================================

pub struct InMemoryDirectory {
    profiles: Mutex<Vec<Profile>>,
    invitations: Vec<Invitation>,
    fail_reads: AtomicBool,
}

impl InMemoryDirectory {
    pub fn new(profiles: Vec<Profile>, invitations: Vec<Invitation>) -> Self {
        Self {
            profiles: Mutex::new(profiles),
            invitations,
            fail_reads: AtomicBool::new(false),
        }
    }

    pub fn add_profile(&self, profile: Profile) {
        self.profiles.lock().unwrap().push(profile);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            Err(AppError::Internal("directory unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DirectoryStore for InMemoryDirectory {
    async fn list_profiles(&self) -> Result<Vec<Profile>> {
        self.check()?;
        Ok(self.profiles.lock().unwrap().clone())
    }

    async fn list_invitations(&self) -> Result<Vec<Invitation>> {
        self.check()?;
        Ok(self.invitations.clone())
    }
}

/// Profile with a random name and email and a role-neutral user type
pub fn fake_profile() -> Profile {
    Profile {
        id: Uuid::new_v4(),
        email: Some(SafeEmail().fake()),
        first_name: Some(FirstName().fake()),
        last_name: Some(LastName().fake()),
        user_type: Some("employee".to_string()),
    }
}

// =============================================================================
// FILES
// =============================================================================

pub fn upload_file(name: &str, content_type: &str, size: usize) -> UploadedFile {
    UploadedFile {
        file_name: name.to_string(),
        content_type: content_type.to_string(),
        data: vec![0u8; size],
    }
}

pub fn video_file(name: &str, size: usize) -> UploadedFile {
    upload_file(name, "video/mp4", size)
}

// =============================================================================
// WIRED SERVICES
// =============================================================================

/// Every service wired to in-memory backends, as `main` wires them to Postgres and MinIO
pub struct TestBackend {
    pub store: Arc<InMemoryEquipmentStore>,
    pub directory: Arc<InMemoryDirectory>,
    pub video_storage: Arc<InMemoryStorage>,
    pub attachment_storage: Arc<InMemoryStorage>,
    pub previews: Arc<PreviewRegistry>,
    pub schema: Arc<SchemaReadinessService>,
    pub people: Arc<PeopleService>,
    pub safety: Arc<SafetyCheckService>,
    pub videos: Arc<TrainingVideoService>,
    pub attachments: Arc<AttachmentService>,
    pub panel: Arc<SafetyPanelService>,
}

impl TestBackend {
    pub const VIDEO_MAX_SIZE: usize = 100 * 1024 * 1024;

    pub fn ready() -> Self {
        Self::build(InMemoryEquipmentStore::new())
    }

    pub fn needs_setup() -> Self {
        Self::build(InMemoryEquipmentStore::without_safety_columns())
    }

    fn build(store: InMemoryEquipmentStore) -> Self {
        let store = Arc::new(store);
        let directory = Arc::new(InMemoryDirectory::new(Vec::new(), Vec::new()));
        let video_storage = Arc::new(InMemoryStorage::with_rules(
            "training-videos",
            BucketRules::video_only(Self::VIDEO_MAX_SIZE),
        ));
        let attachment_storage = Arc::new(InMemoryStorage::new("equipment-attachments"));
        let previews = Arc::new(PreviewRegistry::new(Duration::from_secs(1800)));

        let schema = Arc::new(SchemaReadinessService::new(
            store.clone(),
            video_storage.clone(),
        ));
        let people = Arc::new(PeopleService::new(directory.clone()));
        let safety = Arc::new(SafetyCheckService::new(store.clone(), schema.clone()));
        let videos = Arc::new(TrainingVideoService::new(
            store.clone(),
            video_storage.clone(),
            schema.clone(),
            previews.clone(),
        ));
        let attachments = Arc::new(AttachmentService::new(
            store.clone(),
            attachment_storage.clone(),
        ));
        let panel = Arc::new(SafetyPanelService::new(
            people.clone(),
            safety.clone(),
            videos.clone(),
        ));

        Self {
            store,
            directory,
            video_storage,
            attachment_storage,
            previews,
            schema,
            people,
            safety,
            videos,
            attachments,
            panel,
        }
    }

    /// Full API router with every request authenticated as a test user
    pub fn router(&self) -> Router {
        let equipment = EquipmentServices {
            schema: self.schema.clone(),
            panel: self.panel.clone(),
            videos: self.videos.clone(),
            attachments: self.attachments.clone(),
            training_video_max_size: Self::VIDEO_MAX_SIZE,
        };
        with_test_user(crate::features::api_routes(self.people.clone(), equipment))
    }
}

// =============================================================================
// AUTH
// =============================================================================

pub fn test_user() -> AuthenticatedUser {
    AuthenticatedUser {
        sub: "test-sub".to_string(),
        email: Some("tester@example.com".to_string()),
        roles: vec!["manager".to_string()],
    }
}

async fn inject_test_user(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(test_user());
    next.run(request).await
}

pub fn with_test_user(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_test_user))
}
