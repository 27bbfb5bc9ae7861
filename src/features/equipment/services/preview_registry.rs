use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

use crate::features::equipment::models::UploadedFile;

/// A staged, not yet saved training video held in process memory.
///
/// Leases are only ever dropped through `PreviewRegistry::retire`.
#[derive(Debug)]
pub struct PreviewLease {
    token: Uuid,
    file_name: String,
    content_type: String,
    data: Arc<Vec<u8>>,
    last_access: Instant,
}

/// Cheap view of a lease handed out to callers
#[derive(Debug, Clone)]
pub struct PendingVideo {
    pub token: Uuid,
    pub file_name: String,
    pub content_type: String,
    pub data: Arc<Vec<u8>>,
}

impl PreviewLease {
    fn snapshot(&self) -> PendingVideo {
        PendingVideo {
            token: self.token,
            file_name: self.file_name.clone(),
            content_type: self.content_type.clone(),
            data: Arc::clone(&self.data),
        }
    }
}

/// Local previews of selected training videos, at most one per equipment
pub struct PreviewRegistry {
    leases: Mutex<HashMap<Uuid, PreviewLease>>,
    idle_ttl: Duration,
}

impl PreviewRegistry {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            leases: Mutex::new(HashMap::new()),
            idle_ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, PreviewLease>> {
        self.leases.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn retire(equipment_id: Uuid, lease: PreviewLease, reason: &str) {
        debug!(
            "Released preview {} of equipment {} ({} bytes, {})",
            lease.token,
            equipment_id,
            lease.data.len(),
            reason
        );
    }

    /// Stage a selected file, releasing any preview it supersedes
    pub fn stage(&self, equipment_id: Uuid, file: UploadedFile) -> PendingVideo {
        let lease = PreviewLease {
            token: Uuid::new_v4(),
            file_name: file.file_name,
            content_type: file.content_type,
            data: Arc::new(file.data),
            last_access: Instant::now(),
        };
        let pending = lease.snapshot();

        if let Some(previous) = self.lock().insert(equipment_id, lease) {
            Self::retire(equipment_id, previous, "replaced");
        }
        pending
    }

    pub fn pending(&self, equipment_id: Uuid) -> Option<PendingVideo> {
        self.lock().get(&equipment_id).map(PreviewLease::snapshot)
    }

    /// Bytes for playback; refreshes the idle timer
    pub fn open(&self, equipment_id: Uuid, token: Uuid) -> Option<PendingVideo> {
        let mut leases = self.lock();
        let lease = leases.get_mut(&equipment_id).filter(|l| l.token == token)?;
        lease.last_access = Instant::now();
        Some(lease.snapshot())
    }

    /// Release the preview of `equipment_id`; returns whether one existed
    pub fn release(&self, equipment_id: Uuid) -> bool {
        match self.lock().remove(&equipment_id) {
            Some(lease) => {
                Self::retire(equipment_id, lease, "released");
                true
            }
            None => false,
        }
    }

    /// Release only if the preview is still the one identified by `token`
    pub fn release_token(&self, equipment_id: Uuid, token: Uuid) -> bool {
        let mut leases = self.lock();
        if leases.get(&equipment_id).is_some_and(|l| l.token == token) {
            if let Some(lease) = leases.remove(&equipment_id) {
                Self::retire(equipment_id, lease, "committed");
                return true;
            }
        }
        false
    }

    /// Release previews idle for longer than the configured TTL
    pub fn sweep(&self) -> usize {
        let mut leases = self.lock();
        let expired: Vec<Uuid> = leases
            .iter()
            .filter(|(_, lease)| lease.last_access.elapsed() > self.idle_ttl)
            .map(|(id, _)| *id)
            .collect();

        for equipment_id in &expired {
            if let Some(lease) = leases.remove(equipment_id) {
                Self::retire(*equipment_id, lease, "idle");
            }
        }
        expired.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Periodically release idle previews
    pub fn spawn_sweeper(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let released = self.sweep();
                if released > 0 {
                    debug!(
                        "Preview sweeper released {} idle previews, {} still staged",
                        released,
                        self.len()
                    );
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            content_type: "video/mp4".to_string(),
            data: vec![0u8; 16],
        }
    }

    #[test]
    fn test_stage_replaces_previous() {
        let registry = PreviewRegistry::new(Duration::from_secs(60));
        let id = Uuid::new_v4();

        let first = registry.stage(id, file("a.mp4"));
        let second = registry.stage(id, file("b.mp4"));

        assert_eq!(registry.len(), 1);
        assert!(registry.open(id, first.token).is_none());
        assert_eq!(registry.open(id, second.token).unwrap().file_name, "b.mp4");
    }

    #[test]
    fn test_release_token_ignores_newer_selection() {
        let registry = PreviewRegistry::new(Duration::from_secs(60));
        let id = Uuid::new_v4();

        let first = registry.stage(id, file("a.mp4"));
        registry.stage(id, file("b.mp4"));

        assert!(!registry.release_token(id, first.token));
        assert_eq!(registry.len(), 1);
        assert!(registry.release(id));
        assert!(!registry.release(id));
    }

    #[test]
    fn test_sweep_releases_idle_previews() {
        let registry = PreviewRegistry::new(Duration::ZERO);
        registry.stage(Uuid::new_v4(), file("a.mp4"));
        registry.stage(Uuid::new_v4(), file("b.mp4"));

        std::thread::sleep(Duration::from_millis(5));

        assert_eq!(registry.sweep(), 2);
        assert_eq!(registry.len(), 0);
    }
}
