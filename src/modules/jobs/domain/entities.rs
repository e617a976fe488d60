/// Domain entities for the background job system
///
/// Jobs represent async import stages (profile, catalog, events, setlists)
/// that are queued per named queue and processed by worker pools.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Named queues, one per import stage kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Queue {
    ProfileSync,
    CatalogSync,
    EventSync,
    SetlistSync,
}

impl Queue {
    pub const ALL: [Queue; 4] = [
        Queue::ProfileSync,
        Queue::CatalogSync,
        Queue::EventSync,
        Queue::SetlistSync,
    ];
}

impl std::fmt::Display for Queue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Queue::ProfileSync => write!(f, "profile-sync"),
            Queue::CatalogSync => write!(f, "catalog-sync"),
            Queue::EventSync => write!(f, "event-sync"),
            Queue::SetlistSync => write!(f, "setlist-sync"),
        }
    }
}

impl std::str::FromStr for Queue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "profile-sync" => Ok(Queue::ProfileSync),
            "catalog-sync" => Ok(Queue::CatalogSync),
            "event-sync" => Ok(Queue::EventSync),
            "setlist-sync" => Ok(Queue::SetlistSync),
            _ => Err(format!("Invalid queue name: {}", s)),
        }
    }
}

/// Job lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Waiting,
    Delayed,
    Active,
    Completed,
    Failed,
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobState::Waiting => write!(f, "waiting"),
            JobState::Delayed => write!(f, "delayed"),
            JobState::Active => write!(f, "active"),
            JobState::Completed => write!(f, "completed"),
            JobState::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for JobState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "waiting" => Ok(JobState::Waiting),
            "delayed" => Ok(JobState::Delayed),
            "active" => Ok(JobState::Active),
            "completed" => Ok(JobState::Completed),
            "failed" => Ok(JobState::Failed),
            _ => Err(format!("Invalid job state: {}", s)),
        }
    }
}

/// Five-level priority, 1 = critical .. 5 = background
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobPriority {
    Critical = 1,
    High = 2,
    Normal = 3,
    Low = 4,
    Background = 5,
}

impl JobPriority {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Recover the enum from a stored priority; out-of-range values clamp to
    /// the nearest level.
    pub fn from_i32(value: i32) -> Self {
        match value {
            i32::MIN..=1 => JobPriority::Critical,
            2 => JobPriority::High,
            3 => JobPriority::Normal,
            4 => JobPriority::Low,
            _ => JobPriority::Background,
        }
    }
}

/// Job payload for profile-sync jobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSyncPayload {
    pub artist_id: Uuid,
    pub attraction_id: String,
    pub force_refresh: bool,
    pub admin_import: bool,
}

/// Job payload for catalog-sync jobs; `deep` marks the exhaustive pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSyncPayload {
    pub artist_id: Uuid,
    pub deep: bool,
}

/// Job payload for event-sync jobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSyncPayload {
    pub artist_id: Uuid,
}

/// Job payload for setlist-sync jobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetlistSyncPayload {
    pub artist_id: Uuid,
}

/// New job to be queued (before insertion into the store)
#[derive(Debug, Clone)]
pub struct Job {
    pub queue: Queue,
    pub payload: serde_json::Value,
    pub priority: JobPriority,
}

impl Job {
    /// Create a new profile-sync job
    pub fn profile_sync(payload: ProfileSyncPayload, priority: JobPriority) -> Self {
        Self {
            queue: Queue::ProfileSync,
            payload: serde_json::to_value(payload).unwrap(),
            priority,
        }
    }

    /// Create a new catalog-sync job
    pub fn catalog_sync(payload: CatalogSyncPayload, priority: JobPriority) -> Self {
        Self {
            queue: Queue::CatalogSync,
            payload: serde_json::to_value(payload).unwrap(),
            priority,
        }
    }

    /// Create a new event-sync job
    pub fn event_sync(payload: EventSyncPayload, priority: JobPriority) -> Self {
        Self {
            queue: Queue::EventSync,
            payload: serde_json::to_value(payload).unwrap(),
            priority,
        }
    }

    /// Create a new setlist-sync job
    pub fn setlist_sync(payload: SetlistSyncPayload, priority: JobPriority) -> Self {
        Self {
            queue: Queue::SetlistSync,
            payload: serde_json::to_value(payload).unwrap(),
            priority,
        }
    }
}

/// Job record from the store (with lifecycle metadata)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: Uuid,
    pub queue: String,
    pub payload: serde_json::Value,
    pub priority: i32,
    pub state: String,
    pub attempts: i32,
    pub max_attempts: i32,
    pub progress: i32,
    pub delay_until: Option<DateTime<Utc>>,
    pub lease_owner: Option<String>,
    pub lease_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl JobRecord {
    /// Parse queue name
    pub fn parse_queue(&self) -> Result<Queue, String> {
        self.queue.parse()
    }

    /// Parse job state
    pub fn parse_state(&self) -> Result<JobState, String> {
        self.state.parse()
    }

    /// Check if job can be retried
    pub fn can_retry(&self) -> bool {
        self.attempts < self.max_attempts
    }

    /// Parse profile-sync payload
    pub fn parse_profile_payload(&self) -> Result<ProfileSyncPayload, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }

    /// Parse catalog-sync payload
    pub fn parse_catalog_payload(&self) -> Result<CatalogSyncPayload, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }

    /// Parse event-sync payload
    pub fn parse_event_payload(&self) -> Result<EventSyncPayload, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }

    /// Parse setlist-sync payload
    pub fn parse_setlist_payload(&self) -> Result<SetlistSyncPayload, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_display_roundtrip() {
        for queue in Queue::ALL {
            assert_eq!(queue.to_string().parse::<Queue>().unwrap(), queue);
        }
        assert!("not-a-queue".parse::<Queue>().is_err());
    }

    #[test]
    fn test_job_state_from_str() {
        assert_eq!("waiting".parse::<JobState>().unwrap(), JobState::Waiting);
        assert_eq!("DELAYED".parse::<JobState>().unwrap(), JobState::Delayed);
        assert!("invalid".parse::<JobState>().is_err());
    }

    #[test]
    fn test_priority_ordering() {
        assert_eq!(JobPriority::Critical.as_i32(), 1);
        assert_eq!(JobPriority::Background.as_i32(), 5);
        assert!(JobPriority::Critical < JobPriority::Background);
    }

    #[test]
    fn test_create_profile_sync_job() {
        let artist_id = Uuid::new_v4();
        let job = Job::profile_sync(
            ProfileSyncPayload {
                artist_id,
                attraction_id: "evt_123".to_string(),
                force_refresh: false,
                admin_import: false,
            },
            JobPriority::High,
        );

        assert_eq!(job.queue, Queue::ProfileSync);
        assert_eq!(job.priority, JobPriority::High);

        let payload: ProfileSyncPayload = serde_json::from_value(job.payload).unwrap();
        assert_eq!(payload.artist_id, artist_id);
        assert_eq!(payload.attraction_id, "evt_123");
    }

    #[test]
    fn test_job_record_can_retry() {
        let record = JobRecord {
            id: Uuid::new_v4(),
            queue: "catalog-sync".to_string(),
            payload: serde_json::json!({"artist_id": Uuid::new_v4(), "deep": false}),
            priority: 3,
            state: "delayed".to_string(),
            attempts: 2,
            max_attempts: 3,
            progress: 0,
            delay_until: None,
            lease_owner: None,
            lease_expires_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            completed_at: None,
            error: Some("Test error".to_string()),
        };

        assert!(record.can_retry());

        let exhausted = JobRecord {
            attempts: 3,
            ..record
        };
        assert!(!exhausted.can_retry());
    }

    #[test]
    fn test_job_record_parse_payloads() {
        let artist_id = Uuid::new_v4();

        let record = JobRecord {
            id: Uuid::new_v4(),
            queue: "catalog-sync".to_string(),
            payload: serde_json::json!({"artist_id": artist_id, "deep": true}),
            priority: 5,
            state: "waiting".to_string(),
            attempts: 0,
            max_attempts: 3,
            progress: 0,
            delay_until: None,
            lease_owner: None,
            lease_expires_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            completed_at: None,
            error: None,
        };

        assert_eq!(record.parse_queue().unwrap(), Queue::CatalogSync);
        let payload = record.parse_catalog_payload().unwrap();
        assert_eq!(payload.artist_id, artist_id);
        assert!(payload.deep);
    }
}
