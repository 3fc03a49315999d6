use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection,
    DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Schema, Set,
};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};
use uuid::Uuid;

use yatra_core::{
    AgentOutputRecord, ConversationState, EngineError, EntitySlots, MessageRecord, OutputKind,
    Role, SessionRecord, SessionStats, SessionStore,
};
use yatra_entities::{agent_outputs, messages, sessions};

fn is_table_already_exists_error(err: &DbErr) -> bool {
    err.to_string().contains("table") && err.to_string().contains("already exists")
}

/// SQLite-backed session store.
///
/// SQLite allows a single writer; the pool is capped at one connection
/// so concurrent statements queue at the pool instead of failing with
/// lock errors. Logical per-session exclusivity is a separate layer:
/// [`SessionStore::lock_session`] guards a whole turn.
pub struct MemoryManager {
    db: DatabaseConnection,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl MemoryManager {
    /// Open (and create if needed) the store at the given file path.
    pub async fn new(db_path: &Path) -> anyhow::Result<Self> {
        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
        Self::connect(&db_url).await
    }

    /// Open a private in-memory store. Used by tests and ephemeral runs.
    pub async fn in_memory() -> anyhow::Result<Self> {
        Self::connect("sqlite::memory:").await
    }

    async fn connect(db_url: &str) -> anyhow::Result<Self> {
        info!("Connecting to session database: {}", db_url);

        let mut options = ConnectOptions::new(db_url.to_owned());
        options.max_connections(1);
        let db = Database::connect(options).await?;

        Self::init_schema(&db).await?;

        info!("MemoryManager initialized");
        Ok(Self {
            db,
            locks: Mutex::new(HashMap::new()),
        })
    }

    async fn init_schema(db: &DatabaseConnection) -> anyhow::Result<()> {
        let backend = db.get_database_backend();
        let schema = Schema::new(backend);

        let statements = [
            schema.create_table_from_entity(sessions::Entity),
            schema.create_table_from_entity(messages::Entity),
            schema.create_table_from_entity(agent_outputs::Entity),
        ];

        for stmt in statements {
            match db.execute_unprepared(&backend.build(&stmt).to_string()).await {
                Ok(_) => {}
                Err(e) if is_table_already_exists_error(&e) => {
                    debug!("Table already exists, skipping creation");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }

    async fn require_session(&self, id: &str) -> Result<sessions::Model, EngineError> {
        sessions::Entity::find_by_id(id.to_owned())
            .one(&self.db)
            .await
            .map_err(EngineError::storage)?
            .ok_or_else(|| EngineError::SessionNotFound(id.to_owned()))
    }

    async fn touch(&self, model: sessions::Model) -> Result<(), EngineError> {
        let mut active: sessions::ActiveModel = model.into();
        active.last_activity = Set(Utc::now().naive_utc());
        active.update(&self.db).await.map_err(EngineError::storage)?;
        Ok(())
    }

    /// All session ids currently in the store.
    pub async fn list_sessions(&self) -> Result<Vec<String>, EngineError> {
        let models = sessions::Entity::find()
            .all(&self.db)
            .await
            .map_err(EngineError::storage)?;

        Ok(models.into_iter().map(|s| s.id).collect())
    }

    /// Delete every session whose last activity is older than `max_age`.
    /// Returns the number of sessions removed.
    pub async fn purge_stale_sessions(&self, max_age: chrono::Duration) -> Result<u64, EngineError> {
        let cutoff = (Utc::now() - max_age).naive_utc();

        let stale = sessions::Entity::find()
            .filter(sessions::Column::LastActivity.lt(cutoff))
            .all(&self.db)
            .await
            .map_err(EngineError::storage)?;

        let mut removed = 0_u64;
        for session in stale {
            if self.delete_session(&session.id).await? {
                removed += 1;
            }
        }

        info!("Purged {} stale sessions", removed);
        Ok(removed)
    }
}

fn session_record(model: sessions::Model) -> SessionRecord {
    let metadata: HashMap<String, String> =
        serde_json::from_str(&model.metadata).unwrap_or_default();
    let entities: EntitySlots = serde_json::from_str(&model.entities).unwrap_or_default();

    SessionRecord {
        id: model.id,
        created_at: model.created_at.and_utc(),
        last_activity: model.last_activity.and_utc(),
        metadata,
        entities,
        state: ConversationState::from_str_lowercase(&model.state),
        language: model.language,
    }
}

fn message_record(model: messages::Model) -> MessageRecord {
    MessageRecord {
        role: Role::from_str_lowercase(&model.role),
        content: model.content,
        metadata: model
            .metadata
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok()),
        timestamp: model.timestamp.and_utc(),
    }
}

fn output_record(model: agent_outputs::Model) -> Option<AgentOutputRecord> {
    let Some(kind) = OutputKind::from_str_lowercase(&model.output_type) else {
        warn!("Skipping agent output with unknown type: {}", model.output_type);
        return None;
    };

    let payload = serde_json::from_str(&model.output_data)
        .unwrap_or(serde_json::Value::String(model.output_data));

    Some(AgentOutputRecord {
        agent_name: model.agent_name,
        task_name: model.task_name,
        kind,
        payload,
        timestamp: model.timestamp.and_utc(),
    })
}

#[async_trait]
impl SessionStore for MemoryManager {
    async fn create_session(&self, metadata: HashMap<String, String>) -> Result<String, EngineError> {
        let id = Uuid::now_v7().to_string();
        let now = Utc::now().naive_utc();
        let metadata_json =
            serde_json::to_string(&metadata).map_err(EngineError::storage)?;

        sessions::ActiveModel {
            id: Set(id.clone()),
            created_at: Set(now),
            last_activity: Set(now),
            metadata: Set(metadata_json),
            entities: Set("{}".to_string()),
            state: Set(ConversationState::Collecting.as_str().to_string()),
            language: Set(None),
        }
        .insert(&self.db)
        .await
        .map_err(EngineError::storage)?;

        info!("Session created: {}", id);
        Ok(id)
    }

    async fn get_session(&self, id: &str) -> Result<Option<SessionRecord>, EngineError> {
        let model = sessions::Entity::find_by_id(id.to_owned())
            .one(&self.db)
            .await
            .map_err(EngineError::storage)?;

        Ok(model.map(session_record))
    }

    async fn append_message(
        &self,
        id: &str,
        role: Role,
        content: &str,
        metadata: Option<serde_json::Value>,
    ) -> Result<(), EngineError> {
        let session = self.require_session(id).await?;

        messages::ActiveModel {
            session_id: Set(id.to_owned()),
            role: Set(role.as_str().to_string()),
            content: Set(content.to_string()),
            metadata: Set(metadata.map(|v| v.to_string())),
            timestamp: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(EngineError::storage)?;

        self.touch(session).await?;

        debug!("Message appended to session {}: {}", id, role.as_str());
        Ok(())
    }

    async fn append_agent_output(
        &self,
        id: &str,
        agent_name: &str,
        task_name: &str,
        kind: OutputKind,
        payload: serde_json::Value,
    ) -> Result<(), EngineError> {
        self.require_session(id).await?;

        agent_outputs::ActiveModel {
            session_id: Set(id.to_owned()),
            agent_name: Set(agent_name.to_string()),
            task_name: Set(task_name.to_string()),
            output_type: Set(kind.as_str().to_string()),
            output_data: Set(payload.to_string()),
            timestamp: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(EngineError::storage)?;

        debug!("Agent output stored for session {}: {}", id, agent_name);
        Ok(())
    }

    async fn merge_entity_slots(
        &self,
        id: &str,
        partial: &EntitySlots,
    ) -> Result<EntitySlots, EngineError> {
        let session = self.require_session(id).await?;

        let mut merged: EntitySlots =
            serde_json::from_str(&session.entities).unwrap_or_default();
        merged.merge(partial);

        let entities_json = serde_json::to_string(&merged).map_err(EngineError::storage)?;
        let mut active: sessions::ActiveModel = session.into();
        active.entities = Set(entities_json);
        active.update(&self.db).await.map_err(EngineError::storage)?;

        Ok(merged)
    }

    async fn replace_entity_slots(&self, id: &str, slots: &EntitySlots) -> Result<(), EngineError> {
        let session = self.require_session(id).await?;

        let entities_json = serde_json::to_string(slots).map_err(EngineError::storage)?;
        let mut active: sessions::ActiveModel = session.into();
        active.entities = Set(entities_json);
        active.update(&self.db).await.map_err(EngineError::storage)?;

        Ok(())
    }

    async fn set_state(&self, id: &str, state: ConversationState) -> Result<(), EngineError> {
        let session = self.require_session(id).await?;

        let mut active: sessions::ActiveModel = session.into();
        active.state = Set(state.as_str().to_string());
        active.update(&self.db).await.map_err(EngineError::storage)?;

        Ok(())
    }

    async fn set_language(&self, id: &str, language: &str) -> Result<(), EngineError> {
        let session = self.require_session(id).await?;

        let mut active: sessions::ActiveModel = session.into();
        active.language = Set(Some(language.to_string()));
        active.update(&self.db).await.map_err(EngineError::storage)?;

        Ok(())
    }

    async fn delete_session(&self, id: &str) -> Result<bool, EngineError> {
        // Child rows first: SQLite only honors the FK cascade when
        // foreign keys are enabled on the connection.
        let _guard = self.lock_session(id).await;

        let found = sessions::Entity::find_by_id(id.to_owned())
            .one(&self.db)
            .await
            .map_err(EngineError::storage)?
            .is_some();

        messages::Entity::delete_many()
            .filter(messages::Column::SessionId.eq(id))
            .exec(&self.db)
            .await
            .map_err(EngineError::storage)?;
        agent_outputs::Entity::delete_many()
            .filter(agent_outputs::Column::SessionId.eq(id))
            .exec(&self.db)
            .await
            .map_err(EngineError::storage)?;
        sessions::Entity::delete_by_id(id.to_owned())
            .exec(&self.db)
            .await
            .map_err(EngineError::storage)?;

        drop(_guard);
        self.locks.lock().await.remove(id);

        if found {
            info!("Session deleted: {}", id);
        } else {
            debug!("Delete requested for unknown session: {}", id);
        }
        Ok(found)
    }

    async fn recent_agent_outputs(
        &self,
        id: &str,
        kinds: &[OutputKind],
        limit: u64,
    ) -> Result<Vec<AgentOutputRecord>, EngineError> {
        let mut query = agent_outputs::Entity::find()
            .filter(agent_outputs::Column::SessionId.eq(id));

        if !kinds.is_empty() {
            let names: Vec<&str> = kinds.iter().map(|k| k.as_str()).collect();
            query = query.filter(agent_outputs::Column::OutputType.is_in(names));
        }

        let models = query
            .order_by_desc(agent_outputs::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(EngineError::storage)?;

        Ok(models.into_iter().filter_map(output_record).collect())
    }

    async fn conversation_history(
        &self,
        id: &str,
        limit: u64,
    ) -> Result<Vec<MessageRecord>, EngineError> {
        let mut models = messages::Entity::find()
            .filter(messages::Column::SessionId.eq(id))
            .order_by_desc(messages::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(EngineError::storage)?;

        // Fetched newest-first to honor the limit; present chronologically.
        models.reverse();
        Ok(models.into_iter().map(message_record).collect())
    }

    async fn session_stats(&self, id: &str) -> Result<SessionStats, EngineError> {
        let session = sessions::Entity::find_by_id(id.to_owned())
            .one(&self.db)
            .await
            .map_err(EngineError::storage)?;

        let message_count = messages::Entity::find()
            .filter(messages::Column::SessionId.eq(id))
            .count(&self.db)
            .await
            .map_err(EngineError::storage)?;

        let agent_call_count = agent_outputs::Entity::find()
            .filter(agent_outputs::Column::SessionId.eq(id))
            .count(&self.db)
            .await
            .map_err(EngineError::storage)?;

        Ok(SessionStats {
            message_count,
            agent_call_count,
            created_at: session.as_ref().map(|s| s.created_at.and_utc()),
            last_activity: session.as_ref().map(|s| s.last_activity.and_utc()),
        })
    }

    async fn lock_session(&self, id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(
                locks
                    .entry(id.to_owned())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        lock.lock_owned().await
    }

    async fn ping(&self) -> Result<(), EngineError> {
        self.db
            .execute_unprepared("SELECT 1")
            .await
            .map_err(EngineError::storage)?;
        Ok(())
    }
}
