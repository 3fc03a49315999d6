use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub created_at: DateTime,
    pub last_activity: DateTime,
    /// Free-form string-to-string metadata, JSON encoded.
    pub metadata: String,
    /// Current entity slot record, JSON encoded.
    pub entities: String,
    pub state: String,
    pub language: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::messages::Entity")]
    Messages,
    #[sea_orm(has_many = "super::agent_outputs::Entity")]
    AgentOutputs,
}

impl Related<super::messages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Messages.def()
    }
}

impl Related<super::agent_outputs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AgentOutputs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
