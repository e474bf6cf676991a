use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::database::types::AccountKind;

/// Server-side login session; the primary key is the value of the `sid` cookie.
pub mod session {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DeriveEntityModel)]
    #[sea_orm(table_name = "sessions")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub account_kind: AccountKind,
        pub account_id: Uuid,
        pub created_at: DateTimeUtc,
        pub expires_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}

    impl Model {
        pub fn is_expired(&self, now: DateTimeUtc) -> bool {
            self.expires_at <= now
        }
    }
}
