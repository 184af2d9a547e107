use anyhow::Result;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::{messages, prelude::*};

pub struct MessageRepository {
    conn: DatabaseConnection,
}

impl MessageRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn send(
        &self,
        sender_id: i64,
        recipient_id: i64,
        body: &str,
        now: &str,
    ) -> Result<messages::Model> {
        let active_model = messages::ActiveModel {
            sender_id: Set(sender_id),
            recipient_id: Set(recipient_id),
            body: Set(body.to_string()),
            is_read: Set(false),
            created_at: Set(now.to_string()),
            ..Default::default()
        };

        let inserted = Messages::insert(active_model).exec(&self.conn).await?;

        let row = Messages::find_by_id(inserted.last_insert_id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Message {} vanished after insert", inserted.last_insert_id))?;

        Ok(row)
    }

    /// Both directions of a two-party conversation, oldest first.
    pub async fn conversation(&self, a: i64, b: i64) -> Result<Vec<messages::Model>> {
        let rows = Messages::find()
            .filter(
                Condition::any()
                    .add(
                        Condition::all()
                            .add(messages::Column::SenderId.eq(a))
                            .add(messages::Column::RecipientId.eq(b)),
                    )
                    .add(
                        Condition::all()
                            .add(messages::Column::SenderId.eq(b))
                            .add(messages::Column::RecipientId.eq(a)),
                    ),
            )
            .order_by_asc(messages::Column::CreatedAt)
            .order_by_asc(messages::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows)
    }

    /// Everything sent to or from a profile, newest first, for the inbox view.
    pub async fn list_for_profile(&self, profile_id: i64) -> Result<Vec<messages::Model>> {
        let rows = Messages::find()
            .filter(
                Condition::any()
                    .add(messages::Column::SenderId.eq(profile_id))
                    .add(messages::Column::RecipientId.eq(profile_id)),
            )
            .order_by_desc(messages::Column::CreatedAt)
            .order_by_desc(messages::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows)
    }

    pub async fn unread_count(&self, recipient_id: i64) -> Result<u64> {
        let count = Messages::find()
            .filter(messages::Column::RecipientId.eq(recipient_id))
            .filter(messages::Column::IsRead.eq(false))
            .count(&self.conn)
            .await?;
        Ok(count)
    }

    /// Marks a message read; only the recipient may do so.
    pub async fn mark_read(&self, message_id: i64, recipient_id: i64) -> Result<bool> {
        let result = Messages::update_many()
            .col_expr(
                messages::Column::IsRead,
                sea_orm::sea_query::Expr::value(true),
            )
            .filter(messages::Column::Id.eq(message_id))
            .filter(messages::Column::RecipientId.eq(recipient_id))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count_all(&self) -> Result<u64> {
        Ok(Messages::find().count(&self.conn).await?)
    }
}
