use chrono::Utc;
use diesel::prelude::*;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use shared::*;
use tracing::debug;
use uuid::Uuid;

use super::{BookingPatch, BookingStore, PartyResolver, StoreError, UpdateOutcome};
use crate::models::*;
use crate::schema::*;

pub type DbPool = bb8::Pool<AsyncDieselConnectionManager<AsyncPgConnection>>;

#[derive(Clone)]
pub struct PgBookingStore {
    pool: DbPool,
}

impl PgBookingStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn load_provider_user_id(conn: &mut AsyncPgConnection, provider_id: Uuid) -> Result<Uuid, StoreError> {
        let user_id = providers::table
            .filter(providers::id.eq(provider_id))
            .select(providers::user_id)
            .first::<Uuid>(conn)
            .await?;
        Ok(user_id)
    }

    async fn apply_patch(
        conn: &mut AsyncPgConnection,
        id: Uuid,
        expected_version: i32,
        changeset: BookingChangeset,
    ) -> Result<UpdateOutcome, StoreError> {
        conn.transaction::<_, StoreError, _>(|conn| {
            Box::pin(async move {
                let row = diesel::update(
                    bookings::table
                        .filter(bookings::id.eq(id))
                        .filter(bookings::version.eq(expected_version)),
                )
                .set(&changeset)
                .returning(BookingRow::as_returning())
                .get_result::<BookingRow>(conn)
                .await
                .optional()?;

                let Some(row) = row else {
                    return Ok(UpdateOutcome::VersionMismatch);
                };

                let provider_user_id = Self::load_provider_user_id(conn, row.provider_id).await?;
                let booking = row.into_booking(provider_user_id)?;

                let outbox_event = NewOutboxEvent::change(&ChangeEvent::booking(ChangeKind::Update, &booking))?;
                diesel::insert_into(outbox_events::table)
                    .values(&outbox_event)
                    .execute(conn)
                    .await?;

                Ok(UpdateOutcome::Updated(booking))
            })
        })
        .await
    }

    async fn insert_notification(conn: &mut AsyncPgConnection, row: NotificationRow) -> Result<NotificationRow, StoreError> {
        conn.transaction::<_, StoreError, _>(|conn| {
            Box::pin(async move {
                diesel::insert_into(notifications::table)
                    .values(&row)
                    .execute(conn)
                    .await?;

                let notification = Notification::from(row.clone());
                let outbox_event = NewOutboxEvent::change(&ChangeEvent::notification(&notification))?;
                diesel::insert_into(outbox_events::table)
                    .values(&outbox_event)
                    .execute(conn)
                    .await?;

                Ok(row)
            })
        })
        .await
    }
}

impl BookingStore for PgBookingStore {
    async fn get(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        let mut conn = self.pool.get().await?;

        let row = bookings::table
            .inner_join(providers::table)
            .filter(bookings::id.eq(id))
            .select((BookingRow::as_select(), providers::user_id))
            .first::<(BookingRow, Uuid)>(&mut conn)
            .await
            .optional()?;

        row.map(|(booking, provider_user_id)| booking.into_booking(provider_user_id))
            .transpose()
    }

    async fn get_details(&self, id: Uuid) -> Result<Option<BookingDetails>, StoreError> {
        let mut conn = self.pool.get().await?;

        let row = bookings::table
            .inner_join(providers::table)
            .inner_join(provider_services::table)
            .inner_join(profiles::table)
            .filter(bookings::id.eq(id))
            .select((
                BookingRow::as_select(),
                providers::user_id,
                providers::business_name,
                provider_services::name,
                provider_services::duration_minutes,
                profiles::full_name,
            ))
            .first::<DetailsRow>(&mut conn)
            .await
            .optional()?;

        row.map(details_from_row).transpose()
    }

    async fn list_for_party(&self, party_id: Uuid, role: PartyRole) -> Result<Vec<BookingDetails>, StoreError> {
        let mut conn = self.pool.get().await?;

        let query = bookings::table
            .inner_join(providers::table)
            .inner_join(provider_services::table)
            .inner_join(profiles::table)
            .select((
                BookingRow::as_select(),
                providers::user_id,
                providers::business_name,
                provider_services::name,
                provider_services::duration_minutes,
                profiles::full_name,
            ))
            .order((bookings::scheduled_date.desc(), bookings::scheduled_time.desc()))
            .into_boxed();

        let query = match role {
            PartyRole::Customer => query.filter(bookings::customer_id.eq(party_id)),
            PartyRole::Provider => query.filter(providers::user_id.eq(party_id)),
        };

        let rows = query.load::<DetailsRow>(&mut conn).await?;
        debug!("Loaded {} bookings for {} {}", rows.len(), role, party_id);

        rows.into_iter().map(details_from_row).collect()
    }

    async fn update(&self, id: Uuid, expected_version: i32, patch: BookingPatch) -> Result<UpdateOutcome, StoreError> {
        let mut conn = self.pool.get().await?;
        let changeset = BookingChangeset::new(&patch, expected_version + 1);
        Self::apply_patch(&mut conn, id, expected_version, changeset).await
    }

    async fn create_notification(&self, notification: NewNotification) -> Result<Notification, StoreError> {
        let mut conn = self.pool.get().await?;
        let row = NotificationRow::from(notification.into_notification());
        let row = Self::insert_notification(&mut conn, row).await?;
        Ok(Notification::from(row))
    }
}

impl PartyResolver for PgBookingStore {
    async fn resolve_party(&self, token: &str) -> Result<Option<Uuid>, StoreError> {
        let mut conn = self.pool.get().await?;

        let user_id = sessions::table
            .filter(sessions::token.eq(token))
            .filter(sessions::expires_at.gt(Utc::now()))
            .select(sessions::user_id)
            .first::<Uuid>(&mut conn)
            .await
            .optional()?;

        Ok(user_id)
    }
}
