diesel::table! {
    bookings (id) {
        id -> Uuid,
        customer_id -> Uuid,
        provider_id -> Uuid,
        provider_service_id -> Uuid,
        scheduled_date -> Date,
        scheduled_time -> Time,
        end_time -> Nullable<Time>,
        total_price -> Numeric,
        travel_fee -> Numeric,
        status -> Varchar,
        payment_intent_id -> Nullable<Varchar>,
        payment_status -> Varchar,
        notes -> Nullable<Text>,
        version -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    notifications (id) {
        id -> Uuid,
        user_id -> Uuid,
        notification_type -> Varchar,
        title -> Varchar,
        message -> Text,
        data -> Jsonb,
        is_read -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    outbox_events (id) {
        id -> Uuid,
        aggregate_id -> Uuid,
        event_type -> Varchar,
        event_data -> Jsonb,
        processed -> Nullable<Bool>,
        created_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    profiles (id) {
        id -> Uuid,
        full_name -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    provider_services (id) {
        id -> Uuid,
        provider_id -> Uuid,
        name -> Varchar,
        duration_minutes -> Int4,
        price -> Numeric,
    }
}

diesel::table! {
    providers (id) {
        id -> Uuid,
        user_id -> Uuid,
        business_name -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    sessions (token) {
        token -> Varchar,
        user_id -> Uuid,
        expires_at -> Timestamptz,
    }
}

diesel::joinable!(bookings -> profiles (customer_id));
diesel::joinable!(bookings -> provider_services (provider_service_id));
diesel::joinable!(bookings -> providers (provider_id));

diesel::allow_tables_to_appear_in_same_query!(
    bookings,
    notifications,
    outbox_events,
    profiles,
    provider_services,
    providers,
    sessions,
);
