diesel::table! {
    users (id) {
        id -> Uuid,
        email -> Text,
        password_hash -> Text,
        subscription_active -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    subscriptions (id) {
        id -> Uuid,
        subscription_code -> Nullable<Text>,
        user_id -> Uuid,
        plan -> Text,
        amount_minor -> Int8,
        status -> Text,
        next_payment_date -> Nullable<Timestamptz>,
        email_token -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    upload_jobs (id) {
        id -> Uuid,
        user_id -> Uuid,
        file_bytes -> Bytea,
        mime_type -> Text,
        size_bytes -> Int8,
        attempts -> Int4,
        max_attempts -> Int4,
        run_at -> Timestamptz,
        locked_at -> Nullable<Timestamptz>,
        locked_by -> Nullable<Text>,
        status -> Text,
        error -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    images (id) {
        id -> Uuid,
        job_id -> Uuid,
        user_id -> Uuid,
        url -> Text,
        metadata -> Jsonb,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(subscriptions -> users (user_id));
diesel::joinable!(upload_jobs -> users (user_id));
diesel::joinable!(images -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, subscriptions, upload_jobs, images,);
