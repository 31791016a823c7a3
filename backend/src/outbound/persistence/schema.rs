//! Diesel schema definitions.
//!
//! Kept in lockstep with the SQL under `migrations/`; regenerate with
//! `diesel print-schema` after adding a migration.

diesel::table! {
    media_objects (key) {
        key -> Text,
        owner_id -> Uuid,
        content_type -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    achievements (user_id, code) {
        user_id -> Uuid,
        code -> Text,
        points -> Int4,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    points_ledger (id) {
        id -> Uuid,
        user_id -> Uuid,
        points -> Int4,
        reason -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    friendships (id) {
        id -> Uuid,
        user_lo -> Uuid,
        user_hi -> Uuid,
        requester_id -> Uuid,
        status -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    challenges (id) {
        id -> Uuid,
        challenger_id -> Uuid,
        challenged_id -> Uuid,
        challenge_type -> Text,
        target_value -> Int8,
        challenger_progress -> Int8,
        challenged_progress -> Int8,
        points_reward -> Int4,
        status -> Text,
        winner_id -> Nullable<Uuid>,
        start_date -> Timestamptz,
        end_date -> Timestamptz,
        created_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    media_objects,
    achievements,
    points_ledger,
    friendships,
    challenges,
);
