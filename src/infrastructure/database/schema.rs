diesel::table! {
    use diesel::sql_types::*;
    use pgvector::sql_types::*;

    pages (id) {
        id -> Uuid,
        project -> Text,
        path -> Text,
        title -> Text,
        content -> Text,
        checksum -> Text,
        chunk_index -> Int4,
        embedding -> Nullable<Vector>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}
