table! {
    boards (id) {
        id -> Text,
        title -> Text,
        description -> Nullable<Text>,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

table! {
    columns (id) {
        id -> Text,
        board_id -> Text,
        title -> Text,
        rank -> Text,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

table! {
    issues (id) {
        id -> Text,
        column_id -> Text,
        title -> Text,
        description -> Nullable<Text>,
        rank -> Text,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

table! {
    tags (id) {
        id -> Text,
        name -> Text,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

table! {
    issue_tags (id) {
        id -> Text,
        issue_id -> Text,
        tag_id -> Text,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

joinable!(columns -> boards (board_id));
joinable!(issues -> columns (column_id));
joinable!(issue_tags -> issues (issue_id));
joinable!(issue_tags -> tags (tag_id));

allow_tables_to_appear_in_same_query!(
    boards,
    columns,
    issues,
    tags,
    issue_tags,
);
