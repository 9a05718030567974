//! Diesel schema for task persistence.

diesel::table! {
    /// Task records.
    tasks (id) {
        /// Store-assigned identifier.
        id -> Int8,
        /// Task title.
        #[max_length = 100]
        title -> Varchar,
        /// Optional description.
        #[max_length = 500]
        description -> Nullable<Varchar>,
        /// Completion flag.
        is_complete -> Bool,
        /// Creation timestamp.
        created_date -> Timestamptz,
        /// Optional due date.
        due_date -> Nullable<Timestamptz>,
        /// Completion timestamp.
        completed_date -> Nullable<Timestamptz>,
        /// Priority level in `1..=5`.
        priority -> Int2,
        /// Optimistic-concurrency token, replaced on every update.
        concurrency_token -> Uuid,
    }
}
