//! Diesel schema for transition rule storage.

diesel::table! {
    /// Allowed status edges per task type and role.
    task_status_transitions (id) {
        /// Surrogate key.
        id -> Int4,
        /// Task type the rule belongs to.
        #[max_length = 50]
        task_type_code -> Varchar,
        /// Source status.
        #[max_length = 50]
        from_status_code -> Varchar,
        /// Target status.
        #[max_length = 50]
        to_status_code -> Varchar,
        /// Role required to take the edge; null opens it to everyone.
        #[max_length = 50]
        required_role -> Nullable<Varchar>,
        /// Whether the edge is only taken through a review decision.
        requires_approval -> Bool,
        /// Whether the edge is enabled.
        is_allowed -> Bool,
    }
}
