//! Diesel schema for workflow storage.

diesel::table! {
    /// Task aggregates.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Task type code.
        #[max_length = 50]
        task_type -> Varchar,
        /// Lifecycle status code.
        #[max_length = 50]
        status -> Varchar,
        /// Title.
        title -> Text,
        /// Creator.
        creator_id -> Uuid,
        /// Assigned executor.
        executor_id -> Nullable<Uuid>,
        /// Direct parent task.
        parent_id -> Nullable<Uuid>,
        /// Hierarchy root.
        root_id -> Nullable<Uuid>,
        /// Priority code.
        #[max_length = 20]
        priority -> Varchar,
        /// Advisory solution deadline in days.
        solution_deadline_days -> Nullable<Int4>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last mutation timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Executor and jury membership rows.
    task_participants (task_id, user_id, role) {
        /// Owning task.
        task_id -> Uuid,
        /// Participating user.
        user_id -> Uuid,
        /// Participation role code.
        #[max_length = 20]
        role -> Varchar,
        /// Invitation status code.
        #[max_length = 20]
        status -> Varchar,
        /// Inviting user.
        invited_by -> Uuid,
        /// Invitation timestamp.
        invited_at -> Timestamptz,
    }
}

diesel::table! {
    /// Versioned solutions.
    solutions (id) {
        /// Solution identifier.
        id -> Uuid,
        /// Owning task.
        task_id -> Uuid,
        /// Per-task version.
        version -> Int4,
        /// Body.
        content -> Text,
        /// Mind-map reference.
        mindmap_ref -> Nullable<Text>,
        /// Review outcome code.
        #[max_length = 20]
        status -> Varchar,
        /// Submitting user.
        submitted_by -> Uuid,
        /// Submission timestamp.
        submitted_at -> Timestamptz,
    }
}

diesel::table! {
    /// Versioned execution plans.
    execution_plans (id) {
        /// Plan identifier.
        id -> Uuid,
        /// Owning task.
        task_id -> Uuid,
        /// Per-task version.
        version -> Int4,
        /// Body.
        content -> Text,
        /// Attachment reference.
        attachment_ref -> Nullable<Text>,
        /// Review outcome code.
        #[max_length = 20]
        status -> Varchar,
        /// Submitting user.
        submitted_by -> Uuid,
        /// Submission timestamp.
        submitted_at -> Timestamptz,
    }
}

diesel::table! {
    /// Goals belonging to one plan version.
    goals (id) {
        /// Goal identifier.
        id -> Uuid,
        /// Owning plan.
        plan_id -> Uuid,
        /// One-based ordinal.
        goal_no -> Int4,
        /// Title.
        title -> Text,
        /// Description.
        description -> Text,
        /// Acceptance criteria.
        acceptance_criteria -> Nullable<Text>,
        /// Priority code.
        #[max_length = 20]
        priority -> Varchar,
        /// Progress code.
        #[max_length = 20]
        status -> Varchar,
    }
}

diesel::table! {
    /// Review sessions over one artifact version.
    review_sessions (id) {
        /// Session identifier.
        id -> Uuid,
        /// Task under review.
        task_id -> Uuid,
        /// Review type code.
        #[max_length = 50]
        review_type -> Varchar,
        /// Target kind code.
        #[max_length = 50]
        target_type -> Varchar,
        /// Target artifact identifier.
        target_id -> Uuid,
        /// Vote collection mode code.
        #[max_length = 20]
        review_mode -> Varchar,
        /// Advisory quorum.
        required_approvals -> Int4,
        /// Session status code.
        #[max_length = 20]
        status -> Varchar,
        /// Opening user.
        initiated_by -> Uuid,
        /// Opening timestamp.
        initiated_at -> Timestamptz,
        /// Decision code.
        #[max_length = 20]
        final_decision -> Nullable<Varchar>,
        /// Closing user.
        decided_by -> Nullable<Uuid>,
        /// Closing timestamp.
        decided_at -> Nullable<Timestamptz>,
        /// Decision or cancellation comment.
        decision_comment -> Nullable<Text>,
        /// Completion timestamp.
        completed_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Votes and creator decisions.
    review_records (id) {
        /// Record identifier.
        id -> Uuid,
        /// Session voted in.
        session_id -> Uuid,
        /// Voting user.
        reviewer_id -> Uuid,
        /// Reviewer role code.
        #[max_length = 20]
        reviewer_role -> Varchar,
        /// Opinion code.
        #[max_length = 20]
        opinion -> Varchar,
        /// Score out of one hundred.
        score -> Nullable<Int2>,
        /// Vote weight.
        weight -> Float8,
        /// Remark.
        comment -> Nullable<Text>,
        /// Vote timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only audit trail.
    task_change_logs (id) {
        /// Entry identifier.
        id -> Uuid,
        /// Insertion sequence used for stable ordering.
        seq -> Int8,
        /// Owning task.
        task_id -> Uuid,
        /// Acting user.
        actor_id -> Uuid,
        /// Change type code.
        #[max_length = 50]
        change_type -> Varchar,
        /// Changed field.
        #[max_length = 100]
        field_name -> Nullable<Varchar>,
        /// Value before.
        old_value -> Nullable<Text>,
        /// Value after.
        new_value -> Nullable<Text>,
        /// Comment.
        comment -> Nullable<Text>,
        /// Entry timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(task_participants -> tasks (task_id));
diesel::joinable!(solutions -> tasks (task_id));
diesel::joinable!(execution_plans -> tasks (task_id));
diesel::joinable!(goals -> execution_plans (plan_id));
diesel::joinable!(review_sessions -> tasks (task_id));
diesel::joinable!(review_records -> review_sessions (session_id));
diesel::joinable!(task_change_logs -> tasks (task_id));

diesel::allow_tables_to_appear_in_same_query!(
    tasks,
    task_participants,
    solutions,
    execution_plans,
    goals,
    review_sessions,
    review_records,
    task_change_logs,
);
