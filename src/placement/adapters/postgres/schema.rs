//! Diesel schema for placement persistence.

diesel::table! {
    /// Boards: the project scope of tasks, sprints and columns.
    boards (id) {
        /// Board identifier.
        id -> Uuid,
        /// Owning organization.
        organization_id -> Uuid,
        /// Board name.
        #[max_length = 255]
        name -> Varchar,
    }
}

diesel::table! {
    /// Kanban columns outside any sprint.
    board_columns (id) {
        /// Column identifier.
        id -> Uuid,
        /// Owning board.
        board_id -> Uuid,
        /// Column name.
        #[max_length = 255]
        name -> Varchar,
        /// Workflow role (`initial`, `active`, `terminal`).
        #[max_length = 20]
        role -> Varchar,
        /// Optional work-in-progress limit.
        wip_limit -> Nullable<Int4>,
    }
}

diesel::table! {
    /// Sprints on a board.
    sprints (id) {
        /// Sprint identifier.
        id -> Uuid,
        /// Owning board.
        board_id -> Uuid,
        /// Sprint name.
        #[max_length = 255]
        name -> Varchar,
    }
}

diesel::table! {
    /// Columns inside a sprint.
    sprint_columns (id) {
        /// Column identifier.
        id -> Uuid,
        /// Owning sprint.
        sprint_id -> Uuid,
        /// Column name.
        #[max_length = 255]
        name -> Varchar,
        /// Workflow role (`initial`, `active`, `terminal`).
        #[max_length = 20]
        role -> Varchar,
        /// Optional work-in-progress limit.
        wip_limit -> Nullable<Int4>,
    }
}

diesel::table! {
    /// Tasks and their three-reference placement layout.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning board.
        board_id -> Uuid,
        /// Task title.
        #[max_length = 255]
        title -> Varchar,
        /// Task type.
        #[max_length = 20]
        task_type -> Varchar,
        /// Task priority.
        #[max_length = 20]
        priority -> Varchar,
        /// Optional story-point estimate.
        estimate -> Nullable<Int4>,
        /// Board column reference.
        board_column_id -> Nullable<Uuid>,
        /// Sprint reference.
        sprint_id -> Nullable<Uuid>,
        /// Sprint column reference.
        sprint_column_id -> Nullable<Uuid>,
        /// Rank inside the current container.
        position -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Directed blocking edges between tasks.
    task_blockers (blocker_id, blocked_id) {
        /// Blocking task.
        blocker_id -> Uuid,
        /// Blocked task.
        blocked_id -> Uuid,
    }
}

diesel::table! {
    /// Predefined template tasks owned by a board.
    template_tasks (id) {
        /// Template identifier.
        id -> Uuid,
        /// Owning board.
        board_id -> Uuid,
        /// Title copied into cloned tasks.
        #[max_length = 255]
        title -> Varchar,
        /// Task type copied into cloned tasks.
        #[max_length = 20]
        task_type -> Varchar,
        /// Priority copied into cloned tasks.
        #[max_length = 20]
        priority -> Varchar,
        /// Estimate copied into cloned tasks.
        estimate -> Nullable<Int4>,
        /// Order in which templates are cloned.
        template_order -> Int4,
    }
}
